#![deny(clippy::all, clippy::pedantic)]

use libris_api_types::Genre;
use time::{Date, macros::format_description};

pub fn parse_genre(value: &str) -> Result<Genre, String> {
    value.parse::<Genre>().map_err(|err| err.to_string())
}

pub fn parse_due_date(value: &str) -> Result<Date, String> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|err| format!("expected YYYY-MM-DD: {err}"))
}
