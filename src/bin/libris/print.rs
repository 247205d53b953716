#![deny(clippy::all, clippy::pedantic)]

use libris::application::AppError;
use libris::infra::error::InfraError;
use serde::Serialize;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|e| InfraError::output(format!("failed to render output: {e}")))?;
    println!("{out}");
    Ok(())
}
