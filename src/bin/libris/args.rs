//! Command-line surface for `libris`.

#![deny(clippy::all, clippy::pedantic)]

use clap::{Args, Parser, Subcommand};
use libris::config::ConfigOverrides;
use libris_api_types::Genre;
use time::Date;

use crate::io::{parse_due_date, parse_genre};

#[derive(Parser, Debug)]
#[command(name = "libris", version, about = "Library catalog client", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub overrides: ConfigOverrides,

    /// Answer yes to every confirmation prompt
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Book management (list/show/create/edit/delete)
    Books(BooksArgs),
    /// Borrow copies of a book
    Borrow(BorrowArgs),
    /// Borrowed quantity per book
    Summary,
    /// Resolve an application path and print what its route loads
    Open(OpenArgs),
}

#[derive(Parser, Debug)]
pub struct BooksArgs {
    #[command(subcommand)]
    pub action: BooksCmd,
}

#[derive(Subcommand, Debug)]
pub enum BooksCmd {
    /// List every book in the catalog
    List,
    /// Show one book
    Show { id: String },
    /// Add a book
    Create(BookFields),
    /// Edit a book; omitted fields keep their current value
    Edit {
        id: String,
        #[command(flatten)]
        fields: BookPatch,
    },
    /// Delete a book
    Delete { id: String },
}

#[derive(Args, Debug, Clone)]
pub struct BookFields {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub author: String,
    /// FICTION, NON_FICTION, SCIENCE, HISTORY, BIOGRAPHY or FANTASY
    #[arg(long, value_parser = parse_genre)]
    pub genre: Genre,
    #[arg(long)]
    pub isbn: String,
    #[arg(long)]
    pub description: String,
    #[arg(long, default_value_t = 1)]
    pub copies: u32,
}

#[derive(Args, Debug, Clone, Default)]
pub struct BookPatch {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub author: Option<String>,
    #[arg(long, value_parser = parse_genre)]
    pub genre: Option<Genre>,
    #[arg(long)]
    pub isbn: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub copies: Option<u32>,
}

#[derive(Args, Debug, Clone)]
pub struct BorrowArgs {
    /// Book id
    pub id: String,
    #[arg(long, default_value_t = 1)]
    pub quantity: u32,
    /// Due date as YYYY-MM-DD
    #[arg(long = "due-date", value_parser = parse_due_date)]
    pub due_date: Option<Date>,
}

#[derive(Args, Debug, Clone)]
pub struct OpenArgs {
    /// Path such as `/books/42` or `/borrow-summary`
    pub path: String,
}
