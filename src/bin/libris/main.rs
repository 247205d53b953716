//! libris: command-line front end for the catalog client.
//! Every command goes through the same cache, router and action flows a UI would use.
#![deny(clippy::all, clippy::pedantic)]

mod args;
mod context;
mod handlers;
mod io;
mod print;
mod prompt;


use std::process::ExitCode;

use clap::Parser;
use libris::application::AppError;
use libris::config;
use libris::infra::telemetry;

use args::{Cli, Commands};
use context::Ctx;
use handlers::{books, borrow, open, summary};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::from(err.exit_code())
        }
    }
}

fn report(err: &AppError) {
    match err {
        AppError::Route(boundary) => eprintln!("error {}: {}", boundary.status, boundary.message),
        other => eprintln!("error: {other}"),
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let settings = config::load(&cli.overrides)?;
    telemetry::init(&settings.logging)?;
    let ctx = Ctx::from_settings(&settings, cli.yes)?;

    match cli.command {
        Commands::Books(cmd) => books::handle(&ctx, cmd.action).await?,
        Commands::Borrow(cmd) => borrow::handle(&ctx, &cmd).await?,
        Commands::Summary => summary::handle(&ctx).await?,
        Commands::Open(cmd) => open::handle(&ctx, &cmd.path).await?,
    }

    Ok(())
}
