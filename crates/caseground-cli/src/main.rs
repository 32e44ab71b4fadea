//! Caseground CLI
//!
//! Draft occupational-therapy reports grounded in prior case records.

use anyhow::Result;
use caseground_core::error::exit_codes;
use caseground_core::{CasegroundError, Config, Database};
use clap::Parser;

mod app;
mod commands;
mod output;
mod progress;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

/// Core errors carry their own exit code; anything else is a general error
fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<CasegroundError>()
        .map_or(exit_codes::GENERAL_ERROR, CasegroundError::exit_code)
}

async fn run(cli: Cli) -> Result<()> {
    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Open database (CASEGROUND_DB overrides the default location)
    let db = Database::open(Database::default_path())?;
    db.initialize()?;

    match cli.command {
        Commands::Generate(args) => commands::generate::run(args, db, &config, cli.format).await,
        Commands::Decompose(args) => commands::decompose::run(args, cli.format).await,
        Commands::Retrieve(args) => commands::retrieve::run(args, db, &config, cli.format).await,
        Commands::Ingest(args) => commands::ingest::run(args, &db, &config, cli.format).await,
        Commands::Status => commands::status::run(&db, &config, cli.format).await,
    }
}
