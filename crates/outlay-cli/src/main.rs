//! Outlay CLI - Expense tracker and categorizer
//!
//! Usage:
//!   outlay init                          Initialize database
//!   outlay categorize "Lunch 250"        Suggest a category for free text
//!   outlay rules add "dog food" "Pet Care"
//!   outlay serve --port 3000             Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let db_path = commands::resolve_db_path(cli.db.as_deref());

    match cli.command {
        Commands::Init => commands::cmd_init(&db_path),
        Commands::Serve {
            port,
            host,
            origins,
        } => commands::cmd_serve(&db_path, &host, port, origins).await,
        Commands::Categorize { text } => commands::cmd_categorize(&db_path, &text).await,
        Commands::Rules { action } => {
            let db = commands::open_db(&db_path)?;
            match action {
                None | Some(RulesAction::List) => commands::cmd_rules_list(&db),
                Some(RulesAction::Add { term, category }) => {
                    commands::cmd_rules_add(&db, &term, &category)
                }
                Some(RulesAction::Delete { term }) => commands::cmd_rules_delete(&db, &term),
            }
        }
        Commands::Categories => commands::cmd_categories(),
    }
}
