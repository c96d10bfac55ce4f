//! CLI command implementations

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use outlay_core::ai::ClassifierClient;
use outlay_core::categories::{is_allowed, ALLOWED_CATEGORIES};
use outlay_core::db::Database;
use outlay_core::engine::CategorizationEngine;
use outlay_core::rules::RuleStore;

/// Resolve the database path: --db flag, then $OUTLAY_DB, then outlay.db.
pub fn resolve_db_path(flag: Option<&Path>) -> PathBuf {
    flag.map(Path::to_path_buf)
        .or_else(|| std::env::var("OUTLAY_DB").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("outlay.db"))
}

pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    Database::new(path_str).context("Failed to open database")
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("Initializing database at {}...", db_path.display());

    open_db(db_path)?;

    println!("Database initialized.");
    println!();
    println!("Next steps:");
    println!("  1. Try a suggestion: outlay categorize \"Lunch 250 at cafe\"");
    println!("  2. Start the API:    outlay serve");

    Ok(())
}

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    origins: Vec<String>,
) -> Result<()> {
    let db = open_db(db_path)?;
    let config = outlay_server::ServerConfig {
        allowed_origins: origins,
    };
    outlay_server::serve(db, host, port, config).await
}

pub async fn cmd_categorize(db_path: &Path, text: &str) -> Result<()> {
    let db = open_db(db_path)?;
    let classifier = ClassifierClient::from_env();
    let engine = CategorizationEngine::new(Arc::new(db), classifier);

    let suggestion = engine.suggest(text).await?;
    println!("{}", serde_json::to_string_pretty(&suggestion)?);

    Ok(())
}

pub fn cmd_rules_list(db: &Database) -> Result<()> {
    let rules = db.scan_all()?;
    if rules.is_empty() {
        println!("No rules yet.");
        return Ok(());
    }

    for rule in rules {
        println!("{:30} -> {}", rule.term, rule.category);
    }
    Ok(())
}

pub fn cmd_rules_add(db: &Database, term: &str, category: &str) -> Result<()> {
    let term = term.trim().to_lowercase();
    anyhow::ensure!(!term.is_empty(), "Term must not be empty");
    anyhow::ensure!(
        is_allowed(category),
        "Unknown category: {} (see `outlay categories`)",
        category
    );

    if db.put_if_absent(&term, category)? {
        println!("Added: {} -> {}", term, category);
    } else {
        println!("Rule for '{}' already exists, left unchanged.", term);
    }
    Ok(())
}

pub fn cmd_rules_delete(db: &Database, term: &str) -> Result<()> {
    if db.delete(term)? {
        println!("Deleted rule '{}'.", term);
    } else {
        println!("No rule for '{}'.", term);
    }
    Ok(())
}

pub fn cmd_categories() -> Result<()> {
    for category in ALLOWED_CATEGORIES {
        println!("{}", category);
    }
    Ok(())
}
