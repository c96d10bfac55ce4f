//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Outlay - Expense tracking with layered categorization
#[derive(Parser)]
#[command(name = "outlay")]
#[command(about = "Self-hosted expense tracker and categorizer", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path (defaults to $OUTLAY_DB, then outlay.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Allowed CORS origin (repeatable)
        #[arg(long = "origin")]
        origins: Vec<String>,
    },

    /// Categorize one free-text entry and print the suggestion as JSON
    Categorize {
        /// The entry, e.g. "Lunch 250 at cafe"
        text: String,
    },

    /// Manage category rules
    Rules {
        #[command(subcommand)]
        action: Option<RulesAction>,
    },

    /// Print the allowed category list
    Categories,
}

#[derive(Subcommand)]
pub enum RulesAction {
    /// List all rules
    List,

    /// Add a rule (first writer wins)
    Add {
        /// Term to match, e.g. "laptop repair"
        term: String,

        /// Category to assign
        category: String,
    },

    /// Delete a rule by term
    Delete {
        /// Term of the rule to remove
        term: String,
    },
}
