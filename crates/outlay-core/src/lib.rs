//! Outlay Core Library
//!
//! Shared functionality for the Outlay expense tracker:
//! - Database access and migrations
//! - Free-text amount and term extraction
//! - Layered categorization engine (synonyms, learned rules, AI fallback)
//! - Pluggable AI classifier backends (Groq, mock)
//! - Portfolio, reference-data, and loan repayment persistence

pub mod ai;
pub mod categories;
pub mod db;
pub mod engine;
pub mod error;
pub mod extract;
pub mod models;
pub mod rules;

pub use ai::{ClassifierBackend, ClassifierClient, ClassifierOutcome, GroqBackend, MockBackend};
pub use categories::ALLOWED_CATEGORIES;
pub use db::{Database, ExpenseFilter, RepaymentSummary};
pub use engine::CategorizationEngine;
pub use error::{Error, Result};
pub use models::{
    CategoryRule, CategorySuggestion, Expense, Holding, InvestmentTxn, MutualFund, Portfolio,
    Repayment, RepaymentEvent, StockCompany,
};
pub use rules::{MemoryRuleStore, RuleStore};
