//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `expenses` - Expense CRUD and spending summaries
//! - `budgets` - Per-user monthly budget maps
//! - `rules` - SQLite-backed category rule store
//! - `portfolio` - Portfolios, allocation plans, holdings, transactions
//! - `reference` - Mutual fund and stock reference tables
//! - `repayments` - Loan repayments, prepayments, and payment history

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;

use crate::error::Result;

mod budgets;
mod expenses;
mod portfolio;
mod reference;
mod repayments;
mod rules;

pub use expenses::ExpenseFilter;
pub use repayments::RepaymentSummary;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Parse a SQLite datetime string into a DateTime<Utc>
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    // SQLite stores as "YYYY-MM-DD HH:MM:SS" format
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Create a new database connection pool
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create an in-memory database (for testing)
    ///
    /// Note: Uses a temporary file rather than `:memory:` because each
    /// pooled connection would otherwise see its own empty database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = format!(
            "{}/outlay_test_{}_{}.db",
            std::env::temp_dir().display(),
            std::process::id(),
            id
        );

        // Remove any existing file
        let _ = std::fs::remove_file(&path);

        Self::new(&path)
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- Enable foreign keys
            PRAGMA foreign_keys = ON;

            -- WAL mode: better concurrency, readers don't block writers
            PRAGMA journal_mode = WAL;

            -- Synchronous NORMAL: good balance of safety and performance
            PRAGMA synchronous = NORMAL;

            -- Recorded expenses
            CREATE TABLE IF NOT EXISTS expenses (
                id INTEGER PRIMARY KEY,
                user_id TEXT NOT NULL,
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                raw_text TEXT NOT NULL,
                date TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_expenses_user_date ON expenses(user_id, date);

            -- Per-user budgets: one JSON map of category -> amount
            CREATE TABLE IF NOT EXISTS budgets (
                user_id TEXT PRIMARY KEY,
                budgets TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Learned term -> category rules. The term is the key; first
            -- writer wins via INSERT OR IGNORE.
            CREATE TABLE IF NOT EXISTS category_rules (
                term TEXT PRIMARY KEY,
                category TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Investment portfolios
            CREATE TABLE IF NOT EXISTS portfolios (
                id INTEGER PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_portfolios_user ON portfolios(user_id);

            -- One allocation plan per portfolio, stored as a JSON document
            CREATE TABLE IF NOT EXISTS allocation_plans (
                portfolio_id INTEGER PRIMARY KEY REFERENCES portfolios(id),
                plan TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Holdings: opaque instrument JSON plus derived classification
            CREATE TABLE IF NOT EXISTS holdings (
                id INTEGER PRIMARY KEY,
                user_id TEXT NOT NULL,
                portfolio_id INTEGER NOT NULL REFERENCES portfolios(id),
                data TEXT NOT NULL,
                asset_class TEXT NOT NULL,
                portfolio_role TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_holdings_portfolio ON holdings(portfolio_id);

            -- Investment buy/sell records
            CREATE TABLE IF NOT EXISTS invest_transactions (
                id INTEGER PRIMARY KEY,
                portfolio_id INTEGER NOT NULL REFERENCES portfolios(id),
                date TEXT NOT NULL,
                data TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_invest_txns_portfolio_date
                ON invest_transactions(portfolio_id, date);

            -- Asset class -> portfolio role overrides (built-in defaults
            -- apply when a class is absent here)
            CREATE TABLE IF NOT EXISTS asset_class_mapping (
                asset_class TEXT PRIMARY KEY,
                portfolio_role TEXT NOT NULL
            );

            -- Mutual fund scheme reference data (populated out of band)
            CREATE TABLE IF NOT EXISTS mutual_fund_schemes (
                scheme_code TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                full_name TEXT NOT NULL,
                current_nav REAL NOT NULL DEFAULT 0,
                asset_class TEXT NOT NULL DEFAULT '',
                portfolio_role TEXT NOT NULL DEFAULT '',
                is_etf INTEGER NOT NULL DEFAULT 0,
                amc TEXT NOT NULL DEFAULT '',
                scheme_type TEXT NOT NULL DEFAULT '',
                scheme_subtype TEXT NOT NULL DEFAULT '',
                option TEXT NOT NULL DEFAULT '',
                plan TEXT NOT NULL DEFAULT '',
                date TEXT NOT NULL DEFAULT ''
            );

            -- Listed stock reference data (populated out of band)
            CREATE TABLE IF NOT EXISTS stock_companies (
                symbol TEXT PRIMARY KEY,
                company_name TEXT NOT NULL,
                listing_date TEXT,
                isin_number TEXT NOT NULL DEFAULT '',
                exchange TEXT NOT NULL DEFAULT ''
            );

            -- Loan repayments
            CREATE TABLE IF NOT EXISTS repayments (
                id INTEGER PRIMARY KEY,
                user_id TEXT NOT NULL,
                loan_type TEXT NOT NULL,
                institution TEXT NOT NULL,
                principal REAL NOT NULL,
                interest_rate REAL NOT NULL,
                emi_amount REAL NOT NULL,
                tenure_months INTEGER NOT NULL,
                outstanding_balance REAL NOT NULL,
                start_date TEXT NOT NULL,
                due_date TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'active',
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_repayments_user ON repayments(user_id);

            -- Payment events: EMIs and prepayments
            CREATE TABLE IF NOT EXISTS repayment_history (
                id INTEGER PRIMARY KEY,
                repayment_id INTEGER NOT NULL REFERENCES repayments(id),
                amount REAL NOT NULL,
                payment_date TEXT NOT NULL,
                kind TEXT NOT NULL,
                principal_component REAL NOT NULL DEFAULT 0,
                interest_component REAL NOT NULL DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_repayment_history_loan
                ON repayment_history(repayment_id);
            "#,
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let db = Database::in_memory().unwrap();
        db.run_migrations().unwrap();
        db.run_migrations().unwrap();
    }

    #[test]
    fn test_parse_datetime_valid() {
        let dt = parse_datetime("2026-03-15 10:30:00");
        assert_eq!(dt.to_rfc3339(), "2026-03-15T10:30:00+00:00");
    }
}
