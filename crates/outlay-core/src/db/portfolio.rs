//! Portfolio operations: portfolios, allocation plans, holdings, and
//! investment transactions.

use chrono::NaiveDate;
use rusqlite::params;
use serde_json::Value;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Holding, InvestmentTxn, Portfolio};

/// Built-in asset class -> portfolio role defaults. Rows in
/// `asset_class_mapping` override these; anything unmapped is Equity.
const DEFAULT_ROLE_MAPPING: &[(&str, &str)] = &[
    ("Stocks", "Equity"),
    ("Equity MF", "Equity"),
    ("Liquid Funds", "Defensive"),
    ("Debt Funds", "Defensive"),
    ("Bonds", "Defensive"),
    ("FD", "Defensive"),
    ("Gold", "Satellite"),
    ("Real Estate", "Satellite"),
];

impl Database {
    /// Create a portfolio for a user.
    pub fn create_portfolio(&self, user_id: &str, name: &str) -> Result<Portfolio> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO portfolios (user_id, name) VALUES (?, ?)",
            params![user_id, name],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_portfolio(id)?
            .ok_or_else(|| Error::NotFound(format!("portfolio {}", id)))
    }

    pub fn get_portfolio(&self, id: i64) -> Result<Option<Portfolio>> {
        let conn = self.conn()?;
        let portfolio = conn
            .query_row(
                "SELECT id, user_id, name, created_at FROM portfolios WHERE id = ?",
                params![id],
                |row| {
                    let created_at_str: String = row.get(3)?;
                    Ok(Portfolio {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        name: row.get(2)?,
                        created_at: parse_datetime(&created_at_str),
                    })
                },
            )
            .ok();
        Ok(portfolio)
    }

    /// List a user's portfolios, oldest first.
    pub fn list_portfolios(&self, user_id: &str) -> Result<Vec<Portfolio>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, created_at FROM portfolios WHERE user_id = ? ORDER BY id",
        )?;
        let portfolios = stmt
            .query_map(params![user_id], |row| {
                let created_at_str: String = row.get(3)?;
                Ok(Portfolio {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    name: row.get(2)?,
                    created_at: parse_datetime(&created_at_str),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(portfolios)
    }

    /// Upsert the allocation plan for a portfolio.
    pub fn put_allocation_plan(&self, portfolio_id: i64, plan: &Value) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO allocation_plans (portfolio_id, plan, updated_at)
             VALUES (?, ?, CURRENT_TIMESTAMP)
             ON CONFLICT(portfolio_id) DO UPDATE SET
                plan = excluded.plan,
                updated_at = CURRENT_TIMESTAMP",
            params![portfolio_id, plan.to_string()],
        )?;
        Ok(())
    }

    /// Fetch the allocation plan. An unset plan is an empty object.
    pub fn get_allocation_plan(&self, portfolio_id: i64) -> Result<Value> {
        let conn = self.conn()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT plan FROM allocation_plans WHERE portfolio_id = ?",
                params![portfolio_id],
                |row| row.get(0),
            )
            .ok();

        Ok(raw
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_else(|| Value::Object(Default::default())))
    }

    /// Resolve the portfolio role for an asset class: the mapping table
    /// first, then the built-in defaults, then Equity.
    pub fn role_for_asset_class(&self, asset_class: &str) -> Result<String> {
        let conn = self.conn()?;
        let configured: Option<String> = conn
            .query_row(
                "SELECT portfolio_role FROM asset_class_mapping WHERE asset_class = ?",
                params![asset_class],
                |row| row.get(0),
            )
            .ok();
        if let Some(role) = configured {
            return Ok(role);
        }

        Ok(DEFAULT_ROLE_MAPPING
            .iter()
            .find(|(class, _)| *class == asset_class)
            .map(|(_, role)| (*role).to_string())
            .unwrap_or_else(|| "Equity".to_string()))
    }

    /// Store a holding. The instrument document is kept verbatim; the
    /// asset class is read from its `asset_class` field (default Stocks)
    /// and mapped to a portfolio role.
    pub fn insert_holding(
        &self,
        user_id: &str,
        portfolio_id: i64,
        data: &Value,
    ) -> Result<Holding> {
        let asset_class = data
            .get("asset_class")
            .and_then(Value::as_str)
            .unwrap_or("Stocks")
            .to_string();
        let portfolio_role = self.role_for_asset_class(&asset_class)?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO holdings (user_id, portfolio_id, data, asset_class, portfolio_role)
             VALUES (?, ?, ?, ?, ?)",
            params![user_id, portfolio_id, data.to_string(), asset_class, portfolio_role],
        )?;
        let id = conn.last_insert_rowid();

        Ok(Holding {
            id,
            user_id: user_id.to_string(),
            portfolio_id,
            data: data.clone(),
            asset_class,
            portfolio_role,
        })
    }

    /// All holdings in a portfolio, insertion order.
    pub fn list_holdings(&self, portfolio_id: i64) -> Result<Vec<Holding>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, portfolio_id, data, asset_class, portfolio_role
             FROM holdings WHERE portfolio_id = ? ORDER BY id",
        )?;
        let holdings = stmt
            .query_map(params![portfolio_id], |row| {
                let data_str: String = row.get(3)?;
                Ok(Holding {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    portfolio_id: row.get(2)?,
                    data: serde_json::from_str(&data_str).unwrap_or(Value::Null),
                    asset_class: row.get(4)?,
                    portfolio_role: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(holdings)
    }

    pub fn delete_holding(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM holdings WHERE id = ?", params![id])?;
        Ok(changed > 0)
    }

    /// Record an investment transaction.
    pub fn insert_investment_txn(
        &self,
        portfolio_id: i64,
        date: NaiveDate,
        data: &Value,
    ) -> Result<InvestmentTxn> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO invest_transactions (portfolio_id, date, data) VALUES (?, ?, ?)",
            params![portfolio_id, date.to_string(), data.to_string()],
        )?;
        let id = conn.last_insert_rowid();

        Ok(InvestmentTxn {
            id,
            portfolio_id,
            date,
            data: data.clone(),
        })
    }

    /// Transactions for a portfolio, optionally clamped to a date range,
    /// oldest first.
    pub fn list_investment_txns(
        &self,
        portfolio_id: i64,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<InvestmentTxn>> {
        let start = start.map(|d| d.to_string()).unwrap_or_else(|| "0000-00-00".to_string());
        let end = end.map(|d| d.to_string()).unwrap_or_else(|| "9999-99-99".to_string());

        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, portfolio_id, date, data FROM invest_transactions
             WHERE portfolio_id = ? AND date >= ? AND date <= ?
             ORDER BY date, id",
        )?;
        let txns = stmt
            .query_map(params![portfolio_id, start, end], |row| {
                let date_str: String = row.get(2)?;
                let data_str: String = row.get(3)?;
                Ok(InvestmentTxn {
                    id: row.get(0)?,
                    portfolio_id: row.get(1)?,
                    date: date_str
                        .parse()
                        .unwrap_or_else(|_| chrono::Utc::now().date_naive()),
                    data: serde_json::from_str(&data_str).unwrap_or(Value::Null),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(txns)
    }
}
