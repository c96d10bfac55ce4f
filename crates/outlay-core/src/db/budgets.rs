//! Budget operations
//!
//! One row per user holding the whole category -> amount map as JSON.
//! Read failures degrade to an empty map rather than erroring, so a
//! user with no budgets set sees `{}`.

use rusqlite::params;
use serde_json::Value;

use super::Database;
use crate::error::Result;

impl Database {
    /// Fetch a user's budget map. Missing or unreadable rows yield an
    /// empty object.
    pub fn get_budgets(&self, user_id: &str) -> Result<Value> {
        let conn = self.conn()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT budgets FROM budgets WHERE user_id = ?",
                params![user_id],
                |row| row.get(0),
            )
            .ok();

        let budgets = raw
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_else(|| Value::Object(Default::default()));
        Ok(budgets)
    }

    /// Replace a user's budget map.
    pub fn put_budgets(&self, user_id: &str, budgets: &Value) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO budgets (user_id, budgets, updated_at)
             VALUES (?, ?, CURRENT_TIMESTAMP)
             ON CONFLICT(user_id) DO UPDATE SET
                budgets = excluded.budgets,
                updated_at = CURRENT_TIMESTAMP",
            params![user_id, budgets.to_string()],
        )?;
        Ok(())
    }
}
