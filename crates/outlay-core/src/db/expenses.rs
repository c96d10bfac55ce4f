//! Expense operations

use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, types::Value as SqlValue};

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::Expense;

/// Optional filters for expense listing. All criteria are conjunctive.
#[derive(Debug, Default, Clone)]
pub struct ExpenseFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub category: Option<String>,
}

impl Database {
    /// Record an expense and return it with its assigned id.
    pub fn insert_expense(
        &self,
        user_id: &str,
        amount: f64,
        category: &str,
        raw_text: &str,
        date: NaiveDate,
    ) -> Result<Expense> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO expenses (user_id, amount, category, raw_text, date) VALUES (?, ?, ?, ?, ?)",
            params![user_id, amount, category, raw_text, date.to_string()],
        )?;
        let id = conn.last_insert_rowid();

        self.get_expense(id)?
            .ok_or_else(|| crate::error::Error::NotFound(format!("expense {}", id)))
    }

    /// Get an expense by ID
    pub fn get_expense(&self, id: i64) -> Result<Option<Expense>> {
        let conn = self.conn()?;
        let expense = conn
            .query_row(
                "SELECT id, user_id, amount, category, raw_text, date, created_at
                 FROM expenses WHERE id = ?",
                params![id],
                row_to_expense,
            )
            .ok();
        Ok(expense)
    }

    /// List a user's expenses, newest first, with optional filters.
    pub fn list_expenses(&self, user_id: &str, filter: &ExpenseFilter) -> Result<Vec<Expense>> {
        let mut sql = String::from(
            "SELECT id, user_id, amount, category, raw_text, date, created_at
             FROM expenses WHERE user_id = ?",
        );
        let mut values: Vec<SqlValue> = vec![SqlValue::Text(user_id.to_string())];

        if let Some(start) = filter.start {
            sql.push_str(" AND date >= ?");
            values.push(SqlValue::Text(start.to_string()));
        }
        if let Some(end) = filter.end {
            sql.push_str(" AND date <= ?");
            values.push(SqlValue::Text(end.to_string()));
        }
        if let Some(category) = &filter.category {
            sql.push_str(" AND category = ?");
            values.push(SqlValue::Text(category.clone()));
        }
        sql.push_str(" ORDER BY date DESC, id DESC");

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let expenses = stmt
            .query_map(params_from_iter(values), row_to_expense)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(expenses)
    }

    /// Partially update an expense. Returns false when the id is unknown,
    /// or when no field was given.
    pub fn update_expense(
        &self,
        id: i64,
        amount: Option<f64>,
        category: Option<&str>,
        raw_text: Option<&str>,
    ) -> Result<bool> {
        let mut assignments: Vec<&str> = Vec::new();
        let mut values: Vec<SqlValue> = Vec::new();

        if let Some(amount) = amount {
            assignments.push("amount = ?");
            values.push(SqlValue::Real(amount));
        }
        if let Some(category) = category {
            assignments.push("category = ?");
            values.push(SqlValue::Text(category.to_string()));
        }
        if let Some(raw_text) = raw_text {
            assignments.push("raw_text = ?");
            values.push(SqlValue::Text(raw_text.to_string()));
        }
        if assignments.is_empty() {
            return Ok(false);
        }

        let sql = format!("UPDATE expenses SET {} WHERE id = ?", assignments.join(", "));
        values.push(SqlValue::Integer(id));

        let conn = self.conn()?;
        let changed = conn.execute(&sql, params_from_iter(values))?;
        Ok(changed > 0)
    }

    /// Delete an expense. Returns true when a row was removed.
    pub fn delete_expense(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM expenses WHERE id = ?", params![id])?;
        Ok(changed > 0)
    }

    /// Per-category spend totals for one month (`YYYY-MM`).
    pub fn monthly_summary(&self, user_id: &str, month: &str) -> Result<Vec<(String, f64)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT category, SUM(amount) FROM expenses
             WHERE user_id = ? AND date LIKE ?
             GROUP BY category ORDER BY SUM(amount) DESC",
        )?;

        let totals = stmt
            .query_map(params![user_id, format!("{}%", month)], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(totals)
    }

    /// All of a user's expenses in one category, plus the running total.
    pub fn category_summary(&self, user_id: &str, category: &str) -> Result<(Vec<Expense>, f64)> {
        let filter = ExpenseFilter {
            category: Some(category.to_string()),
            ..Default::default()
        };
        let expenses = self.list_expenses(user_id, &filter)?;
        let total = expenses.iter().map(|e| e.amount).sum();
        Ok((expenses, total))
    }
}

fn row_to_expense(row: &rusqlite::Row<'_>) -> rusqlite::Result<Expense> {
    let date_str: String = row.get(5)?;
    let created_at_str: String = row.get(6)?;

    Ok(Expense {
        id: row.get(0)?,
        user_id: row.get(1)?,
        amount: row.get(2)?,
        category: row.get(3)?,
        raw_text: row.get(4)?,
        date: date_str
            .parse()
            .unwrap_or_else(|_| chrono::Utc::now().date_naive()),
        created_at: parse_datetime(&created_at_str),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let db = Database::in_memory().unwrap();
        let expense = db
            .insert_expense("u1", 250.0, "Food", "Lunch 250", date("2026-03-15"))
            .unwrap();

        assert_eq!(expense.user_id, "u1");
        assert_eq!(expense.amount, 250.0);
        assert_eq!(expense.category, "Food");
        assert_eq!(db.get_expense(expense.id).unwrap().unwrap().id, expense.id);
    }

    #[test]
    fn test_list_filters_by_date_range_and_category() {
        let db = Database::in_memory().unwrap();
        db.insert_expense("u1", 100.0, "Food", "a", date("2026-03-01")).unwrap();
        db.insert_expense("u1", 200.0, "Travel", "b", date("2026-03-10")).unwrap();
        db.insert_expense("u1", 300.0, "Food", "c", date("2026-04-01")).unwrap();
        db.insert_expense("u2", 400.0, "Food", "d", date("2026-03-05")).unwrap();

        let march = ExpenseFilter {
            start: Some(date("2026-03-01")),
            end: Some(date("2026-03-31")),
            ..Default::default()
        };
        assert_eq!(db.list_expenses("u1", &march).unwrap().len(), 2);

        let food = ExpenseFilter {
            category: Some("Food".to_string()),
            ..Default::default()
        };
        assert_eq!(db.list_expenses("u1", &food).unwrap().len(), 2);
    }

    #[test]
    fn test_update_requires_a_field() {
        let db = Database::in_memory().unwrap();
        let expense = db
            .insert_expense("u1", 100.0, "Food", "a", date("2026-03-01"))
            .unwrap();

        assert!(!db.update_expense(expense.id, None, None, None).unwrap());
        assert!(db
            .update_expense(expense.id, Some(150.0), Some("Travel"), None)
            .unwrap());

        let updated = db.get_expense(expense.id).unwrap().unwrap();
        assert_eq!(updated.amount, 150.0);
        assert_eq!(updated.category, "Travel");
        assert_eq!(updated.raw_text, "a");
    }

    #[test]
    fn test_delete() {
        let db = Database::in_memory().unwrap();
        let expense = db
            .insert_expense("u1", 100.0, "Food", "a", date("2026-03-01"))
            .unwrap();

        assert!(db.delete_expense(expense.id).unwrap());
        assert!(!db.delete_expense(expense.id).unwrap());
        assert!(db.get_expense(expense.id).unwrap().is_none());
    }

    #[test]
    fn test_monthly_summary_groups_by_category() {
        let db = Database::in_memory().unwrap();
        db.insert_expense("u1", 100.0, "Food", "a", date("2026-03-01")).unwrap();
        db.insert_expense("u1", 50.0, "Food", "b", date("2026-03-20")).unwrap();
        db.insert_expense("u1", 200.0, "Travel", "c", date("2026-03-10")).unwrap();
        db.insert_expense("u1", 999.0, "Food", "d", date("2026-04-01")).unwrap();

        let summary = db.monthly_summary("u1", "2026-03").unwrap();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0], ("Travel".to_string(), 200.0));
        assert_eq!(summary[1], ("Food".to_string(), 150.0));
    }

    #[test]
    fn test_category_summary_totals() {
        let db = Database::in_memory().unwrap();
        db.insert_expense("u1", 100.0, "Food", "a", date("2026-03-01")).unwrap();
        db.insert_expense("u1", 50.0, "Food", "b", date("2026-03-20")).unwrap();
        db.insert_expense("u1", 200.0, "Travel", "c", date("2026-03-10")).unwrap();

        let (items, total) = db.category_summary("u1", "Food").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(total, 150.0);
    }
}
