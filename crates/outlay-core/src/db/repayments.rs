//! Loan repayment operations

use rusqlite::{params, params_from_iter, types::Value as SqlValue};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Repayment, RepaymentEvent};

/// Aggregates across a user's loans, served alongside the list.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RepaymentSummary {
    pub total_outstanding: f64,
    pub total_emi: f64,
    pub total_repayments: usize,
}

const REPAYMENT_COLUMNS: &str = "id, user_id, loan_type, institution, principal, interest_rate, \
     emi_amount, tenure_months, outstanding_balance, start_date, due_date, status, \
     created_at, updated_at";

impl Database {
    /// Create a repayment. The outstanding balance starts at the principal
    /// and the status at "active".
    #[allow(clippy::too_many_arguments)]
    pub fn create_repayment(
        &self,
        user_id: &str,
        loan_type: &str,
        institution: &str,
        principal: f64,
        interest_rate: f64,
        emi_amount: f64,
        tenure_months: i64,
        start_date: &str,
        due_date: &str,
    ) -> Result<Repayment> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO repayments
                 (user_id, loan_type, institution, principal, interest_rate, emi_amount,
                  tenure_months, outstanding_balance, start_date, due_date, status)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'active')",
            params![
                user_id,
                loan_type,
                institution,
                principal,
                interest_rate,
                emi_amount,
                tenure_months,
                principal,
                start_date,
                due_date,
            ],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_repayment(id)?
            .ok_or_else(|| Error::NotFound(format!("repayment {}", id)))
    }

    pub fn get_repayment(&self, id: i64) -> Result<Option<Repayment>> {
        let conn = self.conn()?;
        let repayment = conn
            .query_row(
                &format!("SELECT {} FROM repayments WHERE id = ?", REPAYMENT_COLUMNS),
                params![id],
                row_to_repayment,
            )
            .ok();
        Ok(repayment)
    }

    /// A user's repayments plus the summary aggregates.
    pub fn list_repayments(&self, user_id: &str) -> Result<(Vec<Repayment>, RepaymentSummary)> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM repayments WHERE user_id = ? ORDER BY id",
            REPAYMENT_COLUMNS
        ))?;
        let repayments = stmt
            .query_map(params![user_id], row_to_repayment)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let summary = RepaymentSummary {
            total_outstanding: repayments.iter().map(|r| r.outstanding_balance).sum(),
            total_emi: repayments
                .iter()
                .filter(|r| r.status == "active")
                .map(|r| r.emi_amount)
                .sum(),
            total_repayments: repayments.len(),
        };
        Ok((repayments, summary))
    }

    /// Partially update a repayment. Returns false when the id is unknown
    /// or no field was given.
    pub fn update_repayment(
        &self,
        id: i64,
        institution: Option<&str>,
        interest_rate: Option<f64>,
        emi_amount: Option<f64>,
        outstanding_balance: Option<f64>,
        status: Option<&str>,
    ) -> Result<bool> {
        let mut assignments: Vec<&str> = Vec::new();
        let mut values: Vec<SqlValue> = Vec::new();

        if let Some(institution) = institution {
            assignments.push("institution = ?");
            values.push(SqlValue::Text(institution.to_string()));
        }
        if let Some(rate) = interest_rate {
            assignments.push("interest_rate = ?");
            values.push(SqlValue::Real(rate));
        }
        if let Some(emi) = emi_amount {
            assignments.push("emi_amount = ?");
            values.push(SqlValue::Real(emi));
        }
        if let Some(balance) = outstanding_balance {
            assignments.push("outstanding_balance = ?");
            values.push(SqlValue::Real(balance));
        }
        if let Some(status) = status {
            assignments.push("status = ?");
            values.push(SqlValue::Text(status.to_string()));
        }
        if assignments.is_empty() {
            return Ok(false);
        }

        let sql = format!(
            "UPDATE repayments SET {}, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            assignments.join(", ")
        );
        values.push(SqlValue::Integer(id));

        let conn = self.conn()?;
        let changed = conn.execute(&sql, params_from_iter(values))?;
        Ok(changed > 0)
    }

    pub fn delete_repayment(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM repayment_history WHERE repayment_id = ?",
            params![id],
        )?;
        let changed = conn.execute("DELETE FROM repayments WHERE id = ?", params![id])?;
        Ok(changed > 0)
    }

    /// Record a prepayment: a history event plus a balance decrement,
    /// floored at zero.
    pub fn record_prepayment(
        &self,
        repayment_id: i64,
        amount: f64,
        payment_date: &str,
        principal_component: f64,
        interest_component: f64,
    ) -> Result<RepaymentEvent> {
        let repayment = self
            .get_repayment(repayment_id)?
            .ok_or_else(|| Error::NotFound(format!("repayment {}", repayment_id)))?;

        let new_balance = (repayment.outstanding_balance - amount).max(0.0);

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO repayment_history
                 (repayment_id, amount, payment_date, kind, principal_component, interest_component)
             VALUES (?, ?, ?, 'prepayment', ?, ?)",
            params![repayment_id, amount, payment_date, principal_component, interest_component],
        )?;
        let event_id = conn.last_insert_rowid();

        conn.execute(
            "UPDATE repayments SET outstanding_balance = ?, updated_at = CURRENT_TIMESTAMP
             WHERE id = ?",
            params![new_balance, repayment_id],
        )?;
        drop(conn);

        self.get_repayment_event(event_id)?
            .ok_or_else(|| Error::NotFound(format!("repayment event {}", event_id)))
    }

    fn get_repayment_event(&self, id: i64) -> Result<Option<RepaymentEvent>> {
        let conn = self.conn()?;
        let event = conn
            .query_row(
                "SELECT id, repayment_id, amount, payment_date, kind,
                        principal_component, interest_component, created_at
                 FROM repayment_history WHERE id = ?",
                params![id],
                row_to_event,
            )
            .ok();
        Ok(event)
    }

    /// Payment history for a loan, oldest first.
    pub fn list_repayment_history(&self, repayment_id: i64) -> Result<Vec<RepaymentEvent>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, repayment_id, amount, payment_date, kind,
                    principal_component, interest_component, created_at
             FROM repayment_history WHERE repayment_id = ? ORDER BY payment_date, id",
        )?;
        let events = stmt
            .query_map(params![repayment_id], row_to_event)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(events)
    }
}

fn row_to_repayment(row: &rusqlite::Row<'_>) -> rusqlite::Result<Repayment> {
    let created_at_str: String = row.get(12)?;
    let updated_at_str: String = row.get(13)?;

    Ok(Repayment {
        id: row.get(0)?,
        user_id: row.get(1)?,
        loan_type: row.get(2)?,
        institution: row.get(3)?,
        principal: row.get(4)?,
        interest_rate: row.get(5)?,
        emi_amount: row.get(6)?,
        tenure_months: row.get(7)?,
        outstanding_balance: row.get(8)?,
        start_date: row.get(9)?,
        due_date: row.get(10)?,
        status: row.get(11)?,
        created_at: parse_datetime(&created_at_str),
        updated_at: parse_datetime(&updated_at_str),
    })
}

fn row_to_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<RepaymentEvent> {
    let created_at_str: String = row.get(7)?;

    Ok(RepaymentEvent {
        id: row.get(0)?,
        repayment_id: row.get(1)?,
        amount: row.get(2)?,
        payment_date: row.get(3)?,
        kind: row.get(4)?,
        principal_component: row.get(5)?,
        interest_component: row.get(6)?,
        created_at: parse_datetime(&created_at_str),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn home_loan(db: &Database) -> Repayment {
        db.create_repayment(
            "u1",
            "home",
            "HDFC",
            5_000_000.0,
            8.5,
            45_000.0,
            240,
            "2024-01-01",
            "2044-01-01",
        )
        .unwrap()
    }

    #[test]
    fn test_create_initializes_balance_and_status() {
        let db = Database::in_memory().unwrap();
        let loan = home_loan(&db);
        assert_eq!(loan.outstanding_balance, 5_000_000.0);
        assert_eq!(loan.status, "active");
    }

    #[test]
    fn test_list_with_summary() {
        let db = Database::in_memory().unwrap();
        home_loan(&db);
        db.create_repayment(
            "u1", "car", "SBI", 800_000.0, 9.2, 16_000.0, 60, "2025-06-01", "2030-06-01",
        )
        .unwrap();

        let (loans, summary) = db.list_repayments("u1").unwrap();
        assert_eq!(loans.len(), 2);
        assert_eq!(summary.total_repayments, 2);
        assert_eq!(summary.total_outstanding, 5_800_000.0);
        assert_eq!(summary.total_emi, 61_000.0);
    }

    #[test]
    fn test_closed_loans_excluded_from_emi_total() {
        let db = Database::in_memory().unwrap();
        let loan = home_loan(&db);
        db.update_repayment(loan.id, None, None, None, Some(0.0), Some("closed"))
            .unwrap();

        let (_, summary) = db.list_repayments("u1").unwrap();
        assert_eq!(summary.total_emi, 0.0);
    }

    #[test]
    fn test_prepayment_decrements_balance() {
        let db = Database::in_memory().unwrap();
        let loan = home_loan(&db);

        let event = db
            .record_prepayment(loan.id, 500_000.0, "2026-03-01", 500_000.0, 0.0)
            .unwrap();
        assert_eq!(event.kind, "prepayment");
        assert_eq!(event.amount, 500_000.0);

        let updated = db.get_repayment(loan.id).unwrap().unwrap();
        assert_eq!(updated.outstanding_balance, 4_500_000.0);
    }

    #[test]
    fn test_prepayment_balance_floors_at_zero() {
        let db = Database::in_memory().unwrap();
        let loan = db
            .create_repayment(
                "u1", "personal", "ICICI", 10_000.0, 12.0, 1_000.0, 12, "2026-01-01", "2027-01-01",
            )
            .unwrap();

        db.record_prepayment(loan.id, 25_000.0, "2026-03-01", 25_000.0, 0.0)
            .unwrap();
        let updated = db.get_repayment(loan.id).unwrap().unwrap();
        assert_eq!(updated.outstanding_balance, 0.0);
    }

    #[test]
    fn test_prepayment_on_unknown_loan() {
        let db = Database::in_memory().unwrap();
        let err = db
            .record_prepayment(999, 100.0, "2026-03-01", 100.0, 0.0)
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_history_ordering() {
        let db = Database::in_memory().unwrap();
        let loan = home_loan(&db);
        db.record_prepayment(loan.id, 100.0, "2026-03-01", 100.0, 0.0).unwrap();
        db.record_prepayment(loan.id, 200.0, "2026-01-01", 200.0, 0.0).unwrap();

        let history = db.list_repayment_history(loan.id).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].payment_date, "2026-01-01");
    }

    #[test]
    fn test_delete_removes_history_too() {
        let db = Database::in_memory().unwrap();
        let loan = home_loan(&db);
        db.record_prepayment(loan.id, 100.0, "2026-03-01", 100.0, 0.0).unwrap();

        assert!(db.delete_repayment(loan.id).unwrap());
        assert!(db.get_repayment(loan.id).unwrap().is_none());
        assert!(db.list_repayment_history(loan.id).unwrap().is_empty());
    }
}
