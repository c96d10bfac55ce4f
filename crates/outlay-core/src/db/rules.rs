//! SQLite-backed category rule store
//!
//! Implements [`RuleStore`] over the `category_rules` table. First-writer-
//! wins semantics come directly from `INSERT OR IGNORE` on the primary key,
//! so concurrent learners racing on the same term resolve in SQLite.

use rusqlite::params;

use super::Database;
use crate::error::Result;
use crate::models::CategoryRule;
use crate::rules::RuleStore;

impl RuleStore for Database {
    fn get(&self, term: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let category = conn
            .query_row(
                "SELECT category FROM category_rules WHERE term = ?",
                params![term],
                |row| row.get(0),
            )
            .ok();
        Ok(category)
    }

    fn put_if_absent(&self, term: &str, category: &str) -> Result<bool> {
        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO category_rules (term, category) VALUES (?, ?)",
            params![term, category],
        )?;
        Ok(inserted > 0)
    }

    fn scan_all(&self) -> Result<Vec<CategoryRule>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT term, category FROM category_rules ORDER BY created_at, term",
        )?;
        let rules = stmt
            .query_map([], |row| {
                Ok(CategoryRule {
                    term: row.get(0)?,
                    category: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rules)
    }

    fn delete(&self, term: &str) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM category_rules WHERE term = ?", params![term])?;
        Ok(changed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_if_absent_first_writer_wins() {
        let db = Database::in_memory().unwrap();
        assert!(db.put_if_absent("dog food", "Pet Care").unwrap());
        assert!(!db.put_if_absent("dog food", "Food").unwrap());
        assert_eq!(db.get("dog food").unwrap().as_deref(), Some("Pet Care"));
    }

    #[test]
    fn test_scan_all_and_delete() {
        let db = Database::in_memory().unwrap();
        db.put_if_absent("laptop repair", "Shopping").unwrap();
        db.put_if_absent("car wash", "Travel").unwrap();

        assert_eq!(db.scan_all().unwrap().len(), 2);
        assert!(db.delete("car wash").unwrap());
        assert!(!db.delete("car wash").unwrap());
        assert_eq!(db.scan_all().unwrap().len(), 1);
    }

    #[test]
    fn test_get_missing() {
        let db = Database::in_memory().unwrap();
        assert_eq!(db.get("unknown").unwrap(), None);
    }
}
