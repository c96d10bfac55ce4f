//! Rule store abstraction
//!
//! A rule maps a normalized term (lowercase, at most 3 words) to a spending
//! category. Rules memoize prior categorization decisions: once a term is
//! resolved, subsequent lookups for it skip the classifier entirely.
//!
//! The store is injected into the engine rather than held globally so tests
//! can swap in [`MemoryRuleStore`]. The SQLite-backed implementation lives
//! in `db::rules`.

use std::sync::Mutex;

use crate::error::Result;
use crate::models::CategoryRule;

/// Persisted term -> category mapping.
///
/// Invariant: at most one category per distinct term, first writer wins.
/// This pipeline never updates or deletes a rule once written.
pub trait RuleStore: Send + Sync {
    /// Look up the category for a term, verbatim.
    fn get(&self, term: &str) -> Result<Option<String>>;

    /// Insert a rule unless the term already exists.
    ///
    /// Returns `true` when the rule was inserted, `false` when the term was
    /// already present (a normal outcome, not an error). Concurrent inserts
    /// of the same term race benignly: exactly one writer wins.
    fn put_if_absent(&self, term: &str, category: &str) -> Result<bool>;

    /// All rules, in storage order. Used by the fuzzy matcher; the scan is
    /// unbounded, acceptable only while the table stays small.
    fn scan_all(&self) -> Result<Vec<CategoryRule>>;

    /// Remove a rule by term. Returns `true` when a rule was deleted.
    fn delete(&self, term: &str) -> Result<bool>;
}

/// Word-order-insensitive match against stored rule keys.
///
/// Only applies to terms with at least two words: the first rule whose key
/// contains both of the term's first two words as substrings wins. This
/// compensates for phrasing variation ("laptop repair" vs "repair for
/// laptop").
pub fn fuzzy_match(rules: &[CategoryRule], term: &str) -> Option<String> {
    let words: Vec<&str> = term.split_whitespace().collect();
    if words.len() < 2 {
        return None;
    }
    let (first, second) = (words[0].to_lowercase(), words[1].to_lowercase());

    rules
        .iter()
        .find(|rule| {
            let key = rule.term.to_lowercase();
            key.contains(&first) && key.contains(&second)
        })
        .map(|rule| rule.category.clone())
}

/// In-memory rule store for tests and one-shot CLI runs.
///
/// Preserves insertion order so fuzzy-match determinism matches the
/// SQLite implementation.
#[derive(Default)]
pub struct MemoryRuleStore {
    rules: Mutex<Vec<CategoryRule>>,
}

impl MemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RuleStore for MemoryRuleStore {
    fn get(&self, term: &str) -> Result<Option<String>> {
        let rules = self.rules.lock().expect("rule store lock");
        Ok(rules
            .iter()
            .find(|r| r.term == term)
            .map(|r| r.category.clone()))
    }

    fn put_if_absent(&self, term: &str, category: &str) -> Result<bool> {
        let mut rules = self.rules.lock().expect("rule store lock");
        if rules.iter().any(|r| r.term == term) {
            return Ok(false);
        }
        rules.push(CategoryRule {
            term: term.to_string(),
            category: category.to_string(),
        });
        Ok(true)
    }

    fn scan_all(&self) -> Result<Vec<CategoryRule>> {
        Ok(self.rules.lock().expect("rule store lock").clone())
    }

    fn delete(&self, term: &str) -> Result<bool> {
        let mut rules = self.rules.lock().expect("rule store lock");
        let before = rules.len();
        rules.retain(|r| r.term != term);
        Ok(rules.len() < before)
    }
}
