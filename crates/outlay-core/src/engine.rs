//! Layered categorization engine
//!
//! Turns one free-text expense entry into a [`CategorySuggestion`]. The
//! pipeline is terminal on first hit:
//!
//! 1. Amount extraction (absence is not an error)
//! 2. Term extraction (one pass, reused by the later stages)
//! 3. Static synonym table against the lowered raw text; a hit also
//!    teaches the rule store the extracted term, best-effort
//! 4. Rule store exact lookup on the term
//! 5. Rule store fuzzy lookup (two-word terms only)
//! 6. AI classifier fallback; its suggestion is normalized against the
//!    allowed set and always presented for confirmation
//!
//! Rule-store failures never surface: a failed read counts as "no rule"
//! and the pipeline falls through to the classifier, a failed learn-write
//! is logged and skipped. The engine always returns a usable suggestion.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::ai::{ClassifierBackend, ClassifierClient, ClassifierOutcome};
use crate::categories::{match_synonym, normalize_suggestion, ALLOWED_CATEGORIES};
use crate::error::Result;
use crate::extract::{extract_term, parse_amount};
use crate::models::CategorySuggestion;
use crate::rules::{fuzzy_match, RuleStore};

/// The categorization pipeline over a rule store and an optional
/// classifier. Without a classifier, stage 6 degrades to "Other".
#[derive(Clone)]
pub struct CategorizationEngine {
    rules: Arc<dyn RuleStore>,
    classifier: Option<ClassifierClient>,
}

impl CategorizationEngine {
    pub fn new(rules: Arc<dyn RuleStore>, classifier: Option<ClassifierClient>) -> Self {
        Self { rules, classifier }
    }

    /// Suggest a category for one raw entry.
    pub async fn suggest(&self, raw_text: &str) -> Result<CategorySuggestion> {
        let amount = parse_amount(raw_text);
        let term = extract_term(raw_text);
        let lowered = raw_text.to_lowercase();

        // Stage 3: static synonyms. A hit also seeds the rule store so the
        // term resolves without the table next time.
        if let Some(category) = match_synonym(&lowered) {
            if !term.is_empty() {
                if let Err(e) = self.rules.put_if_absent(&term, category) {
                    warn!(term = %term, error = %e, "Failed to learn rule from synonym match");
                }
            }
            debug!(term = %term, category, "Synonym match");
            return Ok(Self::resolved(amount, category.to_string()));
        }

        // Stages 4-5: learned rules, exact then fuzzy. A store read failure
        // is "no rule", not a failed request: log and fall through to the
        // classifier.
        if !term.is_empty() {
            match self.rules.get(&term) {
                Ok(Some(category)) => {
                    debug!(term = %term, category = %category, "Exact rule match");
                    return Ok(Self::resolved(amount, category));
                }
                Ok(None) => {}
                Err(e) => warn!(term = %term, error = %e, "Rule lookup failed"),
            }
            match self.rules.scan_all() {
                Ok(all) => {
                    if let Some(category) = fuzzy_match(&all, &term) {
                        debug!(term = %term, category = %category, "Fuzzy rule match");
                        return Ok(Self::resolved(amount, category));
                    }
                }
                Err(e) => warn!(term = %term, error = %e, "Rule scan failed"),
            }
        }

        // Stage 6: classifier fallback.
        let outcome = match &self.classifier {
            Some(client) => client.classify(raw_text).await,
            None => ClassifierOutcome::Unavailable,
        };

        let (raw_category, confidence) = match outcome {
            ClassifierOutcome::Suggestion(s) => (s.category, Some(s.confidence)),
            ClassifierOutcome::Unavailable => {
                debug!("Classifier unavailable, defaulting to Other");
                (String::new(), None)
            }
            ClassifierOutcome::Malformed => {
                warn!("Classifier reply was malformed, defaulting to Other");
                (String::new(), None)
            }
        };
        let category = normalize_suggestion(&raw_category).to_string();

        let message = match amount {
            Some(a) => format!("Parsed amount {}; AI suggestion {}. Pick a category.", a, category),
            None => format!("Could not parse amount; AI suggestion {}. Pick a category.", category),
        };

        // Raw suggestion first so the user sees exactly what the model
        // said, then the allowed list, de-duplicated in order.
        let mut options: Vec<String> = Vec::with_capacity(ALLOWED_CATEGORIES.len() + 1);
        if !raw_category.is_empty() {
            options.push(raw_category);
        }
        for allowed in ALLOWED_CATEGORIES {
            if !options.iter().any(|o| o == allowed) {
                options.push(allowed.to_string());
            }
        }

        Ok(CategorySuggestion {
            amount,
            category,
            message,
            // Always present on this path; null when the classifier gave
            // no usable signal.
            ai_confidence: Some(confidence),
            options: Some(options),
        })
    }

    /// A stage 3-5 result: confirmed category, no options, no confidence.
    fn resolved(amount: Option<f64>, category: String) -> CategorySuggestion {
        let message = match amount {
            Some(a) => format!("Parsed amount {} and category {}", a, category),
            None => format!("Could not parse amount; suggested category {}", category),
        };
        CategorySuggestion {
            amount,
            category,
            message,
            ai_confidence: None,
            options: None,
        }
    }
}
