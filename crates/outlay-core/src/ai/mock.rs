//! Mock backend for testing and offline development.
//!
//! Deterministic keyword matching against the allowed categories, so tests
//! exercise the full pipeline without touching the network.

use async_trait::async_trait;

use super::{ClassifierBackend, ClassifierOutcome, RawSuggestion};

/// Keyword hints the mock recognizes. Checked in order, first match wins.
const KEYWORD_HINTS: &[(&str, &str)] = &[
    ("coffee", "Food"),
    ("lunch", "Food"),
    ("dinner", "Food"),
    ("restaurant", "Food"),
    ("cab", "Travel"),
    ("flight", "Travel"),
    ("fuel", "Travel"),
    ("movie", "Entertainment"),
    ("rent", "Housing"),
    ("doctor", "Healthcare"),
    ("medicine", "Healthcare"),
    ("course", "Education"),
    ("gift", "Gifts"),
];

/// Mock classifier backend with deterministic responses.
#[derive(Clone, Default)]
pub struct MockBackend {
    healthy: bool,
    canned: Option<ClassifierOutcome>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            healthy: true,
            canned: None,
        }
    }

    /// A backend that reports unhealthy and answers `Unavailable`.
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            canned: Some(ClassifierOutcome::Unavailable),
        }
    }

    /// A backend that returns the same outcome for every input.
    pub fn with_canned(outcome: ClassifierOutcome) -> Self {
        Self {
            healthy: true,
            canned: Some(outcome),
        }
    }
}

#[async_trait]
impl ClassifierBackend for MockBackend {
    async fn classify(&self, raw_text: &str) -> ClassifierOutcome {
        if let Some(canned) = &self.canned {
            return canned.clone();
        }

        let lowered = raw_text.to_lowercase();
        for (keyword, category) in KEYWORD_HINTS {
            if lowered.contains(keyword) {
                return ClassifierOutcome::Suggestion(RawSuggestion {
                    category: (*category).to_string(),
                    confidence: 0.9,
                });
            }
        }

        ClassifierOutcome::Suggestion(RawSuggestion {
            category: "Other".to_string(),
            confidence: 0.7,
        })
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
