//! Pluggable AI classifier abstraction
//!
//! The classifier is the last-resort stage of the categorization pipeline:
//! it is consulted only when neither the synonym table nor the rule store
//! resolved a category, and its suggestion is always surfaced to the user
//! for confirmation rather than trusted silently.
//!
//! # Architecture
//!
//! - `ClassifierBackend` trait: the interface every backend implements
//! - `ClassifierClient` enum: concrete wrapper providing Clone + static dispatch
//! - Backends: `GroqBackend` (OpenAI-compatible chat API), `MockBackend`
//!
//! # Failure semantics
//!
//! A classifier call never fails the request. Every failure mode collapses
//! into a [`ClassifierOutcome`] variant the engine can treat as "no signal":
//! missing credentials, network errors, and non-2xx responses become
//! `Unavailable`; replies that cannot be parsed even leniently become
//! `Malformed`. The two are distinguished so call sites can log them
//! differently, but both degrade to the same user-facing fallback.
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (groq, mock). Default: groq
//! - `GROQ_API_KEY`: API key (required for the groq backend)
//! - `GROQ_MODEL`: Model name (default: llama-3.1-70b-versatile)
//! - `GROQ_HOST`: Server URL (default: https://api.groq.com)

mod groq;
mod mock;
pub mod parsing;

pub use groq::GroqBackend;
pub use mock::MockBackend;

use async_trait::async_trait;

/// A raw, unvalidated suggestion from a classifier.
///
/// `category` is whatever the model said; it has not been checked against
/// the allowed set yet. Normalization happens in the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSuggestion {
    pub category: String,
    pub confidence: f64,
}

/// Tagged outcome of one classification call.
///
/// An explicit taxonomy instead of blanket swallow-and-return-empty: the
/// engine treats `Unavailable` and `Malformed` identically (no signal), but
/// they are logged differently and remain independently testable.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifierOutcome {
    /// The backend produced a parseable (category, confidence) pair.
    Suggestion(RawSuggestion),
    /// The backend could not be reached (network failure, non-2xx,
    /// missing credentials).
    Unavailable,
    /// The backend replied, but the reply could not be parsed even with
    /// lenient recovery.
    Malformed,
}

/// Interface for text-to-category classification backends.
#[async_trait]
pub trait ClassifierBackend: Send + Sync {
    /// Classify one free-text expense entry. Never returns an error; all
    /// failures map to a non-`Suggestion` outcome.
    async fn classify(&self, raw_text: &str) -> ClassifierOutcome;

    /// Check if the backend is reachable.
    async fn health_check(&self) -> bool;

    /// Model name (for logging).
    fn model(&self) -> &str;

    /// Host URL (for logging).
    fn host(&self) -> &str;
}

/// Concrete classifier client enum.
///
/// Provides Clone and compile-time dispatch without `Box<dyn>` overhead.
#[derive(Clone)]
pub enum ClassifierClient {
    /// Groq chat-completions backend (OpenAI-compatible API).
    Groq(GroqBackend),
    /// Mock backend for testing and offline development.
    Mock(MockBackend),
}

impl ClassifierClient {
    /// Create a classifier client from environment variables.
    ///
    /// Checks `AI_BACKEND` to determine which backend to use:
    /// - `groq` (default): requires `GROQ_API_KEY`
    /// - `mock`: deterministic keyword-based responses
    ///
    /// Returns None when the required variables are not set; callers must
    /// degrade gracefully rather than failing requests.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "groq".to_string());

        match backend.to_lowercase().as_str() {
            "groq" => GroqBackend::from_env().map(ClassifierClient::Groq),
            "mock" => Some(ClassifierClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to groq");
                GroqBackend::from_env().map(ClassifierClient::Groq)
            }
        }
    }

    /// Create a mock backend for testing.
    pub fn mock() -> Self {
        ClassifierClient::Mock(MockBackend::new())
    }
}

#[async_trait]
impl ClassifierBackend for ClassifierClient {
    async fn classify(&self, raw_text: &str) -> ClassifierOutcome {
        match self {
            ClassifierClient::Groq(b) => b.classify(raw_text).await,
            ClassifierClient::Mock(b) => b.classify(raw_text).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            ClassifierClient::Groq(b) => b.health_check().await,
            ClassifierClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            ClassifierClient::Groq(b) => b.model(),
            ClassifierClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            ClassifierClient::Groq(b) => b.host(),
            ClassifierClient::Mock(b) => b.host(),
        }
    }
}
