//! Parsing of classifier replies
//!
//! Models are asked for strict JSON but do not always comply: replies often
//! wrap the payload in prose, or abandon JSON entirely. The strict parser
//! and the regex-based lenient parser share one signature so the fallback
//! stage is independently testable.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use super::RawSuggestion;

/// Confidence assumed when a reply names a category but no confidence.
const DEFAULT_CONFIDENCE: f64 = 0.7;

#[derive(Debug, Deserialize)]
struct ReplyPayload {
    category: String,
    #[serde(default = "default_confidence")]
    confidence: f64,
}

fn default_confidence() -> f64 {
    DEFAULT_CONFIDENCE
}

fn category_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)category\W+([A-Za-z]+)").expect("valid regex"))
}

fn confidence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)confidence\W+(\d+(?:\.\d+)?)").expect("valid regex"))
}

/// Strict parse: find the JSON object in the reply and deserialize it.
///
/// Tolerates prose before/after the payload, since models often add it.
pub fn parse_strict(reply: &str) -> Option<RawSuggestion> {
    let reply = reply.trim();
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if start >= end {
        return None;
    }

    let payload: ReplyPayload = serde_json::from_str(&reply[start..=end]).ok()?;
    Some(RawSuggestion {
        category: payload.category,
        confidence: payload.confidence,
    })
}

/// Lenient parse: best-effort regex extraction of a category word and a
/// confidence number from a reply that is not valid JSON.
///
/// Confidences above 1 are treated as percentages and divided by 100.
pub fn parse_lenient(reply: &str) -> Option<RawSuggestion> {
    let category = category_re()
        .captures(reply)
        .map(|c| c[1].to_string())?;

    let mut confidence = confidence_re()
        .captures(reply)
        .and_then(|c| c[1].parse::<f64>().ok())
        .unwrap_or(DEFAULT_CONFIDENCE);
    if confidence > 1.0 {
        confidence /= 100.0;
    }

    Some(RawSuggestion {
        category,
        confidence,
    })
}

/// Parse a reply, strict first, then lenient recovery.
pub fn parse_reply(reply: &str) -> Option<RawSuggestion> {
    parse_strict(reply).or_else(|| parse_lenient(reply))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strict() {
        let reply = r#"{"category": "Food", "confidence": 0.92}"#;
        let s = parse_strict(reply).unwrap();
        assert_eq!(s.category, "Food");
        assert!((s.confidence - 0.92).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_strict_with_surrounding_text() {
        let reply = "Here is the classification:\n{\"category\": \"Travel\", \"confidence\": 0.8}\nDone!";
        let s = parse_strict(reply).unwrap();
        assert_eq!(s.category, "Travel");
    }

    #[test]
    fn test_parse_strict_default_confidence() {
        let reply = r#"{"category": "Shopping"}"#;
        let s = parse_strict(reply).unwrap();
        assert!((s.confidence - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_strict_rejects_non_json() {
        assert_eq!(parse_strict("The category is Food"), None);
        assert_eq!(parse_strict(""), None);
    }

    #[test]
    fn test_parse_lenient_extracts_words() {
        let s = parse_lenient("category: Food, confidence: 0.85").unwrap();
        assert_eq!(s.category, "Food");
        assert!((s.confidence - 0.85).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_lenient_percent_confidence() {
        let s = parse_lenient("category: Travel, confidence: 85").unwrap();
        assert_eq!(s.category, "Travel");
        assert!((s.confidence - 0.85).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_lenient_missing_confidence() {
        let s = parse_lenient("category = Utilities").unwrap();
        assert_eq!(s.category, "Utilities");
        assert!((s.confidence - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_lenient_no_category() {
        assert_eq!(parse_lenient("no idea what this is"), None);
    }

    #[test]
    fn test_parse_reply_falls_back_to_lenient() {
        let s = parse_reply("category Food confidence 70").unwrap();
        assert_eq!(s.category, "Food");
        assert!((s.confidence - 0.7).abs() < f64::EPSILON);
    }
}
