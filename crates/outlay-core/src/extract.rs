//! Amount and term extraction from free-text expense entries
//!
//! Both extractors are pure heuristics: "nothing found" is a normal outcome
//! (`None` / empty string), never an error. Match quality depends on user
//! phrasing and there are no retries.

use std::sync::OnceLock;

use regex::Regex;

fn amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Optional currency symbol, then digits with optional comma
        // thousands groups and up to 2 decimal places.
        Regex::new(r"(?:[₹$€£])?\s*(\d{1,3}(?:,\d{3})+(?:\.\d{1,2})?|\d+(?:\.\d{1,2})?)")
            .expect("valid regex")
    })
}

fn preposition_phrase_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:on|for|at|to)\s+([A-Za-z][A-Za-z\s]{1,40})").expect("valid regex")
    })
}

fn relative_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:yesterday|today|tomorrow|\d{4}-\d{2}-\d{2})\b").expect("valid regex")
    })
}

fn word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z]+").expect("valid regex"))
}

/// Extract the first currency-like amount from free text.
///
/// Comma thousands separators are accepted and stripped, so
/// "₹1,245.50" parses as 1245.50. Returns `None` when no numeric token
/// matches.
pub fn parse_amount(raw_text: &str) -> Option<f64> {
    let captures = amount_re().captures(raw_text)?;
    let token = captures.get(1)?.as_str().replace(',', "");
    token.parse::<f64>().ok()
}

/// Derive a short lowercase phrase from free text for rule lookups.
///
/// Prefers a phrase following a preposition (on/for/at/to), truncated
/// before any relative-date token and to the last 3 words at most ("buy
/// for pet dog food items" -> "dog food items"); falls back to the last
/// two alphabetic tokens; empty string means "no usable term".
pub fn extract_term(raw_text: &str) -> String {
    if let Some(captures) = preposition_phrase_re().captures(raw_text) {
        let mut candidate = captures[1].trim().to_string();

        if let Some(m) = relative_date_re().find(&candidate) {
            candidate.truncate(m.start());
        }
        let candidate: String = candidate
            .chars()
            .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
            .collect();
        let words: Vec<&str> = candidate.split_whitespace().collect();

        if !words.is_empty() {
            let tail = if words.len() > 3 {
                &words[words.len() - 3..]
            } else {
                &words[..]
            };
            return tail.join(" ").to_lowercase();
        }
    }

    let tokens: Vec<&str> = word_re().find_iter(raw_text).map(|m| m.as_str()).collect();
    match tokens.as_slice() {
        [] => String::new(),
        [only] => only.to_lowercase(),
        [.., a, b] => format!("{} {}", a.to_lowercase(), b.to_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_plain() {
        assert_eq!(parse_amount("Lunch 250 at restaurant"), Some(250.0));
    }

    #[test]
    fn test_parse_amount_currency_and_decimals() {
        assert_eq!(parse_amount("Paid ₹120.50 for coffee"), Some(120.5));
        assert_eq!(parse_amount("$ 42 parking"), Some(42.0));
    }

    #[test]
    fn test_parse_amount_thousands_separators_stripped() {
        assert_eq!(parse_amount("Paid ₹1,245.50 for groceries"), Some(1245.5));
        assert_eq!(parse_amount("rent 12,000"), Some(12000.0));
    }

    #[test]
    fn test_parse_amount_missing() {
        assert_eq!(parse_amount("coffee with friends"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_extract_term_prepositional_phrase() {
        assert_eq!(extract_term("Lunch 250 at restaurant"), "restaurant");
        assert_eq!(extract_term("spent 500 on dog food"), "dog food");
    }

    #[test]
    fn test_extract_term_strips_relative_dates() {
        assert_eq!(extract_term("200 on dog food yesterday"), "dog food");
        assert_eq!(extract_term("paid for groceries 2024-03-01"), "groceries");
    }

    #[test]
    fn test_extract_term_keeps_last_three_words() {
        assert_eq!(
            extract_term("spent 900 on premium pet dog food"),
            "pet dog food"
        );
    }

    #[test]
    fn test_extract_term_fallback_last_two_tokens() {
        assert_eq!(extract_term("250 laptop repair"), "laptop repair");
        assert_eq!(extract_term("150 haircut"), "haircut");
    }

    #[test]
    fn test_extract_term_no_letters() {
        assert_eq!(extract_term("12345 67"), "");
        assert_eq!(extract_term(""), "");
    }

    #[test]
    fn test_extract_term_is_lowercase() {
        assert_eq!(extract_term("Dinner at Olive Garden"), "olive garden");
    }
}
