//! Common types and utilities shared across models.

use serde::{Deserialize, Serialize};

/// Price of a good: numeric value plus a fixed currency
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Price {
    pub value: f64,
    pub currency: String,
}

impl Price {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            currency: default_currency(),
        }
    }
}

fn default_currency() -> String {
    "грн".to_string()
}

/// Helper to parse a JSON string-array column from the database
pub fn parse_string_list(json: &str) -> Vec<String> {
    serde_json::from_str(json).unwrap_or_default()
}

/// Helper to serialize a string list to JSON for the database
pub fn serialize_string_list(list: &[String]) -> String {
    serde_json::to_string(list).unwrap_or_else(|_| "[]".to_string())
}

/// Current calendar day in YYYY-MM-DD form, the format stored on
/// feedbacks and orders
pub fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

/// Current timestamp in RFC 3339 form for created_at/updated_at columns
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_list_round_trip() {
        let list = vec!["white".to_string(), "black".to_string()];
        let json = serialize_string_list(&list);
        assert_eq!(parse_string_list(&json), list);
    }

    #[test]
    fn test_parse_string_list_garbage() {
        assert!(parse_string_list("not json").is_empty());
        assert!(parse_string_list("").is_empty());
    }

    #[test]
    fn test_today_format() {
        let d = today();
        assert_eq!(d.len(), 10);
        assert_eq!(d.as_bytes()[4], b'-');
        assert_eq!(d.as_bytes()[7], b'-');
    }
}
