//! Decoding raw widget text into record values.
//!
//! `Intent::SetScalar` runs [`coerce_field_input`] when it carries an
//! `input` kind, so edit files may hold raw widget text.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a form control's text should be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Text,
    /// Floating point number; unparsable text becomes `null`.
    Number,
    /// Base-10 integer; unparsable text becomes `null`.
    Integer,
    /// Comma-separated non-negative integers.
    CommaSeparatedNumbers,
    /// Comma-separated strings.
    CommaSeparatedText,
}

pub fn coerce_field_input(raw: &str, kind: InputKind) -> Value {
    match kind {
        InputKind::Text => Value::String(raw.to_string()),
        InputKind::Number => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map_or(Value::Null, Value::Number),
        InputKind::Integer => raw
            .trim()
            .parse::<i64>()
            .map_or(Value::Null, Value::from),
        InputKind::CommaSeparatedNumbers => comma_separated_to_numbers(raw)
            .into_iter()
            .map(Value::from)
            .collect(),
        InputKind::CommaSeparatedText => format_comma_separated_string(raw)
            .into_iter()
            .map(Value::String)
            .collect(),
    }
}

/// Unique non-negative integers from a comma-separated list, first
/// occurrence order. Entries that are not plain digits are dropped.
pub fn comma_separated_to_numbers(raw: &str) -> Vec<i64> {
    let mut numbers = Vec::new();
    for part in raw.split(',').map(str::trim) {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        if let Ok(n) = part.parse::<i64>()
            && !numbers.contains(&n)
        {
            numbers.push(n);
        }
    }
    numbers
}

/// Unique trimmed non-empty entries of a comma-separated list.
pub fn format_comma_separated_string(raw: &str) -> Vec<String> {
    let mut entries: Vec<String> = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if !entries.iter().any(|e| e == part) {
            entries.push(part.to_string());
        }
    }
    entries
}

/// `"session_id"`-style names to `"Session Id"`.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_comma_separated_numbers() {
        assert_eq!(comma_separated_to_numbers("3, 1,abc, 3,, 2.5, 10"), vec![3, 1, 10]);
        assert!(comma_separated_to_numbers("").is_empty());
    }

    #[test]
    fn test_comma_separated_text() {
        assert_eq!(
            format_comma_separated_string(" spatial, memory ,, spatial"),
            vec!["spatial".to_string(), "memory".to_string()]
        );
    }

    #[test]
    fn test_coerce_numbers() {
        assert_eq!(coerce_field_input("2.5", InputKind::Number), json!(2.5));
        assert_eq!(coerce_field_input("abc", InputKind::Number), Value::Null);
        assert_eq!(coerce_field_input(" 7 ", InputKind::Integer), json!(7));
        assert_eq!(
            coerce_field_input("1, 2", InputKind::CommaSeparatedNumbers),
            json!([1, 2])
        );
        assert_eq!(coerce_field_input(" x ", InputKind::Text), json!(" x "));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("session id"), "Session Id");
        assert_eq!(title_case("ELECTRODE groups 0"), "Electrode Groups 0");
    }
}
