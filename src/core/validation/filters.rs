//! Reusable field filters
//!
//! These filters normalize form values before validation

use anyhow::Result;
use serde_json::Value;

/// Filter: trim whitespace from string
pub fn trim() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    |_: &str, value: Value| {
        if let Some(s) = value.as_str() {
            Ok(Value::String(s.trim().to_string()))
        } else {
            Ok(value)
        }
    }
}

/// Filter: convert string to lowercase
pub fn lowercase() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    |_: &str, value: Value| {
        if let Some(s) = value.as_str() {
            Ok(Value::String(s.to_lowercase()))
        } else {
            Ok(value)
        }
    }
}

/// Filter: convert string to uppercase
pub fn uppercase() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    |_: &str, value: Value| {
        if let Some(s) = value.as_str() {
            Ok(Value::String(s.to_uppercase()))
        } else {
            Ok(value)
        }
    }
}

/// Filter: collapse runs of inner whitespace into single spaces
pub fn collapse_whitespace() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    |_: &str, value: Value| {
        if let Some(s) = value.as_str() {
            Ok(Value::String(
                s.split_whitespace().collect::<Vec<_>>().join(" "),
            ))
        } else {
            Ok(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trim_removes_whitespace() {
        let f = trim();
        let result = f("recipient_name", json!("  Rahim  ")).expect("should not fail");
        assert_eq!(result, json!("Rahim"));
    }

    #[test]
    fn test_trim_non_string_passthrough() {
        let f = trim();
        let result = f("age", json!(42)).expect("should not fail");
        assert_eq!(result, json!(42));
    }

    #[test]
    fn test_lowercase_converts_string() {
        let f = lowercase();
        let result = f("email", json!("Owner@Example.COM")).expect("should not fail");
        assert_eq!(result, json!("owner@example.com"));
    }

    #[test]
    fn test_uppercase_converts_blood_group() {
        let f = uppercase();
        let result = f("blood_group", json!("ab+")).expect("should not fail");
        assert_eq!(result, json!("AB+"));
    }

    #[test]
    fn test_collapse_whitespace() {
        let f = collapse_whitespace();
        let result = f("message", json!("need   blood \n urgently")).expect("should not fail");
        assert_eq!(result, json!("need blood urgently"));
    }

    #[test]
    fn test_null_passthrough() {
        let f = lowercase();
        let result = f("email", json!(null)).expect("should not fail");
        assert_eq!(result, json!(null));
    }
}
