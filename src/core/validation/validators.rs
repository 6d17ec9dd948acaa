//! Reusable field validators
//!
//! Each validator inspects one field of a JSON form payload. Validators other
//! than `required` let values of the wrong type through so that another rule
//! can report them.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Validator: field is present and not blank
pub fn required() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| match value {
        Value::Null => Err(format!("'{}' is required", field)),
        Value::String(s) if s.trim().is_empty() => Err(format!("'{}' is required", field)),
        _ => Ok(()),
    }
}

/// Validator: field is optional (always valid)
pub fn optional() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |_: &str, _: &Value| Ok(())
}

/// Validator: string length (in characters) must be within range
pub fn string_length(
    min: usize,
    max: usize,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| {
        if let Some(s) = value.as_str() {
            let len = s.chars().count();
            if len < min {
                Err(format!(
                    "'{}' must be at least {} characters (got {})",
                    field, min, len
                ))
            } else if len > max {
                Err(format!(
                    "'{}' must be at most {} characters (got {})",
                    field, max, len
                ))
            } else {
                Ok(())
            }
        } else {
            Ok(())
        }
    }
}

/// Validator: value must be in allowed list
pub fn in_list(
    allowed: Vec<String>,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| {
        if let Some(s) = value.as_str() {
            if !allowed.iter().any(|a| a == s) {
                Err(format!(
                    "'{}' must be one of {:?} (got {})",
                    field, allowed, s
                ))
            } else {
                Ok(())
            }
        } else {
            Ok(())
        }
    }
}

/// Validator: date must match format
pub fn date_format(
    format: &'static str,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| {
        if let Some(s) = value.as_str() {
            match chrono::NaiveDate::parse_from_str(s, format) {
                Ok(_) => Ok(()),
                Err(_) => Err(format!(
                    "'{}' must use the format {} (got {})",
                    field, format, s
                )),
            }
        } else {
            Ok(())
        }
    }
}

/// Validator: time of day must match format
pub fn time_format(
    format: &'static str,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| {
        if let Some(s) = value.as_str() {
            match chrono::NaiveTime::parse_from_str(s, format) {
                Ok(_) => Ok(()),
                Err(_) => Err(format!(
                    "'{}' must use the time format {} (got {})",
                    field, format, s
                )),
            }
        } else {
            Ok(())
        }
    }
}

/// Validator: string must look like an email address
pub fn email() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
        let Some(s) = value.as_str() else {
            return Ok(());
        };
        let regex = EMAIL_REGEX.get_or_init(|| {
            Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
                .expect("email pattern is valid")
        });
        if regex.is_match(s) {
            Ok(())
        } else {
            Err(format!("'{}' is not a valid email address (got {})", field, s))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_rejects_null_and_blank() {
        let v = required();
        assert!(v("name", &json!(null)).unwrap_err().contains("required"));
        assert!(v("name", &json!("   ")).is_err());
        assert!(v("name", &json!("Rahim")).is_ok());
        assert!(v("count", &json!(0)).is_ok());
    }

    #[test]
    fn test_optional_always_ok() {
        let v = optional();
        assert!(v("field", &json!(null)).is_ok());
        assert!(v("field", &json!("value")).is_ok());
    }

    #[test]
    fn test_string_length_bounds() {
        let v = string_length(2, 5);
        assert!(v("name", &json!("a")).unwrap_err().contains("at least 2"));
        assert!(v("name", &json!("abcdef")).unwrap_err().contains("at most 5"));
        assert!(v("name", &json!("abc")).is_ok());
        assert!(v("name", &json!(12)).is_ok());
    }

    #[test]
    fn test_string_length_counts_characters() {
        let v = string_length(1, 4);
        assert!(v("name", &json!("ঢাকা")).is_ok());
    }

    #[test]
    fn test_in_list() {
        let v = in_list(vec!["A+".to_string(), "B+".to_string()]);
        assert!(v("blood_group", &json!("A+")).is_ok());
        assert!(v("blood_group", &json!("C+")).unwrap_err().contains("must be one of"));
    }

    #[test]
    fn test_date_format() {
        let v = date_format("%Y-%m-%d");
        assert!(v("donation_date", &json!("2024-02-29")).is_ok());
        assert!(v("donation_date", &json!("2023-02-29")).is_err());
        assert!(v("donation_date", &json!("29/02/2024")).is_err());
    }

    #[test]
    fn test_time_format() {
        let v = time_format("%H:%M");
        assert!(v("donation_time", &json!("09:30")).is_ok());
        assert!(v("donation_time", &json!("25:00")).is_err());
    }

    #[test]
    fn test_email() {
        let v = email();
        assert!(v("email", &json!("donor@example.com")).is_ok());
        assert!(v("email", &json!("not-an-email")).is_err());
        assert!(v("email", &json!(null)).is_ok());
    }
}
