//! Per-form validation configuration

use anyhow::Result;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

use crate::core::error::FieldValidationError;

type Validator = Arc<dyn Fn(&str, &Value) -> std::result::Result<(), String> + Send + Sync>;
type Filter = Arc<dyn Fn(&str, Value) -> Result<Value> + Send + Sync>;

/// Validators and filters for one form operation
///
/// Filters run first and rewrite the payload; validators then check the
/// filtered values. Every failing field is reported, not just the first.
#[derive(Clone, Default)]
pub struct FormValidationConfig {
    /// Form name, used in logs
    pub form: String,
    validators: IndexMap<String, Vec<Validator>>,
    filters: IndexMap<String, Vec<Filter>>,
}

impl FormValidationConfig {
    pub fn new(form: impl Into<String>) -> Self {
        Self {
            form: form.into(),
            ..Self::default()
        }
    }

    pub fn add_validator<F>(&mut self, field: &str, validator: F) -> &mut Self
    where
        F: Fn(&str, &Value) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        self.validators
            .entry(field.to_string())
            .or_default()
            .push(Arc::new(validator));
        self
    }

    pub fn add_filter<F>(&mut self, field: &str, filter: F) -> &mut Self
    where
        F: Fn(&str, Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.filters
            .entry(field.to_string())
            .or_default()
            .push(Arc::new(filter));
        self
    }

    /// Apply filters, then validators, to a JSON object payload
    pub fn validate_and_filter(
        &self,
        mut payload: Value,
    ) -> std::result::Result<Value, Vec<FieldValidationError>> {
        let Some(obj) = payload.as_object_mut() else {
            return Err(vec![FieldValidationError {
                field: "_payload".to_string(),
                message: "expected a JSON object".to_string(),
            }]);
        };

        let mut errors = Vec::new();

        for (field, filters) in &self.filters {
            let Some(current) = obj.get(field).cloned() else {
                continue;
            };
            let mut value = current;
            for filter in filters {
                match filter(field.as_str(), value.clone()) {
                    Ok(filtered) => value = filtered,
                    Err(e) => errors.push(FieldValidationError {
                        field: field.clone(),
                        message: e.to_string(),
                    }),
                }
            }
            obj.insert(field.clone(), value);
        }

        for (field, validators) in &self.validators {
            let value = obj.get(field).unwrap_or(&Value::Null);
            for validator in validators {
                if let Err(message) = validator(field.as_str(), value) {
                    errors.push(FieldValidationError {
                        field: field.clone(),
                        message,
                    });
                }
            }
        }

        if errors.is_empty() {
            Ok(payload)
        } else {
            tracing::debug!(form = %self.form, failures = errors.len(), "form rejected");
            Err(errors)
        }
    }
}

impl std::fmt::Debug for FormValidationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormValidationConfig")
            .field("form", &self.form)
            .field("validated_fields", &self.validators.keys().collect::<Vec<_>>())
            .field("filtered_fields", &self.filters.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validation::{filters, validators};
    use serde_json::json;

    #[test]
    fn test_filters_run_before_validators() {
        let mut config = FormValidationConfig::new("test");
        config
            .add_filter("name", filters::trim())
            .add_validator("name", validators::string_length(1, 3));

        let result = config.validate_and_filter(json!({"name": "  abc  "})).unwrap();
        assert_eq!(result["name"], "abc");
    }

    #[test]
    fn test_collects_every_failure() {
        let mut config = FormValidationConfig::new("test");
        config
            .add_validator("name", validators::required())
            .add_validator("email", validators::required())
            .add_validator("email", validators::email());

        let errors = config
            .validate_and_filter(json!({"email": "nope"}))
            .unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "email"]);
    }

    #[test]
    fn test_rejects_non_object_payload() {
        let config = FormValidationConfig::new("test");
        let errors = config.validate_and_filter(json!([1, 2])).unwrap_err();
        assert_eq!(errors[0].field, "_payload");
    }
}
