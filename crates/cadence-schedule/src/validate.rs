use serde::{Deserialize, Serialize};

use crate::{
    codec::DISPLAY_ZONE,
    describe::describe_expression_in,
    expression::Expression,
    timezone::Zone,
};

/// Outcome of validating a raw expression typed into the editor.
///
/// `error` is empty exactly when `is_valid`; `description` is filled only
/// when valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub error: String,
    pub description: String,
}

impl ValidationResult {
    pub fn valid(description: impl Into<String>) -> Self {
        Self {
            is_valid: true,
            error: String::new(),
            description: description.into(),
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: error.into(),
            description: String::new(),
        }
    }
}

/// Validate `raw` field by field and describe it for the default display zone.
pub fn validate(raw: &str) -> ValidationResult {
    validate_in(raw, DISPLAY_ZONE)
}

/// Like [`validate`], with the description's secondary time shown in `zone`.
pub fn validate_in(raw: &str, zone: Zone) -> ValidationResult {
    match Expression::parse(raw) {
        Ok(expr) => ValidationResult::valid(describe_expression_in(&expr, zone)),
        Err(e) => ValidationResult::invalid(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_expression_is_described() {
        let result = validate("*/30 * * * *");
        assert!(result.is_valid);
        assert!(result.error.is_empty());
        assert!(result.description.to_lowercase().contains("every 30 minutes"));
    }

    #[test]
    fn invalid_expression_carries_error_only() {
        let result = validate("0 24 * * *");
        assert!(!result.is_valid);
        assert!(result.error.contains("hour"));
        assert!(result.description.is_empty());
    }

    #[test]
    fn blank_input_is_rejected() {
        let result = validate("  ");
        assert!(!result.is_valid);
        assert_eq!(result.error, "Schedule expression is empty");
    }

    #[test]
    fn zone_changes_secondary_time() {
        let result = validate_in("0 20 * * 2", Zone::Cst);
        assert_eq!(
            result.description,
            "Every Tuesday at 8:00 PM UTC (2:00 PM CST)"
        );
    }

    #[test]
    fn serializes_with_camel_case() {
        let json = serde_json::to_string(&validate("0 0 * *")).unwrap();
        assert!(json.contains(r#""isValid":false"#));
        assert!(json.contains("Expected 5 fields"));
    }
}
