//! Argument validation against an [`InputSchema`]
//!
//! Walks the schema depth-first in property declaration order and stops at the
//! first violation.

use serde_json::Value;

use crate::catalog::schema::{join_path, InputSchema, SchemaType};
use crate::error::ValidationError;

/// Path reported for a violation at the top level of the arguments
pub const ROOT_PATH: &str = "arguments";

/// Check `arguments` against `schema`, returning the first violation
pub fn check(schema: &InputSchema, arguments: &Value) -> Result<(), ValidationError> {
    check_at(schema, arguments, "")
}

fn check_at(schema: &InputSchema, value: &Value, path: &str) -> Result<(), ValidationError> {
    match &schema.kind {
        SchemaType::Object {
            properties,
            required,
        } => {
            let map = value
                .as_object()
                .ok_or_else(|| mismatch(path, "object", value))?;

            for (name, sub_schema) in properties {
                let child = join_path(path, name);
                match map.get(name) {
                    Some(v) => check_at(sub_schema, v, &child)?,
                    None if required.contains(name) => {
                        return Err(ValidationError::new(child, "required property is missing"));
                    }
                    None => {}
                }
            }
            Ok(())
        }
        SchemaType::String => {
            if value.is_string() {
                Ok(())
            } else {
                Err(mismatch(path, "string", value))
            }
        }
        SchemaType::Number => {
            if value.is_number() {
                Ok(())
            } else {
                Err(mismatch(path, "number", value))
            }
        }
        SchemaType::Array { items } => {
            let elements = value
                .as_array()
                .ok_or_else(|| mismatch(path, "array", value))?;
            for (i, element) in elements.iter().enumerate() {
                check_at(items, element, &join_path(path, &i.to_string()))?;
            }
            Ok(())
        }
        SchemaType::Enum { values } => match value.as_str() {
            Some(s) if values.iter().any(|allowed| allowed == s) => Ok(()),
            Some(s) => Err(ValidationError::new(
                display_path(path),
                format!("'{}' is not one of: {}", s, values.join(", ")),
            )),
            None => Err(mismatch(path, "string", value)),
        },
    }
}

fn mismatch(path: &str, expected: &str, actual: &Value) -> ValidationError {
    ValidationError::new(
        display_path(path),
        format!("expected {}, got {}", expected, type_name(actual)),
    )
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        ROOT_PATH.to_string()
    } else {
        path.to_string()
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn investment_schema() -> InputSchema {
        InputSchema::object(
            vec![
                ("investment_amount", InputSchema::number()),
                (
                    "risk_tolerance",
                    InputSchema::enumeration(&["conservative", "moderate", "aggressive"]),
                ),
                ("time_horizon", InputSchema::string()),
                ("goals", InputSchema::array(InputSchema::string())),
            ],
            &["investment_amount", "risk_tolerance", "time_horizon"],
        )
    }

    #[test]
    fn test_accepts_valid_arguments() {
        let args = json!({
            "investment_amount": 100000,
            "risk_tolerance": "moderate",
            "time_horizon": "5 years",
            "goals": ["retirement", "education"]
        });
        assert!(check(&investment_schema(), &args).is_ok());
    }

    #[test]
    fn test_tolerates_extra_properties() {
        let args = json!({
            "investment_amount": 1.5,
            "risk_tolerance": "aggressive",
            "time_horizon": "1 year",
            "currency": "EUR"
        });
        assert!(check(&investment_schema(), &args).is_ok());
    }

    #[test]
    fn test_reports_first_violation_in_declaration_order() {
        // both the amount and the horizon are wrong; the amount is declared first
        let args = json!({
            "investment_amount": "lots",
            "risk_tolerance": "moderate"
        });
        let err = check(&investment_schema(), &args).unwrap_err();
        assert_eq!(err.path, "investment_amount");
        assert_eq!(err.reason, "expected number, got string");
    }

    #[test]
    fn test_missing_required_property() {
        let args = json!({"investment_amount": 10, "risk_tolerance": "moderate"});
        let err = check(&investment_schema(), &args).unwrap_err();
        assert_eq!(err.path, "time_horizon");
        assert!(err.reason.contains("missing"));
    }

    #[test]
    fn test_enum_is_case_sensitive() {
        let args = json!({
            "investment_amount": 10,
            "risk_tolerance": "Moderate",
            "time_horizon": "soon"
        });
        let err = check(&investment_schema(), &args).unwrap_err();
        assert_eq!(err.path, "risk_tolerance");
        assert!(err.reason.contains("conservative, moderate, aggressive"));
    }

    #[test]
    fn test_array_element_path() {
        let args = json!({
            "investment_amount": 10,
            "risk_tolerance": "moderate",
            "time_horizon": "soon",
            "goals": ["growth", 7]
        });
        let err = check(&investment_schema(), &args).unwrap_err();
        assert_eq!(err.path, "goals.1");
    }

    #[test]
    fn test_nested_object_path() {
        let schema = InputSchema::object(
            vec![(
                "profile",
                InputSchema::object(vec![("age", InputSchema::number())], &["age"]),
            )],
            &["profile"],
        );
        let err = check(&schema, &json!({"profile": {}})).unwrap_err();
        assert_eq!(err.path, "profile.age");
    }

    #[test]
    fn test_root_must_be_object() {
        let err = check(&investment_schema(), &json!([1, 2])).unwrap_err();
        assert_eq!(err.path, ROOT_PATH);
        assert_eq!(err.reason, "expected object, got array");
    }

    #[test]
    fn test_check_is_repeatable() {
        let args = json!({"investment_amount": 10});
        let first = check(&investment_schema(), &args);
        let second = check(&investment_schema(), &args);
        assert_eq!(first, second);
    }
}
