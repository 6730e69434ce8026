//! Record Validator

use crate::error::ValidationError;
use feature_engine::{AttributeValue, RawRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Rule applied to a single attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldRule {
    /// Whole number within an inclusive range
    Integer { min: i64, max: i64 },
    /// Any number within an inclusive range
    Float { min: f64, max: f64 },
    /// Text drawn from a fixed set
    Category { allowed: Vec<String> },
    /// Any text
    Text,
}

/// Validation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Rules by attribute name
    pub fields: BTreeMap<String, FieldRule>,
    /// Attributes that must be present
    pub required: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        let categories = |values: &[&str]| FieldRule::Category {
            allowed: values.iter().map(|v| v.to_string()).collect(),
        };

        let mut fields = BTreeMap::new();
        fields.insert("year".to_string(), FieldRule::Integer { min: 1980, max: 2026 });
        fields.insert("mileage".to_string(), FieldRule::Integer { min: 0, max: i64::MAX });
        fields.insert("engine_size".to_string(), FieldRule::Float { min: 0.5, max: 8.0 });
        fields.insert("horsepower".to_string(), FieldRule::Integer { min: 100, max: 1500 });
        fields.insert("doors".to_string(), FieldRule::Integer { min: 2, max: 5 });
        fields.insert(
            "fuel_type".to_string(),
            categories(&["Petrol", "Diesel", "Electric", "Hybrid"]),
        );
        fields.insert("transmission".to_string(), categories(&["Manual", "Automatic"]));
        fields.insert("brand".to_string(), FieldRule::Text);
        fields.insert("color".to_string(), FieldRule::Text);

        Self {
            fields,
            required: ["year", "mileage", "fuel_type", "transmission", "brand", "color"]
                .iter()
                .map(|f| f.to_string())
                .collect(),
        }
    }
}

impl ValidationConfig {
    /// Accept any well-typed record: no ranges, no required fields
    pub fn permissive() -> Self {
        Self {
            fields: BTreeMap::new(),
            required: Vec::new(),
        }
    }
}

/// Result of validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether all values are valid
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Number of fields validated
    pub fields_checked: usize,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid(fields_checked: usize) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            fields_checked,
        }
    }

    /// Create an invalid result with errors
    pub fn invalid(errors: Vec<ValidationError>, fields_checked: usize) -> Self {
        Self {
            valid: false,
            errors,
            fields_checked,
        }
    }
}

/// Validator for raw attribute records
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Configuration in use
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a record, stopping at the first error
    pub fn validate(&self, record: &RawRecord) -> Result<(), ValidationError> {
        match self.check(record).errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Validate a record, collecting every error
    pub fn check(&self, record: &RawRecord) -> ValidationResult {
        let mut errors = Vec::new();

        for field in &self.config.required {
            if record.get(field).is_none() {
                errors.push(ValidationError::MissingField(field.clone()));
            }
        }

        let mut fields_checked = 0;
        for (name, value) in record.iter() {
            let Some(rule) = self.config.fields.get(name) else {
                continue;
            };
            fields_checked += 1;
            if let Err(e) = self.validate_field(name, value, rule) {
                errors.push(e);
            }
        }

        if errors.is_empty() {
            ValidationResult::valid(fields_checked)
        } else {
            debug!("Record rejected with {} validation errors", errors.len());
            ValidationResult::invalid(errors, fields_checked)
        }
    }

    /// Validate a single value against its rule
    pub fn validate_field(
        &self,
        field: &str,
        value: &AttributeValue,
        rule: &FieldRule,
    ) -> Result<(), ValidationError> {
        match rule {
            FieldRule::Integer { min, max } => match value {
                AttributeValue::Integer(v) => {
                    self.validate_range(field, *v as f64, (*min as f64, *max as f64))
                }
                other => Err(type_mismatch(field, "integer", other)),
            },
            FieldRule::Float { min, max } => match value.as_f64() {
                Some(v) if !v.is_finite() => Err(ValidationError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("{v} is not finite"),
                }),
                Some(v) => self.validate_range(field, v, (*min, *max)),
                None => Err(type_mismatch(field, "number", value)),
            },
            FieldRule::Category { allowed } => match value.as_text() {
                Some(v) if allowed.iter().any(|a| a == v) => Ok(()),
                Some(v) => Err(ValidationError::InvalidCategory {
                    field: field.to_string(),
                    value: v.to_string(),
                    allowed: allowed.clone(),
                }),
                None => Err(type_mismatch(field, "text", value)),
            },
            FieldRule::Text => match value {
                AttributeValue::Text(_) => Ok(()),
                other => Err(type_mismatch(field, "text", other)),
            },
        }
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field: field.to_string(),
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

fn type_mismatch(field: &str, expected: &'static str, actual: &AttributeValue) -> ValidationError {
    ValidationError::TypeMismatch {
        field: field.to_string(),
        expected,
        actual: actual.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::CarAttributes;
    use proptest::prelude::*;

    fn default_record() -> RawRecord {
        CarAttributes::default().into()
    }

    #[test]
    fn test_default_form_is_valid() {
        let validator = Validator::default();
        let result = validator.check(&default_record());
        assert!(result.valid, "{:?}", result.errors);
        assert_eq!(result.fields_checked, 8);
    }

    #[test]
    fn test_year_range() {
        let validator = Validator::default();
        let mut record = default_record();
        record.insert("year", 1979);
        assert!(matches!(
            validator.validate(&record),
            Err(ValidationError::OutOfRange { ref field, .. }) if field == "year"
        ));
        record.insert("year", 2026);
        assert!(validator.validate(&record).is_ok());
    }

    #[test]
    fn test_type_mismatch() {
        let validator = Validator::default();
        let mut record = default_record();
        record.insert("doors", "two");
        let err = validator.validate(&record).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TypeMismatch {
                field: "doors".to_string(),
                expected: "integer",
                actual: "text",
            }
        );
    }

    #[test]
    fn test_float_field_accepts_integer() {
        let validator = Validator::default();
        let mut record = default_record();
        record.insert("engine_size", 4);
        assert!(validator.validate(&record).is_ok());
        record.insert("engine_size", 8.5);
        assert!(validator.validate(&record).is_err());
    }

    #[test]
    fn test_non_finite_float_rejected() {
        let validator = Validator::default();
        let mut record = default_record();
        record.insert("engine_size", f64::NAN);
        assert!(matches!(
            validator.validate(&record),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_unknown_category() {
        let validator = Validator::default();
        let mut record = default_record();
        record.insert("fuel_type", "Hydrogen");
        assert!(matches!(
            validator.validate(&record),
            Err(ValidationError::InvalidCategory { .. })
        ));
    }

    #[test]
    fn test_missing_and_multiple_errors() {
        let validator = Validator::default();
        let record = RawRecord::new().with("year", 2020).with("doors", 9);
        let result = validator.check(&record);
        assert!(!result.valid);
        // mileage, fuel_type, transmission, brand, color missing; doors out of range
        assert_eq!(result.errors.len(), 6);
    }

    #[test]
    fn test_unknown_fields_pass_through() {
        let validator = Validator::default();
        let record = default_record().with("sunroof", "yes");
        assert!(validator.validate(&record).is_ok());
    }

    #[test]
    fn test_permissive_config() {
        let validator = Validator::new(ValidationConfig::permissive());
        assert!(validator.validate(&RawRecord::new()).is_ok());
    }

    #[test]
    fn test_config_deserializes() {
        let json = r#"{
            "fields": {
                "horsepower": { "type": "integer", "min": 100, "max": 1500 },
                "transmission": { "type": "category", "allowed": ["Manual"] }
            },
            "required": ["horsepower"]
        }"#;
        let config: ValidationConfig = serde_json::from_str(json).unwrap();
        let validator = Validator::new(config);

        let record = RawRecord::new()
            .with("horsepower", 700)
            .with("transmission", "Manual");
        assert!(validator.validate(&record).is_ok());
        assert!(validator
            .validate(&RawRecord::new().with("transmission", "Manual"))
            .is_err());
    }

    proptest! {
        #[test]
        fn prop_year_accepted_iff_in_range(year in 1900i64..2100) {
            let validator = Validator::default();
            let mut record = default_record();
            record.insert("year", year);
            prop_assert_eq!(validator.validate(&record).is_ok(), (1980..=2026).contains(&year));
        }
    }
}
