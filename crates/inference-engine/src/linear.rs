//! Linear Regression Model

use crate::predictor::Predictor;
use crate::InferenceError;
use feature_engine::{NumericVector, Schema};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
struct LinearArtifact {
    #[serde(default)]
    feature_names: Option<Schema>,
    coefficients: Vec<f64>,
    intercept: f64,
}

/// Linear price model: `intercept + coefficients · features`
#[derive(Debug, Clone)]
pub struct LinearModel {
    schema: Option<Schema>,
    coefficients: Vec<f64>,
    intercept: f64,
    name: String,
}

impl LinearModel {
    /// Create a model; feature names, when given, must match the coefficients
    pub fn new(
        schema: Option<Schema>,
        coefficients: Vec<f64>,
        intercept: f64,
    ) -> Result<Self, InferenceError> {
        if let Some(schema) = &schema {
            check_width(schema, &coefficients)?;
        }
        Ok(Self {
            schema,
            coefficients,
            intercept,
            name: "linear".to_string(),
        })
    }

    /// Parse a JSON artifact
    pub fn from_json_str(json: &str) -> Result<Self, InferenceError> {
        let artifact: LinearArtifact = serde_json::from_str(json)
            .map_err(|e| InferenceError::ModelLoadError(e.to_string()))?;
        Self::new(
            artifact.feature_names,
            artifact.coefficients,
            artifact.intercept,
        )
    }

    /// Load a JSON artifact from disk
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;
        let mut model = Self::from_json_str(&json)?;
        model.name = format!("linear:{}", path.display());
        debug!(
            "Loaded linear model with {} coefficients",
            model.coefficients.len()
        );
        Ok(model)
    }

    /// Replace the feature schema
    pub fn with_schema(mut self, schema: Schema) -> Result<Self, InferenceError> {
        check_width(&schema, &self.coefficients)?;
        self.schema = Some(schema);
        Ok(self)
    }
}

fn check_width(schema: &Schema, coefficients: &[f64]) -> Result<(), InferenceError> {
    if schema.len() != coefficients.len() {
        return Err(InferenceError::ModelLoadError(format!(
            "{} feature names but {} coefficients",
            schema.len(),
            coefficients.len()
        )));
    }
    Ok(())
}

impl Predictor for LinearModel {
    fn predict(&self, vector: &NumericVector) -> Result<f64, InferenceError> {
        if vector.len() != self.coefficients.len() {
            return Err(InferenceError::InvalidInputShape {
                expected: self.coefficients.len(),
                actual: vector.len(),
            });
        }
        let dot: f64 = self
            .coefficients
            .iter()
            .zip(vector.as_slice())
            .map(|(c, x)| c * x)
            .sum();
        Ok(self.intercept + dot)
    }

    fn feature_schema(&self) -> Result<Schema, InferenceError> {
        self.schema.clone().ok_or_else(|| {
            InferenceError::SchemaUnavailable(format!("{} has no feature names", self.name))
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict() {
        let model = LinearModel::new(None, vec![2.0, 3.0], 1.0).unwrap();
        let price = model.predict(&NumericVector::new(vec![10.0, 100.0])).unwrap();
        assert!((price - 321.0).abs() < 1e-9);
    }

    #[test]
    fn test_shape_mismatch() {
        let model = LinearModel::new(None, vec![2.0, 3.0], 1.0).unwrap();
        let err = model.predict(&NumericVector::new(vec![1.0])).unwrap_err();
        assert!(matches!(
            err,
            InferenceError::InvalidInputShape {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_schema_unavailable_without_names() {
        let model = LinearModel::from_json_str(r#"{"coefficients":[1.0],"intercept":0.0}"#).unwrap();
        assert!(matches!(
            model.feature_schema(),
            Err(InferenceError::SchemaUnavailable(_))
        ));
    }

    #[test]
    fn test_rejects_mismatched_names() {
        let result = LinearModel::from_json_str(
            r#"{"feature_names":["year"],"coefficients":[1.0,2.0],"intercept":0.0}"#,
        );
        assert!(matches!(result, Err(InferenceError::ModelLoadError(_))));
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let result = LinearModel::from_json_str(
            r#"{"feature_names":["year","year"],"coefficients":[1.0,2.0],"intercept":0.0}"#,
        );
        assert!(result.is_err());
    }
}
