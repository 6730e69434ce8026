//! ONNX Regressor via tract

use crate::predictor::Predictor;
use crate::InferenceError;
use feature_engine::{NumericVector, Schema};
use std::path::Path;
use tracing::{debug, info};
use tract_onnx::prelude::*;

type Plan = TypedRunnableModel<TypedModel>;

fn load_error(e: impl std::fmt::Display) -> InferenceError {
    InferenceError::ModelLoadError(e.to_string())
}

fn inference_error(e: impl std::fmt::Display) -> InferenceError {
    InferenceError::InferenceFailed(e.to_string())
}

/// ONNX price regressor taking an `f32[1, n]` input.
///
/// ONNX graphs carry no column names, so the feature schema has to be
/// supplied alongside the model.
pub struct OnnxPredictor {
    plan: Plan,
    schema: Option<Schema>,
    name: String,
}

impl OnnxPredictor {
    /// Load and optimize an ONNX model
    pub fn load(path: &Path, schema: Option<Schema>) -> Result<Self, InferenceError> {
        let mut model = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(load_error)?;

        if let Some(schema) = &schema {
            // Pin the input so tract can fully type the graph
            model = model
                .with_input_fact(0, f32::fact([1, schema.len()]).into())
                .map_err(load_error)?;
        }

        let plan = model
            .into_optimized()
            .map_err(load_error)?
            .into_runnable()
            .map_err(load_error)?;

        info!(
            "ONNX model {} ready ({} schema columns)",
            path.display(),
            schema.as_ref().map(Schema::len).unwrap_or(0)
        );

        Ok(Self {
            plan,
            schema,
            name: format!("onnx:{}", path.display()),
        })
    }
}

impl Predictor for OnnxPredictor {
    fn predict(&self, vector: &NumericVector) -> Result<f64, InferenceError> {
        if let Some(schema) = &self.schema {
            if vector.len() != schema.len() {
                return Err(InferenceError::InvalidInputShape {
                    expected: schema.len(),
                    actual: vector.len(),
                });
            }
        }

        let data: Vec<f32> = vector.as_slice().iter().map(|&v| v as f32).collect();
        let input = Tensor::from_shape(&[1, data.len()], &data).map_err(inference_error)?;

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(inference_error)?;
        let output = outputs
            .first()
            .ok_or_else(|| InferenceError::InferenceFailed("model produced no output".into()))?;

        let values = output.cast_to::<f64>().map_err(inference_error)?;
        let price = values
            .as_slice::<f64>()
            .map_err(inference_error)?
            .first()
            .copied()
            .ok_or_else(|| InferenceError::InferenceFailed("model output is empty".into()))?;

        debug!("ONNX prediction: {}", price);
        Ok(price)
    }

    fn feature_schema(&self) -> Result<Schema, InferenceError> {
        self.schema.clone().ok_or_else(|| {
            InferenceError::SchemaUnavailable(format!(
                "{} has no feature schema configured",
                self.name
            ))
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
