//! Predictor Interface and Model Loading

use crate::linear::LinearModel;
use crate::onnx::OnnxPredictor;
use crate::InferenceError;
use feature_engine::{NumericVector, Schema};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// A trained price model
pub trait Predictor: Send + Sync {
    /// Score one aligned feature vector
    fn predict(&self, vector: &NumericVector) -> Result<f64, InferenceError>;

    /// Ordered feature columns the model was trained on
    fn feature_schema(&self) -> Result<Schema, InferenceError>;

    /// Human-readable model name for logs and health output
    fn name(&self) -> &str;
}

/// Serialized model format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFormat {
    /// Pick by file extension
    #[default]
    Auto,
    /// ONNX graph run with tract
    Onnx,
    /// JSON linear model artifact
    LinearJson,
}

#[derive(Debug, Clone, Copy)]
enum ArtifactKind {
    Onnx,
    LinearJson,
}

impl ModelFormat {
    fn resolve(self, path: &Path) -> Result<ArtifactKind, InferenceError> {
        match self {
            ModelFormat::Onnx => return Ok(ArtifactKind::Onnx),
            ModelFormat::LinearJson => return Ok(ArtifactKind::LinearJson),
            ModelFormat::Auto => {}
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some("onnx") => Ok(ArtifactKind::Onnx),
            Some("json") => Ok(ArtifactKind::LinearJson),
            _ => Err(InferenceError::ModelLoadError(format!(
                "Cannot infer model format from {}",
                path.display()
            ))),
        }
    }
}

/// Model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model artifact path
    pub path: PathBuf,
    /// Artifact format
    pub format: ModelFormat,
    /// Optional JSON file listing the model's feature columns
    pub schema_path: Option<PathBuf>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("models/car_price_model.onnx"),
            format: ModelFormat::Auto,
            schema_path: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaFile {
    Named { feature_names: Schema },
    Bare(Schema),
}

/// Read a feature schema from a JSON file.
///
/// Accepts either `{"feature_names": [...]}` or a bare array of names.
pub fn load_schema_file(path: &Path) -> Result<Schema, InferenceError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        InferenceError::SchemaUnavailable(format!("{}: {}", path.display(), e))
    })?;
    let file: SchemaFile = serde_json::from_str(&text).map_err(|e| {
        InferenceError::SchemaUnavailable(format!("{}: {}", path.display(), e))
    })?;
    Ok(match file {
        SchemaFile::Named { feature_names } => feature_names,
        SchemaFile::Bare(schema) => schema,
    })
}

/// Load the configured predictor
pub fn load_predictor(config: &ModelConfig) -> Result<Box<dyn Predictor>, InferenceError> {
    if !config.path.exists() {
        return Err(InferenceError::ModelNotFound(config.path.clone()));
    }

    let schema = config
        .schema_path
        .as_deref()
        .map(load_schema_file)
        .transpose()?;

    let kind = config.format.resolve(&config.path)?;
    info!("Loading {:?} model from {}", kind, config.path.display());

    let predictor: Box<dyn Predictor> = match kind {
        ArtifactKind::Onnx => Box::new(OnnxPredictor::load(&config.path, schema)?),
        ArtifactKind::LinearJson => {
            let model = LinearModel::load(&config.path)?;
            match schema {
                Some(schema) => Box::new(model.with_schema(schema)?),
                None => Box::new(model),
            }
        }
    };

    info!("Model {} loaded", predictor.name());
    Ok(predictor)
}
