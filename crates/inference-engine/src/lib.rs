//! Price Inference Engine
//!
//! Loads trained price models and turns validated attribute records into
//! price quotes. Models are reached only through the [`Predictor`] trait.

mod engine;
mod linear;
mod onnx;
mod predictor;

pub use engine::{format_price, PriceQuote, PricingService, SchemaSource};
pub use linear::LinearModel;
pub use onnx::OnnxPredictor;
pub use predictor::{load_predictor, load_schema_file, ModelConfig, ModelFormat, Predictor};

use data_validator::ValidationError;
use feature_engine::SchemaError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors loading or running a model
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Feature schema unavailable: {0}")]
    SchemaUnavailable(String),
    #[error("Model file not found: {}", .0.display())]
    ModelNotFound(PathBuf),
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: usize, actual: usize },
}

/// Errors producing a price quote for one request
#[derive(Debug, Error)]
pub enum PricingError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error("Prediction failed: {0}")]
    Predictor(#[from] InferenceError),
    #[error("Invalid feature schema: {0}")]
    Schema(#[from] SchemaError),
}
