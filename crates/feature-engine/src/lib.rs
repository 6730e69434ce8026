//! Feature Engineering Engine
//!
//! Turns raw car attribute records into the ordered numeric feature
//! vectors a trained price model expects: one-hot encoding followed by
//! alignment to the model's feature schema.

mod aligner;
mod encoder;
mod record;
mod schema;

pub use aligner::{align, align_with_report, prepare, AlignmentReport, FeatureAligner};
pub use encoder::{encode, encode_with, indicator_column, EncodeOptions, EncodedRecord};
pub use record::{AttributeValue, CarAttributes, RawRecord};
pub use schema::{NumericVector, Schema};

use thiserror::Error;

/// Errors building a feature schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Duplicate column in schema: {0}")]
    DuplicateColumn(String),
}
