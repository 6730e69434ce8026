//! Schema Alignment
//!
//! Reshapes an encoded record to the exact column set a predictor was
//! trained on. A single record can never span every category seen in
//! training, so absent columns are zero-filled and unknown columns dropped.
//!
//! A category outside the training vocabulary and the reference category
//! of a drop-first encoded model both end up as all-zero indicators. The
//! two cases cannot be told apart from the schema alone.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::encoder::{encode_with, EncodeOptions, EncodedRecord};
use crate::record::RawRecord;
use crate::schema::{NumericVector, Schema};

/// What alignment had to change to fit the schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignmentReport {
    /// Schema columns absent from the encoded record, set to 0
    pub zero_filled: Vec<String>,
    /// Encoded columns unknown to the schema, discarded
    pub dropped: Vec<String>,
}

impl AlignmentReport {
    /// Whether the encoded record matched the schema exactly
    pub fn is_exact(&self) -> bool {
        self.zero_filled.is_empty() && self.dropped.is_empty()
    }
}

/// Align an encoded record to a schema
pub fn align(encoded: &EncodedRecord, schema: &Schema) -> NumericVector {
    align_with_report(encoded, schema).0
}

/// Align an encoded record to a schema and report what was changed
pub fn align_with_report(
    encoded: &EncodedRecord,
    schema: &Schema,
) -> (NumericVector, AlignmentReport) {
    let mut report = AlignmentReport::default();

    let values = schema
        .iter()
        .map(|column| match encoded.get(column) {
            Some(value) => value,
            None => {
                report.zero_filled.push(column.to_string());
                0.0
            }
        })
        .collect();

    report.dropped = encoded
        .column_names()
        .filter(|column| !schema.contains(column))
        .map(str::to_string)
        .collect();

    (NumericVector::new(values), report)
}

/// Encode with default options, then align
pub fn prepare(raw: &RawRecord, schema: &Schema) -> NumericVector {
    FeatureAligner::default().prepare(raw, schema)
}

/// Feature aligner with configurable encoding
#[derive(Debug, Clone, Default)]
pub struct FeatureAligner {
    options: EncodeOptions,
}

impl FeatureAligner {
    /// Create an aligner with the given encoding options
    pub fn new(options: EncodeOptions) -> Self {
        Self { options }
    }

    /// Encode a raw record
    pub fn encode(&self, raw: &RawRecord) -> EncodedRecord {
        encode_with(raw, &self.options)
    }

    /// Align an encoded record to a schema
    pub fn align(&self, encoded: &EncodedRecord, schema: &Schema) -> NumericVector {
        align(encoded, schema)
    }

    /// Encode then align
    pub fn prepare(&self, raw: &RawRecord, schema: &Schema) -> NumericVector {
        self.align(&self.encode(raw), schema)
    }

    /// Encode then align, reporting zero-filled and dropped columns
    pub fn prepare_with_report(
        &self,
        raw: &RawRecord,
        schema: &Schema,
    ) -> (NumericVector, AlignmentReport) {
        let encoded = self.encode(raw);
        let (vector, report) = align_with_report(&encoded, schema);
        debug!(
            "Aligned {} encoded columns to {} schema columns: {} zero-filled, {} dropped",
            encoded.len(),
            schema.len(),
            report.zero_filled.len(),
            report.dropped.len()
        );
        (vector, report)
    }
}
