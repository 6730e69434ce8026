//! Pricing Service
//!
//! Validates a record, aligns it to the predictor's schema and scores it.

use crate::predictor::Predictor;
use crate::{InferenceError, PricingError};
use data_validator::Validator;
use feature_engine::{align_with_report, AlignmentReport, FeatureAligner, RawRecord, Schema};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Where the schema used for alignment came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaSource {
    /// Reported by the predictor
    Predictor,
    /// Degraded: each request's own encoded columns
    LocalEncoding,
}

/// A priced request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Predicted price
    pub price: f64,
    /// Price formatted for display
    pub formatted: String,
    /// Whether the prediction used a locally derived schema
    pub degraded: bool,
    /// Schema origin
    pub schema_source: SchemaSource,
    /// Columns zero-filled or dropped during alignment
    pub alignment: AlignmentReport,
    /// End-to-end latency in microseconds
    pub latency_us: u64,
    /// Timestamp when the quote was produced
    pub timestamp_ms: u64,
}

/// Prices raw records against one loaded predictor
pub struct PricingService {
    predictor: Arc<dyn Predictor>,
    aligner: FeatureAligner,
    validator: Validator,
    /// `None` in degraded mode
    schema: Option<Schema>,
}

impl PricingService {
    /// Create a service, resolving the predictor's schema once.
    ///
    /// An unavailable schema switches the service into degraded mode;
    /// any other error is returned.
    pub fn new(
        predictor: Arc<dyn Predictor>,
        aligner: FeatureAligner,
        validator: Validator,
    ) -> Result<Self, InferenceError> {
        let schema = match predictor.feature_schema() {
            Ok(schema) => {
                info!(
                    "Using {}-column feature schema from {}",
                    schema.len(),
                    predictor.name()
                );
                Some(schema)
            }
            Err(InferenceError::SchemaUnavailable(reason)) => {
                warn!(
                    "Feature schema unavailable ({}); aligning to locally encoded columns, predictions may be unreliable",
                    reason
                );
                None
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            predictor,
            aligner,
            validator,
            schema,
        })
    }

    /// Resolved schema, `None` in degraded mode
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Origin of the alignment schema
    pub fn schema_source(&self) -> SchemaSource {
        if self.schema.is_some() {
            SchemaSource::Predictor
        } else {
            SchemaSource::LocalEncoding
        }
    }

    /// Whether the service runs without a predictor schema
    pub fn is_degraded(&self) -> bool {
        self.schema.is_none()
    }

    /// Name of the underlying predictor
    pub fn predictor_name(&self) -> &str {
        self.predictor.name()
    }

    /// Price one record
    pub fn quote(&self, raw: &RawRecord) -> Result<PriceQuote, PricingError> {
        let start = Instant::now();

        self.validator.validate(raw)?;

        let (vector, alignment) = match &self.schema {
            Some(schema) => self.aligner.prepare_with_report(raw, schema),
            None => {
                let encoded = self.aligner.encode(raw);
                let local = Schema::new(encoded.column_names())?;
                debug!("Degraded alignment to {} local columns", local.len());
                align_with_report(&encoded, &local)
            }
        };

        let price = self.predictor.predict(&vector)?;
        if !price.is_finite() {
            return Err(InferenceError::InferenceFailed(format!(
                "{} returned non-finite price {}",
                self.predictor.name(),
                price
            ))
            .into());
        }

        let latency_us = start.elapsed().as_micros() as u64;
        let timestamp_ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        debug!("Quoted {:.2} in {}us", price, latency_us);

        Ok(PriceQuote {
            price,
            formatted: format_price(price),
            degraded: self.is_degraded(),
            schema_source: self.schema_source(),
            alignment,
            latency_us,
            timestamp_ms,
        })
    }
}

/// Format a price as `$1,234,567.89`.
///
/// Matches the dashboard's `"${:,.2f}"` output: the sign goes after the
/// dollar sign (`$-45,000.50`) and exact half-cent ties round to even.
pub fn format_price(price: f64) -> String {
    if price.is_nan() {
        return "$nan".to_string();
    }
    let sign = if price.is_sign_negative() { "-" } else { "" };
    if price.is_infinite() {
        return format!("${sign}inf");
    }

    let (whole, fraction) = fixed_two_places(price.abs());

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("${sign}{grouped}.{fraction}")
}

/// Split a non-negative finite value into whole and two-digit fraction
fn fixed_two_places(value: f64) -> (String, String) {
    // A binary value can only sit exactly on a half cent when it is an
    // odd number of eighths.
    let eighths = value * 8.0;
    if eighths.fract() == 0.0 && eighths % 2.0 == 1.0 {
        let mut cents = (value * 100.0).floor() as u128;
        if cents % 2 == 1 {
            cents += 1;
        }
        return ((cents / 100).to_string(), format!("{:02}", cents % 100));
    }

    let fixed = format!("{value:.2}");
    match fixed.split_once('.') {
        Some((whole, fraction)) => (whole.to_string(), fraction.to_string()),
        None => (fixed, "00".to_string()),
    }
}
