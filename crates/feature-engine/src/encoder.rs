//! One-Hot Encoding of Raw Records

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{trace, warn};

use crate::record::{AttributeValue, RawRecord};

/// Encoding options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// Joins attribute name and category value in indicator column names
    pub separator: String,
    /// Drop the first observed category of every categorical attribute.
    ///
    /// A single record has exactly one category per attribute, so this
    /// removes every indicator column.
    pub drop_first: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            separator: "_".to_string(),
            drop_first: false,
        }
    }
}

impl EncodeOptions {
    /// Options reproducing the literal drop-first convention
    pub fn drop_first() -> Self {
        Self {
            drop_first: true,
            ..Default::default()
        }
    }
}

/// Encoded record: ordered column names with numeric values
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EncodedRecord {
    columns: Vec<(String, f64)>,
    /// Column -> position in `columns`
    index: HashMap<String, usize>,
}

impl EncodedRecord {
    /// Look up a column value
    pub fn get(&self, column: &str) -> Option<f64> {
        self.index.get(column).map(|&pos| self.columns[pos].1)
    }

    /// Column names in encoding order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(c, _)| c.as_str())
    }

    /// Iterate columns in encoding order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.columns.iter().map(|(c, v)| (c.as_str(), *v))
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether there are no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Append a column; an existing column of the same name is kept
    fn push(&mut self, column: String, value: f64) -> bool {
        if self.index.contains_key(&column) {
            return false;
        }
        self.index.insert(column.clone(), self.columns.len());
        self.columns.push((column, value));
        true
    }
}

/// Name of the indicator column for a categorical value
pub fn indicator_column(attribute: &str, value: &str, separator: &str) -> String {
    format!("{attribute}{separator}{value}")
}

/// Encode a record: numeric columns first, then indicator columns, each in
/// record order.
///
/// An indicator whose name is already taken, by a numeric attribute or an
/// earlier indicator, is skipped with a warning; the first column wins.
pub fn encode_with(raw: &RawRecord, options: &EncodeOptions) -> EncodedRecord {
    let mut encoded = EncodedRecord::default();

    for (name, value) in raw.iter() {
        if let Some(v) = value.as_f64() {
            encoded.push(name.to_string(), v);
        }
    }

    for (name, value) in raw.iter() {
        if let AttributeValue::Text(category) = value {
            if options.drop_first {
                // The only observed category is also the first one.
                trace!("Dropping reference category {}={}", name, category);
                continue;
            }
            let column = indicator_column(name, category, &options.separator);
            if !encoded.push(column, 1.0) {
                warn!(
                    "Indicator for {}={} collides with an existing column; keeping the existing value",
                    name, category
                );
            }
        }
    }

    encoded
}

/// Encode a record with default options
pub fn encode(raw: &RawRecord) -> EncodedRecord {
    encode_with(raw, &EncodeOptions::default())
}
