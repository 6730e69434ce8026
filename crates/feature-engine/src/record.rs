//! Raw Attribute Records

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// A single scalar attribute value as supplied by the input source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Whole number (year, mileage, doors, horsepower)
    Integer(i64),
    /// Floating-point number (engine size)
    Float(f64),
    /// Categorical or free text (fuel type, brand, color)
    Text(String),
}

impl AttributeValue {
    /// Numeric view of the value, `None` for text
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Integer(v) => Some(*v as f64),
            AttributeValue::Float(v) => Some(*v),
            AttributeValue::Text(_) => None,
        }
    }

    /// Text view of the value, `None` for numbers
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short type name used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            AttributeValue::Integer(_) => "integer",
            AttributeValue::Float(_) => "float",
            AttributeValue::Text(_) => "text",
        }
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        AttributeValue::Integer(value.into())
    }
}

impl From<u32> for AttributeValue {
    fn from(value: u32) -> Self {
        AttributeValue::Integer(value.into())
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Float(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

/// One prediction request's attributes, in the order they were supplied.
///
/// Order matters: when a predictor cannot report its schema, the encoded
/// columns of this record become the schema, so they must come out in a
/// stable, caller-defined order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: Vec<(String, AttributeValue)>,
    /// Name -> position in `fields`
    index: HashMap<String, usize>,
}

impl RawRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert an attribute, replacing an existing value in place
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        let name = name.into();
        let value = value.into();
        match self.index.get(&name) {
            Some(&pos) => self.fields[pos].1 = value,
            None => {
                self.index.insert(name.clone(), self.fields.len());
                self.fields.push((name, value));
            }
        }
    }

    /// Look up an attribute by name
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.index.get(name).map(|&pos| &self.fields[pos].1)
    }

    /// Iterate attributes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no attributes
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RawRecord
where
    K: Into<String>,
    V: Into<AttributeValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = RawRecord::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

impl Serialize for RawRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct RawRecordVisitor;

impl<'de> Visitor<'de> for RawRecordVisitor {
    type Value = RawRecord;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of attribute names to integer, float or text values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        // Entries arrive in document order; keep it.
        let mut record = RawRecord::new();
        while let Some((name, value)) = access.next_entry::<String, AttributeValue>()? {
            record.insert(name, value);
        }
        Ok(record)
    }
}

impl<'de> Deserialize<'de> for RawRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RawRecordVisitor)
    }
}

/// Typed car attributes as collected by the dashboard form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarAttributes {
    /// Model year
    pub year: i64,
    /// Odometer reading (km)
    pub mileage: i64,
    /// Engine displacement (L)
    #[serde(default)]
    pub engine_size: Option<f64>,
    /// Rated power (hp)
    #[serde(default)]
    pub horsepower: Option<i64>,
    /// Fuel type (Petrol, Diesel, Electric, Hybrid)
    pub fuel_type: String,
    /// Transmission (Manual, Automatic)
    pub transmission: String,
    /// Manufacturer
    pub brand: String,
    /// Exterior color
    pub color: String,
    /// Number of doors
    #[serde(default)]
    pub doors: Option<i64>,
}

impl Default for CarAttributes {
    fn default() -> Self {
        Self {
            year: 2022,
            mileage: 5000,
            engine_size: Some(3.0),
            horsepower: None,
            fuel_type: "Petrol".to_string(),
            transmission: "Manual".to_string(),
            brand: "Ferrari".to_string(),
            color: "Red".to_string(),
            doors: Some(2),
        }
    }
}

impl From<CarAttributes> for RawRecord {
    fn from(car: CarAttributes) -> Self {
        let mut record = RawRecord::new()
            .with("year", car.year)
            .with("mileage", car.mileage);
        if let Some(engine_size) = car.engine_size {
            record.insert("engine_size", engine_size);
        }
        if let Some(horsepower) = car.horsepower {
            record.insert("horsepower", horsepower);
        }
        record.insert("fuel_type", car.fuel_type);
        record.insert("transmission", car.transmission);
        record.insert("brand", car.brand);
        record.insert("color", car.color);
        if let Some(doors) = car.doors {
            record.insert("doors", doors);
        }
        record
    }
}
