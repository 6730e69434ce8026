//! Record Validation
//!
//! Boundary checks applied to raw car attribute records before encoding:
//! scalar types, numeric ranges, and categorical value sets.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{FieldRule, ValidationConfig, ValidationResult, Validator};
