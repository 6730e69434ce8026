//! API Error Responses

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use inference_engine::PricingError;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// Errors returned by request handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error(transparent)]
    InvalidBody(#[from] JsonRejection),
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    /// Offending attribute, for validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ApiError {
    /// Stable machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Pricing(PricingError::Validation(_)) => "validation",
            ApiError::Pricing(PricingError::Predictor(_)) => "predictor",
            ApiError::Pricing(PricingError::Schema(_)) => "schema",
            ApiError::InvalidBody(_) => "invalid_body",
        }
    }

    /// Attribute the error refers to, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            ApiError::Pricing(PricingError::Validation(e)) => Some(e.field()),
            _ => None,
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Pricing(PricingError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Pricing(PricingError::Predictor(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Pricing(PricingError::Schema(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InvalidBody(rejection) => rejection.status(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!("Request failed: {}", self);
        }
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
            field: self.field().map(str::to_string),
        };
        (status, Json(body)).into_response()
    }
}
