//! Schema Routes

use axum::{extract::State, Json};
use inference_engine::SchemaSource;
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

/// Response for schema endpoint
#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub source: SchemaSource,
    /// Empty in degraded mode, where each request defines its own columns
    pub columns: Vec<String>,
    pub count: usize,
}

/// Get the feature schema requests are aligned to
pub async fn get_schema(State(state): State<Arc<AppState>>) -> Json<SchemaResponse> {
    let columns: Vec<String> = state
        .service
        .schema()
        .map(|schema| schema.columns().to_vec())
        .unwrap_or_default();

    Json(SchemaResponse {
        source: state.service.schema_source(),
        count: columns.len(),
        columns,
    })
}
