//! Prediction Routes

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use feature_engine::RawRecord;
use inference_engine::PriceQuote;
use std::sync::Arc;
use tracing::debug;

use crate::{ApiError, AppState};

/// Price one car
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RawRecord>, JsonRejection>,
) -> Result<Json<PriceQuote>, ApiError> {
    let Json(raw) = payload.map_err(|rejection| {
        metrics::counter!("price_quote_failures_total", "kind" => "invalid_body").increment(1);
        ApiError::from(rejection)
    })?;
    debug!("Pricing record with {} attributes", raw.len());

    match state.service.quote(&raw) {
        Ok(quote) => {
            metrics::counter!("price_quotes_total").increment(1);
            metrics::histogram!("price_quote_latency_seconds")
                .record(quote.latency_us as f64 / 1_000_000.0);
            if quote.degraded {
                metrics::counter!("price_quotes_degraded_total").increment(1);
            }
            Ok(Json(quote))
        }
        Err(e) => {
            let error = ApiError::from(e);
            metrics::counter!("price_quote_failures_total", "kind" => error.kind()).increment(1);
            Err(error)
        }
    }
}
