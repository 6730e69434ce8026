//! Car Price API Server
//!
//! REST API exposing the pricing service to dashboards and other clients.

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod error;
mod routes;
pub mod settings;

use data_validator::Validator;
use feature_engine::FeatureAligner;
use inference_engine::{load_predictor, PricingService};
use settings::{AppConfig, LoggingConfig};

pub use error::ApiError;

/// Application state shared across handlers
pub struct AppState {
    /// Pricing service owning the loaded predictor
    pub service: PricingService,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
    /// Prometheus handle, when the recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state
    pub fn new(service: PricingService) -> Self {
        Self {
            service,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
            metrics: None,
        }
    }

    /// Attach a Prometheus handle
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub model: String,
    pub degraded: bool,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/schema", get(routes::schema::get_schema))
        .route("/api/v1/predict", post(routes::predictions::predict))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let degraded = state.service.is_degraded();
    Json(HealthResponse {
        status: if degraded { "degraded" } else { "healthy" }.to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model: state.service.predictor_name().to_string(),
        degraded,
    })
}

/// Prometheus exposition
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::NOT_FOUND,
            "metrics recorder not installed".to_string(),
        ),
    }
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .with_context(|| format!("invalid log level {:?}", config.level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow::anyhow!("failed to set tracing subscriber: {e}"))
}

/// Build application state from configuration
pub fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let predictor = load_predictor(&config.model)
        .with_context(|| format!("failed to load model {}", config.model.path.display()))?;

    let service = PricingService::new(
        Arc::from(predictor),
        FeatureAligner::new(config.encoding.clone()),
        Validator::new(config.validation.clone()),
    )
    .context("failed to initialise pricing service")?;

    Ok(AppState::new(service))
}

/// Run the server
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let mut state = build_state(&config)?;

    if config.server.metrics {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("failed to install Prometheus recorder")?;
        state = state.with_metrics(handle);
    }

    let app = create_router(Arc::new(state));

    info!("Starting API server on {}", config.server.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use inference_engine::{LinearModel, ModelConfig, ModelFormat};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app_with(model: LinearModel) -> Router {
        let service = PricingService::new(
            Arc::new(model),
            FeatureAligner::default(),
            Validator::default(),
        )
        .unwrap();
        create_router(Arc::new(AppState::new(service)))
    }

    fn scenario_model() -> LinearModel {
        let schema = feature_engine::Schema::new([
            "year",
            "mileage",
            "engine_size",
            "doors",
            "fuel_type_Diesel",
            "transmission_Manual",
            "brand_Lamborghini",
        ])
        .unwrap();
        LinearModel::new(
            Some(schema),
            vec![10.0, -1.0, 5000.0, 0.0, 0.0, 1000.0, 50_000.0],
            0.0,
        )
        .unwrap()
    }

    fn default_body() -> Value {
        json!({
            "year": 2022,
            "mileage": 5000,
            "engine_size": 3.0,
            "fuel_type": "Petrol",
            "transmission": "Manual",
            "brand": "Ferrari",
            "color": "Red",
            "doors": 2
        })
    }

    async fn post_json(app: Router, uri: &str, body: &Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        send(app, request).await
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_predict_ok() {
        let app = app_with(scenario_model());
        let (status, body) = post_json(app, "/api/v1/predict", &default_body()).await;

        assert_eq!(status, StatusCode::OK);
        // 2022*10 - 5000 + 3*5000 + 1000
        assert_eq!(body["price"], json!(31220.0));
        assert_eq!(body["formatted"], json!("$31,220.00"));
        assert_eq!(body["degraded"], json!(false));
        assert_eq!(body["schema_source"], json!("predictor"));
    }

    #[tokio::test]
    async fn test_predict_validation_error() {
        let app = app_with(scenario_model());
        let mut body = default_body();
        body["doors"] = json!("two");

        let (status, body) = post_json(app, "/api/v1/predict", &body).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], json!("validation"));
        assert_eq!(body["field"], json!("doors"));
    }

    #[tokio::test]
    async fn test_predict_malformed_body() {
        let app = app_with(scenario_model());
        let (status, body) = post_json(app, "/api/v1/predict", &json!([1, 2, 3])).await;
        assert!(status.is_client_error());
        assert_eq!(body["error"], json!("invalid_body"));
    }

    #[tokio::test]
    async fn test_predictor_failure_is_bad_gateway() {
        // No schema and too few coefficients: degraded width mismatch
        let app = app_with(LinearModel::new(None, vec![1.0], 0.0).unwrap());
        let (status, body) = post_json(app, "/api/v1/predict", &default_body()).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], json!("predictor"));
    }

    #[tokio::test]
    async fn test_health_and_schema() {
        let app = app_with(scenario_model());

        let (status, health) = get_json(app.clone(), "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["status"], json!("healthy"));

        let (status, schema) = get_json(app, "/api/v1/schema").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(schema["source"], json!("predictor"));
        assert_eq!(schema["columns"].as_array().map(Vec::len), Some(7));
    }

    #[tokio::test]
    async fn test_degraded_health() {
        let app = app_with(LinearModel::new(None, vec![1.0; 8], 0.0).unwrap());
        let (_, health) = get_json(app.clone(), "/api/v1/health").await;
        assert_eq!(health["status"], json!("degraded"));

        let (_, schema) = get_json(app, "/api/v1/schema").await;
        assert_eq!(schema["source"], json!("local_encoding"));
        assert_eq!(schema["columns"], json!([]));
    }

    #[tokio::test]
    async fn test_metrics_not_installed() {
        let app = app_with(scenario_model());
        let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_metrics_rendered_with_recorder() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, || {
            metrics::counter!("price_quotes_total").increment(3);
        });

        let service = PricingService::new(
            Arc::new(scenario_model()),
            FeatureAligner::default(),
            Validator::default(),
        )
        .unwrap();
        let app = create_router(Arc::new(AppState::new(service).with_metrics(handle)));

        let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("price_quotes_total 3"), "{text}");
    }

    #[tokio::test]
    async fn test_predict_ignores_many_unknown_attributes() {
        let mut body = default_body();
        let fields = body.as_object_mut().unwrap();
        for i in 0..20_000 {
            fields.insert(format!("x{i}"), json!(1));
        }

        let app = app_with(scenario_model());
        let (status, quote) = post_json(app, "/api/v1/predict", &body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(quote["price"], json!(31220.0));
    }

    #[test]
    fn test_build_state_missing_model() {
        let config = AppConfig {
            model: ModelConfig {
                path: "/nonexistent/model.json".into(),
                format: ModelFormat::LinearJson,
                schema_path: None,
            },
            ..Default::default()
        };
        assert!(build_state(&config).is_err());
    }
}
