// Axum web server layer

use axum::error_handling::HandleErrorLayer;
use axum::http::StatusCode;
use axum::{BoxError, Router};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;

pub mod handlers;
pub mod responses;

use crate::config::Config;
use crate::engine::anomaly::AnomalyScorer;
use crate::engine::firewall::PromptFirewall;
use crate::state::{HistoryStore, PolicyStore};

/// Application state containing all shared dependencies
///
/// All components are wrapped in Arc for shared ownership across async
/// tasks. AppState itself is cloned per request by the router.
#[derive(Clone)]
pub struct AppState {
    pub firewall: Arc<PromptFirewall>,
    pub scorer: Arc<AnomalyScorer>,
    pub policy_store: Arc<dyn PolicyStore>,
    pub history_store: Arc<dyn HistoryStore>,
    pub config: Arc<Config>,
}

/// Create the Axum router with all routes and middleware
///
/// Middleware stack (outermost to innermost):
/// - Request timeout (tower::timeout) - global timeout from config
/// - Body size limit (tower-http::limit) - max body size from config
///
/// `/health` carries no analysis state and is always fast.
pub fn create_router(app_state: AppState) -> Router {
    let body_limit = app_state.config.body_size_limit_bytes;
    let timeout_secs = app_state.config.request_timeout_secs;

    let router = Router::new()
        .route("/v1/analyze", axum::routing::post(handlers::analyze_handler))
        .route("/health", axum::routing::get(handlers::health_handler))
        .with_state(app_state)
        .layer(RequestBodyLimitLayer::new(body_limit));

    // HandleErrorLayer must come BEFORE timeout to catch the timeout error
    let middleware_stack = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(|e: BoxError| async move {
            let status = if e.is::<tower::timeout::error::Elapsed>() {
                StatusCode::REQUEST_TIMEOUT
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, e.to_string())
        }))
        .timeout(Duration::from_secs(timeout_secs))
        .into_inner();

    router.layer(middleware_stack)
}
