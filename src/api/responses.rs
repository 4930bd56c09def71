// Response types for API endpoints

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::core::models::{Finding, PolicyAction, RiskScore, Severity};

/// Success response for the analyze endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub decision: PolicyAction,
    pub original_prompt: String,
    pub modified_prompt: String,
    pub modified_response: String,
    pub risks: Vec<Finding>,
    pub explanations: Vec<String>,
    pub severity: Severity,
    pub risk_score: RiskScore,
    pub latency_ms: u64,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// API error type that converts domain errors to HTTP responses
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub request_id: Option<String>,
}

impl ApiError {
    /// Create from FirewallError with request ID
    pub fn from_firewall_error(
        err: crate::core::errors::FirewallError,
        request_id: String,
    ) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self {
            status,
            message: err.user_message(),
            request_id: Some(request_id),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
            request_id: self.request_id,
        });
        (self.status, body).into_response()
    }
}

impl From<crate::core::errors::FirewallError> for ApiError {
    fn from(err: crate::core::errors::FirewallError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self {
            status,
            message: err.user_message(),
            request_id: None,
        }
    }
}
