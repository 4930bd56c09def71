// Request handlers for API endpoints

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Json;
use chrono::Utc;
use serde::Deserialize;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::api::responses::{AnalyzeResponse, ApiError, HealthResponse};
use crate::api::AppState;
use crate::core::errors::FirewallError;
use crate::core::models::{DecisionSnapshot, HistoryRecord};

/// Request body for the analyze endpoint.
///
/// `response` is supplied by the caller when a model response should be
/// scanned for leakage; invoking the model itself is not this service's job.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub prompt: String,
    #[serde(default)]
    pub response: String,
    pub user_id: Option<String>,
    pub tenant_id: Option<String>,
}

/// Main handler for the analyze endpoint
///
/// POST /v1/analyze
///
/// Request flow:
/// 1. Extract request ID from headers or generate UUID
/// 2. Validate prompt bounds
/// 3. Load the tenant's active policies
/// 4. Run the firewall pipeline (fan-out, merge, policy resolution)
/// 5. Persist a history record for the anomaly scorer
/// 6. Score the request and append risk_score into decision metadata
/// 7. Return JSON response
pub async fn analyze_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let start = Instant::now();

    // Extract or generate request ID
    let request_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let tenant_id = request.tenant_id.as_deref().unwrap_or("default").to_string();
    let user_id = request.user_id.as_deref().unwrap_or("anonymous").to_string();

    info!(
        request_id = %request_id,
        tenant_id = %tenant_id,
        prompt_len = request.prompt.len(),
        "Firewall analysis started"
    );

    validate_prompt(&request.prompt, app_state.config.max_prompt_chars)
        .map_err(|e| ApiError::from_firewall_error(e, request_id.clone()))?;

    let policies = app_state
        .policy_store
        .active_policies(&tenant_id)
        .await
        .map_err(|e| {
            error!(error = %e, request_id = %request_id, "Failed to load tenant policies");
            ApiError::from_firewall_error(e, request_id.clone())
        })?;

    let mut decision = app_state
        .firewall
        .analyze_request(&request.prompt, &request.response, &policies)
        .await
        .map_err(|e| {
            error!(error = %e, request_id = %request_id, "Firewall analysis failed");
            ApiError::from_firewall_error(e, request_id.clone())
        })?;

    // Persist the snapshot before scoring so this request is part of the
    // user's history going forward
    let record = HistoryRecord {
        timestamp: Utc::now(),
        decision: DecisionSnapshot {
            decision: decision.decision,
            severity: decision.severity,
        },
        risks: decision.findings.clone(),
        severity: decision.severity,
        user_id: user_id.clone(),
        tenant_id: tenant_id.clone(),
    };
    if let Err(e) = app_state.history_store.record(record).await {
        warn!(error = %e, request_id = %request_id, "Failed to persist history record");
    }

    let risk_score = app_state
        .scorer
        .calculate_risk_score(&user_id, &tenant_id, &decision)
        .await
        .map_err(|e| {
            error!(error = %e, request_id = %request_id, "Risk scoring failed");
            ApiError::from_firewall_error(e, request_id.clone())
        })?;

    decision
        .metadata
        .insert("risk_score".to_string(), serde_json::json!(risk_score));

    let latency_ms = start.elapsed().as_millis() as u64;

    info!(
        request_id = %request_id,
        decision = %decision.decision,
        severity = %decision.severity,
        risk_count = decision.findings.len(),
        risk_score,
        latency_ms,
        "Firewall decision"
    );

    Ok(Json(AnalyzeResponse {
        decision: decision.decision,
        original_prompt: request.prompt,
        modified_prompt: decision.prompt_modified,
        modified_response: decision.response_modified,
        risks: decision.findings,
        explanations: decision.explanations,
        severity: decision.severity,
        risk_score,
        latency_ms,
        metadata: decision.metadata,
    }))
}

/// Health check endpoint
///
/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "prompt-firewall".to_string(),
    })
}

fn validate_prompt(prompt: &str, max_chars: usize) -> Result<(), FirewallError> {
    if prompt.is_empty() {
        return Err(FirewallError::InvalidRequest(
            "prompt must not be empty".to_string(),
        ));
    }
    let chars = prompt.chars().count();
    if chars > max_chars {
        return Err(FirewallError::InvalidRequest(format!(
            "prompt exceeds {} characters",
            max_chars
        )));
    }
    Ok(())
}
