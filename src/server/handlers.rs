use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::lookup::{DomainError, DomainRecord};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

#[derive(Debug)]
pub struct ApiError(StatusCode, String);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.0
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        api_error(status_for(&e), e.to_string())
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

fn status_for(e: &DomainError) -> StatusCode {
    match e {
        DomainError::InvalidFormat(_) => StatusCode::BAD_REQUEST,
        DomainError::UnresolvableDomain(_) => StatusCode::NOT_FOUND,
        DomainError::AddressResolutionFailed { .. } => StatusCode::BAD_GATEWAY,
        DomainError::LocationUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

// ─── GET /health ─────────────────────────────────────────────────

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ─── GET /api/lookup ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LookupQuery {
    pub domain: Option<String>,
}

pub async fn lookup(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LookupQuery>,
) -> Result<Json<DomainRecord>, ApiError> {
    let start = Instant::now();

    let input = params.domain.unwrap_or_default();
    if input.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Missing 'domain' parameter"));
    }

    // DNS and provider calls block; keep them off the async workers.
    let query = input.clone();
    let result = tokio::task::spawn_blocking(move || state.validator.validate_domain(&query))
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("lookup task failed: {}", e)))?;

    let record = result?;

    info!(
        "GET /api/lookup?domain={} -> {} ({:.1}ms)",
        input,
        record.resolved_address,
        start.elapsed().as_secs_f64() * 1000.0,
    );

    Ok(Json(record))
}
