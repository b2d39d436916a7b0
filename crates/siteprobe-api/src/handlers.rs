//! REST API handlers.
//!
//! Each handler calls into the shared `Exporter`, which persists and
//! rebuilds the collector on successful mutations. Request bodies are
//! parsed as JSON regardless of the declared content type.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use siteprobe_core::{RegistryError, Target};
use siteprobe_metrics::{prometheus, render_prometheus, ExporterError};

use crate::ApiState;

/// Response wrapper for consistent API format.
#[derive(serde::Serialize)]
struct ApiResponse<T: serde::Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

fn error_response(msg: &str, status: StatusCode) -> Response {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
        .into_response()
}

fn exporter_error(err: ExporterError) -> Response {
    let status = match &err {
        ExporterError::Registry(RegistryError::NotFound(_)) => StatusCode::NOT_FOUND,
        ExporterError::Registry(RegistryError::Conflict(_)) => StatusCode::CONFLICT,
        ExporterError::Registry(RegistryError::Invalid(_)) => StatusCode::BAD_REQUEST,
        ExporterError::Persist(_) | ExporterError::Load(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(&err.to_string(), status)
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, Response> {
    serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, "rejected request body");
        error_response(&format!("invalid request body: {e}"), StatusCode::BAD_REQUEST)
    })
}

fn no_content(result: Result<(), ExporterError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => exporter_error(e),
    }
}

/// Optional `?name=` selector.
#[derive(Debug, Default, Deserialize)]
pub struct NameQuery {
    pub name: Option<String>,
}

/// Body of a delete request; extra fields such as `address` are ignored.
#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub name: String,
}

/// Body of a path-addressed update.
#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub address: String,
}

// ── Targets ────────────────────────────────────────────────────

/// GET /api/site
pub async fn list_sites(
    State(state): State<ApiState>,
    Query(query): Query<NameQuery>,
) -> Response {
    match query.name {
        Some(name) => find_site(&state, &name).await,
        None => ApiResponse::ok(state.exporter.list().await).into_response(),
    }
}

/// GET /api/site/:name
pub async fn get_site(State(state): State<ApiState>, Path(name): Path<String>) -> Response {
    find_site(&state, &name).await
}

async fn find_site(state: &ApiState, name: &str) -> Response {
    match state.exporter.find(name).await {
        Ok(target) => ApiResponse::ok(target).into_response(),
        Err(e) => exporter_error(e),
    }
}

/// POST /api/site
pub async fn add_site(State(state): State<ApiState>, body: Bytes) -> Response {
    let target: Target = match parse_body(&body) {
        Ok(target) => target,
        Err(resp) => return resp,
    };
    no_content(state.exporter.add(target).await)
}

/// PUT /api/site
pub async fn update_site(State(state): State<ApiState>, body: Bytes) -> Response {
    let target: Target = match parse_body(&body) {
        Ok(target) => target,
        Err(resp) => return resp,
    };
    no_content(state.exporter.update(&target.name, &target.address).await)
}

/// PUT /api/site/:name
pub async fn update_site_by_name(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Response {
    let req: UpdateRequest = match parse_body(&body) {
        Ok(req) => req,
        Err(resp) => return resp,
    };
    no_content(state.exporter.update(&name, &req.address).await)
}

/// DELETE /api/site
pub async fn delete_site(
    State(state): State<ApiState>,
    Query(query): Query<NameQuery>,
    body: Bytes,
) -> Response {
    let name = match query.name {
        Some(name) => name,
        None if body.is_empty() => {
            return error_response("target name required", StatusCode::BAD_REQUEST);
        }
        None => match parse_body::<DeleteRequest>(&body) {
            Ok(req) => req.name,
            Err(resp) => return resp,
        },
    };
    no_content(state.exporter.remove(&name).await)
}

/// DELETE /api/site/:name
pub async fn delete_site_by_name(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> Response {
    no_content(state.exporter.remove(&name).await)
}

/// Any other method on a target route.
pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(serde_json::json!({ "message": "Method not supported" })),
    )
        .into_response()
}

// ── Prometheus ─────────────────────────────────────────────────

/// GET /metrics
pub async fn prometheus_metrics(State(state): State<ApiState>) -> Response {
    let samples = state.exporter.scrape().await;
    let failed = samples
        .iter()
        .filter(|s| s.labels.status_code == siteprobe_metrics::collector::UNREACHABLE_STATUS)
        .count();
    if failed > 0 {
        warn!(failed, total = samples.len(), "scrape finished with unreachable targets");
    }

    let body = render_prometheus(&samples);
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, prometheus::CONTENT_TYPE)],
        body,
    )
        .into_response()
}
