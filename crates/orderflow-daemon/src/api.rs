// SPDX-License-Identifier: MIT OR Apache-2.0
//! Operator HTTP API: health, queue stats, and worker stats endpoints.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;

use crate::queue::TenantJobQueue;
use crate::worker::WorkerPoolStats;

/// Shared state handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    /// The bounded per-tenant extraction queue workers drain.
    pub queue: Arc<TenantJobQueue>,
    /// Live worker slot state.
    pub worker_stats: Arc<WorkerPoolStats>,
    /// Configured worker count, reported on `/health`.
    pub worker_count: usize,
}

/// Structured API error, returned as a JSON body with a matching status.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    code: String,
    message: String,
}

impl ApiError {
    /// Construct an error with the given status, stable code, and message.
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self { status, code: code.into(), message: message.into() }
    }

    /// 500 — unexpected internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(json!({ "code": self.code, "message": self.message }))).into_response()
    }
}

/// Build the Axum router with all operator routes.
pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/queue/stats", get(queue_stats))
        .route("/workers/stats", get(worker_stats))
        .with_state(state)
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "time": Utc::now().to_rfc3339(),
        "worker_count": state.worker_count,
        "queued_jobs": state.queue.len(),
    }))
}

async fn queue_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.queue.stats())
}

async fn worker_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.worker_stats.snapshot())
}
