//! Defines routes for the file front-end.
//!
//! ## Structure
//! - **Files**
//!   - `POST /upload`          — multipart upload (field `file`)
//!   - `GET  /files/db`        — list registered files
//!   - `GET  /file/{key}/url`  — presigned download link as `{ "url": ... }`
//!   - `GET  /file/{key}`      — 302 redirect to a presigned download link
//!
//! - **Health**
//!   - `GET /healthz`, `GET /readyz`
//!
//! Keys containing `/` must be sent percent-encoded (`%2F`).

use crate::{
    handlers::{
        file_handlers::{file_redirect, file_url, list_files, upload_file},
        health_handlers::{healthz, readyz},
    },
    services::storage_service::StorageService,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Build and return the router for all file routes.
///
/// The router carries shared state (`StorageService`) to all handlers.
pub fn routes() -> Router<StorageService> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/upload", post(upload_file))
        .route("/files/db", get(list_files))
        .route("/file/{key}/url", get(file_url))
        .route("/file/{key}", get(file_redirect))
}

/// Full application: routes plus upload limit, request timeout and tracing.
pub fn app(service: StorageService, max_upload_bytes: usize, request_timeout: Duration) -> Router {
    routes()
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
