// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Download gate — component G. Fails closed unless the operator enabled
//! downloads, then gates on the allow-list before serving bytes.
//!
//! Byte-serving itself (range requests, content-type by extension) is
//! delegated to `tower_http::services::ServeFile`, the same crate the
//! teacher already uses for static assets — there is no reason to hand-roll
//! range-request parsing when the ambient stack already has it.

use axum::extract::{Query, State};
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::warn;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    path: String,
}

pub async fn handler(
    State(state): State<AppState>,
    Query(params): Query<DownloadParams>,
    request: Request<axum::body::Body>,
) -> Response {
    if !state.allow_download {
        warn!("download endpoint hit while allow-download is disabled");
        return StatusCode::FORBIDDEN.into_response();
    }

    if !state.session_ctx.allow_list.contains(&params.path) {
        warn!(path = %params.path, "download rejected: path not in allow-list");
        return StatusCode::NOT_FOUND.into_response();
    }

    match ServeFile::new(&params.path).oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(err) => {
            warn!(%err, path = %params.path, "failed to serve file");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}
