// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! HTTP/WebSocket transport — component I. Everything in this module is
//! ambient machinery the core library has no opinion about; `tailon-core`
//! never imports from here.

mod download;
mod ws;

use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;
use tower::Layer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;

use tailon_core::SessionContext;

use crate::config::Config;

/// Shared application state handed to every route.
#[derive(Clone)]
pub struct AppState {
    pub session_ctx: SessionContext,
    pub title: String,
    pub allow_download: bool,
}

impl AppState {
    pub fn new(config: &Config, session_ctx: SessionContext) -> Self {
        Self {
            session_ctx,
            title: config.title.clone(),
            allow_download: config.allow_download,
        }
    }
}

/// Build the router. `vfs_dir` is where static frontend assets (if any) are
/// served from; it need not exist for the server to still be useful over
/// the WebSocket endpoint.
pub fn router(state: AppState, vfs_dir: &std::path::Path) -> Router {
    let no_cache = SetResponseHeaderLayer::overriding(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate, max-age=0"),
    );
    let vfs_service = ServeDir::new(vfs_dir).fallback(tower_http::services::ServeFile::new(
        vfs_dir.join("index.html"),
    ));

    Router::new()
        .route("/", get(index))
        .route("/ws", get(ws::handler))
        .route("/files", get(download::handler))
        .nest_service("/vfs", no_cache.layer(vfs_service))
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> impl IntoResponse {
    let commands = state
        .session_ctx
        .catalog
        .names_allowed_by_operator()
        .join(", ");
    let body = format!(
        "<!doctype html><html><head><title>{title}</title></head><body>\
         <h1>{title}</h1><p>Commands: {commands}</p>\
         <p>Connect to <code>/ws</code> for the live frame stream.</p></body></html>",
        title = html_escape(&state.title),
        commands = html_escape(&commands),
    );
    (StatusCode::OK, Html(body))
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
