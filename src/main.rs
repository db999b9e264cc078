// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod cli;
mod config;
mod http;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::{TcpListener, UnixListener};
use tracing::info;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use tailon_core::{Catalog, SessionContext};

use cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let filespecs: Vec<tailon_core::FileSpec> = cli
        .filespecs
        .iter()
        .map(|spec| tailon_core::parse_filespec(spec))
        .collect();

    let config = config::load(
        cli.config.as_deref(),
        &cli.bind,
        &cli.relative_root,
        cli.allow_download,
        filespecs,
    )?;

    let catalog = Catalog::new(config.commands.clone(), config.allow_commands.clone());
    let allow_list = tailon_core::AllowList::new();

    // Populate the allow-list once at startup so the download endpoint and
    // a command frame sent before the client's first "list" request both
    // see a consistent snapshot rather than an empty one.
    tailon_core::resolve_listing(&config.filespecs, &allow_list);

    let session_ctx = SessionContext {
        specs: Arc::new(config.filespecs.clone()),
        catalog: Arc::new(catalog),
        allow_list,
    };

    let state = http::AppState::new(&config, session_ctx);
    let vfs_dir = std::env::current_dir()
        .context("resolving working directory for static assets")?
        .join("vfs");
    let router = http::router(state, &vfs_dir);

    info!(title = %config.title, bind = ?config.listen_addr, "starting tailon");

    serve(router, &config.listen_addr).await
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();
}

/// Bind every configured address concurrently. A `unix:` prefix selects a
/// Unix domain socket; anything else is a TCP `host:port`.
async fn serve(router: axum::Router, addrs: &[String]) -> anyhow::Result<()> {
    let mut tasks = Vec::new();

    for addr in addrs {
        let router = router.clone();
        let addr = addr.clone();

        if let Some(path) = addr.strip_prefix("unix:") {
            let path = path.to_string();
            let _ = std::fs::remove_file(&path);
            let listener = UnixListener::bind(&path)
                .with_context(|| format!("binding unix socket {path}"))?;
            info!(%path, "listening on unix socket");
            tasks.push(tokio::spawn(async move {
                axum::serve(listener, router)
                    .await
                    .context("unix socket server exited")
            }));
        } else {
            let listener = TcpListener::bind(&addr)
                .await
                .with_context(|| format!("binding {addr}"))?;
            info!(%addr, "listening");
            tasks.push(tokio::spawn(async move {
                axum::serve(listener, router)
                    .await
                    .context("tcp server exited")
            }));
        }
    }

    for task in tasks {
        task.await.context("server task panicked")??;
    }

    Ok(())
}
