// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Session supervisor — one instance per client connection, holding at most
//! one live [`Pipeline`] and consuming inbound frames strictly in arrival
//! order.
//!
//! Simplified from `sven-node/src/control/service.rs`'s `ControlService`:
//! that type multiplexes many concurrent agent sessions behind one actor
//! loop keyed by `Uuid`. Tailon has no such multiplexing need — the
//! WebSocket connection *is* the session — so there is no `HashMap<Uuid,_>`
//! and no command channel; the HTTP layer (component I) drives
//! [`Session::handle_frame`] directly off the socket's read half.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::allowlist::AllowList;
use crate::argv;
use crate::catalog::Catalog;
use crate::filespec::FileSpec;
use crate::frame::{self, FrontendCommand, Inbound, OutboundLine};
use crate::listing;
use crate::pipeline::Pipeline;

/// Process-wide, read-mostly state shared by every session: the configured
/// file specs, the command catalog, and the allow-list handle. Cheap to
/// clone — everything behind it is an `Arc` or an `Arc<RwLock<_>>`.
#[derive(Clone)]
pub struct SessionContext {
    pub specs: Arc<Vec<FileSpec>>,
    pub catalog: Arc<Catalog>,
    pub allow_list: AllowList,
}

/// One client session's state machine: Idle (no pipeline) or Running (one
/// live pipeline). There is no explicit enum for the two states; `pipeline`
/// being `None` or `Some` *is* the state.
pub struct Session {
    ctx: SessionContext,
    outbound_tx: mpsc::Sender<String>,
    pipeline: Option<Pipeline>,
    forwarder: Option<JoinHandle<()>>,
}

impl Session {
    pub fn new(ctx: SessionContext, outbound_tx: mpsc::Sender<String>) -> Self {
        Self {
            ctx,
            outbound_tx,
            pipeline: None,
            forwarder: None,
        }
    }

    /// Handle one inbound text frame to completion. Callers must serialize
    /// calls (await each one fully before the next) — that serialization,
    /// not anything inside this function, is what keeps a new-pipeline frame
    /// from being processed mid-teardown.
    pub async fn handle_frame(&mut self, raw: &str) {
        match frame::classify(raw) {
            Inbound::List => self.send_listing().await,
            Inbound::Command(cmd) => self.handle_command(cmd).await,
            Inbound::Ignored => {}
        }
    }

    async fn send_listing(&self) {
        let listing = listing::resolve(&self.ctx.specs, &self.ctx.allow_list);
        let _ = self
            .outbound_tx
            .send(frame::encode_listing(&listing))
            .await;
    }

    /// Validate, then on success tear the current pipeline down (if any)
    /// and construct the replacement. Any validation failure logs and
    /// returns without touching the existing pipeline.
    async fn handle_command(&mut self, cmd: FrontendCommand) {
        if !self.ctx.allow_list.contains(&cmd.entry.path) {
            warn!(path = %cmd.entry.path, "rejected command: path not in allow-list");
            return;
        }

        let Some(spec) = self.ctx.catalog.lookup(&cmd.command).cloned() else {
            warn!(command = %cmd.command, "rejected command: not in catalog");
            return;
        };

        let upstream_argv = if spec.stdin.is_empty() {
            None
        } else {
            match self.ctx.catalog.lookup(&spec.stdin) {
                Some(upstream) => Some(argv::expand(&upstream.action, &cmd)),
                None => {
                    warn!(upstream = %spec.stdin, "configured upstream missing from catalog");
                    return;
                }
            }
        };
        let downstream_argv = argv::expand(&spec.action, &cmd);

        self.teardown_pipeline().await;

        let (lines_tx, mut lines_rx) = mpsc::channel(256);
        match Pipeline::spawn(upstream_argv, downstream_argv, lines_tx).await {
            Ok(pipeline) => {
                let outbound = self.outbound_tx.clone();
                let forwarder = tokio::spawn(async move {
                    while let Some(line) = lines_rx.recv().await {
                        if outbound.send(frame::encode_line(&line)).await.is_err() {
                            break;
                        }
                    }
                });
                self.pipeline = Some(pipeline);
                self.forwarder = Some(forwarder);
            }
            Err(err) => {
                warn!(%err, "failed to spawn pipeline");
                let _ = self
                    .outbound_tx
                    .send(frame::encode_line(&OutboundLine::Stderr(err.to_string())))
                    .await;
            }
        }
    }

    /// Tear the live pipeline down, if any. Idempotent.
    async fn teardown_pipeline(&mut self) {
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }
        if let Some(pipeline) = self.pipeline.take() {
            pipeline.teardown().await;
        }
    }

    pub fn has_live_pipeline(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Session close: tear down and consume.
    pub async fn close(mut self) {
        self.teardown_pipeline().await;
    }
}
