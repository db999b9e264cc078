// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! WebSocket endpoint — bridges a socket's text frames to one [`Session`].
//!
//! Shaped after `sven-node/src/http/ws.rs`'s `ws_handler`/`handle_socket`:
//! a `tokio::select!` between the socket's inbound half and an outbound
//! channel, ping/pong and close handled explicitly. Simplified because
//! tailon has no multi-session control protocol above the socket — the
//! connection itself is the session, so there is no broadcast channel or
//! session-id routing, just one `Session` owned for the socket's lifetime.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info};

use tailon_core::Session;

use super::AppState;

pub async fn handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(256);

    let mut session = Session::new(state.session_ctx.clone(), outbound_tx);

    loop {
        tokio::select! {
            inbound = stream.next() => {
                match inbound {
                    Some(Ok(Message::Text(raw))) => {
                        session.handle_frame(&raw).await;
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Binary(_))) => {
                        debug!("ignoring unexpected binary frame");
                    }
                    Some(Err(err)) => {
                        debug!(%err, "websocket read error");
                        break;
                    }
                }
            }
            outbound = outbound_rx.recv() => {
                match outbound {
                    Some(text) => {
                        if sink.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }

    session.close().await;
    info!("session closed");
}
