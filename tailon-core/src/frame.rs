// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Boundary adapter — classifies inbound text frames and shapes outbound
//! ones.
//!
//! Grounded in `sven-node/src/http/ws.rs`'s enum-over-JSON framing, but the
//! inbound side here is not a tagged enum: the exact string `"list"` is a
//! listing request, anything starting with `{` is a candidate command frame,
//! everything else is ignored. That asymmetry comes straight from
//! `examples/original_source/server.go`'s `wsWriter`.

use serde::{Deserialize, Serialize};

use crate::listing::{Listing, ListEntry};

/// A decoded client request frame.
#[derive(Debug, Clone, Deserialize)]
pub struct FrontendCommand {
    pub command: String,
    #[serde(default)]
    pub script: String,
    pub entry: ListEntry,
    #[serde(default)]
    pub nlines: i64,
}

/// Result of classifying one inbound text frame.
pub enum Inbound {
    List,
    Command(FrontendCommand),
    Ignored,
}

/// Classify and, for command frames, decode one inbound text frame.
///
/// Matches `examples/original_source/server.go`: the literal string `"list"`
/// is handled specially before anything is parsed as JSON, so a malformed
/// object never shadows it.
pub fn classify(raw: &str) -> Inbound {
    if raw == "list" {
        return Inbound::List;
    }
    if raw.trim_start().starts_with('{') {
        return match serde_json::from_str::<FrontendCommand>(raw) {
            Ok(cmd) => Inbound::Command(cmd),
            Err(_) => Inbound::Ignored,
        };
    }
    Inbound::Ignored
}

/// One line emitted by the pipeline's stdout or stderr, framed as the
/// two-element array the frontend expects: `["o", line]` or `["e", line]`.
#[derive(Debug, Clone, Serialize)]
#[serde(into = "(String, String)")]
pub enum OutboundLine {
    Stdout(String),
    Stderr(String),
}

impl From<OutboundLine> for (String, String) {
    fn from(line: OutboundLine) -> Self {
        match line {
            OutboundLine::Stdout(s) => ("o".to_string(), s),
            OutboundLine::Stderr(s) => ("e".to_string(), s),
        }
    }
}

/// Serialize a listing as the outbound frame payload.
pub fn encode_listing(listing: &Listing) -> String {
    serde_json::to_string(listing).expect("Listing serializes infallibly")
}

pub fn encode_line(line: &OutboundLine) -> String {
    serde_json::to_string(line).expect("OutboundLine serializes infallibly")
}
