// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Core of tailon: file-spec parsing, listing resolution, the command
//! catalog, argv expansion, the session supervisor and its pipeline runner.
//!
//! Deliberately has no HTTP or WebSocket dependency — the transport (the
//! `tailon` binary crate) depends on this crate, not the other way around.

pub mod allowlist;
pub mod argv;
pub mod catalog;
pub mod error;
pub mod filespec;
pub mod frame;
pub mod listing;
pub mod pipeline;
pub mod session;

pub use allowlist::AllowList;
pub use catalog::{Catalog, CommandSpec};
pub use error::{Error, Result};
pub use filespec::{parse_filespec, FileSpec, Kind};
pub use frame::{FrontendCommand, Inbound, OutboundLine};
pub use listing::{resolve as resolve_listing, ListEntry, Listing};
pub use pipeline::Pipeline;
pub use session::{Session, SessionContext};
