// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use thiserror::Error;

/// Errors surfaced by `tailon-core` to its caller.
///
/// Most failure modes described in the spec (unknown command, path not in
/// the allow-list, malformed frame) are intentionally *not* represented here
/// — they are handled by logging and dropping the offending frame, per the
/// error-handling policy, and never propagate as a hard error.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
