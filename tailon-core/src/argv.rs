// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Argv template expansion.
//!
//! Grounded in `examples/original_source/server.go`'s `expandCommandArgs`:
//! a flat token-for-token substitution, never a shell re-quote. The template
//! is the canonical argument vector handed to `Command::args` directly.

use crate::frame::FrontendCommand;

/// Expand `template` against `cmd`, producing the literal argv for
/// `tokio::process::Command`.
///
/// `$path` is passed through verbatim; callers must have already checked
/// `cmd.entry.path` against the allow-list, since this function performs no
/// validation of its own.
pub fn expand(template: &[String], cmd: &FrontendCommand) -> Vec<String> {
    template
        .iter()
        .map(|token| match token.as_str() {
            "$lines" => cmd.nlines.to_string(),
            "$path" => cmd.entry.path.clone(),
            "$script" => cmd.script.clone(),
            other => other.to_string(),
        })
        .collect()
}
