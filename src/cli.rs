// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Command-line surface, mirroring `examples/original_source/main.go`'s flag
//! set: one or more bind addresses, a relative root for `$path` display, a
//! download toggle, an optional config file, and positional filespecs.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "tailon", about = "Tail, grep, sed and awk over files on the host, streamed live to a browser")]
pub struct Cli {
    /// Address to bind the HTTP/WebSocket server to. Repeatable. Either
    /// `host:port` or `unix:/path/to.sock`. Defaults to `0.0.0.0:8080` when
    /// neither this flag nor `listen-addr` in the config file is given.
    #[arg(long, short = 'b')]
    pub bind: Vec<String>,

    /// Root used to make displayed paths relative; purely cosmetic.
    #[arg(long, short = 'r', default_value = "")]
    pub relative_root: String,

    /// Allow the `GET /files` download endpoint. Off by default.
    #[arg(long, short = 'a')]
    pub allow_download: bool,

    /// Path to a TOML config file. Optional — built-in defaults apply when
    /// absent.
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Filespecs of the form `[alias=A,group=G,]PATH`, PATH optionally
    /// containing glob metacharacters.
    #[arg(required = true)]
    pub filespecs: Vec<String>,
}
