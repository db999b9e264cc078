// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! File-spec parsing — turns one CLI positional argument into a [`FileSpec`].
//!
//! Grounded in `examples/original_source/main.go`'s `parseFileSpec`: the last
//! comma-separated segment is the path, everything before it is `key=value`
//! (or a bare `file`/`dir`/`glob` token). Kept deliberately lenient — the Go
//! original never returns a parse error, and callers rely on that.

use std::path::Path;

/// What kind of filesystem object a [`FileSpec`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    File,
    Glob,
    Dir,
}

/// User-declared intent: one entry the operator listed on the command line
/// or in the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSpec {
    pub path: String,
    pub kind: Kind,
    pub alias: String,
    pub group: String,
}

const GLOB_META: &[char] = &['*', '?', '[', ']'];

/// Parse one textual filespec of the form `[k1=v1,k2=v2,...,]<path>`.
///
/// Never fails — malformed tokens are silently ignored, matching the
/// original's infallible behavior (see `SPEC_FULL.md` §9, Open Questions).
/// The signature intentionally does not return `Result`: there is currently
/// no way to construct one, and threading an uninhabited error type through
/// every caller would be pure ceremony.
pub fn parse_filespec(spec: &str) -> FileSpec {
    let parts: Vec<&str> = spec.split(',').collect();

    if parts.len() == 1 {
        let path = spec.to_string();
        let kind = derive_kind(&path);
        return FileSpec {
            path,
            kind,
            alias: String::new(),
            group: String::new(),
        };
    }

    let (path, tokens) = parts.split_last().expect("split_last on non-empty Vec");
    let path = path.to_string();

    let mut alias = String::new();
    let mut group = String::new();
    let mut kind: Option<Kind> = None;

    for token in tokens {
        if let Some(value) = token.strip_prefix("group=") {
            group = unquote(value);
        } else if let Some(value) = token.strip_prefix("alias=") {
            alias = unquote(value);
        } else {
            kind = match *token {
                "file" => Some(Kind::File),
                "dir" => Some(Kind::Dir),
                "glob" => Some(Kind::Glob),
                _ => kind,
            };
        }
    }

    let kind = kind.unwrap_or_else(|| derive_kind(&path));

    FileSpec {
        path,
        kind,
        alias,
        group,
    }
}

fn unquote(s: &str) -> String {
    s.trim_matches(|c: char| c == '\'' || c == '"' || c == ' ')
        .to_string()
}

/// Derive `kind` when no explicit token was given: glob metacharacters in
/// the path win outright; otherwise stat the path (a directory is `dir`,
/// anything else — including a non-existent path — is `file`).
fn derive_kind(path: &str) -> Kind {
    if path.contains(GLOB_META) {
        return Kind::Glob;
    }
    if Path::new(path).is_dir() {
        return Kind::Dir;
    }
    Kind::File
}
