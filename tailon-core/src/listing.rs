// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Listing resolution — turns the operator's [`FileSpec`]s into the
//! group -> entries map the frontend renders, and rebuilds the [`AllowList`]
//! as a side effect of every resolution.
//!
//! Grounded in `examples/original_source/filelister.go`'s `createListing` and
//! `fileInfo`: glob specs expand via the shell-style glob package, `dir` specs
//! walk the tree recursively, and every concrete path found along the way is
//! folded into the allow-list snapshot replacing the previous one.

use std::collections::HashMap;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::allowlist::AllowList;
use crate::filespec::{FileSpec, Kind};

const DEFAULT_GROUP: &str = "__default__";

/// One resolved, browsable file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListEntry {
    pub path: String,
    pub alias: String,
    /// False when the path was declared but does not (or no longer) exist on
    /// disk; surfaced so the frontend can grey it out rather than silently
    /// drop it.
    pub exists: bool,
    pub size: u64,
    /// Unix seconds, 0 when unknown (entry does not exist).
    pub mtime: u64,
}

/// group name -> entries, in declaration order within each group.
pub type Listing = HashMap<String, Vec<ListEntry>>;

/// Resolve every configured [`FileSpec`] into a [`Listing`], and atomically
/// replace `allow_list` with the full set of concrete paths discovered.
///
/// The allow-list replacement is total, not additive: a file removed from the
/// operator's config (or a glob match that disappeared) drops out of the
/// allow-list on the very next resolution, per the allow-list invariant.
pub fn resolve(specs: &[FileSpec], allow_list: &AllowList) -> Listing {
    let mut listing: Listing = HashMap::new();
    let mut allowed: HashSet<String> = HashSet::new();

    for spec in specs {
        let group = if spec.group.is_empty() {
            DEFAULT_GROUP.to_string()
        } else {
            spec.group.clone()
        };
        let entries = listing.entry(group).or_default();

        match spec.kind {
            Kind::File => {
                let alias = if spec.alias.is_empty() {
                    spec.path.clone()
                } else {
                    spec.alias.clone()
                };
                let entry = file_info(&spec.path, alias);
                allowed.insert(entry.path.clone());
                entries.push(entry);
            }
            Kind::Glob => {
                let matches = glob::glob(&spec.path)
                    .into_iter()
                    .flatten()
                    .filter_map(|m| m.ok());
                for path in matches {
                    let alias = glob_alias(&spec.alias, &path);
                    let entry = file_info(&path.to_string_lossy(), alias);
                    allowed.insert(entry.path.clone());
                    entries.push(entry);
                }
            }
            Kind::Dir => {
                for found in walkdir::WalkDir::new(&spec.path)
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file())
                {
                    let path = found.path();
                    let alias = dir_alias(&spec.alias, &spec.path, path);
                    let entry = file_info(&path.to_string_lossy(), alias);
                    allowed.insert(entry.path.clone());
                    entries.push(entry);
                }
            }
        }
    }

    allow_list.replace(allowed);
    listing
}

/// Stat a path, matching the Go original's "missing is not an error" stance:
/// a listed file that has disappeared stays in the listing with
/// `exists: false` rather than being dropped.
fn file_info(path: &str, alias: String) -> ListEntry {
    let meta = std::fs::metadata(path);
    let (exists, size, mtime) = match &meta {
        Ok(m) => (true, m.len(), unix_seconds(m.modified())),
        Err(_) => (false, 0, 0),
    };
    ListEntry {
        path: path.to_string(),
        alias,
        exists,
        size,
        mtime,
    }
}

fn unix_seconds(modified: std::io::Result<SystemTime>) -> u64 {
    modified
        .ok()
        .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// A glob match gets `alias/basename` when the spec declared an alias,
/// otherwise its path relative to the current working directory, mirroring
/// `path.Join(alias, basename)` / `relative(cwd, match)` in the original.
fn glob_alias(alias: &str, matched: &Path) -> String {
    if alias.is_empty() {
        return relative_to_cwd(matched);
    }
    let basename = matched
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    format!("{alias}/{basename}")
}

/// `matched` relative to the current working directory when it is rooted
/// under it; otherwise (already relative, or cwd unavailable) returned as
/// is.
fn relative_to_cwd(matched: &Path) -> String {
    match std::env::current_dir() {
        Ok(cwd) => matched
            .strip_prefix(&cwd)
            .unwrap_or(matched)
            .to_string_lossy()
            .to_string(),
        Err(_) => matched.to_string_lossy().to_string(),
    }
}

/// A `dir` spec aliases each file to its path relative to the declared root,
/// optionally rooted under the spec's alias.
fn dir_alias(alias: &str, root: &str, found: &Path) -> String {
    let rel = found
        .strip_prefix(root)
        .unwrap_or(found)
        .to_string_lossy()
        .to_string();
    if alias.is_empty() {
        rel
    } else {
        format!("{alias}/{rel}")
    }
}
