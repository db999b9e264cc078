// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! The process-wide allow-list: the only paths tailon will spawn a process
//! against, pipe into a tool as `$path`, or serve via the download endpoint.
//!
//! Modeled on the `Arc<RwLock<_>>` shared-state pattern `sven-node` uses for
//! its peer allowlist (`p2p/auth.rs`) and token store: a plain value behind a
//! lock, replaced wholesale rather than mutated incrementally, so readers
//! always see one complete snapshot.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

/// Cheap-to-clone handle to the shared allow-list.
///
/// Every session holds a clone; the listing resolver holds the writer side.
/// Replacement is atomic: a reader never observes a half-written set.
#[derive(Clone, Default)]
pub struct AllowList {
    inner: Arc<RwLock<HashSet<String>>>,
}

impl AllowList {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `path` was present in the allow-list at the moment of the call.
    pub fn contains(&self, path: &str) -> bool {
        self.inner
            .read()
            .expect("allow-list lock poisoned")
            .contains(path)
    }

    /// Replace the entire set atomically. Readers in flight keep seeing the
    /// prior snapshot until this call returns; no reader ever sees a partial
    /// update.
    pub fn replace(&self, paths: HashSet<String>) {
        *self.inner.write().expect("allow-list lock poisoned") = paths;
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }
}
