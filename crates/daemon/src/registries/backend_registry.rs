// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The backend (namespace) registry.
//!
//! Resolves a [`ResourceDescriptor`]'s namespace-id against registered
//! backends. Per DESIGN.md's resolution of spec.md §9's open question, an
//! unregistered nsid carried alongside a hostname is transparently bound
//! to a synthesised remote backend rather than rejected — this bypasses
//! namespace-level policy, as the spec's own design note acknowledges.

use norns_core::{BackendKind, BackendRecord, NamespaceId, Visibility};
use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum BackendRegistryError {
    #[error("namespace already exists")]
    NamespaceExists,
    #[error("no such namespace")]
    NoSuchNamespace,
    #[error("namespace is not empty")]
    NamespaceNotEmpty,
}

#[derive(Default)]
pub struct BackendRegistry {
    backends: RwLock<HashMap<NamespaceId, BackendRecord>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, record: BackendRecord) -> Result<(), BackendRegistryError> {
        let mut backends = self.backends.write();
        if backends.contains_key(&record.nsid) {
            return Err(BackendRegistryError::NamespaceExists);
        }
        backends.insert(record.nsid.clone(), record);
        Ok(())
    }

    pub fn update(
        &self,
        nsid: &NamespaceId,
        track_contents: Option<bool>,
        capacity_bytes: Option<Option<u64>>,
    ) -> Result<(), BackendRegistryError> {
        let mut backends = self.backends.write();
        let record = backends.get_mut(nsid).ok_or(BackendRegistryError::NoSuchNamespace)?;
        if let Some(tracked) = track_contents {
            record.track_contents = tracked;
        }
        if let Some(capacity) = capacity_bytes {
            record.capacity_bytes = capacity;
        }
        Ok(())
    }

    /// Unregisters a namespace. `has_pending_tasks` lets the caller report
    /// `namespace_not_empty` without this registry needing to know about
    /// tasks (lock order keeps the task manager out of the backend lock).
    pub fn unregister(&self, nsid: &NamespaceId, has_pending_tasks: bool) -> Result<(), BackendRegistryError> {
        if has_pending_tasks {
            return Err(BackendRegistryError::NamespaceNotEmpty);
        }
        let mut backends = self.backends.write();
        backends.remove(nsid).ok_or(BackendRegistryError::NoSuchNamespace)?;
        Ok(())
    }

    pub fn get(&self, nsid: &NamespaceId) -> Option<BackendRecord> {
        self.backends.read().get(nsid).cloned()
    }

    pub fn exists(&self, nsid: &NamespaceId) -> bool {
        self.backends.read().contains_key(nsid)
    }

    pub fn len(&self) -> usize {
        self.backends.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolves a namespace-id against the registry, synthesising a
    /// transient remote backend when `host` is present and the nsid is
    /// otherwise unregistered (spec.md §4.3 "unresolved nsids with a
    /// hostname field are transparently bound to a synthesised
    /// remote-backend handle").
    pub fn resolve(&self, nsid: &NamespaceId, host: Option<&str>) -> Result<BackendRecord, BackendRegistryError> {
        if let Some(record) = self.get(nsid) {
            return Ok(record);
        }
        if let Some(host) = host {
            return Ok(synthesize_remote_backend(nsid, host));
        }
        Err(BackendRegistryError::NoSuchNamespace)
    }
}

fn synthesize_remote_backend(nsid: &NamespaceId, host: &str) -> BackendRecord {
    BackendRecord::new(nsid.clone(), BackendKind::PosixPath, format!("remote://{host}"))
        .visibility(Visibility::Global)
}

#[cfg(test)]
#[path = "backend_registry_tests.rs"]
mod tests;
