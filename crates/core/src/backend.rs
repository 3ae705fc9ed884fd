// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backend registration records.
//!
//! This module holds the *data* describing a registered storage backend —
//! the bits a `namespace register` request carries and a status query
//! returns. The I/O-performing `Backend` trait and its concrete
//! implementations (`PathBackend`, `MemoryBackend`, `RemoteBackend`) live in
//! `norns-daemon`, since this crate does no I/O.

use crate::id::NamespaceId;
use serde::{Deserialize, Serialize};

/// The storage technology a namespace is backed by. Distinct from
/// [`crate::resource::ResourceKind`]: a backend's kind describes *how it is
/// implemented*, a resource's kind describes *how a request addresses it*.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// A POSIX directory tree on local storage.
    PosixPath,
    /// A POSIX directory tree shared (e.g. NFS/Lustre) across hosts.
    SharedPosixPath,
    /// An in-process memory arena, used only for `memory_region` resources.
    Memory,
}

/// Whether a namespace is visible to every job or only to the job that
/// registered it (spec.md §6 `visibility` config field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Global,
    JobPrivate,
}

/// A registered backend: the namespace id clients address it by, the
/// technology behind it, its mount point, and an advisory capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendRecord {
    pub nsid: NamespaceId,
    pub kind: BackendKind,
    pub mountpoint: String,
    /// Advisory capacity in bytes; `None` means unbounded. Per DESIGN.md's
    /// resolution of spec.md's quota Open Question, this is stored and
    /// reported but never enforced at admission time.
    pub capacity_bytes: Option<u64>,
    pub track_contents: bool,
    pub visibility: Visibility,
}

impl BackendRecord {
    pub fn new(nsid: NamespaceId, kind: BackendKind, mountpoint: impl Into<String>) -> Self {
        Self {
            nsid,
            kind,
            mountpoint: mountpoint.into(),
            capacity_bytes: None,
            track_contents: false,
            visibility: Visibility::Global,
        }
    }

    crate::setters! {
        set { capacity_bytes: Option<u64> }
        set { track_contents: bool }
        set { visibility: Visibility }
    }
}

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;
