// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource kinds and descriptors.
//!
//! A [`ResourceDescriptor`] is what a client supplies in a request: the
//! kind of thing being read or written, plus enough addressing information
//! to locate it. A [`Resource`] is what the daemon builds internally once a
//! descriptor has been validated against a registered [`crate::backend::Backend`]
//! (original source: `norns_resources.h`'s `norns_resource_t` union, here
//! expressed as a closed Rust enum instead of a C union-plus-flags).

use crate::id::NamespaceId;
use serde::{Deserialize, Serialize};

/// The six resource kinds spec.md §3 defines. Field-less so it can serve as
/// a `HashMap` key for the transferor matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    MemoryRegion,
    LocalPosixPath,
    SharedPosixPath,
    RemotePosixPath,
    RemoteResource,
    Ignorable,
}

impl ResourceKind {
    pub const fn is_remote(self) -> bool {
        matches!(self, ResourceKind::RemotePosixPath | ResourceKind::RemoteResource)
    }
}

crate::simple_display! {
    ResourceKind {
        MemoryRegion => "memory_region",
        LocalPosixPath => "local_posix_path",
        SharedPosixPath => "shared_posix_path",
        RemotePosixPath => "remote_posix_path",
        RemoteResource => "remote_resource",
        Ignorable => "ignorable",
    }
}

/// A resource as supplied by a client: enough information to locate it
/// without yet having resolved it against a registered backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceDescriptor {
    MemoryRegion { address: u64, size: u64 },
    LocalPosixPath { nsid: NamespaceId, path: String },
    SharedPosixPath { nsid: NamespaceId, path: String },
    RemotePosixPath { nsid: NamespaceId, host: String, path: String },
    RemoteResource { nsid: NamespaceId, host: String, path: String },
    Ignorable,
}

impl ResourceDescriptor {
    pub const fn kind(&self) -> ResourceKind {
        match self {
            ResourceDescriptor::MemoryRegion { .. } => ResourceKind::MemoryRegion,
            ResourceDescriptor::LocalPosixPath { .. } => ResourceKind::LocalPosixPath,
            ResourceDescriptor::SharedPosixPath { .. } => ResourceKind::SharedPosixPath,
            ResourceDescriptor::RemotePosixPath { .. } => ResourceKind::RemotePosixPath,
            ResourceDescriptor::RemoteResource { .. } => ResourceKind::RemoteResource,
            ResourceDescriptor::Ignorable => ResourceKind::Ignorable,
        }
    }

    /// The namespace this descriptor is addressed under, if any.
    /// `MemoryRegion` and `Ignorable` have no namespace.
    pub fn nsid(&self) -> Option<&NamespaceId> {
        match self {
            ResourceDescriptor::LocalPosixPath { nsid, .. }
            | ResourceDescriptor::SharedPosixPath { nsid, .. }
            | ResourceDescriptor::RemotePosixPath { nsid, .. }
            | ResourceDescriptor::RemoteResource { nsid, .. } => Some(nsid),
            ResourceDescriptor::MemoryRegion { .. } | ResourceDescriptor::Ignorable => None,
        }
    }

    /// The hostname this descriptor targets, if it is a remote one.
    pub fn host(&self) -> Option<&str> {
        match self {
            ResourceDescriptor::RemotePosixPath { host, .. }
            | ResourceDescriptor::RemoteResource { host, .. } => Some(host),
            _ => None,
        }
    }
}

/// A descriptor bound to the backend instance that will service it. Built
/// by the daemon once a [`ResourceDescriptor`] has been resolved against
/// the namespace/backend registry; never serialized over the wire.
#[derive(Debug, Clone)]
pub struct Resource {
    pub descriptor: ResourceDescriptor,
    pub backend_nsid: Option<NamespaceId>,
}

impl Resource {
    pub fn new(descriptor: ResourceDescriptor) -> Self {
        let backend_nsid = descriptor.nsid().cloned();
        Self { descriptor, backend_nsid }
    }

    pub const fn kind(&self) -> ResourceKind {
        self.descriptor.kind()
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
