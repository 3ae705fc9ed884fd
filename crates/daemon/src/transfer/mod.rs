// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The transferor matrix: a `(source-kind, destination-kind) -> Transferor`
//! table populated at startup (spec.md §4.6), grounded directly on the
//! original implementation's `transferor_registry`
//! (`src/io/transferor-registry.hpp`'s `add`/`get` over a pair-hash keyed
//! map).

mod path_transferors;
mod transferor;

pub use path_transferors::{ChunkSize, MemoryToPath, PathToPath, PathToRemote, RemoteToPath, RemovePath};
pub use transferor::{TransferContext, Transferor};

use norns_core::ResourceKind;
use std::collections::HashMap;
use std::sync::Arc;

/// Indexed by `(source kind, destination kind)`. Pairs with no entry are
/// `not_supported` at submission time (spec.md §9).
#[derive(Default)]
pub struct TransferorMatrix {
    entries: HashMap<(ResourceKind, ResourceKind), Arc<dyn Transferor>>,
}

impl TransferorMatrix {
    pub fn builder() -> TransferorMatrixBuilder {
        TransferorMatrixBuilder { entries: HashMap::new() }
    }

    pub fn supports(&self, source: ResourceKind, destination: ResourceKind) -> bool {
        self.entries.contains_key(&(source, destination))
    }

    pub fn get(&self, source: ResourceKind, destination: ResourceKind) -> Option<Arc<dyn Transferor>> {
        self.entries.get(&(source, destination)).cloned()
    }

    /// Builds the matrix with every pair required by spec.md §4.6's table,
    /// using a shared chunk size for the streaming transferors.
    pub fn with_default_entries(chunk_size: ChunkSize) -> Self {
        Self::builder()
            .entry(ResourceKind::LocalPosixPath, ResourceKind::LocalPosixPath, Arc::new(PathToPath::new(chunk_size)))
            .entry(ResourceKind::LocalPosixPath, ResourceKind::SharedPosixPath, Arc::new(PathToPath::new(chunk_size)))
            .entry(ResourceKind::LocalPosixPath, ResourceKind::RemoteResource, Arc::new(PathToRemote::new(chunk_size)))
            .entry(ResourceKind::SharedPosixPath, ResourceKind::LocalPosixPath, Arc::new(PathToPath::new(chunk_size)))
            .entry(ResourceKind::SharedPosixPath, ResourceKind::SharedPosixPath, Arc::new(PathToPath::new(chunk_size)))
            .entry(ResourceKind::SharedPosixPath, ResourceKind::RemoteResource, Arc::new(PathToRemote::new(chunk_size)))
            .entry(ResourceKind::MemoryRegion, ResourceKind::LocalPosixPath, Arc::new(MemoryToPath::new(chunk_size)))
            .entry(ResourceKind::MemoryRegion, ResourceKind::SharedPosixPath, Arc::new(MemoryToPath::new(chunk_size)))
            .entry(ResourceKind::MemoryRegion, ResourceKind::RemoteResource, Arc::new(PathToRemote::new(chunk_size)))
            .entry(ResourceKind::RemoteResource, ResourceKind::LocalPosixPath, Arc::new(RemoteToPath::new(chunk_size)))
            .entry(ResourceKind::RemoteResource, ResourceKind::SharedPosixPath, Arc::new(RemoteToPath::new(chunk_size)))
            .entry(ResourceKind::LocalPosixPath, ResourceKind::Ignorable, Arc::new(RemovePath))
            .entry(ResourceKind::SharedPosixPath, ResourceKind::Ignorable, Arc::new(RemovePath))
            .build()
    }
}

pub struct TransferorMatrixBuilder {
    entries: HashMap<(ResourceKind, ResourceKind), Arc<dyn Transferor>>,
}

impl TransferorMatrixBuilder {
    pub fn entry(mut self, source: ResourceKind, destination: ResourceKind, transferor: Arc<dyn Transferor>) -> Self {
        self.entries.insert((source, destination), transferor);
        self
    }

    pub fn build(self) -> TransferorMatrix {
        TransferorMatrix { entries: self.entries }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
