// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process memory arena backing `memory_region` resources.
//!
//! The original implementation's `memory_region` kind addresses a byte
//! range directly in the requesting process's virtual address space
//! (typically a `mmap`'d or `shmget`'d segment shared with the daemon).
//! This workspace forbids `unsafe_code`, so dereferencing an arbitrary
//! client-supplied address is not an option here. Instead, `address` is
//! treated as an opaque handle into a daemon-owned arena: a caller first
//! obtains a handle (and a backing buffer) from [`MemoryArena::alloc`],
//! then references it by that handle in a `memory_region` resource
//! descriptor. This is a deliberate, safe redesign of that resource kind,
//! recorded in DESIGN.md.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum MemoryArenaError {
    #[error("no such memory region")]
    NoSuchRegion,
    #[error("region size mismatch: region holds {actual} bytes, request named {requested}")]
    SizeMismatch { requested: u64, actual: u64 },
}

#[derive(Default)]
pub struct MemoryArena {
    slots: RwLock<HashMap<u64, Vec<u8>>>,
    next_handle: AtomicU64,
}

impl MemoryArena {
    pub fn new() -> Self {
        Self { slots: RwLock::new(HashMap::new()), next_handle: AtomicU64::new(1) }
    }

    /// Registers `bytes` under a freshly allocated handle and returns it.
    pub fn alloc(&self, bytes: Vec<u8>) -> u64 {
        let handle = self.next_handle.fetch_add(1, Ordering::SeqCst);
        self.slots.write().insert(handle, bytes);
        handle
    }

    /// Reads a copy of the region named by `address`, checking that `size`
    /// matches what was registered (a `memory_region` descriptor carries
    /// both fields independently, spec.md §3).
    pub fn read(&self, address: u64, size: u64) -> Result<Vec<u8>, MemoryArenaError> {
        let slots = self.slots.read();
        let region = slots.get(&address).ok_or(MemoryArenaError::NoSuchRegion)?;
        if region.len() as u64 != size {
            return Err(MemoryArenaError::SizeMismatch { requested: size, actual: region.len() as u64 });
        }
        Ok(region.clone())
    }

    /// Writes `bytes` into a region, allocating one at `address` if none
    /// exists yet (used when a remote pull or an `accept_transfer` needs
    /// to materialise incoming bytes into memory rather than onto disk).
    pub fn write(&self, address: u64, bytes: Vec<u8>) {
        self.slots.write().insert(address, bytes);
    }

    pub fn free(&self, address: u64) -> bool {
        self.slots.write().remove(&address).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
