// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Transferor` trait (spec.md §4.6): the strategy object executing
//! one `(source-kind, destination-kind)` pair. Replaces the original
//! implementation's virtual transferor hierarchy with a trait object plus
//! the keyed table in `super::TransferorMatrix` (spec.md §9).

use crate::backend::BackendIoError;
use crate::memory::MemoryArena;
use crate::registries::BackendRegistry;
use norns_core::{ErrorCode, ProcessTriple, Task};
use std::net::TcpStream;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Everything a transferor needs besides the task and its two resource
/// descriptors: the backend registry to resolve mount points, the memory
/// arena backing `memory_region` resources, and enough addressing
/// information to dial a peer daemon for a cross-node transfer.
pub struct TransferContext {
    pub backends: Arc<BackendRegistry>,
    pub memory: Arc<MemoryArena>,
    pub credentials: ProcessTriple,
    pub cancelled: Arc<AtomicBool>,
    pub remote_port: u16,
    pub staging_directory: PathBuf,
    pub connect_timeout: Duration,
}

impl TransferContext {
    /// Whether the task executing under this context has been cancelled
    /// (spec.md §4.5/§5: polled at coarse intervals between chunks).
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Opens a blocking TCP connection to a peer daemon's remote endpoint.
    /// Transferors run on dedicated worker threads (spec.md §5), not on
    /// the tokio event loop, so dialing out happens with `std::net`
    /// rather than pulling a runtime handle into the worker.
    pub fn dial(&self, host: &str) -> std::io::Result<TcpStream> {
        let addr = format!("{host}:{}", self.remote_port);
        let stream = TcpStream::connect(&addr)?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }
}

impl From<BackendIoError> for ErrorCode {
    fn from(_: BackendIoError) -> Self {
        ErrorCode::NoSuchResource
    }
}

/// Strategy executing one `(source-kind, destination-kind)` pair
/// (spec.md §4.6). `validate` is a cheap structural/semantic check run at
/// submission time; `transfer` performs the work synchronously on the
/// calling worker thread; `accept_transfer` is the server-side handler
/// invoked on the *destination* daemon when a peer initiates a cross-node
/// push (spec.md §4.7), and is unreachable for purely local pairs.
pub trait Transferor: Send + Sync {
    fn validate(&self, task: &Task) -> bool;

    /// Performs the transfer, returning the number of bytes moved on
    /// success. Implementations poll `ctx.is_cancelled()` between chunks
    /// and return `ErrorCode::Cancelled` without committing partial work
    /// to the destination when the backend pair allows it (spec.md §4.5).
    fn transfer(&self, ctx: &TransferContext, task: &Task) -> Result<u64, ErrorCode>;

    /// Accepts a push initiated by a peer daemon. Only transferors whose
    /// destination kind can be written to from a remote push implement
    /// this; the default rejects it as unsupported.
    fn accept_transfer(
        &self,
        _ctx: &TransferContext,
        _task: &Task,
        _bytes: Vec<u8>,
    ) -> Result<u64, ErrorCode> {
        Err(ErrorCode::NotSupported)
    }
}

#[cfg(test)]
#[path = "transferor_tests.rs"]
mod tests;
