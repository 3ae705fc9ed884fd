// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared, long-lived daemon state: the registries, task manager, and
//! transferor matrix every accepted session reaches into through an
//! `Arc<AppState>` (spec.md §3 "Ownership" — sessions are owned by their
//! accepting endpoint, but the registries and task manager they dispatch
//! against are shared, thread-safe handles). Grounded on the grounding
//! repo's `ListenCtx` (`listener/mod.rs`), which plays the identical role:
//! one struct built once at startup and cloned by `Arc` into every
//! connection handler.

use crate::memory::MemoryArena;
use crate::registries::{BackendRegistry, JobRegistry};
use crate::task_manager::TaskManager;
use crate::transfer::TransferorMatrix;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub struct AppState {
    pub backends: Arc<BackendRegistry>,
    pub jobs: Arc<JobRegistry>,
    pub tasks: Arc<TaskManager>,
    pub matrix: Arc<TransferorMatrix>,
    pub memory: Arc<MemoryArena>,
    pub remote_port: u16,
    pub staging_directory: PathBuf,
    pub connect_timeout: Duration,
    /// Cancelled once, when shutdown begins, to release every endpoint's
    /// accept loop and every idle session's next frame read out of its
    /// `tokio::select!` (spec.md §4.8). Unlike `tokio::sync::Notify`, a
    /// `CancellationToken` remembers its cancelled state, so a session
    /// spawned concurrently with shutdown can never miss the signal.
    pub shutdown: CancellationToken,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        backends: Arc<BackendRegistry>,
        jobs: Arc<JobRegistry>,
        tasks: Arc<TaskManager>,
        matrix: Arc<TransferorMatrix>,
        memory: Arc<MemoryArena>,
        remote_port: u16,
        staging_directory: PathBuf,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            backends,
            jobs,
            tasks,
            matrix,
            memory,
            remote_port,
            staging_directory,
            connect_timeout,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Marks the daemon as shutting down and wakes every endpoint's accept
    /// loop; idempotent, since both `SIGTERM`/`SIGINT` and `nornsctl
    /// shutdown` (spec.md §4.8's "equivalent to an external SIGTERM") lead
    /// here.
    pub fn begin_shutdown(&self) {
        self.shutdown.cancel();
    }
}
