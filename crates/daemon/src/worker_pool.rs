// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The transfer worker pool: a fixed number of OS threads pulling
//! [`WorkItem`]s off a bounded queue (spec.md §5's "parallel threads"
//! concurrency model — distinct from the tokio event loop the session
//! layer runs on). Grounded on the original implementation's
//! `io/task-manager.cpp` thread-pool-plus-bounded-queue design, expressed
//! here with `std::thread` and `std::sync::mpsc::sync_channel` rather than
//! `tokio::task::spawn_blocking`, since the latter does not give this
//! crate a fixed worker count or a bounded backlog to reject submissions
//! against (spec.md §4.5's high-water-mark).

use crate::memory::MemoryArena;
use crate::registries::BackendRegistry;
use crate::transfer::{TransferContext, TransferorMatrix};
use norns_core::{ErrorCode, SystemClock, Task};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

/// One unit of work handed to the pool: the task to execute plus the
/// shared lookup tables its transferor needs. Holding `Arc` clones here
/// rather than borrowing lets a work item outlive the `submit` call that
/// created it without the task manager's locks being held while it runs.
pub struct WorkItem {
    pub task: Arc<Task>,
    pub matrix: Arc<TransferorMatrix>,
    pub backends: Arc<BackendRegistry>,
}

/// Configuration shared by every worker thread, built once at pool
/// construction (spec.md §6's `remote_port`, `staging_directory`, and
/// `connect_timeout` settings).
struct PoolShared {
    memory: Arc<MemoryArena>,
    remote_port: u16,
    staging_directory: PathBuf,
    connect_timeout: Duration,
}

pub struct WorkerPool {
    sender: Option<SyncSender<WorkItem>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `num_workers` threads reading from a queue bounded at
    /// `queue_capacity` items. `enqueue` blocks the submitting thread once
    /// that bound is reached, so the task manager's own high-water-mark
    /// check (spec.md §4.5) is what actually rejects overload rather than
    /// this queue silently backing up without limit.
    pub fn new(
        num_workers: usize,
        queue_capacity: usize,
        memory: Arc<MemoryArena>,
        remote_port: u16,
        staging_directory: PathBuf,
        connect_timeout: Duration,
    ) -> std::io::Result<Self> {
        let (sender, receiver) = sync_channel::<WorkItem>(queue_capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let shared = Arc::new(PoolShared { memory, remote_port, staging_directory, connect_timeout });

        let mut workers = Vec::with_capacity(num_workers.max(1));
        for index in 0..num_workers.max(1) {
            let receiver = Arc::clone(&receiver);
            let shared = Arc::clone(&shared);
            let handle = std::thread::Builder::new()
                .name(format!("norns-worker-{index}"))
                .spawn(move || worker_loop(receiver, shared))?;
            workers.push(handle);
        }

        Ok(Self { sender: Some(sender), workers })
    }

    /// Enqueues a work item, blocking if every worker is busy and the
    /// queue is full.
    pub fn enqueue(&self, item: WorkItem) {
        if let Some(sender) = &self.sender {
            // The only failure mode is every worker thread having panicked
            // past recovery and dropped its receiver; the task is left
            // `Pending` forever in that case rather than silently lost,
            // which a status poll will surface as a stuck task.
            let _ = sender.send(item);
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for WorkerPool {
    /// Drops the sender first so every worker's `recv` unblocks with
    /// `Err` once the queue drains, then joins each thread. This runs
    /// whenever the last `Arc<WorkerPool>` is dropped, giving the daemon's
    /// shutdown path (spec.md §5) a plain drop to rely on instead of an
    /// explicit two-phase shutdown call.
    fn drop(&mut self) {
        self.sender.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn worker_loop(receiver: Arc<Mutex<Receiver<WorkItem>>>, shared: Arc<PoolShared>) {
    loop {
        let item = {
            let guard = receiver.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            guard.recv()
        };
        let Ok(item) = item else {
            break;
        };
        run_work_item(item, &shared);
    }
}

fn run_work_item(item: WorkItem, shared: &PoolShared) {
    let WorkItem { task, matrix, backends } = item;

    if task.is_cancelled() {
        task.finish(Err(ErrorCode::Cancelled), &SystemClock);
        return;
    }

    task.mark_running();

    let transferor = match matrix.get(task.source.kind(), task.destination.kind()) {
        Some(t) => t,
        None => {
            task.finish(Err(ErrorCode::NotSupported), &SystemClock);
            return;
        }
    };

    let ctx = TransferContext {
        backends,
        memory: Arc::clone(&shared.memory),
        credentials: task.credentials,
        cancelled: task.cancellation_flag(),
        remote_port: shared.remote_port,
        staging_directory: shared.staging_directory.clone(),
        connect_timeout: shared.connect_timeout,
    };

    let result = run_transfer_catching_panics(&transferor, &ctx, &task);
    task.finish(result, &SystemClock);
}

/// A panicking transferor must not take the worker thread down with it
/// (spec.md §7: "no single task's failure, however it fails, is fatal to
/// the daemon process"). `catch_unwind` turns that into an ordinary
/// `ErrorCode::Snafu` terminal state instead.
fn run_transfer_catching_panics(
    transferor: &Arc<dyn crate::transfer::Transferor>,
    ctx: &TransferContext,
    task: &Task,
) -> Result<u64, ErrorCode> {
    match panic::catch_unwind(AssertUnwindSafe(|| transferor.transfer(ctx, task))) {
        Ok(result) => result,
        Err(_) => {
            tracing::error!(task_id = task.id.get(), "transferor panicked during transfer");
            Err(ErrorCode::Snafu)
        }
    }
}

#[cfg(test)]
#[path = "worker_pool_tests.rs"]
mod tests;
