// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task records.
//!
//! A task moves through `Pending -> Running -> {Finished, Error}`. The
//! terminal fields (status, error code, timestamps) live behind a single
//! `parking_lot::Mutex` written exactly once by whichever worker finishes
//! the task, so a status poll never blocks on a running transfer (spec.md
//! §4.5's lock-free-read requirement).

use crate::clock::Clock;
use crate::credentials::ProcessTriple;
use crate::error::ErrorCode;
use crate::id::{JobId, TaskId};
use crate::resource::ResourceDescriptor;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The data-movement operation a task performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Copy,
    Move,
    Remove,
}

/// A task's lifecycle state, as reported to a `status` query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Finished,
    Error,
}

impl TaskStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Finished | TaskStatus::Error)
    }
}

/// The fields only known once a task reaches a terminal state.
#[derive(Debug, Clone, Default)]
pub struct TaskTerminal {
    pub status: Option<TaskStatus>,
    pub error: Option<ErrorCode>,
    pub bytes_transferred: u64,
    /// Epoch milliseconds at the terminal transition, stamped from the
    /// [`Clock`] passed to [`Task::finish`].
    pub finished_at_ms: Option<u64>,
}

/// A submitted task: immutable descriptor fields plus the mutable terminal
/// state written once by its worker.
#[derive(Debug)]
pub struct Task {
    pub id: TaskId,
    pub job_id: JobId,
    pub operation: Operation,
    pub source: ResourceDescriptor,
    pub destination: ResourceDescriptor,
    /// Credentials resolved at submission time (spec.md §9: explicit
    /// credentials from the request body override the socket-derived
    /// ones). Carried on the record so a worker can pass them to
    /// `Transferor::transfer`/`accept_transfer` without reaching back into
    /// the session that submitted the task.
    pub credentials: ProcessTriple,
    /// Epoch milliseconds at submission, stamped from the [`Clock`] passed
    /// to [`Task::new`].
    pub submitted_at_ms: u64,
    terminal: Mutex<TaskTerminal>,
    cancelled: Arc<AtomicBool>,
}

impl Task {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: TaskId,
        job_id: JobId,
        operation: Operation,
        source: ResourceDescriptor,
        destination: ResourceDescriptor,
        credentials: ProcessTriple,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id,
            job_id,
            operation,
            source,
            destination,
            credentials,
            submitted_at_ms: clock.epoch_ms(),
            terminal: Mutex::new(TaskTerminal::default()),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Current lifecycle status: `Pending` until a worker picks the task
    /// up, `InProgress` while it runs, and whatever terminal state the
    /// worker recorded afterward.
    pub fn status(&self) -> TaskStatus {
        self.terminal.lock().status.unwrap_or(TaskStatus::Pending)
    }

    pub fn mark_running(&self) {
        let mut terminal = self.terminal.lock();
        if terminal.status.is_none() {
            terminal.status = Some(TaskStatus::InProgress);
        }
    }

    /// Records the task's final outcome. Called exactly once by the worker
    /// that executed it; subsequent calls are ignored so a late cancellation
    /// race can never overwrite a real result.
    pub fn finish(&self, result: Result<u64, ErrorCode>, clock: &impl Clock) {
        let mut terminal = self.terminal.lock();
        if terminal.status.map(TaskStatus::is_terminal).unwrap_or(false) {
            return;
        }
        match result {
            Ok(bytes) => {
                terminal.status = Some(TaskStatus::Finished);
                terminal.bytes_transferred = bytes;
            }
            Err(code) => {
                terminal.status = Some(TaskStatus::Error);
                terminal.error = Some(code);
            }
        }
        terminal.finished_at_ms = Some(clock.epoch_ms());
    }

    pub fn terminal_snapshot(&self) -> TaskTerminal {
        self.terminal.lock().clone()
    }

    pub fn cancellation_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
