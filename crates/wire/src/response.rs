// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Responses the daemon sends back, one variant per distinct result shape
//! in spec.md §4.3's table. Every handler ultimately returns
//! `Result<Response, ErrorCode>`; `Response::Error` only appears when an
//! internal error surface (e.g. the session layer itself) needs to frame a
//! failure that never reached a handler.

use norns_core::{ErrorCode, TaskId, TaskStatus};
use serde::{Deserialize, Serialize};

/// A snapshot of daemon-wide counters (the `global_status` request).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GlobalStatusSnapshot {
    pub jobs: u32,
    pub namespaces: u32,
    pub pending_tasks: u32,
    pub running_tasks: u32,
    pub finished_tasks: u32,
    pub error_tasks: u32,
    pub accept_paused: bool,
}

/// The status and outcome of one task (the `iotask_status` response).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatusReport {
    pub status: TaskStatus,
    #[serde(default)]
    pub error: Option<ErrorCode>,
    #[serde(default)]
    pub bytes_transferred: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// The bare success acknowledgement most handlers return.
    Ok,
    GlobalStatus(GlobalStatusSnapshot),
    TaskSubmitted { task_id: TaskId },
    TaskStatus(TaskStatusReport),
    /// Carries an error that occurred before or outside normal handler
    /// dispatch (malformed frame, decode failure). Handler-level errors are
    /// instead the `Err` arm of the handler's `Result` and are framed by
    /// the session as this same variant at the wire boundary.
    Error { code: ErrorCode },
}

impl Response {
    pub fn error(code: ErrorCode) -> Self {
        Response::Error { code }
    }

    /// Collapses a handler's `Result<Response, ErrorCode>` into the single
    /// `Response` value that goes on the wire.
    pub fn from_result(result: Result<Response, ErrorCode>) -> Response {
        match result {
            Ok(response) => response,
            Err(code) => Response::error(code),
        }
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
