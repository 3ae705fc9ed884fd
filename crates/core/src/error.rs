// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The closed wire-level error taxonomy.
//!
//! `ErrorCode` is the only error type that ever crosses the wire: every
//! internal error type in the daemon (`WireError`, `RegistryError`,
//! `TaskError`, `TransferError`, ...) eventually maps into one of these
//! variants at the point a handler turns it into a response. Variant names
//! follow the closed list in spec.md §6 exactly; messages are taken from
//! the original implementation's `lib/errors.c` string table so a client
//! built against either daemon sees the same text.

use serde::{Deserialize, Serialize};

/// A closed set of outcomes a request to the daemon can produce.
///
/// `Success` is never constructed as an `Err`; handlers return
/// `Result<Response, ErrorCode>` and the `Ok` arm already implies success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    #[error("Success")]
    Success,
    #[error("Internal error")]
    Snafu,
    #[error("Bad arguments")]
    BadArgs,
    #[error("Bad request")]
    BadRequest,
    #[error("Cannot allocate memory")]
    OutOfMemory,
    #[error("Not supported")]
    NotSupported,
    #[error("Operating system error")]
    SystemError,
    #[error("Cannot connect to daemon")]
    ConnectionFailed,
    #[error("Cannot send requests to daemon")]
    RpcSendFailed,
    #[error("Cannot receive responses from daemon")]
    RpcRecvFailed,
    #[error("Daemon does not accept new tasks")]
    AcceptPaused,
    #[error("Job already exists")]
    JobExists,
    #[error("Job does not exist")]
    NoSuchJob,
    #[error("Process already exists")]
    ProcessExists,
    #[error("Process does not exist")]
    NoSuchProcess,
    #[error("Namespace already exists")]
    NamespaceExists,
    #[error("Namespace does not exist")]
    NoSuchNamespace,
    #[error("Namespace is not empty")]
    NamespaceNotEmpty,
    #[error("Task already exists")]
    TaskExists,
    #[error("Task does not exist")]
    NoSuchTask,
    #[error("Too many pending tasks")]
    TooManyTasks,
    #[error("There are still pending tasks")]
    TasksPending,
    #[error("Resource already exists")]
    ResourceExists,
    #[error("Resource does not exist")]
    NoSuchResource,
    /// Not part of the original error table; a worker-side cancellation
    /// outcome distinct from an I/O failure (spec.md §4.5/§5).
    #[error("Task was cancelled")]
    Cancelled,
    /// `command` requests carry their own small closed set
    /// (`ping`/`pause_accept`/`resume_accept`/`shutdown`, spec.md §4.3);
    /// anything else yields this code.
    #[error("Unknown command")]
    UnknownCommand,
}

impl ErrorCode {
    pub const fn is_success(self) -> bool {
        matches!(self, ErrorCode::Success)
    }
}

impl Default for ErrorCode {
    fn default() -> Self {
        ErrorCode::Success
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
