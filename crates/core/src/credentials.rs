// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process identity carried alongside a request.
//!
//! `Credentials` is normally captured from the peer's `SO_PEERCRED` socket
//! option by the session layer (original source:
//! `src/auth/process-credentials.cpp`), but a request body may carry an
//! explicit `ProcessTriple` that overrides it — used by job-registration
//! requests, which name processes other than the one issuing the request
//! (spec.md §9).

use serde::{Deserialize, Serialize};

/// The (uid, gid, pid) triple identifying one process authorised to act on
/// behalf of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessTriple {
    pub uid: u32,
    pub gid: u32,
    pub pid: u32,
}

impl ProcessTriple {
    pub const fn new(uid: u32, gid: u32, pid: u32) -> Self {
        Self { uid, gid, pid }
    }
}

/// Credentials captured for the connection a request arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Credentials {
    pub pid: u32,
    pub uid: u32,
    pub gid: u32,
}

impl Credentials {
    pub const fn new(pid: u32, uid: u32, gid: u32) -> Self {
        Self { pid, uid, gid }
    }

    /// A triple for the process these credentials describe, for comparison
    /// against a job's authorised process set.
    pub const fn as_triple(&self) -> ProcessTriple {
        ProcessTriple::new(self.uid, self.gid, self.pid)
    }

    /// Credentials to use for an operation: the request's explicit
    /// credentials if present, otherwise the ones captured from the socket.
    pub fn resolve(socket: Credentials, explicit: Option<ProcessTriple>) -> Credentials {
        match explicit {
            Some(t) => Credentials::new(t.pid, t.uid, t.gid),
            None => socket,
        }
    }
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;
