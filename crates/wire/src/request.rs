// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client-facing request variants (spec.md §4.3's request-kind table).
//!
//! Administrative requests (`job_*`, `process_*`, `namespace_*`, `command`)
//! arrive on the control endpoint; `ping`/`global_status`/`iotask_*` arrive
//! on the local endpoint. Both share one `Request` enum and one dispatcher,
//! matching the grounding repo's single big `match` in `handle_request`.

use norns_core::{Credentials, JobId, NamespaceId, Operation, ProcessTriple, ResourceDescriptor, TaskId};
use serde::{Deserialize, Serialize};

/// The administrative commands accepted by the `command` request kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Ping,
    PauseAccept,
    ResumeAccept,
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    Ping,
    GlobalStatus,
    Command {
        command: Command,
    },
    JobRegister {
        job_id: JobId,
        hosts: Vec<String>,
        namespaces: Vec<NamespaceId>,
        #[serde(default)]
        credentials: Option<ProcessTriple>,
    },
    JobUpdate {
        job_id: JobId,
        hosts: Vec<String>,
        namespaces: Vec<NamespaceId>,
    },
    JobUnregister {
        job_id: JobId,
    },
    ProcessRegister {
        job_id: JobId,
        uid: u32,
        gid: u32,
        pid: u32,
    },
    ProcessUnregister {
        job_id: JobId,
        uid: u32,
        gid: u32,
        pid: u32,
    },
    NamespaceRegister {
        nsid: NamespaceId,
        kind: String,
        #[serde(default)]
        track_contents: bool,
        mountpoint: String,
        #[serde(default)]
        capacity: Option<u64>,
    },
    NamespaceUpdate {
        nsid: NamespaceId,
        #[serde(default)]
        track_contents: Option<bool>,
        #[serde(default)]
        capacity: Option<u64>,
    },
    NamespaceUnregister {
        nsid: NamespaceId,
    },
    IotaskSubmit {
        job_id: JobId,
        operation: Operation,
        source: ResourceDescriptor,
        #[serde(default)]
        destination: Option<ResourceDescriptor>,
        #[serde(default)]
        credentials: Option<ProcessTriple>,
    },
    IotaskStatus {
        task_id: TaskId,
    },
}

impl Request {
    /// A short label for the request kind, used in log lines the way the
    /// grounding repo's `handle_request` logs `request.kind()` before
    /// dispatch.
    pub fn kind(&self) -> &'static str {
        match self {
            Request::Ping => "ping",
            Request::GlobalStatus => "global_status",
            Request::Command { .. } => "command",
            Request::JobRegister { .. } => "job_register",
            Request::JobUpdate { .. } => "job_update",
            Request::JobUnregister { .. } => "job_unregister",
            Request::ProcessRegister { .. } => "process_register",
            Request::ProcessUnregister { .. } => "process_unregister",
            Request::NamespaceRegister { .. } => "namespace_register",
            Request::NamespaceUpdate { .. } => "namespace_update",
            Request::NamespaceUnregister { .. } => "namespace_unregister",
            Request::IotaskSubmit { .. } => "iotask_submit",
            Request::IotaskStatus { .. } => "iotask_status",
        }
    }
}

/// A request together with the credentials captured for its connection,
/// built by the session layer before dispatch (spec.md §4.1, §9 "explicit
/// credentials override socket-derived ones").
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    pub request: Request,
    pub credentials: Credentials,
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
