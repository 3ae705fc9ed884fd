// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The narrower daemon-to-daemon protocol spoken over the remote (TCP)
//! endpoint (spec.md §4.7). Distinct from [`crate::request::Request`]:
//! these variants never arrive from a `norns`/`nornsctl` client, only from
//! a peer daemon acting as initiator or acceptor of a cross-node transfer.
//! They travel over the same length-prefixed JSON codec as client traffic.

use norns_core::{JobId, NamespaceId, ResourceDescriptor, TaskId};
use serde::{Deserialize, Serialize};

/// A handle to bytes the initiator has made available for the acceptor to
/// pull, without requiring a second connection: either an inline payload
/// (small files, spec.md §4.7 "packed in-line") or a pointer into
/// pre-registered memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransferHandle {
    Inline { bytes: Vec<u8> },
    PreRegisteredMemory { address: u64, size: u64 },
    /// The bytes follow immediately after this message on the same
    /// connection, length-prefixed the same way (spec.md §4.7 "a
    /// follow-up data channel, at implementation discretion").
    FollowUpStream { total_len: u64 },
}

/// One member of a collection transfer (spec.md §4.7's tar-like framing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionMember {
    pub relative_path: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RemoteRequest {
    /// Initiator asks the acceptor to take ownership of a push
    /// (local/memory source on the initiator, writing into a destination
    /// on the acceptor).
    PushResource {
        origin_task_id: TaskId,
        job_id: JobId,
        source_kind_label: String,
        source_canonical_name: String,
        destination: ResourceDescriptor,
        handle: TransferHandle,
        total_bytes: u64,
        is_collection: bool,
        #[serde(default)]
        members: Vec<CollectionMember>,
    },
    /// Initiator asks the acceptor to expose a resource it holds so the
    /// initiator can pull it (acceptor is the source side of the data).
    PullResource {
        origin_task_id: TaskId,
        job_id: JobId,
        source: ResourceDescriptor,
        #[serde(default)]
        requested_namespace: Option<NamespaceId>,
    },
}

/// The acceptor's reply to either remote RPC: a single terminal error code
/// (spec.md §4.7 step 4 — "the acceptor responds with an error code; the
/// initiator records that code as its task's terminal state").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteReply {
    pub origin_task_id: TaskId,
    pub error: norns_core::ErrorCode,
    pub bytes_transferred: u64,
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
