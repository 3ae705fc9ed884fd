// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use norns_core::ErrorCode;

#[test]
fn push_resource_round_trips_with_collection_members() {
    let req = RemoteRequest::PushResource {
        origin_task_id: TaskId::new(7),
        job_id: JobId::new(1),
        source_kind_label: "local_posix_path".into(),
        source_canonical_name: "a/b".into(),
        destination: ResourceDescriptor::RemoteResource {
            nsid: "nvm0".into(),
            host: "node02".into(),
            path: "c/d".into(),
        },
        handle: TransferHandle::FollowUpStream { total_len: 4096 },
        total_bytes: 4096,
        is_collection: true,
        members: vec![CollectionMember { relative_path: "a".into(), size: 2048 }, CollectionMember { relative_path: "b".into(), size: 2048 }],
    };
    let json = serde_json::to_string(&req).unwrap();
    let back: RemoteRequest = serde_json::from_str(&json).unwrap();
    assert_eq!(req, back);
}

#[test]
fn pull_resource_round_trips_without_explicit_namespace() {
    let req = RemoteRequest::PullResource {
        origin_task_id: TaskId::new(3),
        job_id: JobId::new(1),
        source: ResourceDescriptor::RemoteResource { nsid: "nvm0".into(), host: "node03".into(), path: "x".into() },
        requested_namespace: None,
    };
    let json = serde_json::to_string(&req).unwrap();
    let back: RemoteRequest = serde_json::from_str(&json).unwrap();
    assert_eq!(req, back);
}

#[test]
fn remote_reply_carries_terminal_error_code() {
    let reply = RemoteReply { origin_task_id: TaskId::new(9), error: ErrorCode::Success, bytes_transferred: 1024 };
    let json = serde_json::to_string(&reply).unwrap();
    let back: RemoteReply = serde_json::from_str(&json).unwrap();
    assert_eq!(reply, back);
}
