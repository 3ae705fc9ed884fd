// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn kind_labels_match_spec_request_names() {
    assert_eq!(Request::Ping.kind(), "ping");
    assert_eq!(Request::IotaskStatus { task_id: TaskId::new(1) }.kind(), "iotask_status");
    assert_eq!(Request::Command { command: Command::PauseAccept }.kind(), "command");
}

#[test]
fn ping_round_trips_with_tagged_encoding() {
    let json = serde_json::to_string(&Request::Ping).unwrap();
    assert_eq!(json, r#"{"type":"ping"}"#);
    let back: Request = serde_json::from_str(&json).unwrap();
    assert_eq!(back, Request::Ping);
}

#[test]
fn iotask_submit_round_trips_without_destination_for_remove() {
    let req = Request::IotaskSubmit {
        job_id: JobId::new(1),
        operation: Operation::Remove,
        source: ResourceDescriptor::LocalPosixPath { nsid: "nvm0".into(), path: "a/b".into() },
        destination: None,
        credentials: None,
    };
    let json = serde_json::to_string(&req).unwrap();
    let back: Request = serde_json::from_str(&json).unwrap();
    assert_eq!(req, back);
}

#[test]
fn job_register_round_trips_with_explicit_credentials() {
    let req = Request::JobRegister {
        job_id: JobId::new(42),
        hosts: vec!["h0".into(), "h1".into()],
        namespaces: vec!["nvm0".into()],
        credentials: Some(ProcessTriple::new(1000, 1000, 4321)),
    };
    let json = serde_json::to_string(&req).unwrap();
    let back: Request = serde_json::from_str(&json).unwrap();
    assert_eq!(req, back);
}
