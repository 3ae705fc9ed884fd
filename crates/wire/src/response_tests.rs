// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn ok_round_trips() {
    let json = serde_json::to_string(&Response::Ok).unwrap();
    assert_eq!(json, r#"{"type":"ok"}"#);
    assert_eq!(serde_json::from_str::<Response>(&json).unwrap(), Response::Ok);
}

#[test]
fn from_result_collapses_err_into_error_variant() {
    let response = Response::from_result(Err(ErrorCode::NoSuchTask));
    assert_eq!(response, Response::Error { code: ErrorCode::NoSuchTask });
}

#[test]
fn from_result_passes_ok_through() {
    let response = Response::from_result(Ok(Response::TaskSubmitted { task_id: TaskId::new(3) }));
    assert_eq!(response, Response::TaskSubmitted { task_id: TaskId::new(3) });
}

#[test]
fn task_status_report_round_trips_with_error() {
    let report = TaskStatusReport { status: TaskStatus::Error, error: Some(ErrorCode::SystemError), bytes_transferred: 128 };
    let response = Response::TaskStatus(report);
    let json = serde_json::to_string(&response).unwrap();
    let back: Response = serde_json::from_str(&json).unwrap();
    assert_eq!(response, back);
}

#[test]
fn global_status_snapshot_defaults_to_zeroed_counters() {
    let snapshot = GlobalStatusSnapshot::default();
    assert_eq!(snapshot.jobs, 0);
    assert!(!snapshot.accept_paused);
}
