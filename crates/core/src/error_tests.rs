// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn success_is_the_default_and_not_an_error() {
    assert_eq!(ErrorCode::default(), ErrorCode::Success);
    assert!(ErrorCode::Success.is_success());
    assert!(!ErrorCode::NoSuchJob.is_success());
}

#[test]
fn messages_match_original_string_table() {
    assert_eq!(ErrorCode::Snafu.to_string(), "Internal error");
    assert_eq!(ErrorCode::NoSuchNamespace.to_string(), "Namespace does not exist");
    assert_eq!(ErrorCode::TooManyTasks.to_string(), "Too many pending tasks");
    assert_eq!(ErrorCode::NotSupported.to_string(), "Not supported");
}

#[test]
fn round_trips_through_json() {
    for code in [
        ErrorCode::Success,
        ErrorCode::NoSuchJob,
        ErrorCode::TaskExists,
        ErrorCode::TasksPending,
        ErrorCode::Cancelled,
    ] {
        let json = serde_json::to_string(&code).unwrap();
        let back: ErrorCode = serde_json::from_str(&json).unwrap();
        assert_eq!(code, back);
    }
}

#[test]
fn serializes_as_snake_case() {
    assert_eq!(serde_json::to_string(&ErrorCode::NoSuchJob).unwrap(), "\"no_such_job\"");
    assert_eq!(serde_json::to_string(&ErrorCode::BadArgs).unwrap(), "\"bad_args\"");
}
