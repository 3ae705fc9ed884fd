// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn triple(pid: u32) -> ProcessTriple {
    ProcessTriple::new(1000, 1000, pid)
}

#[test]
fn register_process_is_idempotent_false_on_second_call() {
    let mut job = Job::new(JobId::new(1), vec!["node01".into()], vec![]);
    assert!(job.register_process(triple(100)));
    assert!(!job.register_process(triple(100)));
    assert_eq!(job.process_count(), 1);
}

#[test]
fn unregister_removes_and_reports_presence() {
    let mut job = Job::new(JobId::new(1), vec![], vec![]);
    job.register_process(triple(100));
    assert!(job.unregister_process(&triple(100)));
    assert!(!job.unregister_process(&triple(100)));
    assert_eq!(job.process_count(), 0);
}

#[test]
fn is_authorised_reflects_registered_processes() {
    let mut job = Job::new(JobId::new(1), vec![], vec![]);
    assert!(!job.is_authorised(&triple(100)));
    job.register_process(triple(100));
    assert!(job.is_authorised(&triple(100)));
    assert!(!job.is_authorised(&triple(200)));
}
