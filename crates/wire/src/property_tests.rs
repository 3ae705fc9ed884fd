// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Frame round-trip property: `decode(encode(R)) == R` for every request
//! and response shape (spec.md §8's first testable property).

use crate::{Command, GlobalStatusSnapshot, Request, Response, TaskStatusReport};
use norns_core::{JobId, Operation, ResourceDescriptor, TaskId, TaskStatus};
use yare::parameterized;

#[parameterized(
    ping = { Request::Ping },
    global_status = { Request::GlobalStatus },
    command = { Request::Command { command: Command::Shutdown } },
    job_unregister = { Request::JobUnregister { job_id: JobId::new(3) } },
    namespace_unregister = { Request::NamespaceUnregister { nsid: "nvm0".into() } },
    iotask_status = { Request::IotaskStatus { task_id: TaskId::new(5) } },
)]
fn request_round_trips(request: Request) {
    let encoded = crate::encode(&request).unwrap();
    let decoded: Request = crate::decode(&encoded).unwrap();
    assert_eq!(request, decoded);
}

#[test]
fn iotask_submit_round_trips_for_every_operation() {
    for operation in [Operation::Copy, Operation::Move, Operation::Remove] {
        let request = Request::IotaskSubmit {
            job_id: JobId::new(1),
            operation,
            source: ResourceDescriptor::LocalPosixPath { nsid: "nvm0".into(), path: "a".into() },
            destination: Some(ResourceDescriptor::LocalPosixPath { nsid: "nvm0".into(), path: "b".into() }),
            credentials: None,
        };
        let encoded = crate::encode(&request).unwrap();
        let decoded: Request = crate::decode(&encoded).unwrap();
        assert_eq!(request, decoded);
    }
}

#[parameterized(
    ok = { Response::Ok },
    global_status = { Response::GlobalStatus(GlobalStatusSnapshot::default()) },
    task_submitted = { Response::TaskSubmitted { task_id: TaskId::new(9) } },
    task_status = { Response::TaskStatus(TaskStatusReport { status: TaskStatus::Finished, error: None, bytes_transferred: 2048 }) },
)]
fn response_round_trips(response: Response) {
    let encoded = crate::encode(&response).unwrap();
    let decoded: Response = crate::decode(&encoded).unwrap();
    assert_eq!(response, decoded);
}
