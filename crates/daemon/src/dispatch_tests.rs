use super::*;
use crate::memory::MemoryArena;
use crate::registries::{BackendRegistry, JobRegistry};
use crate::task_manager::TaskManager;
use crate::transfer::{ChunkSize, TransferorMatrix};
use crate::worker_pool::WorkerPool;
use norns_core::{JobId, Operation, ResourceDescriptor};
use std::time::Duration;
use tempfile::tempdir;

fn harness() -> AppState {
    let backends = Arc::new(BackendRegistry::new());
    let jobs = Arc::new(JobRegistry::new());
    let matrix = Arc::new(TransferorMatrix::with_default_entries(ChunkSize::default()));
    let memory = Arc::new(MemoryArena::new());
    let pool = Arc::new(
        WorkerPool::new(2, 8, Arc::clone(&memory), 0, std::env::temp_dir(), Duration::from_millis(50))
            .expect("spawn pool"),
    );
    let tasks = Arc::new(TaskManager::new(Arc::clone(&backends), Arc::clone(&jobs), Arc::clone(&matrix), pool, 8));
    AppState::new(backends, jobs, tasks, matrix, memory, 0, std::env::temp_dir(), Duration::from_secs(1))
}

fn zero_credentials() -> Credentials {
    Credentials::new(0, 0, 0)
}

#[test]
fn ping_answers_ok() {
    let state = harness();
    let response = handle_request(&state, Request::Ping, zero_credentials());
    assert_eq!(response, Response::Ok);
}

#[test]
fn global_status_reflects_registered_jobs_and_namespaces() {
    let state = harness();
    state.jobs.register(JobId::new(1), Vec::new(), Vec::new()).expect("register job");

    let response = handle_request(&state, Request::GlobalStatus, zero_credentials());
    match response {
        Response::GlobalStatus(snapshot) => {
            assert_eq!(snapshot.jobs, 1);
            assert_eq!(snapshot.namespaces, 0);
            assert!(!snapshot.accept_paused);
        }
        other => panic!("expected global_status, got {other:?}"),
    }
}

#[test]
fn job_register_twice_reports_job_exists() {
    let state = harness();
    let request = Request::JobRegister { job_id: JobId::new(1), hosts: Vec::new(), namespaces: Vec::new(), credentials: None };
    assert_eq!(handle_request(&state, request.clone(), zero_credentials()), Response::Ok);
    assert_eq!(handle_request(&state, request, zero_credentials()), Response::error(ErrorCode::JobExists));
}

#[test]
fn job_register_enrolls_the_socket_credentials_as_the_first_process() {
    let state = harness();
    let credentials = Credentials::new(4242, 1000, 1000);
    let request = Request::JobRegister { job_id: JobId::new(1), hosts: Vec::new(), namespaces: Vec::new(), credentials: None };
    assert_eq!(handle_request(&state, request, credentials), Response::Ok);
    assert!(state.jobs.is_authorised(JobId::new(1), &credentials.as_triple()));
}

#[test]
fn job_unregister_rejects_while_tasks_are_pending() {
    let state = harness();
    let job_id = JobId::new(1);
    let nsid = norns_core::NamespaceId::new("ns1");
    let dir = tempdir().expect("tempdir");
    state
        .backends
        .register(norns_core::BackendRecord::new(nsid.clone(), norns_core::BackendKind::PosixPath, dir.path().to_string_lossy().into_owned()))
        .expect("register backend");
    std::fs::write(dir.path().join("src"), b"payload").expect("write source");
    state.jobs.register(job_id, Vec::new(), vec![nsid.clone()]).expect("register job");
    let triple = ProcessTriple::new(1000, 1000, 4242);
    state.jobs.register_process(job_id, triple).expect("register process");

    let source = ResourceDescriptor::LocalPosixPath { nsid: nsid.clone(), path: "src".into() };
    let destination = ResourceDescriptor::LocalPosixPath { nsid, path: "dst".into() };
    state.tasks.submit(job_id, Operation::Copy, source, Some(destination), triple).expect("submit task");

    let response = handle_request(&state, Request::JobUnregister { job_id }, zero_credentials());
    assert_eq!(response, Response::error(ErrorCode::TasksPending));
}

#[test]
fn namespace_register_rejects_unknown_backend_kind() {
    let state = harness();
    let request = Request::NamespaceRegister {
        nsid: norns_core::NamespaceId::new("ns1"),
        kind: "not_a_real_kind".into(),
        track_contents: false,
        mountpoint: "/tmp".into(),
        capacity: None,
    };
    assert_eq!(handle_request(&state, request, zero_credentials()), Response::error(ErrorCode::BadArgs));
}

#[test]
fn namespace_register_rejects_a_nonexistent_mountpoint() {
    let state = harness();
    let request = Request::NamespaceRegister {
        nsid: norns_core::NamespaceId::new("ns1"),
        kind: "posix_path".into(),
        track_contents: false,
        mountpoint: "/no/such/directory/should/ever/exist".into(),
        capacity: None,
    };
    assert_eq!(handle_request(&state, request, zero_credentials()), Response::error(ErrorCode::BadArgs));
    assert!(!state.backends.exists(&norns_core::NamespaceId::new("ns1")));
}

#[test]
fn namespace_register_then_update_changes_capacity() {
    let state = harness();
    let nsid = norns_core::NamespaceId::new("ns1");
    let register = Request::NamespaceRegister {
        nsid: nsid.clone(), kind: "posix_path".into(), track_contents: false, mountpoint: "/tmp".into(), capacity: Some(10),
    };
    assert_eq!(handle_request(&state, register, zero_credentials()), Response::Ok);

    let update = Request::NamespaceUpdate { nsid: nsid.clone(), track_contents: None, capacity: Some(20) };
    assert_eq!(handle_request(&state, update, zero_credentials()), Response::Ok);
    assert_eq!(state.backends.get(&nsid).expect("namespace exists").capacity_bytes, Some(20));
}

#[test]
fn iotask_submit_then_status_eventually_reports_a_terminal_state() {
    let state = harness();
    let job_id = JobId::new(1);
    let nsid = norns_core::NamespaceId::new("ns1");
    let dir = tempdir().expect("tempdir");
    state
        .backends
        .register(norns_core::BackendRecord::new(nsid.clone(), norns_core::BackendKind::PosixPath, dir.path().to_string_lossy().into_owned()))
        .expect("register backend");
    std::fs::write(dir.path().join("src"), b"payload").expect("write source");
    let credentials = Credentials::new(4242, 1000, 1000);
    state
        .jobs
        .register(job_id, Vec::new(), vec![nsid.clone()])
        .expect("register job");
    state.jobs.register_process(job_id, credentials.as_triple()).expect("register process");

    let source = ResourceDescriptor::LocalPosixPath { nsid: nsid.clone(), path: "src".into() };
    let destination = ResourceDescriptor::LocalPosixPath { nsid, path: "dst".into() };
    let submit = Request::IotaskSubmit { job_id, operation: Operation::Copy, source, destination: Some(destination), credentials: None };

    let task_id = match handle_request(&state, submit, credentials) {
        Response::TaskSubmitted { task_id } => task_id,
        other => panic!("expected task_submitted, got {other:?}"),
    };

    for _ in 0..200 {
        match handle_request(&state, Request::IotaskStatus { task_id }, zero_credentials()) {
            Response::TaskStatus(report) if report.status.is_terminal() => {
                assert_eq!(report.status, norns_core::TaskStatus::Finished);
                return;
            }
            Response::TaskStatus(_) => std::thread::sleep(Duration::from_millis(10)),
            other => panic!("expected task_status, got {other:?}"),
        }
    }
    panic!("task never reached a terminal state");
}

#[test]
fn command_pause_and_resume_accept_round_trip() {
    let state = harness();
    assert_eq!(handle_request(&state, Request::Command { command: Command::PauseAccept }, zero_credentials()), Response::Ok);
    assert!(state.tasks.is_accept_paused());
    assert_eq!(handle_request(&state, Request::Command { command: Command::ResumeAccept }, zero_credentials()), Response::Ok);
    assert!(!state.tasks.is_accept_paused());
}

#[test]
fn command_shutdown_marks_the_state_as_shutting_down() {
    let state = harness();
    assert_eq!(handle_request(&state, Request::Command { command: Command::Shutdown }, zero_credentials()), Response::Ok);
    assert!(state.is_shutting_down());
}
