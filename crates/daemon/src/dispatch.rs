// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request dispatch: one handler per [`norns_wire::Request`] variant
//! (spec.md §4.3's request-kind table). Grounded on the grounding repo's
//! `listener::handle_request` — a single `match` over the request enum
//! rather than a literal keyed table of closures, since Rust's exhaustive
//! match already gives the "missing entry" case a compile-time guarantee
//! instead of a runtime lookup miss.

use crate::backend::validate_mountpoint;
use crate::registries::{BackendRegistryError, JobRegistryError};
use crate::state::AppState;
use norns_core::{BackendKind, BackendRecord, Credentials, ErrorCode, ProcessTriple, TaskStatus};
use norns_wire::{Command, GlobalStatusSnapshot, Request, Response, TaskStatusReport};

impl From<JobRegistryError> for ErrorCode {
    fn from(err: JobRegistryError) -> Self {
        match err {
            JobRegistryError::JobExists => ErrorCode::JobExists,
            JobRegistryError::NoSuchJob => ErrorCode::NoSuchJob,
            JobRegistryError::ProcessExists => ErrorCode::ProcessExists,
            JobRegistryError::NoSuchProcess => ErrorCode::NoSuchProcess,
        }
    }
}

impl From<BackendRegistryError> for ErrorCode {
    fn from(err: BackendRegistryError) -> Self {
        match err {
            BackendRegistryError::NamespaceExists => ErrorCode::NamespaceExists,
            BackendRegistryError::NoSuchNamespace => ErrorCode::NoSuchNamespace,
            BackendRegistryError::NamespaceNotEmpty => ErrorCode::NamespaceNotEmpty,
        }
    }
}

fn parse_backend_kind(kind: &str) -> Result<BackendKind, ErrorCode> {
    match kind {
        "posix_path" => Ok(BackendKind::PosixPath),
        "shared_posix_path" => Ok(BackendKind::SharedPosixPath),
        "memory" => Ok(BackendKind::Memory),
        _ => Err(ErrorCode::BadArgs),
    }
}

/// Dispatches one decoded request, collapsing the handler's result into
/// the single `Response` value the session frames back to the client.
/// `socket_credentials` is what the session captured off the connection;
/// a request's own explicit credentials, where it carries any, take
/// precedence (spec.md §9).
pub fn handle_request(state: &AppState, request: Request, socket_credentials: Credentials) -> Response {
    Response::from_result(dispatch(state, request, socket_credentials))
}

fn dispatch(state: &AppState, request: Request, socket_credentials: Credentials) -> Result<Response, ErrorCode> {
    match request {
        Request::Ping => Ok(Response::Ok),

        Request::GlobalStatus => Ok(Response::GlobalStatus(global_status_snapshot(state))),

        Request::Command { command } => handle_command(state, command),

        Request::JobRegister { job_id, hosts, namespaces, credentials } => {
            state.jobs.register(job_id, hosts, namespaces)?;
            let triple = Credentials::resolve(socket_credentials, credentials).as_triple();
            // The job was just created, so the only way this fails is the
            // caller naming the same explicit triple twice in one request;
            // harmless either way, since the net effect (one authorised
            // process) is identical.
            let _ = state.jobs.register_process(job_id, triple);
            Ok(Response::Ok)
        }

        Request::JobUpdate { job_id, hosts, namespaces } => {
            state.jobs.update(job_id, hosts, namespaces)?;
            Ok(Response::Ok)
        }

        Request::JobUnregister { job_id } => {
            if state.tasks.pending_count(|t| !t.status().is_terminal() && t.job_id == job_id) > 0 {
                return Err(ErrorCode::TasksPending);
            }
            state.jobs.unregister(job_id)?;
            Ok(Response::Ok)
        }

        Request::ProcessRegister { job_id, uid, gid, pid } => {
            state.jobs.register_process(job_id, ProcessTriple::new(uid, gid, pid))?;
            Ok(Response::Ok)
        }

        Request::ProcessUnregister { job_id, uid, gid, pid } => {
            state.jobs.unregister_process(job_id, &ProcessTriple::new(uid, gid, pid))?;
            Ok(Response::Ok)
        }

        Request::NamespaceRegister { nsid, kind, track_contents, mountpoint, capacity } => {
            let kind = parse_backend_kind(&kind)?;
            validate_mountpoint(kind, &mountpoint).map_err(|_| ErrorCode::BadArgs)?;
            let mut record = BackendRecord::new(nsid, kind, mountpoint).track_contents(track_contents);
            if capacity.is_some() {
                record = record.capacity_bytes(capacity);
            }
            state.backends.register(record)?;
            Ok(Response::Ok)
        }

        Request::NamespaceUpdate { nsid, track_contents, capacity } => {
            state.backends.update(&nsid, track_contents, capacity.map(Some))?;
            Ok(Response::Ok)
        }

        Request::NamespaceUnregister { nsid } => {
            let has_pending = state.tasks.pending_count(|t| {
                !t.status().is_terminal() && (t.source.nsid() == Some(&nsid) || t.destination.nsid() == Some(&nsid))
            }) > 0;
            state.backends.unregister(&nsid, has_pending)?;
            Ok(Response::Ok)
        }

        Request::IotaskSubmit { job_id, operation, source, destination, credentials } => {
            let triple = Credentials::resolve(socket_credentials, credentials).as_triple();
            let task_id = state.tasks.submit(job_id, operation, source, destination, triple)?;
            Ok(Response::TaskSubmitted { task_id })
        }

        Request::IotaskStatus { task_id } => {
            let task = state.tasks.status(task_id)?;
            let terminal = task.terminal_snapshot();
            Ok(Response::TaskStatus(TaskStatusReport {
                status: task.status(),
                error: terminal.error,
                bytes_transferred: terminal.bytes_transferred,
            }))
        }
    }
}

fn handle_command(state: &AppState, command: Command) -> Result<Response, ErrorCode> {
    match command {
        Command::Ping => Ok(Response::Ok),
        Command::PauseAccept => {
            state.tasks.pause_accept();
            Ok(Response::Ok)
        }
        Command::ResumeAccept => {
            state.tasks.resume_accept();
            Ok(Response::Ok)
        }
        Command::Shutdown => {
            state.begin_shutdown();
            Ok(Response::Ok)
        }
    }
}

fn global_status_snapshot(state: &AppState) -> GlobalStatusSnapshot {
    GlobalStatusSnapshot {
        jobs: state.jobs.len() as u32,
        namespaces: state.backends.len() as u32,
        pending_tasks: state.tasks.pending_count(|t| t.status() == TaskStatus::Pending) as u32,
        running_tasks: state.tasks.pending_count(|t| t.status() == TaskStatus::InProgress) as u32,
        finished_tasks: state.tasks.pending_count(|t| t.status() == TaskStatus::Finished) as u32,
        error_tasks: state.tasks.pending_count(|t| t.status() == TaskStatus::Error) as u32,
        accept_paused: state.tasks.is_accept_paused(),
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
