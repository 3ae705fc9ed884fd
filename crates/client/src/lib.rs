// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! norns-client: a thin async wrapper over the wire protocol, used by
//! batch jobs to submit and poll I/O tasks, by admin tooling (`nornsctl`)
//! to manage jobs/namespaces, and by integration tests to drive a real
//! `nornsd` instance end to end (spec.md §6's "CLI surface" collaborators).
//!
//! Grounded on the grounding repo's `cli/src/client_queries*.rs`: one
//! method per request kind, each a thin `encode → send → decode` wrapper,
//! with the actual connection and framing factored into a single `send`.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod error;

pub use error::ClientError;

use norns_core::{ErrorCode, JobId, NamespaceId, Operation, ProcessTriple, ResourceDescriptor, TaskId};
use norns_wire::{Command, GlobalStatusSnapshot, Request, Response, TaskStatusReport};
use std::path::{Path, PathBuf};
use tokio::net::UnixStream;
use tokio::sync::Mutex;

/// A connection to one of `nornsd`'s Unix-domain endpoints (spec.md §4.2).
/// Holds a single persistent stream behind a mutex, since one connection
/// serves requests one at a time (spec.md §4.1's request/response pipeline
/// has no pipelining).
pub struct NornsClient {
    path: PathBuf,
    stream: Mutex<UnixStream>,
}

impl NornsClient {
    /// Connects to the daemon endpoint at `path` (either the local or the
    /// control socket — both speak the same `Request`/`Response` framing).
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref().to_path_buf();
        let stream = UnixStream::connect(&path)
            .await
            .map_err(|source| ClientError::Connect { path: path.clone(), source })?;
        Ok(Self { path, stream: Mutex::new(stream) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let mut stream = self.stream.lock().await;
        norns_wire::write_encoded(&mut *stream, request).await?;
        let response: Response = norns_wire::read_decoded(&mut *stream).await?;
        Ok(response)
    }

    fn reject<T>(response: Response) -> Result<T, ClientError> {
        match response {
            Response::Error { code } => Err(ClientError::Daemon(code)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn ping(&self) -> Result<(), ClientError> {
        match self.send(&Request::Ping).await? {
            Response::Ok => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn global_status(&self) -> Result<GlobalStatusSnapshot, ClientError> {
        match self.send(&Request::GlobalStatus).await? {
            Response::GlobalStatus(snapshot) => Ok(snapshot),
            other => Self::reject(other),
        }
    }

    pub async fn pause_accept(&self) -> Result<(), ClientError> {
        self.command(Command::PauseAccept).await
    }

    pub async fn resume_accept(&self) -> Result<(), ClientError> {
        self.command(Command::ResumeAccept).await
    }

    pub async fn shutdown(&self) -> Result<(), ClientError> {
        self.command(Command::Shutdown).await
    }

    async fn command(&self, command: Command) -> Result<(), ClientError> {
        match self.send(&Request::Command { command }).await? {
            Response::Ok => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn job_register(
        &self,
        job_id: JobId,
        hosts: Vec<String>,
        namespaces: Vec<NamespaceId>,
        credentials: Option<ProcessTriple>,
    ) -> Result<(), ClientError> {
        match self.send(&Request::JobRegister { job_id, hosts, namespaces, credentials }).await? {
            Response::Ok => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn job_update(&self, job_id: JobId, hosts: Vec<String>, namespaces: Vec<NamespaceId>) -> Result<(), ClientError> {
        match self.send(&Request::JobUpdate { job_id, hosts, namespaces }).await? {
            Response::Ok => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn job_unregister(&self, job_id: JobId) -> Result<(), ClientError> {
        match self.send(&Request::JobUnregister { job_id }).await? {
            Response::Ok => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn process_register(&self, job_id: JobId, uid: u32, gid: u32, pid: u32) -> Result<(), ClientError> {
        match self.send(&Request::ProcessRegister { job_id, uid, gid, pid }).await? {
            Response::Ok => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn process_unregister(&self, job_id: JobId, uid: u32, gid: u32, pid: u32) -> Result<(), ClientError> {
        match self.send(&Request::ProcessUnregister { job_id, uid, gid, pid }).await? {
            Response::Ok => Ok(()),
            other => Self::reject(other),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn namespace_register(
        &self,
        nsid: NamespaceId,
        kind: impl Into<String>,
        track_contents: bool,
        mountpoint: impl Into<String>,
        capacity: Option<u64>,
    ) -> Result<(), ClientError> {
        let request = Request::NamespaceRegister {
            nsid,
            kind: kind.into(),
            track_contents,
            mountpoint: mountpoint.into(),
            capacity,
        };
        match self.send(&request).await? {
            Response::Ok => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn namespace_update(&self, nsid: NamespaceId, track_contents: Option<bool>, capacity: Option<u64>) -> Result<(), ClientError> {
        match self.send(&Request::NamespaceUpdate { nsid, track_contents, capacity }).await? {
            Response::Ok => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn namespace_unregister(&self, nsid: NamespaceId) -> Result<(), ClientError> {
        match self.send(&Request::NamespaceUnregister { nsid }).await? {
            Response::Ok => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn iotask_submit(
        &self,
        job_id: JobId,
        operation: Operation,
        source: ResourceDescriptor,
        destination: Option<ResourceDescriptor>,
        credentials: Option<ProcessTriple>,
    ) -> Result<TaskId, ClientError> {
        let request = Request::IotaskSubmit { job_id, operation, source, destination, credentials };
        match self.send(&request).await? {
            Response::TaskSubmitted { task_id } => Ok(task_id),
            other => Self::reject(other),
        }
    }

    pub async fn iotask_status(&self, task_id: TaskId) -> Result<TaskStatusReport, ClientError> {
        match self.send(&Request::IotaskStatus { task_id }).await? {
            Response::TaskStatus(report) => Ok(report),
            other => Self::reject(other),
        }
    }

    /// Polls `iotask_status` until the task reaches a terminal state, or
    /// `attempts` polls elapse without one, in which case this returns
    /// `Ok(None)` rather than an error — the caller decides whether that's
    /// a timeout worth failing on.
    pub async fn wait_for_task(&self, task_id: TaskId, poll_interval: std::time::Duration, attempts: usize) -> Result<Option<TaskStatusReport>, ClientError> {
        for _ in 0..attempts {
            let report = self.iotask_status(task_id).await?;
            if report.status.is_terminal() {
                return Ok(Some(report));
            }
            tokio::time::sleep(poll_interval).await;
        }
        Ok(None)
    }
}

/// Maps an [`ErrorCode`] onto a process exit code (spec.md §6: "exit code
/// 0 on success, nonzero on any daemon-reported error").
pub fn exit_code_for(code: ErrorCode) -> i32 {
    if code.is_success() {
        0
    } else {
        1
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
