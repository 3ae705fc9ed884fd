// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The task manager: owns the task-id counter and the map from task id to
//! task record (spec.md §4.5). Submission resolves resources, looks up the
//! transferor for the pair and runs its `validate` (spec.md §4.6), allocates
//! an id, inserts the record in `pending`, and enqueues work on the worker
//! pool — in that order, so a task id is never observable before its
//! record exists.

use crate::registries::{BackendRegistry, BackendRegistryError, JobRegistry};
use crate::transfer::TransferorMatrix;
use crate::worker_pool::{WorkItem, WorkerPool};
use norns_core::{
    ErrorCode, JobId, Operation, ProcessTriple, Resource, ResourceDescriptor, ResourceKind, SystemClock, Task, TaskId,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum TaskManagerError {
    #[error("bad arguments")]
    BadArgs,
    #[error("daemon does not accept new tasks")]
    AcceptPaused,
    #[error("no such namespace")]
    NoSuchNamespace,
    #[error("too many pending tasks")]
    TooManyTasks,
    #[error("not supported")]
    NotSupported,
    #[error("no such task")]
    NoSuchTask,
}

impl From<TaskManagerError> for ErrorCode {
    fn from(err: TaskManagerError) -> Self {
        match err {
            TaskManagerError::BadArgs => ErrorCode::BadArgs,
            TaskManagerError::AcceptPaused => ErrorCode::AcceptPaused,
            TaskManagerError::NoSuchNamespace => ErrorCode::NoSuchNamespace,
            TaskManagerError::TooManyTasks => ErrorCode::TooManyTasks,
            TaskManagerError::NotSupported => ErrorCode::NotSupported,
            TaskManagerError::NoSuchTask => ErrorCode::NoSuchTask,
        }
    }
}

impl From<BackendRegistryError> for TaskManagerError {
    fn from(err: BackendRegistryError) -> Self {
        match err {
            BackendRegistryError::NoSuchNamespace => TaskManagerError::NoSuchNamespace,
            // A task submission never unregisters a namespace; the other
            // variants cannot arise from `resolve`.
            _ => TaskManagerError::BadArgs,
        }
    }
}

pub struct TaskManager {
    tasks: RwLock<HashMap<TaskId, Arc<Task>>>,
    next_id: AtomicU32,
    accept_paused: std::sync::atomic::AtomicBool,
    high_water_mark: usize,
    backends: Arc<BackendRegistry>,
    jobs: Arc<JobRegistry>,
    matrix: Arc<TransferorMatrix>,
    pool: Arc<WorkerPool>,
}

impl TaskManager {
    pub fn new(
        backends: Arc<BackendRegistry>,
        jobs: Arc<JobRegistry>,
        matrix: Arc<TransferorMatrix>,
        pool: Arc<WorkerPool>,
        high_water_mark: usize,
    ) -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            next_id: AtomicU32::new(1),
            accept_paused: std::sync::atomic::AtomicBool::new(false),
            high_water_mark,
            backends,
            jobs,
            matrix,
            pool,
        }
    }

    pub fn pause_accept(&self) {
        self.accept_paused.store(true, Ordering::SeqCst);
    }

    pub fn resume_accept(&self) {
        self.accept_paused.store(false, Ordering::SeqCst);
    }

    pub fn is_accept_paused(&self) -> bool {
        self.accept_paused.load(Ordering::SeqCst)
    }

    /// Submits a new task. Lock order here is backend → job → task
    /// (spec.md §4.4): resources are resolved against the backend registry
    /// and the submitting process checked against the job registry before
    /// this registry's writer lock is ever taken.
    #[allow(clippy::too_many_arguments)]
    pub fn submit(
        &self,
        job_id: JobId,
        operation: Operation,
        source: ResourceDescriptor,
        destination: Option<ResourceDescriptor>,
        credentials: ProcessTriple,
    ) -> Result<TaskId, TaskManagerError> {
        if operation != Operation::Remove && destination.is_none() {
            return Err(TaskManagerError::BadArgs);
        }

        if !self.jobs.exists(job_id) {
            return Err(TaskManagerError::BadArgs);
        }
        if !self.jobs.is_authorised(job_id, &credentials) {
            return Err(TaskManagerError::BadArgs);
        }

        self.resolve_descriptor(&source)?;
        if let Some(dst) = &destination {
            self.resolve_descriptor(dst)?;
        }

        let dst_kind = destination.as_ref().map(|d| d.kind()).unwrap_or(ResourceKind::Ignorable);
        let transferor = self.matrix.get(source.kind(), dst_kind).ok_or(TaskManagerError::NotSupported)?;

        if self.is_accept_paused() {
            return Err(TaskManagerError::AcceptPaused);
        }

        let id = TaskId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let destination_descriptor = destination.unwrap_or(ResourceDescriptor::Ignorable);
        let task = Arc::new(Task::new(id, job_id, operation, source, destination_descriptor, credentials, &SystemClock));

        if !transferor.validate(&task) {
            return Err(TaskManagerError::BadArgs);
        }

        let mut tasks = self.tasks.write();
        if self.live_count(&tasks) >= self.high_water_mark {
            return Err(TaskManagerError::TooManyTasks);
        }
        tasks.insert(id, Arc::clone(&task));
        drop(tasks);

        self.pool.enqueue(WorkItem {
            task,
            matrix: Arc::clone(&self.matrix),
            backends: Arc::clone(&self.backends),
        });

        Ok(id)
    }

    /// Counts tasks still occupying a queue slot: pending or in-progress
    /// records. Finished/errored tasks are retained for status polling
    /// (spec.md §4.5) but never reaped here, so they must not count
    /// against the high water mark or submission would wedge permanently
    /// once `backlog_size` tasks had ever been accepted.
    fn live_count(&self, tasks: &HashMap<TaskId, Arc<Task>>) -> usize {
        tasks.values().filter(|t| !t.status().is_terminal()).count()
    }

    fn resolve_descriptor(&self, descriptor: &ResourceDescriptor) -> Result<Option<Resource>, TaskManagerError> {
        match descriptor.nsid() {
            Some(nsid) => {
                self.backends.resolve(nsid, descriptor.host())?;
                Ok(Some(Resource::new(descriptor.clone())))
            }
            None => Ok(None),
        }
    }

    pub fn status(&self, id: TaskId) -> Result<Arc<Task>, TaskManagerError> {
        self.tasks.read().get(&id).cloned().ok_or(TaskManagerError::NoSuchTask)
    }

    pub fn pending_count(&self, predicate: impl Fn(&Task) -> bool) -> usize {
        self.tasks.read().values().filter(|t| predicate(t)).count()
    }

    pub fn len(&self) -> usize {
        self.tasks.read().len()
    }
}

#[cfg(test)]
#[path = "task_manager_tests.rs"]
mod tests;
