// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job registry: a map from job id to job record, behind a single
//! reader-writer lock (spec.md §4.4).

use norns_core::{Job, JobId, NamespaceId, ProcessTriple};
use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum JobRegistryError {
    #[error("job already exists")]
    JobExists,
    #[error("no such job")]
    NoSuchJob,
    #[error("process already exists")]
    ProcessExists,
    #[error("no such process")]
    NoSuchProcess,
}

#[derive(Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, id: JobId, hosts: Vec<String>, namespaces: Vec<NamespaceId>) -> Result<(), JobRegistryError> {
        let mut jobs = self.jobs.write();
        if jobs.contains_key(&id) {
            return Err(JobRegistryError::JobExists);
        }
        jobs.insert(id, Job::new(id, hosts, namespaces));
        Ok(())
    }

    pub fn update(&self, id: JobId, hosts: Vec<String>, namespaces: Vec<NamespaceId>) -> Result<(), JobRegistryError> {
        let mut jobs = self.jobs.write();
        let job = jobs.get_mut(&id).ok_or(JobRegistryError::NoSuchJob)?;
        job.hosts = hosts;
        job.namespaces = namespaces;
        Ok(())
    }

    pub fn unregister(&self, id: JobId) -> Result<(), JobRegistryError> {
        let mut jobs = self.jobs.write();
        jobs.remove(&id).ok_or(JobRegistryError::NoSuchJob)?;
        Ok(())
    }

    pub fn register_process(&self, id: JobId, triple: ProcessTriple) -> Result<(), JobRegistryError> {
        let mut jobs = self.jobs.write();
        let job = jobs.get_mut(&id).ok_or(JobRegistryError::NoSuchJob)?;
        if !job.register_process(triple) {
            return Err(JobRegistryError::ProcessExists);
        }
        Ok(())
    }

    pub fn unregister_process(&self, id: JobId, triple: &ProcessTriple) -> Result<(), JobRegistryError> {
        let mut jobs = self.jobs.write();
        let job = jobs.get_mut(&id).ok_or(JobRegistryError::NoSuchJob)?;
        if !job.unregister_process(triple) {
            return Err(JobRegistryError::NoSuchProcess);
        }
        Ok(())
    }

    /// Reader-locked: whether `triple` is authorised to act for `id`.
    /// Called from the task-submission path, which never needs a writer
    /// lock on this registry.
    pub fn is_authorised(&self, id: JobId, triple: &ProcessTriple) -> bool {
        self.jobs.read().get(&id).map(|job| job.is_authorised(triple)).unwrap_or(false)
    }

    pub fn exists(&self, id: JobId) -> bool {
        self.jobs.read().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "job_registry_tests.rs"]
mod tests;
