// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! I/O-performing backend handles.
//!
//! `norns_core::BackendRecord` is pure data (what a `namespace_register`
//! request carries). This module turns a resolved record into something a
//! transferor can actually read and write: a path rooted at the backend's
//! mount point, or a synthesized remote address. Resources hold only a
//! cheap, read-only reference to their backend's namespace id; the backend
//! registry is the sole owner of the `BackendRecord` arena (spec.md §3
//! "Ownership").

use norns_core::{BackendKind, BackendRecord};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendIoError {
    #[error("backend {nsid} is not path-addressable (kind {kind:?})")]
    NotPathAddressable { nsid: String, kind: BackendKind },
    #[error("path {0:?} escapes its backend's mount point")]
    PathEscape(PathBuf),
    #[error("mount point {0:?} does not exist")]
    MountpointMissing(PathBuf),
}

/// Checks spec.md §3's backend invariant that a path-kind backend's mount
/// point exists at registration time. Memory backends have no mount point
/// to check.
pub fn validate_mountpoint(kind: BackendKind, mountpoint: &str) -> Result<(), BackendIoError> {
    match kind {
        BackendKind::PosixPath | BackendKind::SharedPosixPath => {
            let path = Path::new(mountpoint);
            if !path.is_dir() {
                return Err(BackendIoError::MountpointMissing(path.to_path_buf()));
            }
            Ok(())
        }
        BackendKind::Memory => Ok(()),
    }
}

/// Resolves a relative path carried in a resource descriptor against a
/// path-kind backend's mount point, rejecting `..` escapes out of the
/// namespace (not named explicitly in spec.md, but implied by "the
/// daemon operates on" a resource scoped to its backend).
pub fn resolve_path(record: &BackendRecord, relative: &str) -> Result<PathBuf, BackendIoError> {
    match record.kind {
        BackendKind::PosixPath | BackendKind::SharedPosixPath => {}
        BackendKind::Memory => {
            return Err(BackendIoError::NotPathAddressable {
                nsid: record.nsid.to_string(),
                kind: record.kind,
            })
        }
    }

    let relative = Path::new(relative);
    if relative.components().any(|c| matches!(c, std::path::Component::ParentDir)) {
        return Err(BackendIoError::PathEscape(relative.to_path_buf()));
    }

    Ok(Path::new(&record.mountpoint).join(relative))
}

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;
