// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup and shutdown plumbing: pidfile locking, namespace registration
//! from the parsed config, and signal handling (spec.md §4.8). Grounded
//! on the grounding repo's `lifecycle::startup::startup` — in particular
//! its "acquire the lock file before doing anything else observable"
//! ordering, so two daemon instances racing over the same config can
//! never both believe they own it.

use crate::backend::validate_mountpoint;
use crate::registries::BackendRegistry;
use crate::state::AppState;
use fs2::FileExt;
use norns_core::{BackendKind, BackendRecord, Config, NamespaceVisibility, Visibility};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::signal::unix::{signal, SignalKind};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("failed to open pidfile {path}: {source}")]
    PidfileOpen { path: PathBuf, #[source] source: std::io::Error },
    #[error("another norns daemon instance already holds the lock on {0}")]
    AlreadyRunning(PathBuf),
    #[error("failed to write pidfile {path}: {source}")]
    PidfileWrite { path: PathBuf, #[source] source: std::io::Error },
    #[error("failed to create directory {path}: {source}")]
    CreateDir { path: PathBuf, #[source] source: std::io::Error },
    #[error("namespace {nsid:?} has unknown backend kind {kind:?}")]
    UnknownBackendKind { nsid: String, kind: String },
    #[error("namespace {nsid:?} has an invalid capacity: {source}")]
    InvalidCapacity { nsid: String, #[source] source: norns_core::ConfigError },
    #[error("namespace {nsid:?} mount point {path:?} does not exist")]
    MountpointMissing { nsid: String, path: PathBuf },
    #[error(transparent)]
    Register(#[from] crate::registries::BackendRegistryError),
}

/// Holds the exclusive lock on the pidfile for the life of the process;
/// the lock is released implicitly when this is dropped (std `File`'s
/// `Drop` closes the fd, and `flock`-style locks held by `fs2` are
/// released on close).
pub struct PidfileGuard {
    path: PathBuf,
    file: File,
}

impl PidfileGuard {
    /// Opens (creating if absent) and exclusively locks `path`, then
    /// overwrites it with the current process id. Locking happens before
    /// anything else in startup can fail observably (grounding repo's
    /// `startup_inner` does the same), so a second daemon instance never
    /// gets far enough to unlink a running instance's sockets.
    pub fn acquire(path: &Path) -> Result<Self, LifecycleError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|source| LifecycleError::CreateDir { path: parent.to_path_buf(), source })?;
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)
            .map_err(|source| LifecycleError::PidfileOpen { path: path.to_path_buf(), source })?;

        file.try_lock_exclusive().map_err(|_| LifecycleError::AlreadyRunning(path.to_path_buf()))?;

        file.set_len(0).map_err(|source| LifecycleError::PidfileWrite { path: path.to_path_buf(), source })?;
        writeln!(file, "{}", std::process::id())
            .map_err(|source| LifecycleError::PidfileWrite { path: path.to_path_buf(), source })?;
        file.flush().map_err(|source| LifecycleError::PidfileWrite { path: path.to_path_buf(), source })?;

        Ok(Self { path: path.to_path_buf(), file })
    }
}

impl Drop for PidfileGuard {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Maps a `[[namespaces]]` config entry's `type` string onto `BackendKind`
/// (spec.md §6's config section uses the same kind vocabulary as the wire
/// protocol's `namespace_register` request, so this mirrors
/// `dispatch::parse_backend_kind`).
fn parse_backend_kind(kind: &str) -> Option<BackendKind> {
    match kind {
        "posix_path" => Some(BackendKind::PosixPath),
        "shared_posix_path" => Some(BackendKind::SharedPosixPath),
        "memory" => Some(BackendKind::Memory),
        _ => None,
    }
}

/// Builds and populates the backend registry from the parsed config's
/// `[[namespaces]]` table (spec.md §6), run once at startup before any
/// endpoint accepts a connection.
pub fn build_backend_registry(config: &Config) -> Result<BackendRegistry, LifecycleError> {
    let registry = BackendRegistry::new();
    for ns in &config.namespaces {
        let kind = parse_backend_kind(&ns.kind)
            .ok_or_else(|| LifecycleError::UnknownBackendKind { nsid: ns.nsid.clone(), kind: ns.kind.clone() })?;
        let mountpoint_str = ns.mountpoint.to_string_lossy().into_owned();
        validate_mountpoint(kind, &mountpoint_str)
            .map_err(|_| LifecycleError::MountpointMissing { nsid: ns.nsid.clone(), path: ns.mountpoint.clone() })?;
        let capacity_bytes = ns
            .capacity
            .as_deref()
            .map(norns_core::config::parse_capacity)
            .transpose()
            .map_err(|source| LifecycleError::InvalidCapacity { nsid: ns.nsid.clone(), source })?;
        let visibility = match ns.visibility {
            NamespaceVisibility::Global => Visibility::Global,
            NamespaceVisibility::JobPrivate => Visibility::JobPrivate,
        };

        let record = BackendRecord::new(norns_core::NamespaceId::new(ns.nsid.clone()), kind, mountpoint_str)
            .track_contents(ns.track_contents)
            .capacity_bytes(capacity_bytes)
            .visibility(visibility);
        registry.register(record)?;
    }
    Ok(registry)
}

/// Installs `SIGTERM`/`SIGINT` handlers that call [`AppState::begin_shutdown`],
/// and a `SIGHUP` handler that logs and otherwise ignores the signal
/// (spec.md §4.8: "SIGHUP is reserved and ignored"). Runs for the life of
/// the process as a background tokio task.
pub fn install_signal_handlers(state: Arc<AppState>) -> Result<(), std::io::Error> {
    let mut terminate = signal(SignalKind::terminate())?;
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut hangup = signal(SignalKind::hangup())?;

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = terminate.recv() => {
                    tracing::info!("received SIGTERM, shutting down");
                    state.begin_shutdown();
                    break;
                }
                _ = interrupt.recv() => {
                    tracing::info!("received SIGINT, shutting down");
                    state.begin_shutdown();
                    break;
                }
                _ = hangup.recv() => {
                    tracing::debug!("received SIGHUP, ignoring");
                }
            }
        }
    });

    Ok(())
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
