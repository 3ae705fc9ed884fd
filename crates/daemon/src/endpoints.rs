// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The three listeners spec.md §4.2 defines, and their shared accept loop.
//! Grounded on the grounding repo's `Listener::run_dual`: a single
//! `tokio::select!` fanning out accepted connections to spawned tasks,
//! generalised here from two transports to three.

use crate::remote_protocol;
use crate::session;
use crate::state::AppState;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::{TcpListener, UnixListener};

pub struct Endpoints {
    local: UnixListener,
    local_path: PathBuf,
    control: UnixListener,
    control_path: PathBuf,
    remote: TcpListener,
}

impl Endpoints {
    /// Unlinks stale socket files and binds all three listeners. The
    /// control socket's permissions are restricted to the owner
    /// (spec.md §4.2) after bind, since `bind` itself honours the
    /// process umask rather than an explicit mode.
    pub async fn bind(
        local_path: &Path,
        control_path: &Path,
        bind_address: &str,
        remote_port: u16,
    ) -> std::io::Result<Self> {
        unlink_if_present(local_path)?;
        unlink_if_present(control_path)?;

        let local = UnixListener::bind(local_path)?;
        let control = UnixListener::bind(control_path)?;
        std::fs::set_permissions(control_path, std::fs::Permissions::from_mode(0o600))?;
        let remote = TcpListener::bind((bind_address, remote_port)).await?;

        tracing::info!(
            local = %local_path.display(),
            control = %control_path.display(),
            bind_address,
            remote_port,
            "endpoints bound"
        );

        Ok(Self {
            local,
            local_path: local_path.to_path_buf(),
            control,
            control_path: control_path.to_path_buf(),
            remote,
        })
    }

    /// Accepts connections on all three listeners until `state`'s
    /// shutdown notification fires, then stops accepting and unlinks the
    /// filesystem sockets (spec.md §4.2 "on shutdown, each endpoint stops
    /// accepting... and, for filesystem sockets, unlinks its address
    /// file"). In-flight sessions are spawned tasks and are left to drain
    /// on their own; this function does not wait for them.
    pub async fn serve(self, state: Arc<AppState>) {
        loop {
            tokio::select! {
                biased;
                () = state.shutdown.cancelled() => break,
                accepted = self.local.accept() => {
                    if let Ok((stream, _addr)) = accepted {
                        let state = Arc::clone(&state);
                        tokio::spawn(async move { session::run_unix_session(stream, state).await });
                    }
                }
                accepted = self.control.accept() => {
                    if let Ok((stream, _addr)) = accepted {
                        let state = Arc::clone(&state);
                        tokio::spawn(async move { session::run_unix_session(stream, state).await });
                    }
                }
                accepted = self.remote.accept() => {
                    if let Ok((stream, _addr)) = accepted {
                        let state = Arc::clone(&state);
                        tokio::spawn(async move { remote_protocol::serve_connection(stream, state).await });
                    }
                }
            }
        }

        let _ = std::fs::remove_file(&self.local_path);
        let _ = std::fs::remove_file(&self.control_path);
        tracing::info!("endpoints stopped accepting");
    }
}

fn unlink_if_present(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}
