// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-connection session pipeline (spec.md §4.1): header-read →
//! body-read → dispatch → response-encode → response-write, repeated for
//! as many requests as the client sends on one connection (spec.md §7:
//! "session continues for subsequent requests on the same connection").
//! Grounded on the grounding repo's `listener::handle_connection`, but
//! simplified where the two architectures diverge: every `norns` handler
//! (spec.md §4.3: "must not perform long-running I/O; task work is always
//! enqueued") returns without ever suspending, so there is no in-flight
//! dispatch to race against a mid-handler disconnect the way the
//! grounding repo's long-running handlers require. The only genuine
//! suspension points here are the awaits around reading and writing
//! frames (spec.md §5), so only the *next* frame read is raced against
//! shutdown.

use crate::dispatch;
use crate::state::AppState;
use norns_core::Credentials;
use norns_wire::{ProtocolError, Request, Response};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::UnixStream;

/// Captures the connecting peer's (pid, uid, gid) via `SO_PEERCRED`
/// (original source: `src/auth/process-credentials.cpp`). Only meaningful
/// for `AF_UNIX` sockets; the remote TCP endpoint speaks a distinct
/// daemon-to-daemon protocol (`crate::remote_protocol`) that carries no
/// client credentials at all.
#[cfg(any(target_os = "linux", target_os = "android"))]
fn peer_credentials(stream: &UnixStream) -> std::io::Result<Credentials> {
    use nix::sys::socket::{getsockopt, sockopt::PeerCredentials};

    let creds = getsockopt(stream, PeerCredentials)
        .map_err(|errno| std::io::Error::from_raw_os_error(errno as i32))?;
    Ok(Credentials::new(creds.pid() as u32, creds.uid(), creds.gid()))
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn peer_credentials(_stream: &UnixStream) -> std::io::Result<Credentials> {
    Ok(Credentials::new(0, 0, 0))
}

/// Runs one session over an accepted local or control socket connection.
/// Never returns an error: any I/O failure simply ends the session
/// (spec.md §4.1 "a session whose peer aborts mid-read is discarded
/// without affecting others").
pub async fn run_unix_session(stream: UnixStream, state: Arc<AppState>) {
    let credentials = match peer_credentials(&stream) {
        Ok(credentials) => credentials,
        Err(err) => {
            tracing::warn!(error = %err, "failed to capture peer credentials, defaulting to zero");
            Credentials::new(0, 0, 0)
        }
    };
    pump(stream, &state, credentials).await;
}

async fn pump<S>(mut stream: S, state: &Arc<AppState>, credentials: Credentials)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        let read_result = tokio::select! {
            biased;
            () = state.shutdown.cancelled() => return,
            result = norns_wire::read_decoded::<_, Request>(&mut stream) => result,
        };

        let request = match read_result {
            Ok(request) => request,
            Err(ProtocolError::Io(_) | ProtocolError::TooLarge(_)) => return,
            Err(ProtocolError::Encode(err)) => {
                tracing::debug!(error = %err, "malformed frame, answering bad_request");
                if send(&mut stream, Response::error(norns_core::ErrorCode::BadRequest)).await.is_err() {
                    return;
                }
                continue;
            }
        };

        tracing::debug!(kind = request.kind(), "dispatching request");
        let response = dispatch::handle_request(state, request, credentials);
        if send(&mut stream, response).await.is_err() {
            return;
        }
    }
}

async fn send<S>(stream: &mut S, response: Response) -> Result<(), ProtocolError>
where
    S: AsyncWrite + Unpin,
{
    norns_wire::write_encoded(stream, &response).await
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
