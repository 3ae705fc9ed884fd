// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Acceptor side of the cross-node transfer protocol (spec.md §4.7).
//! Distinct from `crate::session`: connections on the remote (TCP)
//! endpoint never carry a `norns_wire::Request`, only a `RemoteRequest`
//! from a peer daemon acting as initiator. One connection carries exactly
//! one RPC and its one reply, matching `PathToRemote`/`RemoteToPath`'s
//! dial-send-recv-close pattern on the initiator side
//! (`crate::transfer::path_transferors`).

use crate::backend::resolve_path;
use crate::state::AppState;
use crate::transfer::TransferContext;
use norns_core::{ErrorCode, Operation, ProcessTriple, ResourceDescriptor, ResourceKind, SystemClock, Task, TaskId};
use norns_wire::{read_decoded, write_encoded, RemoteReply, RemoteRequest, TransferHandle};
use std::io::Read;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

/// Handles one remote-protocol connection end to end: reads the single
/// RPC it carries, services it, and writes the single reply.
pub async fn serve_connection(mut stream: TcpStream, state: Arc<AppState>) {
    let request: RemoteRequest = match read_decoded(&mut stream).await {
        Ok(request) => request,
        Err(err) => {
            tracing::warn!(error = %err, "failed to read remote request");
            return;
        }
    };

    match request {
        RemoteRequest::PushResource {
            origin_task_id,
            job_id,
            destination,
            handle,
            is_collection,
            members,
            ..
        } => {
            let bytes = match materialise_handle(&mut stream, handle).await {
                Ok(bytes) => bytes,
                Err(code) => {
                    let _ = write_encoded(
                        &mut stream,
                        &RemoteReply { origin_task_id, error: code, bytes_transferred: 0 },
                    )
                    .await;
                    return;
                }
            };

            let reply = accept_push(&state, origin_task_id, job_id, destination, bytes, is_collection, members).await;
            if let Err(err) = write_encoded(&mut stream, &reply).await {
                tracing::warn!(error = %err, "failed to write remote push reply");
            }
        }

        RemoteRequest::PullResource { origin_task_id, source, .. } => match expose_pull(&state, source).await {
            Ok(handle) => {
                if let Err(err) = write_encoded(&mut stream, &handle).await {
                    tracing::warn!(error = %err, "failed to write remote pull handle");
                }
            }
            Err(err) => {
                tracing::warn!(task_id = origin_task_id.get(), %err, "rejecting a pull_resource request");
            }
        },
    }
}

/// Reads the bytes a `push_resource` RPC carries, pulling a follow-up
/// stream off the same connection when the initiator chose that handle
/// kind (spec.md §4.7 "a follow-up data channel, at implementation
/// discretion"). `PreRegisteredMemory` names an address in the
/// initiator's own process, which cannot be dereferenced from here — this
/// daemon's `memory_region` handles are opaque to a single process by
/// design (`crate::memory`), so that handle kind is rejected.
async fn materialise_handle(stream: &mut TcpStream, handle: TransferHandle) -> Result<Vec<u8>, ErrorCode> {
    match handle {
        TransferHandle::Inline { bytes } => Ok(bytes),
        TransferHandle::FollowUpStream { total_len } => {
            let mut bytes = vec![0u8; total_len as usize];
            stream.read_exact(&mut bytes).await.map_err(|_| ErrorCode::RpcRecvFailed)?;
            Ok(bytes)
        }
        TransferHandle::PreRegisteredMemory { .. } => Err(ErrorCode::NotSupported),
    }
}

async fn accept_push(
    state: &Arc<AppState>,
    origin_task_id: TaskId,
    job_id: norns_core::JobId,
    destination: ResourceDescriptor,
    bytes: Vec<u8>,
    is_collection: bool,
    members: Vec<norns_wire::CollectionMember>,
) -> RemoteReply {
    let outcome = accept_push_inner(state, job_id, destination, bytes, is_collection, members).await;
    match outcome {
        Ok(written) => RemoteReply { origin_task_id, error: ErrorCode::Success, bytes_transferred: written },
        Err(code) => RemoteReply { origin_task_id, error: code, bytes_transferred: 0 },
    }
}

async fn accept_push_inner(
    state: &Arc<AppState>,
    job_id: norns_core::JobId,
    destination: ResourceDescriptor,
    bytes: Vec<u8>,
    is_collection: bool,
    members: Vec<norns_wire::CollectionMember>,
) -> Result<u64, ErrorCode> {
    let nsid = destination.nsid().ok_or(ErrorCode::BadArgs)?;
    state.backends.resolve(nsid, destination.host()).map_err(ErrorCode::from)?;

    let transferor = state
        .matrix
        .get(ResourceKind::RemoteResource, destination.kind())
        .ok_or(ErrorCode::NotSupported)?;

    let ctx = TransferContext {
        backends: Arc::clone(&state.backends),
        memory: Arc::clone(&state.memory),
        credentials: ProcessTriple::new(0, 0, 0),
        cancelled: Arc::new(AtomicBool::new(false)),
        remote_port: state.remote_port,
        staging_directory: state.staging_directory.clone(),
        connect_timeout: state.connect_timeout,
    };
    let source = ResourceDescriptor::RemoteResource {
        nsid: nsid.clone(),
        host: String::new(),
        path: String::new(),
    };
    let task = Task::new(
        TaskId::new(0),
        job_id,
        Operation::Copy,
        source,
        destination,
        ProcessTriple::new(0, 0, 0),
        &SystemClock,
    );

    // A collection push is materialised member-by-member directly here,
    // since `accept_transfer`'s contract (spec.md §4.6) is a flat byte
    // buffer; only the non-collection path goes through the transferor.
    if is_collection {
        return tokio::task::spawn_blocking(move || write_collection(&ctx, &task, &bytes, &members))
            .await
            .map_err(|_| ErrorCode::Snafu)?;
    }

    tokio::task::spawn_blocking(move || transferor.accept_transfer(&ctx, &task, bytes))
        .await
        .map_err(|_| ErrorCode::Snafu)?
}

fn write_collection(
    ctx: &TransferContext,
    task: &Task,
    bytes: &[u8],
    members: &[norns_wire::CollectionMember],
) -> Result<u64, ErrorCode> {
    let record = ctx.backends.get(task.destination.nsid().ok_or(ErrorCode::BadArgs)?).ok_or(ErrorCode::NoSuchNamespace)?;
    let root_relative = match &task.destination {
        ResourceDescriptor::LocalPosixPath { path, .. } | ResourceDescriptor::SharedPosixPath { path, .. } => path,
        _ => return Err(ErrorCode::BadArgs),
    };
    let dst_root = resolve_path(&record, root_relative).map_err(ErrorCode::from)?;
    let tmp_root = {
        let mut name = dst_root.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".norns-staging");
        dst_root.with_file_name(name)
    };

    std::fs::create_dir_all(&tmp_root).map_err(|_| ErrorCode::SystemError)?;
    let mut offset = 0usize;
    let mut total = 0u64;
    for member in members {
        let end = offset + member.size as usize;
        let slice = bytes.get(offset..end).ok_or(ErrorCode::BadRequest)?;
        let member_path = tmp_root.join(&member.relative_path);
        if let Some(parent) = member_path.parent() {
            std::fs::create_dir_all(parent).map_err(|_| ErrorCode::SystemError)?;
        }
        if std::fs::write(&member_path, slice).is_err() {
            let _ = std::fs::remove_dir_all(&tmp_root);
            return Err(ErrorCode::SystemError);
        }
        offset = end;
        total += member.size;
    }
    std::fs::rename(&tmp_root, &dst_root).map_err(|_| ErrorCode::SystemError)?;
    Ok(total)
}

/// Exposes a local resource's bytes for a peer's `pull_resource` RPC.
/// Only single files and memory regions are supported (spec.md §4.7
/// describes collection framing for pushes only); a directory source is
/// rejected with `not_supported` rather than silently flattened.
async fn expose_pull(state: &Arc<AppState>, source: ResourceDescriptor) -> Result<TransferHandle, ErrorCode> {
    match &source {
        ResourceDescriptor::MemoryRegion { address, size } => {
            let bytes = state.memory.read(*address, *size).map_err(|_| ErrorCode::NoSuchResource)?;
            Ok(TransferHandle::Inline { bytes })
        }
        ResourceDescriptor::LocalPosixPath { .. } | ResourceDescriptor::SharedPosixPath { .. } => {
            let nsid = source.nsid().ok_or(ErrorCode::BadArgs)?;
            let record = state.backends.resolve(nsid, source.host()).map_err(ErrorCode::from)?;
            let relative = match &source {
                ResourceDescriptor::LocalPosixPath { path, .. } | ResourceDescriptor::SharedPosixPath { path, .. } => path.clone(),
                _ => unreachable!(),
            };
            let path = resolve_path(&record, &relative).map_err(ErrorCode::from)?;
            if path.is_dir() {
                return Err(ErrorCode::NotSupported);
            }
            let bytes = tokio::task::spawn_blocking(move || {
                let mut file = std::fs::File::open(&path).map_err(|_| ErrorCode::NoSuchResource)?;
                let mut bytes = Vec::new();
                file.read_to_end(&mut bytes).map_err(|_| ErrorCode::SystemError)?;
                Ok::<_, ErrorCode>(bytes)
            })
            .await
            .map_err(|_| ErrorCode::Snafu)??;
            Ok(TransferHandle::Inline { bytes })
        }
        _ => Err(ErrorCode::BadArgs),
    }
}
