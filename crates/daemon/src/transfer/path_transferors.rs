// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concrete transferors for the pairs spec.md §4.6's table requires:
//! `PathToPath` (local/shared <-> local/shared), `MemoryToPath` (memory
//! region -> path), `PathToRemote` (push to a peer daemon), and
//! `RemoteToPath` (pull from, or accept a push from, a peer daemon).
//! Grounded on the original source's `transferor_registry` file list
//! (`local-path-to-shared-path.hpp`, `memory-to-remote-path.cpp`,
//! `remote-resource-to-local-path.hpp`) — a streaming read-chunk/
//! write-chunk loop per pair, generalised here behind one shared
//! `stream_copy`/`copy_tree` helper instead of one struct per original
//! file, since the Rust encoding collapses the pair's direction into a
//! single resolve-then-copy body.

use super::transferor::{TransferContext, Transferor};
use norns_core::{ErrorCode, Operation, ResourceDescriptor, Task};
use norns_wire::{CollectionMember, RemoteReply, RemoteRequest, TransferHandle};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Streaming chunk size for path-to-path and path-to-memory transferors
/// (spec.md §4.6, default 8 KiB).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSize(pub usize);

impl Default for ChunkSize {
    fn default() -> Self {
        ChunkSize(8 * 1024)
    }
}

fn resolve_local_path(
    ctx: &TransferContext,
    descriptor: &ResourceDescriptor,
) -> Result<PathBuf, ErrorCode> {
    let nsid = descriptor.nsid().ok_or(ErrorCode::BadArgs)?;
    let record = ctx.backends.resolve(nsid, descriptor.host()).map_err(|_| ErrorCode::NoSuchNamespace)?;
    let relative = match descriptor {
        ResourceDescriptor::LocalPosixPath { path, .. } | ResourceDescriptor::SharedPosixPath { path, .. } => path,
        _ => return Err(ErrorCode::BadArgs),
    };
    crate::backend::resolve_path(&record, relative).map_err(ErrorCode::from)
}

/// Copies one file in chunks, checking cancellation between reads.
fn stream_copy(ctx: &TransferContext, src: &Path, dst: &Path, chunk_size: usize) -> Result<u64, ErrorCode> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|_| ErrorCode::SystemError)?;
    }
    let mut reader = File::open(src).map_err(|_| ErrorCode::SystemError)?;
    let mut writer = File::create(dst).map_err(|_| ErrorCode::SystemError)?;
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut total = 0u64;
    loop {
        if ctx.is_cancelled() {
            return Err(ErrorCode::Cancelled);
        }
        let n = reader.read(&mut buf).map_err(|_| ErrorCode::SystemError)?;
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n]).map_err(|_| ErrorCode::SystemError)?;
        total += n as u64;
    }
    Ok(total)
}

/// Recursively copies a directory tree, one file at a time via
/// [`stream_copy`]. Local/shared path descriptors carry no `is_collection`
/// flag (only `remote_resource` does, spec.md §3); directory-ness is
/// simply discovered with `stat` since both ends share a filesystem
/// namespace model.
fn copy_tree(ctx: &TransferContext, src: &Path, dst: &Path, chunk_size: usize) -> Result<u64, ErrorCode> {
    if src.is_dir() {
        fs::create_dir_all(dst).map_err(|_| ErrorCode::SystemError)?;
        let mut total = 0u64;
        let entries = fs::read_dir(src).map_err(|_| ErrorCode::SystemError)?;
        for entry in entries {
            let entry = entry.map_err(|_| ErrorCode::SystemError)?;
            total += copy_tree(ctx, &entry.path(), &dst.join(entry.file_name()), chunk_size)?;
        }
        Ok(total)
    } else {
        stream_copy(ctx, src, dst, chunk_size)
    }
}

fn remove_tree(path: &Path) -> std::io::Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// `local_posix_path`/`shared_posix_path` on both ends (spec.md §4.6's
/// "copy via read+write streams" and "reverse of above" entries, and the
/// `shared_posix_path -> shared_posix_path` no-op-copy entry — within a
/// single namespace the copy is a real filesystem copy either way, since
/// this crate has no separate record-only fast path for same-namespace
/// moves).
pub struct PathToPath {
    chunk_size: ChunkSize,
}

impl PathToPath {
    pub fn new(chunk_size: ChunkSize) -> Self {
        Self { chunk_size }
    }
}

impl Transferor for PathToPath {
    fn validate(&self, task: &Task) -> bool {
        matches!(task.operation, Operation::Copy | Operation::Move)
            && matches!(
                task.source,
                ResourceDescriptor::LocalPosixPath { .. } | ResourceDescriptor::SharedPosixPath { .. }
            )
            && matches!(
                task.destination,
                ResourceDescriptor::LocalPosixPath { .. } | ResourceDescriptor::SharedPosixPath { .. }
            )
    }

    fn transfer(&self, ctx: &TransferContext, task: &Task) -> Result<u64, ErrorCode> {
        let src_path = resolve_local_path(ctx, &task.source)?;
        let dst_path = resolve_local_path(ctx, &task.destination)?;
        let bytes = copy_tree(ctx, &src_path, &dst_path, self.chunk_size.0)?;
        if task.operation == Operation::Move {
            remove_tree(&src_path).map_err(|_| ErrorCode::SystemError)?;
        }
        Ok(bytes)
    }
}

/// Deletes the resource named by a task's `source` (spec.md §4.6: "for
/// remove, only the destination slot is populated" in the original's
/// wording, but this crate's `iotask_submit` contract — spec.md §4.3 —
/// always carries `source` and only omits `destination` for `remove`, so
/// it is `source` that names the thing being deleted here; see
/// DESIGN.md).
pub struct RemovePath;

impl Transferor for RemovePath {
    fn validate(&self, task: &Task) -> bool {
        task.operation == Operation::Remove
            && matches!(
                task.source,
                ResourceDescriptor::LocalPosixPath { .. } | ResourceDescriptor::SharedPosixPath { .. }
            )
    }

    fn transfer(&self, ctx: &TransferContext, task: &Task) -> Result<u64, ErrorCode> {
        let path = resolve_local_path(ctx, &task.source)?;
        let size = tree_size(&path).unwrap_or(0);
        remove_tree(&path).map_err(|_| ErrorCode::SystemError)?;
        Ok(size)
    }
}

fn tree_size(path: &Path) -> std::io::Result<u64> {
    let meta = fs::symlink_metadata(path)?;
    if meta.is_dir() {
        let mut total = 0;
        for entry in fs::read_dir(path)? {
            total += tree_size(&entry?.path())?;
        }
        Ok(total)
    } else {
        Ok(meta.len())
    }
}

/// `memory_region -> local_posix_path` / `memory_region -> shared_posix_path`
/// (spec.md §4.6 "write-out to local/shared path").
pub struct MemoryToPath {
    chunk_size: ChunkSize,
}

impl MemoryToPath {
    pub fn new(chunk_size: ChunkSize) -> Self {
        Self { chunk_size }
    }
}

impl Transferor for MemoryToPath {
    fn validate(&self, task: &Task) -> bool {
        matches!(task.source, ResourceDescriptor::MemoryRegion { .. })
            && matches!(
                task.destination,
                ResourceDescriptor::LocalPosixPath { .. } | ResourceDescriptor::SharedPosixPath { .. }
            )
    }

    fn transfer(&self, ctx: &TransferContext, task: &Task) -> Result<u64, ErrorCode> {
        let (address, size) = match task.source {
            ResourceDescriptor::MemoryRegion { address, size } => (address, size),
            _ => return Err(ErrorCode::BadArgs),
        };
        let bytes = ctx.memory.read(address, size).map_err(|_| ErrorCode::NoSuchResource)?;
        let dst_path = resolve_local_path(ctx, &task.destination)?;
        if let Some(parent) = dst_path.parent() {
            fs::create_dir_all(parent).map_err(|_| ErrorCode::SystemError)?;
        }
        let mut writer = File::create(&dst_path).map_err(|_| ErrorCode::SystemError)?;
        for chunk in bytes.chunks(self.chunk_size.0.max(1)) {
            if ctx.is_cancelled() {
                return Err(ErrorCode::Cancelled);
            }
            writer.write_all(chunk).map_err(|_| ErrorCode::SystemError)?;
        }
        if task.operation == Operation::Move {
            ctx.memory.free(address);
        }
        Ok(bytes.len() as u64)
    }
}

/// Gathers a path or directory tree into one concatenated byte buffer plus
/// a member list, for the tar-like framing spec.md §4.7 describes for
/// collections. A single file is represented as one member.
fn pack_tree(root: &Path) -> std::io::Result<(Vec<u8>, Vec<CollectionMember>)> {
    let mut bytes = Vec::new();
    let mut members = Vec::new();
    pack_tree_inner(root, Path::new(""), &mut bytes, &mut members)?;
    Ok((bytes, members))
}

fn pack_tree_inner(
    abs: &Path,
    relative: &Path,
    bytes: &mut Vec<u8>,
    members: &mut Vec<CollectionMember>,
) -> std::io::Result<()> {
    if abs.is_dir() {
        for entry in fs::read_dir(abs)? {
            let entry = entry?;
            pack_tree_inner(&entry.path(), &relative.join(entry.file_name()), bytes, members)?;
        }
    } else {
        let mut file_bytes = Vec::new();
        File::open(abs)?.read_to_end(&mut file_bytes)?;
        members.push(CollectionMember {
            relative_path: relative.to_string_lossy().into_owned(),
            size: file_bytes.len() as u64,
        });
        bytes.extend_from_slice(&file_bytes);
    }
    Ok(())
}

/// Initiator side of a cross-node push: `local_posix_path`,
/// `shared_posix_path`, and `memory_region` sources all push to a
/// `remote_resource` destination (spec.md §4.6's table).
pub struct PathToRemote {
    chunk_size: ChunkSize,
}

impl PathToRemote {
    pub fn new(chunk_size: ChunkSize) -> Self {
        Self { chunk_size }
    }
}

impl Transferor for PathToRemote {
    fn validate(&self, task: &Task) -> bool {
        matches!(task.operation, Operation::Copy | Operation::Move)
            && matches!(task.destination, ResourceDescriptor::RemoteResource { .. })
    }

    fn transfer(&self, ctx: &TransferContext, task: &Task) -> Result<u64, ErrorCode> {
        let host = match &task.destination {
            ResourceDescriptor::RemoteResource { host, .. } => host.clone(),
            _ => return Err(ErrorCode::BadArgs),
        };
        let source_canonical_name = match &task.source {
            ResourceDescriptor::LocalPosixPath { nsid, path } | ResourceDescriptor::SharedPosixPath { nsid, path } => {
                format!("{nsid}:{path}")
            }
            ResourceDescriptor::MemoryRegion { address, .. } => format!("memory:{address}"),
            _ => return Err(ErrorCode::BadArgs),
        };

        let (payload, is_collection, members) = match &task.source {
            ResourceDescriptor::MemoryRegion { address, size } => {
                let bytes = ctx.memory.read(*address, *size).map_err(|_| ErrorCode::NoSuchResource)?;
                (bytes, false, Vec::new())
            }
            ResourceDescriptor::LocalPosixPath { .. } | ResourceDescriptor::SharedPosixPath { .. } => {
                let src_path = resolve_local_path(ctx, &task.source)?;
                if src_path.is_dir() {
                    let (bytes, members) = pack_tree(&src_path).map_err(|_| ErrorCode::SystemError)?;
                    (bytes, true, members)
                } else {
                    let mut bytes = Vec::new();
                    File::open(&src_path).map_err(|_| ErrorCode::SystemError)?.read_to_end(&mut bytes).map_err(|_| ErrorCode::SystemError)?;
                    (bytes, false, Vec::new())
                }
            }
            _ => return Err(ErrorCode::BadArgs),
        };

        let request = RemoteRequest::PushResource {
            origin_task_id: task.id,
            job_id: task.job_id,
            source_kind_label: task.source.kind().to_string(),
            source_canonical_name,
            destination: task.destination.clone(),
            handle: TransferHandle::Inline { bytes: payload.clone() },
            total_bytes: payload.len() as u64,
            is_collection,
            members,
        };

        let mut stream = ctx.dial(&host).map_err(|_| ErrorCode::RpcSendFailed)?;
        norns_wire::write_encoded_sync(&mut stream, &request).map_err(|_| ErrorCode::RpcSendFailed)?;
        let reply: RemoteReply = norns_wire::read_decoded_sync(&mut stream).map_err(|_| ErrorCode::RpcRecvFailed)?;

        if reply.error != ErrorCode::Success {
            return Err(reply.error);
        }

        if task.operation == Operation::Move {
            match &task.source {
                ResourceDescriptor::MemoryRegion { address, .. } => {
                    ctx.memory.free(*address);
                }
                _ => {
                    let src_path = resolve_local_path(ctx, &task.source)?;
                    remove_tree(&src_path).map_err(|_| ErrorCode::SystemError)?;
                }
            }
        }

        Ok(reply.bytes_transferred)
    }
}

/// `remote_resource -> local_posix_path` / `remote_resource ->
/// shared_posix_path`: pulling from a peer daemon on the initiator side
/// (`transfer`), and accepting a push from a peer daemon on the acceptor
/// side (`accept_transfer`) — spec.md §4.6's table entry "pull from
/// remote daemon (on dst side: `accept_transfer`)".
pub struct RemoteToPath {
    chunk_size: ChunkSize,
}

impl RemoteToPath {
    pub fn new(chunk_size: ChunkSize) -> Self {
        Self { chunk_size }
    }

    fn write_payload(&self, dst_root: &Path, bytes: &[u8], is_collection: bool, members: &[CollectionMember]) -> Result<u64, ErrorCode> {
        if let Some(parent) = dst_root.parent() {
            fs::create_dir_all(parent).map_err(|_| ErrorCode::SystemError)?;
        }
        if !is_collection {
            let tmp = staging_sibling(dst_root);
            fs::write(&tmp, bytes).map_err(|_| ErrorCode::SystemError)?;
            fs::rename(&tmp, dst_root).map_err(|_| ErrorCode::SystemError)?;
            return Ok(bytes.len() as u64);
        }

        // Collections materialise atomically per spec.md §4.7: every
        // member is staged under a temp root and only renamed into place
        // once all members have been written successfully.
        let tmp_root = staging_sibling(dst_root);
        fs::create_dir_all(&tmp_root).map_err(|_| ErrorCode::SystemError)?;
        let mut offset = 0usize;
        let mut total = 0u64;
        for member in members {
            let end = offset + member.size as usize;
            let slice = bytes.get(offset..end).ok_or(ErrorCode::BadRequest)?;
            let member_path = tmp_root.join(&member.relative_path);
            if let Some(parent) = member_path.parent() {
                fs::create_dir_all(parent).map_err(|_| ErrorCode::SystemError)?;
            }
            fs::write(&member_path, slice).map_err(|e| {
                let _ = fs::remove_dir_all(&tmp_root);
                tracing::warn!(error = %e, "failed staging collection member, discarding partial transfer");
                ErrorCode::SystemError
            })?;
            offset = end;
            total += member.size;
        }
        fs::rename(&tmp_root, dst_root).map_err(|_| ErrorCode::SystemError)?;
        Ok(total)
    }
}

fn staging_sibling(dst: &Path) -> PathBuf {
    let mut name = dst.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".norns-staging");
    dst.with_file_name(name)
}

impl Transferor for RemoteToPath {
    fn validate(&self, task: &Task) -> bool {
        matches!(task.operation, Operation::Copy | Operation::Move)
            && matches!(task.source, ResourceDescriptor::RemoteResource { .. })
            && matches!(
                task.destination,
                ResourceDescriptor::LocalPosixPath { .. } | ResourceDescriptor::SharedPosixPath { .. }
            )
    }

    fn transfer(&self, ctx: &TransferContext, task: &Task) -> Result<u64, ErrorCode> {
        let host = match &task.source {
            ResourceDescriptor::RemoteResource { host, .. } => host.clone(),
            _ => return Err(ErrorCode::BadArgs),
        };

        let request = RemoteRequest::PullResource {
            origin_task_id: task.id,
            job_id: task.job_id,
            source: task.source.clone(),
            requested_namespace: task.destination.nsid().cloned(),
        };

        let mut stream = ctx.dial(&host).map_err(|_| ErrorCode::RpcSendFailed)?;
        norns_wire::write_encoded_sync(&mut stream, &request).map_err(|_| ErrorCode::RpcSendFailed)?;
        let handle: TransferHandle = norns_wire::read_decoded_sync(&mut stream).map_err(|_| ErrorCode::RpcRecvFailed)?;

        let bytes = match handle {
            TransferHandle::Inline { bytes } => bytes,
            TransferHandle::FollowUpStream { total_len } => {
                let mut bytes = vec![0u8; total_len as usize];
                std::io::Read::read_exact(&mut stream, &mut bytes).map_err(|_| ErrorCode::RpcRecvFailed)?;
                bytes
            }
            TransferHandle::PreRegisteredMemory { address, size } => {
                ctx.memory.read(address, size).map_err(|_| ErrorCode::NoSuchResource)?
            }
        };

        let dst_path = resolve_local_path(ctx, &task.destination)?;
        self.write_payload(&dst_path, &bytes, false, &[])
    }

    fn accept_transfer(&self, ctx: &TransferContext, task: &Task, bytes: Vec<u8>) -> Result<u64, ErrorCode> {
        let dst_path = resolve_local_path(ctx, &task.destination)?;
        self.write_payload(&dst_path, &bytes, false, &[])
    }
}

#[cfg(test)]
#[path = "path_transferors_tests.rs"]
mod tests;
