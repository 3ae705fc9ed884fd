// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Length-prefixed JSON framing.
//!
//! Every message on the wire is an 8-byte big-endian length prefix
//! followed by that many bytes of JSON (spec.md §6's framing contract).
//! `encode`/`decode` work on the JSON payload alone; `write_message`/
//! `read_message` add and strip the length prefix over any
//! `AsyncWrite`/`AsyncRead`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Header width in bytes: an 8-byte big-endian `u64` length prefix.
pub const HEADER_LEN: usize = 8;

/// Largest payload this codec will accept on read, guarding against a
/// corrupt or malicious length prefix forcing an unbounded allocation.
pub const MAX_MESSAGE_LEN: u64 = 256 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("failed to serialize message: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("message length {0} exceeds maximum of {MAX_MESSAGE_LEN}")]
    TooLarge(u64),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serializes `value` to its raw JSON payload, with no length prefix.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(value)?)
}

/// Deserializes a raw JSON payload (no length prefix) into `T`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Writes `payload` to `writer` prefixed with its 8-byte big-endian length.
pub async fn write_message<W>(writer: &mut W, payload: &[u8]) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let len = payload.len() as u64;
    if len > MAX_MESSAGE_LEN {
        return Err(ProtocolError::TooLarge(len));
    }
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one length-prefixed message from `reader` and returns its raw
/// JSON payload (prefix stripped).
pub async fn read_message<R>(reader: &mut R) -> Result<Vec<u8>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_LEN];
    reader.read_exact(&mut header).await?;
    let len = u64::from_be_bytes(header);
    if len > MAX_MESSAGE_LEN {
        return Err(ProtocolError::TooLarge(len));
    }
    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await?;
    Ok(payload)
}

/// Convenience: read a length-prefixed message and decode it as `T`.
pub async fn read_decoded<R, T>(reader: &mut R) -> Result<T, ProtocolError>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let payload = read_message(reader).await?;
    decode(&payload)
}

/// Convenience: encode `value` and write it length-prefixed to `writer`.
pub async fn write_encoded<W, T>(writer: &mut W, value: &T) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let payload = encode(value)?;
    write_message(writer, &payload).await
}

/// Blocking counterpart of [`write_message`], for callers running on a
/// dedicated OS thread rather than inside the tokio runtime (the worker
/// pool's transferors, spec.md §5's "parallel threads" model, dial peer
/// daemons synchronously rather than pulling in an async runtime handle).
pub fn write_message_sync<W>(writer: &mut W, payload: &[u8]) -> Result<(), ProtocolError>
where
    W: std::io::Write,
{
    let len = payload.len() as u64;
    if len > MAX_MESSAGE_LEN {
        return Err(ProtocolError::TooLarge(len));
    }
    writer.write_all(&len.to_be_bytes())?;
    writer.write_all(payload)?;
    writer.flush()?;
    Ok(())
}

/// Blocking counterpart of [`read_message`].
pub fn read_message_sync<R>(reader: &mut R) -> Result<Vec<u8>, ProtocolError>
where
    R: std::io::Read,
{
    let mut header = [0u8; HEADER_LEN];
    reader.read_exact(&mut header)?;
    let len = u64::from_be_bytes(header);
    if len > MAX_MESSAGE_LEN {
        return Err(ProtocolError::TooLarge(len));
    }
    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload)?;
    Ok(payload)
}

/// Blocking counterpart of [`write_encoded`].
pub fn write_encoded_sync<W, T>(writer: &mut W, value: &T) -> Result<(), ProtocolError>
where
    W: std::io::Write,
    T: Serialize,
{
    let payload = encode(value)?;
    write_message_sync(writer, &payload)
}

/// Blocking counterpart of [`read_decoded`].
pub fn read_decoded_sync<R, T>(reader: &mut R) -> Result<T, ProtocolError>
where
    R: std::io::Read,
    T: DeserializeOwned,
{
    let payload = read_message_sync(reader)?;
    decode(&payload)
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
