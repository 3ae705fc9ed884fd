// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors surfaced to callers of [`crate::NornsClient`]. Grounded on the
//! grounding repo's `ClientError` shape (`cli/src/client.rs`): a thin enum
//! distinguishing "couldn't reach the daemon" from "the daemon answered
//! with an error code" from "the daemon answered with the wrong response
//! shape for this request".

use norns_core::ErrorCode;
use norns_wire::ProtocolError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("cannot connect to daemon at {path}: {source}")]
    Connect { path: PathBuf, #[source] source: std::io::Error },

    #[error("lost connection to daemon: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("daemon reported an error: {0}")]
    Daemon(ErrorCode),

    #[error("daemon sent an unexpected response for this request")]
    UnexpectedResponse,
}

impl ClientError {
    /// The [`ErrorCode`] this error maps onto, for a CLI's exit-code logic.
    /// Connection and protocol failures get their own codes (spec.md §6's
    /// `connection_failed`/`rpc_send_failed`/`rpc_recv_failed`) rather than
    /// a generic failure, so scripts can distinguish "daemon down" from
    /// "daemon rejected the request".
    pub fn error_code(&self) -> ErrorCode {
        match self {
            ClientError::Connect { .. } => ErrorCode::ConnectionFailed,
            ClientError::Protocol(_) => ErrorCode::RpcRecvFailed,
            ClientError::Daemon(code) => *code,
            ClientError::UnexpectedResponse => ErrorCode::Snafu,
        }
    }
}
