// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! norns-wire: the wire protocol shared between `nornsd`, `norns-client`,
//! and daemon-to-daemon remote transfer traffic.
//!
//! Wire format: 8-byte length prefix (big-endian) + JSON payload.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod codec;
mod remote;
mod request;
mod response;

pub use codec::{
    decode, encode, read_decoded, read_decoded_sync, read_message, read_message_sync,
    write_encoded, write_encoded_sync, write_message, write_message_sync, ProtocolError,
    HEADER_LEN, MAX_MESSAGE_LEN,
};
pub use remote::{CollectionMember, RemoteReply, RemoteRequest, TransferHandle};
pub use request::{Command, IncomingRequest, Request};
pub use response::{GlobalStatusSnapshot, Response, TaskStatusReport};

#[cfg(test)]
mod property_tests;
