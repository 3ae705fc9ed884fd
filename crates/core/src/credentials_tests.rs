// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn resolve_prefers_explicit_triple_over_socket() {
    let socket = Credentials::new(100, 1000, 1000);
    let explicit = ProcessTriple::new(2000, 2000, 200);
    let resolved = Credentials::resolve(socket, Some(explicit));
    assert_eq!(resolved, Credentials::new(200, 2000, 2000));
}

#[test]
fn resolve_falls_back_to_socket_credentials() {
    let socket = Credentials::new(100, 1000, 1000);
    let resolved = Credentials::resolve(socket, None);
    assert_eq!(resolved, socket);
}

#[test]
fn as_triple_reorders_fields() {
    let creds = Credentials::new(42, 7, 8);
    assert_eq!(creds.as_triple(), ProcessTriple::new(7, 8, 42));
}
