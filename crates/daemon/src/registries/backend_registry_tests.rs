// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn record(nsid: &str) -> BackendRecord {
    BackendRecord::new(NamespaceId::new(nsid), BackendKind::PosixPath, "/mnt/nvm0")
}

#[test]
fn duplicate_register_is_rejected() {
    let registry = BackendRegistry::new();
    registry.register(record("nvm0")).unwrap();
    assert_eq!(registry.register(record("nvm0")), Err(BackendRegistryError::NamespaceExists));
}

#[test]
fn unregister_requires_no_pending_tasks() {
    let registry = BackendRegistry::new();
    registry.register(record("nvm0")).unwrap();
    let nsid = NamespaceId::new("nvm0");
    assert_eq!(registry.unregister(&nsid, true), Err(BackendRegistryError::NamespaceNotEmpty));
    registry.unregister(&nsid, false).unwrap();
    assert_eq!(registry.unregister(&nsid, false), Err(BackendRegistryError::NoSuchNamespace));
}

#[test]
fn update_changes_only_provided_fields() {
    let registry = BackendRegistry::new();
    registry.register(record("nvm0")).unwrap();
    let nsid = NamespaceId::new("nvm0");
    registry.update(&nsid, Some(true), None).unwrap();
    let after = registry.get(&nsid).unwrap();
    assert!(after.track_contents);
    assert_eq!(after.capacity_bytes, None);

    registry.update(&nsid, None, Some(Some(4096))).unwrap();
    assert_eq!(registry.get(&nsid).unwrap().capacity_bytes, Some(4096));
}

#[test]
fn resolve_returns_registered_backend_without_synthesis() {
    let registry = BackendRegistry::new();
    registry.register(record("nvm0")).unwrap();
    let resolved = registry.resolve(&NamespaceId::new("nvm0"), Some("node02")).unwrap();
    assert_eq!(resolved.mountpoint, "/mnt/nvm0");
}

#[test]
fn resolve_synthesizes_remote_backend_for_unknown_nsid_with_host() {
    let registry = BackendRegistry::new();
    let resolved = registry.resolve(&NamespaceId::new("ghost"), Some("node07")).unwrap();
    assert_eq!(resolved.mountpoint, "remote://node07");
}

#[test]
fn resolve_fails_for_unknown_nsid_without_host() {
    let registry = BackendRegistry::new();
    assert_eq!(
        registry.resolve(&NamespaceId::new("ghost"), None),
        Err(BackendRegistryError::NoSuchNamespace)
    );
}

#[test]
fn register_unregister_round_trip_restores_empty_registry() {
    let registry = BackendRegistry::new();
    for n in 0..3 {
        registry.register(record(&format!("nvm{n}"))).unwrap();
    }
    assert_eq!(registry.len(), 3);
    for n in 0..3 {
        registry.unregister(&NamespaceId::new(format!("nvm{n}")), false).unwrap();
    }
    assert!(registry.is_empty());
}
