// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    bare_bytes = { "512", 512 },
    si_kilo = { "2KB", 2_000 },
    iec_kibi = { "2KiB", 2_048 },
    si_giga = { "1GB", 1_000_000_000 },
    iec_gibi = { "1GiB", 1_073_741_824 },
    fractional = { "1.5MiB", 1_572_864 },
)]
fn parses_capacity_suffixes(input: &str, expected: u64) {
    assert_eq!(parse_capacity(input).unwrap(), expected);
}

#[test]
fn rejects_unknown_suffix() {
    assert!(parse_capacity("5XB").is_err());
}

#[test]
fn rejects_empty_string() {
    assert!(parse_capacity("").is_err());
}

#[test]
fn global_settings_defaults_are_sane() {
    let defaults = GlobalSettings::default();
    assert!(!defaults.use_syslog);
    assert!(!defaults.dry_run);
    assert_eq!(defaults.workers, 8);
    assert_eq!(defaults.remote_port, 50_098);
}

#[test]
fn parses_minimal_toml_document() {
    let text = r#"
        [global_settings]
        bind_address = "127.0.0.1"
        remote_port = 9000
        workers = 4

        [[namespaces]]
        nsid = "nvm0"
        mountpoint = "/mnt/nvm0"
        type = "posix_path"
        capacity = "500GiB"
    "#;
    let config = Config::from_toml_str(text).unwrap();
    assert_eq!(config.global_settings.bind_address, "127.0.0.1");
    assert_eq!(config.global_settings.workers, 4);
    assert_eq!(config.namespaces.len(), 1);
    assert_eq!(config.namespaces[0].nsid, "nvm0");
    assert_eq!(parse_capacity(config.namespaces[0].capacity.as_ref().unwrap()).unwrap(), 500 * 1024 * 1024 * 1024);
}

#[test]
fn missing_sections_fall_back_to_defaults() {
    let config = Config::from_toml_str("").unwrap();
    assert_eq!(config.global_settings, GlobalSettings::default());
    assert!(config.namespaces.is_empty());
}
