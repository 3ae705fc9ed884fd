// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration model.
//!
//! Parses the `[global_settings]` table and `[[namespaces]]` array spec.md
//! §6 defines. Field names and defaults are grounded on the original
//! implementation's `src/config/defaults.hpp`. This is not a general
//! purpose config layer — only the fields spec.md §6 names, plus
//! `dry_run`'s companion duration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: PathBuf, #[source] source: std::io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse { path: PathBuf, #[source] source: toml::de::Error },
    #[error("invalid capacity value {0:?}")]
    InvalidCapacity(String),
}

/// Global daemon settings (spec.md §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalSettings {
    pub use_syslog: bool,
    pub log_file: Option<PathBuf>,
    pub log_file_max_size: u32,
    pub dry_run: bool,
    pub global_socket: PathBuf,
    pub control_socket: PathBuf,
    pub bind_address: String,
    pub remote_port: u16,
    pub pidfile: PathBuf,
    pub workers: u32,
    pub staging_directory: PathBuf,
    pub backlog_size: u32,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            use_syslog: false,
            log_file: None,
            log_file_max_size: 4 * 1024 * 1024,
            dry_run: false,
            global_socket: PathBuf::from("/var/run/norns/global.socket"),
            control_socket: PathBuf::from("/var/run/norns/control.socket"),
            bind_address: "0.0.0.0".into(),
            remote_port: 50_098,
            pidfile: PathBuf::from("/var/run/norns/norns.pid"),
            workers: 8,
            staging_directory: PathBuf::from("/var/run/norns/staging"),
            backlog_size: 256,
        }
    }
}

/// One `[[namespaces]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceConfig {
    pub nsid: String,
    #[serde(default)]
    pub track_contents: bool,
    pub mountpoint: PathBuf,
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable capacity, e.g. `"500GiB"`. Parsed with
    /// [`parse_capacity`]; `None`/absent means unbounded.
    #[serde(default)]
    pub capacity: Option<String>,
    #[serde(default)]
    pub visibility: NamespaceVisibility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamespaceVisibility {
    #[default]
    Global,
    JobPrivate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub global_settings: GlobalSettings,
    #[serde(default)]
    pub namespaces: Vec<NamespaceConfig>,
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }
}

/// Parses a human-readable capacity string like `"500GiB"`, `"2TB"`, or a
/// bare byte count, into a byte count. Accepts both SI (KB/MB/GB/TB, base
/// 1000) and IEC (KiB/MiB/GiB/TiB, base 1024) suffixes, matching the
/// spec's `[[namespaces]].capacity` field.
pub fn parse_capacity(s: &str) -> Result<u64, ConfigError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ConfigError::InvalidCapacity(s.to_string()));
    }

    let split_at = s.find(|c: char| !c.is_ascii_digit() && c != '.').unwrap_or(s.len());
    let (number, suffix) = s.split_at(split_at);
    let value: f64 = number.parse().map_err(|_| ConfigError::InvalidCapacity(s.to_string()))?;

    let multiplier: f64 = match suffix.trim() {
        "" | "B" => 1.0,
        "K" | "KB" => 1_000.0,
        "KiB" => 1_024.0,
        "M" | "MB" => 1_000_000.0,
        "MiB" => 1_024.0 * 1_024.0,
        "G" | "GB" => 1_000_000_000.0,
        "GiB" => 1_024.0 * 1_024.0 * 1_024.0,
        "T" | "TB" => 1_000_000_000_000.0,
        "TiB" => 1_024.0 * 1_024.0 * 1_024.0 * 1_024.0,
        _ => return Err(ConfigError::InvalidCapacity(s.to_string())),
    };

    if value < 0.0 {
        return Err(ConfigError::InvalidCapacity(s.to_string()));
    }

    Ok((value * multiplier) as u64)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
