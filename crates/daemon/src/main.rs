// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! norns daemon entry point: parses a config file path, assembles the
//! registries/worker pool/task manager, binds the three endpoints spec.md
//! §4.2 defines, and runs until a shutdown signal arrives. The assembly
//! order below follows the grounding repo's `lifecycle::startup` — acquire
//! the pidfile first, then build in-memory state, then bind sockets last —
//! so a second instance racing the same config dies on the lock rather
//! than partially unlinking a running instance's sockets.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod backend;
mod dispatch;
mod endpoints;
mod lifecycle;
mod memory;
mod registries;
mod remote_protocol;
mod session;
mod state;
mod task_manager;
mod transfer;
mod worker_pool;

use clap::Parser;
use norns_core::Config;
use state::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use transfer::{ChunkSize, TransferorMatrix};
use worker_pool::WorkerPool;

/// The norns data-movement daemon.
#[derive(Debug, Parser)]
#[command(name = "nornsd", version, about = "norns data-movement daemon")]
struct Cli {
    /// Path to the daemon's TOML configuration file.
    #[arg(short, long, default_value = "/etc/norns/norns.toml")]
    config: PathBuf,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, path = %cli.config.display(), "failed to load configuration");
            return std::process::ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            tracing::error!(error = %err, "failed to start tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(config)) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "daemon exited with an error");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let settings = &config.global_settings;

    // Acquire the pidfile before anything else that's observable (a stale
    // socket left behind by a crashed instance is still safe to unlink;
    // two live daemons fighting over the same sockets is not).
    let pidfile = lifecycle::PidfileGuard::acquire(&settings.pidfile)?;

    let backends = Arc::new(lifecycle::build_backend_registry(&config)?);
    let jobs = Arc::new(registries::JobRegistry::new());
    let matrix = Arc::new(TransferorMatrix::with_default_entries(ChunkSize::default()));
    let memory = Arc::new(memory::MemoryArena::new());

    let connect_timeout = Duration::from_secs(10);
    let pool = Arc::new(WorkerPool::new(
        settings.workers.max(1) as usize,
        settings.backlog_size.max(1) as usize,
        Arc::clone(&memory),
        settings.remote_port,
        settings.staging_directory.clone(),
        connect_timeout,
    )?);

    let tasks = Arc::new(task_manager::TaskManager::new(
        Arc::clone(&backends),
        Arc::clone(&jobs),
        Arc::clone(&matrix),
        Arc::clone(&pool),
        settings.backlog_size.max(1) as usize,
    ));

    let state = Arc::new(AppState::new(
        backends,
        jobs,
        tasks,
        matrix,
        memory,
        settings.remote_port,
        settings.staging_directory.clone(),
        connect_timeout,
    ));

    lifecycle::install_signal_handlers(Arc::clone(&state))?;

    let endpoints = endpoints::Endpoints::bind(
        &settings.global_socket,
        &settings.control_socket,
        &settings.bind_address,
        settings.remote_port,
    )
    .await?;

    tracing::info!("nornsd ready");
    endpoints.serve(state).await;
    drop(pidfile);
    Ok(())
}
