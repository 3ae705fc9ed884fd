// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `norns`: the batch-job-facing demo CLI (spec.md §6 "CLI surface") for
//! submitting an I/O task and polling it to completion against the local
//! endpoint. Distinct from `nornsctl`, which talks to the control socket
//! for administrative commands.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use norns_client::NornsClient;
use norns_core::{JobId, NamespaceId, Operation, ResourceDescriptor};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Subcommand)]
enum Command {
    /// Check whether the daemon is reachable.
    Ping,
    /// Submit a copy/move/remove task and print its task id.
    Submit {
        job_id: u32,
        operation: OperationArg,
        #[arg(long)]
        source_nsid: String,
        #[arg(long)]
        source_path: String,
        #[arg(long)]
        destination_nsid: Option<String>,
        #[arg(long)]
        destination_path: Option<String>,
    },
    /// Poll a task until it reaches a terminal state, printing the result.
    Status { task_id: u32, #[arg(long, default_value = "500")] poll_interval_ms: u64, #[arg(long, default_value = "120")] attempts: usize },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OperationArg {
    Copy,
    Move,
    Remove,
}

impl From<OperationArg> for Operation {
    fn from(arg: OperationArg) -> Self {
        match arg {
            OperationArg::Copy => Operation::Copy,
            OperationArg::Move => Operation::Move,
            OperationArg::Remove => Operation::Remove,
        }
    }
}

#[derive(Parser)]
#[command(name = "norns", version, about = "norns batch-job client")]
struct Cli {
    /// Path to the daemon's local (non-control) socket.
    #[arg(long, default_value = "/var/run/norns/global.socket")]
    socket: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("norns: {err:#}");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let client = NornsClient::connect(&cli.socket).await.with_context(|| format!("connecting to {}", cli.socket.display()))?;

    match cli.command {
        Command::Ping => {
            client.ping().await?;
            println!("ok");
        }
        Command::Submit { job_id, operation, source_nsid, source_path, destination_nsid, destination_path } => {
            let source = ResourceDescriptor::LocalPosixPath { nsid: NamespaceId::new(source_nsid), path: source_path };
            let destination = destination_nsid
                .map(|nsid| ResourceDescriptor::LocalPosixPath { nsid: NamespaceId::new(nsid), path: destination_path.unwrap_or_default() });
            let task_id = client.iotask_submit(JobId::new(job_id), operation.into(), source, destination, None).await?;
            println!("{}", task_id.get());
        }
        Command::Status { task_id, poll_interval_ms, attempts } => {
            let task_id = norns_core::TaskId::new(task_id);
            let report = client
                .wait_for_task(task_id, Duration::from_millis(poll_interval_ms), attempts)
                .await?
                .context("task did not reach a terminal state before the polling budget ran out")?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
