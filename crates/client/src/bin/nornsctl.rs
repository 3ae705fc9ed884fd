// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `nornsctl`: the daemon's admin CLI (spec.md §6 "CLI surface"). Grounded
//! on the grounding repo's `oj` binary crate — `clap`-derive command
//! groups dispatching into `norns_client::NornsClient`, `anyhow` for
//! top-level error context, process exit code driven by the daemon's
//! reported [`norns_core::ErrorCode`] rather than a blanket failure.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use norns_client::NornsClient;
use norns_core::{JobId, NamespaceId, TaskId};
use std::path::PathBuf;

/// `nornsctl job ...`
#[derive(Subcommand)]
enum JobCommand {
    /// Register a new job.
    Register { job_id: u32, #[arg(long)] host: Vec<String>, #[arg(long = "namespace")] namespaces: Vec<String> },
    /// Update a job's hosts/namespaces.
    Update { job_id: u32, #[arg(long)] host: Vec<String>, #[arg(long = "namespace")] namespaces: Vec<String> },
    /// Unregister a job.
    Unregister { job_id: u32 },
}

/// `nornsctl process ...`
#[derive(Subcommand)]
enum ProcessCommand {
    /// Authorise a process to submit tasks under a job.
    Register { job_id: u32, uid: u32, gid: u32, pid: u32 },
    /// Revoke a process's authorisation.
    Unregister { job_id: u32, uid: u32, gid: u32, pid: u32 },
}

/// `nornsctl namespace ...`
#[derive(Subcommand)]
enum NamespaceCommand {
    /// Register a storage namespace.
    Register {
        nsid: String,
        #[arg(long = "type")]
        kind: String,
        mountpoint: String,
        #[arg(long)]
        track_contents: bool,
        #[arg(long)]
        capacity: Option<u64>,
    },
    /// Update a namespace's tracking/capacity.
    Update { nsid: String, #[arg(long)] track_contents: Option<bool>, #[arg(long)] capacity: Option<u64> },
    /// Unregister a namespace.
    Unregister { nsid: String },
}

#[derive(Subcommand)]
enum Command {
    /// Check whether the daemon is reachable.
    Ping,
    /// Print daemon-wide counters.
    Status,
    /// Stop accepting new I/O tasks.
    PauseAccept,
    /// Resume accepting new I/O tasks.
    ResumeAccept,
    /// Request a graceful shutdown (equivalent to SIGTERM).
    Shutdown,
    /// Poll an I/O task's status.
    TaskStatus { task_id: u32 },
    #[command(subcommand)]
    Job(JobCommand),
    #[command(subcommand)]
    Process(ProcessCommand),
    #[command(subcommand)]
    Namespace(NamespaceCommand),
}

#[derive(Parser)]
#[command(name = "nornsctl", version, about = "norns daemon administration")]
struct Cli {
    /// Path to the daemon's control socket.
    #[arg(long, default_value = "/var/run/norns/control.socket")]
    control_socket: PathBuf,

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
            eprintln!("nornsctl: {err:#}");
            // Every failure here is nonzero (spec.md §6: "exit code 0 on
            // success, nonzero on any daemon-reported error"); the specific
            // ErrorCode is already visible in the printed message.
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let client = NornsClient::connect(&cli.control_socket)
        .await
        .with_context(|| format!("connecting to {}", cli.control_socket.display()))?;

    match cli.command {
        Command::Ping => {
            client.ping().await?;
            println!("ok");
        }
        Command::Status => {
            let snapshot = client.global_status().await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Command::PauseAccept => client.pause_accept().await?,
        Command::ResumeAccept => client.resume_accept().await?,
        Command::Shutdown => client.shutdown().await?,
        Command::TaskStatus { task_id } => {
            let report = client.iotask_status(TaskId::new(task_id)).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Job(command) => job(&client, command).await?,
        Command::Process(command) => process(&client, command).await?,
        Command::Namespace(command) => namespace(&client, command).await?,
    }
    Ok(())
}

async fn job(client: &NornsClient, command: JobCommand) -> Result<()> {
    match command {
        JobCommand::Register { job_id, host, namespaces } => {
            client.job_register(JobId::new(job_id), host, namespaces.into_iter().map(NamespaceId::new).collect(), None).await?;
        }
        JobCommand::Update { job_id, host, namespaces } => {
            client.job_update(JobId::new(job_id), host, namespaces.into_iter().map(NamespaceId::new).collect()).await?;
        }
        JobCommand::Unregister { job_id } => {
            client.job_unregister(JobId::new(job_id)).await?;
        }
    }
    println!("ok");
    Ok(())
}

async fn process(client: &NornsClient, command: ProcessCommand) -> Result<()> {
    match command {
        ProcessCommand::Register { job_id, uid, gid, pid } => {
            client.process_register(JobId::new(job_id), uid, gid, pid).await?;
        }
        ProcessCommand::Unregister { job_id, uid, gid, pid } => {
            client.process_unregister(JobId::new(job_id), uid, gid, pid).await?;
        }
    }
    println!("ok");
    Ok(())
}

async fn namespace(client: &NornsClient, command: NamespaceCommand) -> Result<()> {
    match command {
        NamespaceCommand::Register { nsid, kind, mountpoint, track_contents, capacity } => {
            client.namespace_register(NamespaceId::new(nsid), kind, track_contents, mountpoint, capacity).await?;
        }
        NamespaceCommand::Update { nsid, track_contents, capacity } => {
            client.namespace_update(NamespaceId::new(nsid), track_contents, capacity).await?;
        }
        NamespaceCommand::Unregister { nsid } => {
            client.namespace_unregister(NamespaceId::new(nsid)).await?;
        }
    }
    println!("ok");
    Ok(())
}
