//! End-to-end daemon specs: spawn a real `nornsd` against a scratch
//! config, drive it over its Unix-domain sockets with `norns-client`, and
//! assert on the observable protocol behaviour spec.md §4 and §9 define.
//!
//! Grounded on the shape of the grounding repo's `tests/specs/daemon/*`:
//! a per-test scratch directory, a spawned daemon subprocess, and
//! `wait_for`-style polling for state that only settles asynchronously
//! (socket files appearing, tasks reaching a terminal state).

use assert_cmd::cargo::cargo_bin;
use norns_client::NornsClient;
use norns_core::{ErrorCode, JobId, NamespaceId, Operation, ResourceDescriptor};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;

const WAIT_MAX: Duration = Duration::from_secs(5);

fn wait_for(max: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + max;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}

/// A running `nornsd` bound to sockets under a private scratch directory,
/// killed on drop so a failing assertion never leaks a daemon process.
struct Daemon {
    child: Child,
    dir: TempDir,
    global_socket: PathBuf,
    control_socket: PathBuf,
}

impl Daemon {
    fn spawn_with_namespaces(namespaces_toml: &str) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let global_socket = dir.path().join("global.socket");
        let control_socket = dir.path().join("control.socket");
        let pidfile = dir.path().join("norns.pid");
        let staging_directory = dir.path().join("staging");
        std::fs::create_dir_all(&staging_directory).expect("create staging directory");

        let config = format!(
            r#"
[global_settings]
global_socket = {global_socket:?}
control_socket = {control_socket:?}
pidfile = {pidfile:?}
staging_directory = {staging_directory:?}
bind_address = "127.0.0.1"
remote_port = 0
workers = 2
backlog_size = 16

{namespaces_toml}
"#
        );
        let config_path = dir.path().join("norns.toml");
        std::fs::write(&config_path, config).expect("write config");

        let child = Command::new(cargo_bin("nornsd"))
            .arg("--config")
            .arg(&config_path)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn nornsd");

        let daemon = Self { child, dir, global_socket, control_socket };
        assert!(wait_for(WAIT_MAX, || daemon.global_socket.exists()), "global socket never appeared");
        assert!(wait_for(WAIT_MAX, || daemon.control_socket.exists()), "control socket never appeared");
        daemon
    }

    fn spawn() -> Self {
        Self::spawn_with_namespaces("")
    }

    fn scratch_path(&self) -> &Path {
        self.dir.path()
    }

    async fn client(&self) -> NornsClient {
        NornsClient::connect(&self.global_socket).await.expect("connect to global socket")
    }

    async fn control_client(&self) -> NornsClient {
        NornsClient::connect(&self.control_socket).await.expect("connect to control socket")
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[tokio::test]
async fn ping_succeeds_once_the_daemon_is_up() {
    let daemon = Daemon::spawn();
    daemon.client().await.ping().await.expect("ping should succeed");
}

#[tokio::test]
async fn both_local_and_control_sockets_answer_the_same_protocol() {
    let daemon = Daemon::spawn();
    daemon.client().await.ping().await.expect("local socket should answer ping");
    daemon.control_client().await.ping().await.expect("control socket should answer ping");
}

#[tokio::test]
async fn global_status_reflects_registered_jobs_and_namespaces() {
    let daemon = Daemon::spawn_with_namespaces(
        r#"
[[namespaces]]
nsid = "scratch"
type = "posix_path"
mountpoint = "/tmp"
"#,
    );
    let client = daemon.client().await;

    let before = client.global_status().await.expect("status");
    assert_eq!(before.namespaces, 1, "the configured namespace should already be registered");
    assert_eq!(before.jobs, 0);

    client.job_register(JobId::new(1), vec!["localhost".into()], vec![NamespaceId::new("scratch")], None).await.expect("job_register");

    let after = client.global_status().await.expect("status");
    assert_eq!(after.jobs, 1);
}

#[tokio::test]
async fn registering_the_same_job_twice_is_rejected() {
    let daemon = Daemon::spawn();
    let client = daemon.client().await;

    client.job_register(JobId::new(7), vec![], vec![], None).await.expect("first registration");
    let err = client.job_register(JobId::new(7), vec![], vec![], None).await.expect_err("duplicate should be rejected");
    assert_eq!(err.error_code(), ErrorCode::JobExists);
}

#[tokio::test]
async fn unregistering_a_job_with_an_unknown_namespace_kind_is_rejected() {
    let daemon = Daemon::spawn();
    let client = daemon.client().await;

    let err = client
        .namespace_register(NamespaceId::new("bogus"), "not_a_real_kind", false, "/tmp", None)
        .await
        .expect_err("unknown backend kind should be rejected");
    assert_eq!(err.error_code(), ErrorCode::BadArgs);
}

#[tokio::test]
async fn a_copy_task_runs_to_completion_and_reports_bytes_transferred() {
    let namespaces_toml = r#"
[[namespaces]]
nsid = "scratch"
type = "posix_path"
mountpoint = "__SCRATCH__"
"#
    .replace("__SCRATCH__", &format!("{:?}", std::env::temp_dir()));
    let daemon = Daemon::spawn_with_namespaces(&namespaces_toml);
    let client = daemon.client().await;

    let source_path = daemon.scratch_path().join("source.txt");
    std::fs::write(&source_path, b"hello from the specs suite").expect("write source file");
    let destination_path = daemon.scratch_path().join("destination.txt");

    client.job_register(JobId::new(1), vec![], vec![NamespaceId::new("scratch")], None).await.expect("job_register");

    let source = ResourceDescriptor::LocalPosixPath { nsid: NamespaceId::new("scratch"), path: source_path.display().to_string() };
    let destination = ResourceDescriptor::LocalPosixPath { nsid: NamespaceId::new("scratch"), path: destination_path.display().to_string() };

    let task_id = client.iotask_submit(JobId::new(1), Operation::Copy, source, Some(destination.clone()), None).await.expect("submit copy task");

    let report = client
        .wait_for_task(task_id, Duration::from_millis(50), 100)
        .await
        .expect("poll status")
        .expect("task should reach a terminal state within the polling budget");

    assert_eq!(report.status, norns_core::TaskStatus::Finished, "copy should finish: {report:?}");
    assert_eq!(report.bytes_transferred, "hello from the specs suite".len() as u64);
    assert_eq!(std::fs::read(&destination_path).expect("read destination"), b"hello from the specs suite");
}

#[tokio::test]
async fn pause_accept_rejects_new_submissions_until_resumed() {
    let daemon = Daemon::spawn_with_namespaces(
        r#"
[[namespaces]]
nsid = "scratch"
type = "posix_path"
mountpoint = "/tmp"
"#,
    );
    let client = daemon.client().await;
    client.job_register(JobId::new(1), vec![], vec![NamespaceId::new("scratch")], None).await.expect("job_register");

    client.pause_accept().await.expect("pause_accept");

    let source = ResourceDescriptor::LocalPosixPath { nsid: NamespaceId::new("scratch"), path: "/tmp/does-not-matter".into() };
    let err = client
        .iotask_submit(JobId::new(1), Operation::Copy, source.clone(), Some(source.clone()), None)
        .await
        .expect_err("submission should be rejected while paused");
    assert_eq!(err.error_code(), ErrorCode::AcceptPaused);

    client.resume_accept().await.expect("resume_accept");
    let status = client.global_status().await.expect("status");
    assert!(!status.accept_paused, "accept should no longer be paused");
}

#[tokio::test]
async fn shutdown_over_the_control_socket_stops_the_daemon() {
    let daemon = Daemon::spawn();
    daemon.control_client().await.shutdown().await.expect("shutdown");

    let exited = wait_for(WAIT_MAX, || {
        !std::path::Path::new(&format!("/proc/{}", daemon.child.id())).exists()
    });
    assert!(exited, "daemon process should exit after a shutdown command");
}
