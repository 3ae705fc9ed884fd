use super::*;
use crate::memory::MemoryArena;
use crate::registries::{BackendRegistry, JobRegistry};
use crate::task_manager::TaskManager;
use crate::transfer::{ChunkSize, TransferorMatrix};
use crate::worker_pool::WorkerPool;
use norns_wire::Request as WireRequest;
use std::time::Duration;

fn harness() -> Arc<AppState> {
    let backends = Arc::new(BackendRegistry::new());
    let jobs = Arc::new(JobRegistry::new());
    let matrix = Arc::new(TransferorMatrix::with_default_entries(ChunkSize::default()));
    let memory = Arc::new(MemoryArena::new());
    let pool = Arc::new(
        WorkerPool::new(1, 4, Arc::clone(&memory), 0, std::env::temp_dir(), Duration::from_millis(50))
            .expect("spawn pool"),
    );
    let tasks = Arc::new(TaskManager::new(Arc::clone(&backends), Arc::clone(&jobs), Arc::clone(&matrix), pool, 4));
    Arc::new(AppState::new(backends, jobs, tasks, matrix, memory, 0, std::env::temp_dir(), Duration::from_secs(1)))
}

#[tokio::test]
async fn a_ping_answers_ok_and_the_session_stays_open_for_a_second_request() {
    let state = harness();
    let (mut client, server) = tokio::io::duplex(4096);
    let handle = tokio::spawn({
        let state = Arc::clone(&state);
        async move { pump(server, &state, Credentials::new(0, 0, 0)).await }
    });

    norns_wire::write_encoded(&mut client, &WireRequest::Ping).await.expect("write ping");
    let response: Response = norns_wire::read_decoded(&mut client).await.expect("read response");
    assert_eq!(response, Response::Ok);

    norns_wire::write_encoded(&mut client, &WireRequest::Ping).await.expect("write second ping");
    let response: Response = norns_wire::read_decoded(&mut client).await.expect("read second response");
    assert_eq!(response, Response::Ok);

    drop(client);
    handle.await.expect("session task panicked");
}

#[tokio::test]
async fn a_truncated_frame_ends_the_session_without_panicking() {
    let state = harness();
    let (mut client, server) = tokio::io::duplex(4096);
    let handle = tokio::spawn({
        let state = Arc::clone(&state);
        async move { pump(server, &state, Credentials::new(0, 0, 0)).await }
    });

    // A length prefix claiming more body bytes than ever arrive; the peer
    // then disconnects, matching spec.md §4.1's "a session whose peer
    // aborts mid-read is discarded without affecting others."
    use tokio::io::AsyncWriteExt;
    client.write_all(&100u64.to_be_bytes()).await.expect("write header");
    client.write_all(b"short").await.expect("write partial body");
    drop(client);

    handle.await.expect("session task panicked");
}

#[tokio::test]
async fn shutdown_releases_a_session_blocked_on_the_next_read() {
    let state = harness();
    let (client, server) = tokio::io::duplex(4096);
    let handle = tokio::spawn({
        let state = Arc::clone(&state);
        async move { pump(server, &state, Credentials::new(0, 0, 0)).await }
    });

    state.begin_shutdown();
    handle.await.expect("session task panicked");
    drop(client);
}
