//! Bootstrap failure behavior over the real gRPC transport: an unreachable
//! bootstrap node must fail within the fixed bound, not hang.

use std::net::TcpListener;
use std::time::{Duration, Instant};

use freshet_client::{Client, ClientError};

/// Reserve an ephemeral port, then free it so nothing is listening there.
fn unreachable_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[tokio::test]
async fn connect_against_unreachable_node_fails_within_the_bound() {
    let client = Client::new("127.0.0.1", unreachable_port());

    let started = Instant::now();
    let err = client.connect().await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, ClientError::Bootstrap { .. }), "got {err:?}");
    // 5s bootstrap bound plus scheduling slack.
    assert!(elapsed < Duration::from_secs(8), "bootstrap took {elapsed:?}");
}

#[tokio::test]
async fn first_operation_surfaces_the_lazy_bootstrap_failure() {
    let client = Client::new("127.0.0.1", unreachable_port());

    // No explicit connect(): the command path bootstraps lazily and fails.
    let err = client.topics().await.unwrap_err();
    assert!(matches!(err, ClientError::Bootstrap { .. }), "got {err:?}");
}
