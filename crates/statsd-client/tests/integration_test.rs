// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use statsd_client::client::{MetricEmitter, MetricsClient};
use statsd_client::config::ClientConfig;
use tokio::net::UdpSocket;
use tokio::time::{timeout, Duration};

// Binds a throwaway UDP listener and points a client at it.
async fn udp_fixture() -> (UdpSocket, MetricsClient) {
    let server = UdpSocket::bind("127.0.0.1:0")
        .await
        .expect("unable to bind UDP socket");
    let port = server.local_addr().expect("no local addr").port();
    let client = MetricsClient::new(&ClientConfig {
        host: "127.0.0.1".to_string(),
        port,
        ..ClientConfig::default()
    });
    (server, client)
}

async fn recv_datagram(server: &UdpSocket) -> String {
    let mut buf = [0; 8192];
    let (amt, _src) = timeout(Duration::from_secs(1), server.recv_from(&mut buf))
        .await
        .expect("timed out waiting for datagram")
        .expect("recv failed");
    String::from_utf8_lossy(&buf[..amt]).to_string()
}

#[tokio::test]
async fn counter_produces_single_datagram() {
    let (server, client) = udp_fixture().await;

    client
        .count("requests", 1.0)
        .await
        .expect("send should succeed");
    assert_eq!(recv_datagram(&server).await, "requests:1|c");

    client.incr("requests").await.expect("send should succeed");
    assert_eq!(recv_datagram(&server).await, "requests:1|c");

    client.decr("requests").await.expect("send should succeed");
    assert_eq!(recv_datagram(&server).await, "requests:-1|c");
}

#[tokio::test]
async fn gauge_and_timer_wire_format() {
    let (server, client) = udp_fixture().await;

    client
        .gauge("cpu.load", 0.73)
        .await
        .expect("send should succeed");
    assert_eq!(recv_datagram(&server).await, "cpu.load:0.73|g");

    client
        .timer("db.query", 42.0)
        .await
        .expect("send should succeed");
    assert_eq!(recv_datagram(&server).await, "db.query:42|ms");
}

#[tokio::test]
async fn namespaced_timer_prefixes_key() {
    let (server, client) = udp_fixture().await;

    client
        .space("api")
        .timer("latency", 42.0)
        .await
        .expect("send should succeed");
    assert_eq!(recv_datagram(&server).await, "api.latency:42|ms");
}

#[tokio::test]
async fn nested_namespacing_matches_flat_prefix() {
    let (server, client) = udp_fixture().await;

    client
        .space("a")
        .space("b")
        .count("c", 1.0)
        .await
        .expect("send should succeed");
    client
        .space("a.b")
        .count("c", 1.0)
        .await
        .expect("send should succeed");

    assert_eq!(recv_datagram(&server).await, "a.b.c:1|c");
    assert_eq!(recv_datagram(&server).await, "a.b.c:1|c");
}

#[tokio::test]
async fn in_flight_drains_to_zero_after_concurrent_sends() {
    let (server, client) = udp_fixture().await;

    let handles: Vec<_> = (0..25)
        .map(|i| client.count(&format!("burst.{i}"), f64::from(i)))
        .collect();

    for handle in handles {
        handle.await.expect("send should succeed");
    }
    assert_eq!(client.in_flight(), 0);

    let mut received = Vec::new();
    for _ in 0..25 {
        received.push(recv_datagram(&server).await);
    }
    received.sort();
    let mut expected: Vec<String> = (0..25).map(|i| format!("burst.{i}:{i}|c")).collect();
    expected.sort();
    assert_eq!(received, expected);
}

#[tokio::test]
async fn close_without_socket_is_noop() {
    let (_server, client) = udp_fixture().await;

    assert!(!client.is_open());
    client.close(false);
    client.close(true);
    assert!(!client.is_open());
    assert_eq!(client.in_flight(), 0);
}

#[tokio::test]
async fn forced_close_tears_down_and_next_send_rebinds() {
    let (server, client) = udp_fixture().await;

    client.incr("before").await.expect("send should succeed");
    assert!(client.is_open());

    client.close(true);
    assert!(!client.is_open());
    assert_eq!(client.in_flight(), 0);

    // A later send recreates the socket fresh.
    client.incr("after").await.expect("send should succeed");
    assert!(client.is_open());
    assert_eq!(recv_datagram(&server).await, "before:1|c");
    assert_eq!(recv_datagram(&server).await, "after:1|c");
}

#[tokio::test]
async fn graceful_close_with_nothing_in_flight_is_immediate() {
    let (server, client) = udp_fixture().await;

    client.incr("only").await.expect("send should succeed");
    assert_eq!(recv_datagram(&server).await, "only:1|c");

    client.close(false);
    assert!(!client.is_open());
}

#[tokio::test(start_paused = true)]
async fn graceful_close_defers_teardown_until_grace_expires() {
    let (server, client) = udp_fixture().await;

    // The handle is not awaited yet, so the send is still counted as in
    // flight when close runs.
    let handle = client.incr("slow");
    assert_eq!(client.in_flight(), 1);

    client.close(false);
    assert!(client.is_open(), "socket must survive a graceful close");

    handle.await.expect("send should succeed");
    assert_eq!(recv_datagram(&server).await, "slow:1|c");
    assert_eq!(client.in_flight(), 0);
    assert!(client.is_open());

    // Past the 10-second grace period the deferred forced close fires.
    tokio::time::sleep(Duration::from_secs(11)).await;
    assert!(!client.is_open());
}

#[tokio::test]
async fn send_error_leaves_client_usable() {
    let (server, client) = udp_fixture().await;

    // A datagram beyond the UDP maximum fails locally at send time.
    let oversized = "x".repeat(70_000);
    let result = client.count(&oversized, 1.0).await;
    assert!(result.is_err());
    assert_eq!(client.in_flight(), 0);

    // The failure affects nothing else.
    client
        .incr("still.alive")
        .await
        .expect("send should succeed");
    assert_eq!(recv_datagram(&server).await, "still.alive:1|c");
}
