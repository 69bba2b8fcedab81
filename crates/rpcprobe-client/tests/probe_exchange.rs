use rpcprobe_client::{send_request, ProbeClient, ProbeError};
use rpcprobe_core::{Fixture, OpenParams, ProbeConfig, RequestId};
use rpcprobe_mock::{viewer_plugin, Behavior, MockServer};
use serde_json::Value;
use std::time::{Duration, Instant};

const TIMEOUT: Duration = Duration::from_secs(5);

fn client_for(server: &MockServer) -> ProbeClient {
    ProbeClient::new(ProbeConfig {
        endpoint: server.endpoint(),
        ..ProbeConfig::default()
    })
    .with_timeout(TIMEOUT)
}

#[tokio::test]
async fn test_clear_returns_reply_verbatim() {
    let reply = r#"{"jsonrpc":"2.0","result":null,"id":5}"#;
    let server = MockServer::start(Behavior::Reply(reply.to_string())).await.unwrap();

    let response = send_request(
        &server.endpoint(),
        r#"{"jsonrpc":"2.0","method":"clear","id":5}"#,
        TIMEOUT,
    )
    .await
    .unwrap();

    assert_eq!(response, reply);
    assert_eq!(
        server.received().await,
        vec![r#"{"jsonrpc":"2.0","method":"clear","id":5}"#]
    );
}

#[tokio::test]
async fn test_error_reply_is_not_a_client_error() {
    let reply = r#"{"jsonrpc":"2.0","error":{"code":1,"message":"cancelled by user"},"id":4}"#;
    let server = MockServer::start(Behavior::Reply(reply.to_string())).await.unwrap();

    let response = send_request(
        &server.endpoint(),
        r#"{"jsonrpc":"2.0","method":"open","params":{"filename":"/tmp/x.ply"},"id":4}"#,
        TIMEOUT,
    )
    .await
    .unwrap();

    assert_eq!(response, reply);
}

#[tokio::test]
async fn test_reply_text_is_not_reformatted() {
    let reply = "  {\"jsonrpc\": \"2.0\",\n  \"result\": \"h\u{e9}llo \u{2713}\", \"id\": 1}\n";
    let server = MockServer::start(Behavior::Reply(reply.to_string())).await.unwrap();

    let response = send_request(&server.endpoint(), "anything at all", TIMEOUT)
        .await
        .unwrap();

    assert_eq!(response.as_bytes(), reply.as_bytes());
}

#[tokio::test]
async fn test_unreachable_endpoint_is_connection_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let start = Instant::now();
    let err = send_request(
        &format!("ws://127.0.0.1:{}", port),
        r#"{"jsonrpc":"2.0","method":"clear","id":5}"#,
        Duration::from_secs(30),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ProbeError::Connection { .. }), "got {:?}", err);
    assert!(start.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_silent_server_times_out_and_connection_is_closed() {
    let server = MockServer::start(Behavior::Silent).await.unwrap();
    let deadline = Duration::from_millis(300);

    let start = Instant::now();
    let err = send_request(
        &server.endpoint(),
        r#"{"jsonrpc":"2.0","method":"clear","id":5}"#,
        deadline,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ProbeError::Timeout { .. }), "got {:?}", err);
    assert!(start.elapsed() >= deadline);
    assert!(server.wait_idle(Duration::from_secs(5)).await);
    assert_eq!(server.accepted(), 1);
}

#[tokio::test]
async fn test_stalled_handshake_times_out() {
    // Accepts the TCP connection but never answers the WebSocket upgrade
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let holder = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
        drop(stream);
    });

    let deadline = Duration::from_millis(300);
    let start = Instant::now();
    let err = send_request(
        &format!("ws://{}", addr),
        r#"{"jsonrpc":"2.0","method":"clear","id":5}"#,
        deadline,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ProbeError::Timeout { .. }), "got {:?}", err);
    assert!(start.elapsed() >= deadline);
    holder.abort();
}

#[tokio::test]
async fn test_ping_before_reply_is_skipped() {
    let reply = r#"{"jsonrpc":"2.0","result":0,"id":5}"#;
    let server = MockServer::start(Behavior::PingThenReply(reply.to_string()))
        .await
        .unwrap();

    let response = send_request(
        &server.endpoint(),
        r#"{"jsonrpc":"2.0","method":"clear","id":5}"#,
        TIMEOUT,
    )
    .await
    .unwrap();

    assert_eq!(response, reply);
    assert!(server.wait_idle(Duration::from_secs(5)).await);
}

#[tokio::test]
async fn test_close_before_reply_is_transport_error() {
    let server = MockServer::start(Behavior::CloseWithoutReply).await.unwrap();

    let err = send_request(
        &server.endpoint(),
        r#"{"jsonrpc":"2.0","method":"clear","id":5}"#,
        TIMEOUT,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ProbeError::Transport(_)), "got {:?}", err);
    assert!(server.wait_idle(Duration::from_secs(5)).await);
}

#[tokio::test]
async fn test_binary_reply_is_transport_error() {
    let server = MockServer::start(Behavior::ReplyBinary(b"{}".to_vec())).await.unwrap();

    let err = send_request(
        &server.endpoint(),
        r#"{"jsonrpc":"2.0","method":"clear","id":5}"#,
        TIMEOUT,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ProbeError::Transport(_)), "got {:?}", err);
    assert!(server.wait_idle(Duration::from_secs(5)).await);
}

#[tokio::test]
async fn test_notification_gets_no_reply_and_times_out() {
    let server = MockServer::start(Behavior::Dispatch(viewer_plugin())).await.unwrap();

    let err = send_request(
        &server.endpoint(),
        r#"{"jsonrpc":"2.0","method":"clear"}"#,
        Duration::from_millis(200),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ProbeError::Timeout { .. }), "got {:?}", err);
}

#[tokio::test]
async fn test_every_invocation_releases_its_connection() {
    let server = MockServer::start(Behavior::Reply("{}".to_string())).await.unwrap();
    let silent = MockServer::start(Behavior::Silent).await.unwrap();

    for _ in 0..5 {
        send_request(&server.endpoint(), "{}", TIMEOUT).await.unwrap();
        assert!(server.wait_idle(Duration::from_secs(5)).await);

        let err = send_request(&silent.endpoint(), "{}", Duration::from_millis(200))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Timeout { .. }));
        assert!(silent.wait_idle(Duration::from_secs(5)).await);
    }

    assert_eq!(server.accepted(), 5);
    assert_eq!(silent.accepted(), 5);
}

#[tokio::test]
async fn test_typed_helpers_against_plugin() {
    let server = MockServer::start(Behavior::Dispatch(viewer_plugin())).await.unwrap();
    let client = client_for(&server);

    let cleared = client.clear(Some(RequestId::Number(5))).await.unwrap();
    let cleared: Value = serde_json::from_str(&cleared).unwrap();
    assert_eq!(cleared["result"], 0);
    assert_eq!(cleared["id"], 5);

    let opened = client.open("/nonexistent/teapot.ply", None).await.unwrap();
    let opened: Value = serde_json::from_str(&opened).unwrap();
    assert_eq!(opened["error"]["code"], 1);
    assert_eq!(opened["id"], 1);

    let manifest = concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml");
    let params = OpenParams::new(manifest).with_silent(true);
    let opened = client.open_with(&params, Some("load".into())).await.unwrap();
    let opened: Value = serde_json::from_str(&opened).unwrap();
    assert_eq!(opened["result"], 0);
    assert_eq!(opened["id"], "load");
}

#[tokio::test]
async fn test_fixtures_are_sent_as_built() {
    let server = MockServer::start(Behavior::Dispatch(viewer_plugin())).await.unwrap();
    let client = client_for(&server);

    for fixture in Fixture::ALL {
        let response = client.fixture(fixture).await.unwrap();
        let response: Value = serde_json::from_str(&response).unwrap();
        assert_eq!(response["jsonrpc"], "2.0");
    }

    let received = server.received().await;
    assert_eq!(received.len(), 3);
    for (sent, fixture) in received.iter().zip(Fixture::ALL) {
        assert_eq!(sent, &fixture.payload().unwrap());
    }
}

#[tokio::test]
async fn test_strict_mode_passes_valid_requests() {
    let server = MockServer::start(Behavior::Dispatch(viewer_plugin())).await.unwrap();
    let client = ProbeClient::new(ProbeConfig {
        endpoint: server.endpoint(),
        strict: true,
        ..ProbeConfig::default()
    });

    let response = client
        .send(r#"{"jsonrpc": "2.0", "method": "clear", "id": 5}"#)
        .await
        .unwrap();
    assert!(response.contains("\"result\":0"));

    let err = client.send(r#"{"method": "clear", "id": 5}"#).await.unwrap_err();
    assert!(matches!(err, ProbeError::MalformedInput(_)));
    assert_eq!(server.accepted(), 1);
}
