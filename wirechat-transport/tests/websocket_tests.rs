/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

//! Tests for the WebSocket transport client.
//!
//! Connection-failure tests run against unreachable addresses; the
//! round-trip tests stand up a loopback server on an ephemeral port.

use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use wirechat_transport::{WebSocketClient, WebSocketConnectError};

#[tokio::test]
async fn test_connect_fails_with_invalid_url() {
    let result = WebSocketClient::connect("not-a-url").await;
    assert!(result.is_err(), "Should fail with invalid URL");
}

#[tokio::test]
async fn test_connect_fails_with_unreachable_server() {
    let result = WebSocketClient::connect("ws://127.0.0.1:1/api/v1/chat/connect").await;
    assert!(result.is_err(), "Should fail when server is unreachable");
}

#[tokio::test]
async fn test_connect_fails_with_bad_scheme() {
    let result = WebSocketClient::connect("ftp://localhost:8080/api/v1/chat/connect").await;
    assert!(result.is_err(), "Should fail with non-ws scheme");
}

#[tokio::test]
async fn test_error_message_is_descriptive() {
    let result = WebSocketClient::connect("ws://127.0.0.1:1/nope").await;
    assert!(result.is_err());
    let err_str = format!("{}", result.err().unwrap());
    assert!(
        !err_str.is_empty(),
        "Error should have a descriptive message"
    );
}

#[tokio::test]
async fn test_connect_error_is_not_http_when_unreachable() {
    let result = WebSocketClient::try_connect("ws://127.0.0.1:1/nope").await;
    match result {
        Err(e) => assert_eq!(e.http_status(), None),
        Ok(_) => panic!("Should not connect to port 1"),
    }
}

#[test]
fn test_connect_error_http_status() {
    let err = WebSocketConnectError::HttpError { status: 401 };
    assert_eq!(err.http_status(), Some(401));
    assert!(format!("{err}").contains("401"));
}

/// Bind a loopback server that accepts one connection and echoes every
/// text frame back to the client.
async fn spawn_echo_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        while let Some(Ok(msg)) = ws.next().await {
            match msg {
                Message::Text(text) => {
                    if ws.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });
    format!("ws://{addr}")
}

#[tokio::test]
async fn test_send_and_receive_text_roundtrip() {
    let url = spawn_echo_server().await;
    let (client, mut rx) = WebSocketClient::connect(&url).await.unwrap();
    assert!(client.is_connected());

    client.send("hello".to_string()).await.unwrap();
    let echoed = rx.recv().await.expect("echo frame");
    assert_eq!(echoed, "hello");
}

#[tokio::test]
async fn test_close_ends_inbound_channel() {
    let url = spawn_echo_server().await;
    let (client, mut rx) = WebSocketClient::connect(&url).await.unwrap();

    client.close().await.unwrap();
    assert!(!client.is_connected());

    // The reader loop stops once the close completes, so the channel ends.
    assert_eq!(rx.recv().await, None);
}

#[tokio::test]
async fn test_send_after_close_is_rejected() {
    let url = spawn_echo_server().await;
    let (client, _rx) = WebSocketClient::connect(&url).await.unwrap();

    client.close().await.unwrap();
    let result = client.send("too late".to_string()).await;
    assert!(result.is_err(), "Send after close should error");
}

/// Integration test — requires a running wirechat server.
/// Run manually with: `cargo test -- --ignored`
#[tokio::test]
#[ignore]
async fn test_connect_against_live_server() {
    let (client, _rx) =
        WebSocketClient::connect("ws://localhost:8080/api/v1/chat/connect?uid=test")
            .await
            .expect("Failed to connect");

    assert!(client.is_connected());
    client
        .send(r#"{"source":{"uid":"test","name":"test"},"message":{"type":"text","content":{"text":"hi"}}}"#.to_string())
        .await
        .expect("Failed to send");
    client.close().await.expect("Failed to close");
    assert!(!client.is_connected());
}
