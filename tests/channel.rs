// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket channel integration tests against a real in-process server
//! (spec §8: testable properties 2-4).

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message as WsMessage;

use companion_hub::test_support::spawn_channel_server;

type WsStream = tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;
type WsTx = futures_util::stream::SplitSink<WsStream, WsMessage>;
type WsRx = futures_util::stream::SplitStream<WsStream>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

async fn ws_connect(addr: &std::net::SocketAddr) -> anyhow::Result<(WsTx, WsRx)> {
    let url = format!("ws://{addr}/");
    let (stream, _) = tokio_tungstenite::connect_async(&url).await?;
    Ok(stream.split())
}

async fn ws_send(tx: &mut WsTx, value: &serde_json::Value) -> anyhow::Result<()> {
    tx.send(WsMessage::Text(serde_json::to_string(value)?.into())).await?;
    Ok(())
}

async fn ws_recv(rx: &mut WsRx) -> anyhow::Result<serde_json::Value> {
    loop {
        let msg = tokio::time::timeout(RECV_TIMEOUT, rx.next())
            .await?
            .ok_or_else(|| anyhow::anyhow!("ws stream closed"))??;
        if let WsMessage::Text(text) = msg {
            return Ok(serde_json::from_str(&text)?);
        }
    }
}

/// Receive messages until `pred` matches one, or time out. Used to skip past
/// heartbeats while waiting for a specific reply.
async fn ws_recv_until(rx: &mut WsRx, pred: impl Fn(&serde_json::Value) -> bool) -> anyhow::Result<serde_json::Value> {
    let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;
    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        if remaining.is_zero() {
            anyhow::bail!("timed out waiting for matching message");
        }
        let msg = tokio::time::timeout(remaining, rx.next())
            .await?
            .ok_or_else(|| anyhow::anyhow!("ws stream closed"))??;
        if let WsMessage::Text(text) = msg {
            let value: serde_json::Value = serde_json::from_str(&text)?;
            if pred(&value) {
                return Ok(value);
            }
        }
    }
}

#[tokio::test]
async fn sync_is_the_first_event_on_attach() -> anyhow::Result<()> {
    let (addr, _hub, _handle) = spawn_channel_server().await?;
    let (_tx, mut rx) = ws_connect(&addr).await?;

    let first = ws_recv(&mut rx).await?;
    assert_eq!(first.get("type").and_then(|t| t.as_str()), Some("sync"));
    assert!(first.get("payload").is_some());
    Ok(())
}

#[tokio::test]
async fn query_state_replies_with_current_pet_state() -> anyhow::Result<()> {
    let (addr, _hub, _handle) = spawn_channel_server().await?;
    let (mut tx, mut rx) = ws_connect(&addr).await?;

    let _sync = ws_recv(&mut rx).await?;
    ws_send(&mut tx, &serde_json::json!({"type": "query_state", "payload": {}})).await?;

    let reply = ws_recv_until(&mut rx, |v| v.get("type").and_then(|t| t.as_str()) == Some("state_response")).await?;
    let payload = reply.get("payload").expect("state_response has a payload");
    assert_eq!(payload.get("mode").and_then(|m| m.as_str()), Some("pet"));
    assert_eq!(payload.get("action").and_then(|a| a.as_str()), Some("idle"));
    Ok(())
}

#[tokio::test]
async fn unknown_command_type_produces_no_reply_and_no_state_change() -> anyhow::Result<()> {
    let (addr, hub, _handle) = spawn_channel_server().await?;
    let (mut tx, mut rx) = ws_connect(&addr).await?;
    let _sync = ws_recv(&mut rx).await?;

    ws_send(&mut tx, &serde_json::json!({"type": "not_a_real_command", "payload": {}})).await?;

    // Follow up with a query_state: if the unknown command had produced a
    // reply, it would arrive before this one.
    ws_send(&mut tx, &serde_json::json!({"type": "query_state", "payload": {}})).await?;
    let reply = ws_recv_until(&mut rx, |v| v.get("type").and_then(|t| t.as_str()) == Some("state_response")).await?;
    assert_eq!(reply.get("type").and_then(|t| t.as_str()), Some("state_response"));
    assert_eq!(hub.pet.read().await.action, "idle");
    Ok(())
}

#[tokio::test]
async fn set_mode_command_mutates_state_and_echoes_update() -> anyhow::Result<()> {
    let (addr, _hub, _handle) = spawn_channel_server().await?;
    let (mut tx, mut rx) = ws_connect(&addr).await?;
    let _sync = ws_recv(&mut rx).await?;

    ws_send(&mut tx, &serde_json::json!({"type": "set_mode", "payload": {"mode": "both"}})).await?;

    let update =
        ws_recv_until(&mut rx, |v| v.get("type").and_then(|t| t.as_str()) == Some("pet_state_update")).await?;
    let mode = update.get("payload").and_then(|p| p.get("mode")).and_then(|m| m.as_str());
    assert_eq!(mode, Some("both"));
    Ok(())
}

#[tokio::test]
async fn malformed_json_does_not_close_the_connection() -> anyhow::Result<()> {
    let (addr, _hub, _handle) = spawn_channel_server().await?;
    let (mut tx, mut rx) = ws_connect(&addr).await?;
    let _sync = ws_recv(&mut rx).await?;

    tx.send(WsMessage::Text("{not valid json".into())).await?;
    ws_send(&mut tx, &serde_json::json!({"type": "query_state", "payload": {}})).await?;

    let reply = ws_recv_until(&mut rx, |v| v.get("type").and_then(|t| t.as_str()) == Some("state_response")).await?;
    assert_eq!(reply.get("type").and_then(|t| t.as_str()), Some("state_response"));
    Ok(())
}

#[tokio::test]
async fn a_new_connection_replaces_the_existing_peer() -> anyhow::Result<()> {
    let (addr, _hub, _handle) = spawn_channel_server().await?;
    let (_tx1, mut rx1) = ws_connect(&addr).await?;
    let _sync1 = ws_recv(&mut rx1).await?;

    let (_tx2, mut rx2) = ws_connect(&addr).await?;
    let _sync2 = ws_recv(&mut rx2).await?;

    // The first connection should observe EOF (or at least never receive
    // another message) once replaced.
    let outcome = tokio::time::timeout(Duration::from_secs(2), rx1.next()).await;
    match outcome {
        Ok(Some(Ok(WsMessage::Close(_)))) | Ok(None) | Ok(Some(Err(_))) => {}
        Ok(other) => panic!("expected the replaced peer's connection to end, got {other:?}"),
        Err(_) => panic!("expected the replaced peer's connection to end within the timeout"),
    }
    Ok(())
}
