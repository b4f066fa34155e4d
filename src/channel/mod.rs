// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Channel (C3): the single-peer, JSON-framed WebSocket command/event
//! channel (spec §4.1), plus the `/healthz` liveness endpoint (SPEC_FULL.md
//! §11).

pub mod commands;
mod http;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{ConnectInfo, State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

use crate::observer::platform::PlatformProbe;
use crate::state::{epoch_ms, HubState, PeerHandle};

/// Shared state for the WS + HTTP router: the hub state plus the platform
/// probe, needed directly by `query_screen`/`query_windows`.
#[derive(Clone)]
pub struct ChannelState {
    pub hub: Arc<HubState>,
    pub probe: Arc<dyn PlatformProbe>,
}

/// Build the axum `Router`. Callers must serve it with
/// `into_make_service_with_connect_info::<SocketAddr>()` so [`ws_handler`]
/// can reject non-loopback peers.
pub fn build_router(state: ChannelState) -> Router {
    Router::new()
        .route("/", get(ws_handler))
        .route("/healthz", get(http::healthz))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// `GET /` upgrade handler. Rejects non-loopback peers at accept time (spec
/// §4.1, §6: "Port, bind address: loopback-only").
async fn ws_handler(
    State(state): State<ChannelState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    if !addr.ip().is_loopback() {
        tracing::warn!(%addr, "rejected non-loopback websocket connection attempt");
        return (StatusCode::FORBIDDEN, "loopback connections only").into_response();
    }

    ws.on_upgrade(move |socket| handle_socket(state, socket)).into_response()
}

/// Per-connection handler. Replaces any existing peer (spec §9 open question
/// #1, resolved in DESIGN.md), emits `sync` before anything else, then runs
/// the heartbeat and read/write loop until the peer disconnects, is
/// superseded, or the hub shuts down.
async fn handle_socket(state: ChannelState, socket: WebSocket) {
    let hub = state.hub;
    let probe = state.probe;

    let peer_id = hub.peer_ids.next();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let conn_cancel = CancellationToken::new();

    // Enqueue `sync` onto this connection's own `tx` *before* the peer handle
    // is published into `hub.peer`. Until that publish, no other task can
    // reach `tx` (it isn't reachable via `send_to_peer` yet), so this is the
    // only possible write to the queue — guaranteeing `sync` is strictly
    // first, ahead of any concurrent dispatcher/metrics/heartbeat send (spec
    // §8 invariant 4).
    let sync_value = json!({
        "type": "sync",
        "payload": *hub.pet.read().await,
        "timestamp": epoch_ms(),
    });
    let Ok(sync_text) = serde_json::to_string(&sync_value) else { return };
    if tx.send(sync_text).is_err() {
        return;
    }

    {
        let mut guard = hub.peer.write().await;
        if let Some(old) = guard.take() {
            tracing::info!(old_peer = old.id, new_peer = peer_id, "new websocket peer replaces existing one");
            old.cancel.cancel();
        }
        *guard = Some(PeerHandle { id: peer_id, tx, cancel: conn_cancel.clone() });
    }
    tracing::info!(peer_id, "websocket peer attached");

    spawn_heartbeat(Arc::clone(&hub), conn_cancel.clone());

    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            _ = hub.shutdown.cancelled() => break,
            _ = conn_cancel.cancelled() => break,

            outbound = rx.recv() => {
                match outbound {
                    Some(text) => {
                        if ws_tx.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            inbound = ws_rx.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        commands::dispatch(&hub, &probe, text.as_str()).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    conn_cancel.cancel();
    let mut guard = hub.peer.write().await;
    if guard.as_ref().is_some_and(|p| p.id == peer_id) {
        *guard = None;
    }
    drop(guard);
    tracing::info!(peer_id, "websocket peer detached");
}

/// Emit `{type:"heartbeat", payload:{timestamp}}` every `heartbeat_ms` while
/// this connection is alive (spec §4.1). The peer need not reply.
fn spawn_heartbeat(hub: Arc<HubState>, cancel: CancellationToken) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(hub.config.heartbeat_interval());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // First tick fires immediately; skip it so heartbeat doesn't race `sync`.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = hub.shutdown.cancelled() => break,
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }

            let ts = epoch_ms();
            hub.send_to_peer(&json!({"type": "heartbeat", "payload": {"timestamp": ts}})).await;
        }
    });
}
