// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure for integration tests under `tests/`.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::channel::{self, ChannelState};
use crate::config::HubConfig;
use crate::observer::platform::test_support::FakeProbe;
use crate::observer::platform::PlatformProbe;
use crate::state::HubState;

/// Spawn the channel's axum router (WS + `/healthz`) on an ephemeral
/// loopback port, returning the bound address, the shared [`HubState`], and
/// a join handle for the server task.
pub async fn spawn_channel_server() -> anyhow::Result<(SocketAddr, Arc<HubState>, tokio::task::JoinHandle<()>)> {
    let shutdown = CancellationToken::new();
    let hub = Arc::new(HubState::new(test_config(), shutdown));
    let probe: Arc<dyn PlatformProbe> = Arc::new(FakeProbe::default());

    let router = channel::build_router(ChannelState { hub: Arc::clone(&hub), probe });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>()).await;
    });

    Ok((addr, hub, handle))
}

/// A [`HubConfig`] with fast intervals, suitable for integration tests.
/// Built from literal field values rather than `HubConfig::default()` (which
/// is only available under `#[cfg(test)]`, and this module is not) so it
/// compiles in both test and non-test builds.
pub fn test_config() -> HubConfig {
    HubConfig {
        host: "127.0.0.1".to_owned(),
        port: 0,
        heartbeat_ms: 50,
        clipboard_poll_ms: 500,
        window_poll_ms: 5_000,
        idle_poll_ms: 10_000,
        clock_tick_ms: 60_000,
        global_cooldown_ms: 8_000,
        default_cooldown_ms: 30_000,
        batch_window_ms: 10_000,
        probe_timeout_ms: 4_000,
        model_timeout_ms: 20_000,
        metrics_ms: 15_000,
        model_api_base: None,
        model_api_key: None,
        telegram_token: None,
    }
}
