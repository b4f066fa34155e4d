// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! companion-hub: local agent-to-companion coordination hub.
//!
//! Mediates between an external AI "brain" driving a desktop companion and a
//! bundle of local observers watching operating-system activity. Exposes a
//! single-peer, JSON-framed WebSocket channel; classifies raw OS activity into
//! a curated catalogue of behavioural triggers under cooldown and admission
//! control; and parses free-text commands into structured intents fed back
//! onto the same channel.

pub mod admission;
pub mod brain;
pub mod channel;
pub mod classifier;
pub mod clock;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod observer;
pub mod parser;
pub mod state;
pub mod test_support;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use crate::brain::BrainTriggers;
use crate::classifier::Classifier;
use crate::config::HubConfig;
use crate::observer::platform::{PlatformProbe, ShellPlatformProbe};
use crate::state::HubState;

/// Run the hub until shutdown.
pub async fn run(config: HubConfig) -> anyhow::Result<()> {
    if !config.host.parse::<std::net::IpAddr>().map(|ip| ip.is_loopback()).unwrap_or(false) {
        anyhow::bail!("companion-hub only binds to loopback addresses, got {}", config.host);
    }

    let addr = format!("{}:{}", config.host, config.port);
    let shutdown = CancellationToken::new();

    let probe: Arc<dyn PlatformProbe> = Arc::new(ShellPlatformProbe::new(config.probe_timeout()));
    let state = Arc::new(HubState::new(config.clone(), shutdown.clone()));

    // Observations flow: observers -> classifier -> admission -> dispatcher.
    let (obs_tx, obs_rx) = mpsc::channel(256);
    let (trig_tx, trig_rx) = mpsc::channel(256);
    let (fired_tx, fired_rx) = broadcast::channel(256);

    observer::spawn_all(Arc::clone(&probe), Arc::clone(&state), obs_tx, shutdown.clone());

    let classifier = Classifier::new();
    classifier::spawn(classifier, Arc::clone(&state), obs_rx, trig_tx, shutdown.clone());

    admission::spawn(Arc::clone(&state), Arc::clone(&probe), trig_rx, fired_tx.clone(), shutdown.clone());

    let brain = BrainTriggers::new(Arc::clone(&state));
    brain::spawn_batch_timer(brain.clone(), shutdown.clone());
    dispatcher::spawn(Arc::clone(&state), brain, fired_rx, shutdown.clone());

    metrics::spawn_reporter(Arc::clone(&state), shutdown.clone());

    let channel_state = channel::ChannelState { hub: Arc::clone(&state), probe: Arc::clone(&probe) };
    let router = channel::build_router(channel_state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "companion-hub listening");

    axum::serve(listener, router.into_make_service_with_connect_info::<std::net::SocketAddr>())
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    Ok(())
}
