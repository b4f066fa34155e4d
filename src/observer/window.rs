// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Active-window observer: 5s cadence (spec §4.3).

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::observer::platform::PlatformProbe;
use crate::observer::{Observation, ObservationKind};
use crate::state::HubState;

pub fn spawn(
    probe: Arc<dyn PlatformProbe>,
    state: Arc<HubState>,
    obs_tx: mpsc::Sender<Observation>,
    shutdown: CancellationToken,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(state.config.window_poll_interval());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut last_title: Option<String> = None;
        let mut last_changed_at = state.clock.now_ms();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {}
            }

            let Some(title) = probe.active_window_title().await else { continue };
            let now = state.clock.now_ms();

            let kind = if last_title.as_deref() != Some(title.as_str()) {
                last_title = Some(title.clone());
                last_changed_at = now;
                ObservationKind::ActiveTitleChanged { title }
            } else {
                let duration_secs = ((now - last_changed_at).max(0) / 1000) as u64;
                ObservationKind::TitleStable { title, duration_secs }
            };

            if obs_tx.send(Observation { ts: now, kind }).await.is_err() {
                break;
            }
        }
    });
}
