// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Idle detector: 10s cadence (spec §4.3).
//!
//! `idle_entered` fires once when system idle time crosses above 60s;
//! `idle_exited(duration)` fires once when it falls back below 5s.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::observer::platform::PlatformProbe;
use crate::observer::{Observation, ObservationKind};
use crate::state::HubState;

const IDLE_ENTER_THRESHOLD_SECS: f64 = 60.0;
const IDLE_EXIT_THRESHOLD_SECS: f64 = 5.0;

pub fn spawn(
    probe: Arc<dyn PlatformProbe>,
    state: Arc<HubState>,
    obs_tx: mpsc::Sender<Observation>,
    shutdown: CancellationToken,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(state.config.idle_poll_interval());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut is_idle = false;
        let mut idle_since_ms: Option<i64> = None;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {}
            }

            let Some(idle_secs) = probe.idle_seconds().await else { continue };
            let now = state.clock.now_ms();

            if !is_idle && idle_secs > IDLE_ENTER_THRESHOLD_SECS {
                is_idle = true;
                idle_since_ms = Some(now);
                let obs = Observation { ts: now, kind: ObservationKind::IdleEntered };
                if obs_tx.send(obs).await.is_err() {
                    break;
                }
            } else if is_idle && idle_secs < IDLE_EXIT_THRESHOLD_SECS {
                is_idle = false;
                let duration_secs =
                    idle_since_ms.map(|since| ((now - since).max(0) / 1000) as u64).unwrap_or(0);
                idle_since_ms = None;
                let obs = Observation { ts: now, kind: ObservationKind::IdleExited { duration_secs } };
                if obs_tx.send(obs).await.is_err() {
                    break;
                }
            }
        }
    });
}
