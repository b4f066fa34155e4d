// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wall-clock ticker: 60s cadence (spec §4.3). Feeds the classifier's time
//! triggers (`late_night`, `dawn_coding`, `pre_lunch`, `end_of_work`,
//! `weekend_work`).

use std::sync::Arc;

use chrono::Timelike;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::observer::{Observation, ObservationKind};
use crate::state::HubState;

pub fn spawn(state: Arc<HubState>, obs_tx: mpsc::Sender<Observation>, shutdown: CancellationToken) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(state.config.clock_tick_interval());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {}
            }

            let now = state.clock.now_utc();
            let obs = Observation {
                ts: now.timestamp_millis(),
                kind: ObservationKind::Tick {
                    hour: now.hour(),
                    minute: now.minute(),
                    weekday: now.weekday(),
                },
            };
            if obs_tx.send(obs).await.is_err() {
                break;
            }
        }
    });
}
