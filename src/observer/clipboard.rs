// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clipboard observer: 500ms cadence, text and image detection (spec §4.3).

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
        let mut interval = tokio::time::interval(state.config.clipboard_poll_interval());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut last_text: Option<String> = None;
        let mut had_image = false;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {}
            }

            if let Some(text) = probe.clipboard_text().await {
                if last_text.as_deref() != Some(text.as_str()) {
                    last_text = Some(text.clone());
                    let obs = Observation {
                        ts: state.clock.now_ms(),
                        kind: ObservationKind::ClipboardText(text),
                    };
                    if obs_tx.send(obs).await.is_err() {
                        break;
                    }
                }
            }

            let has_image = probe.clipboard_image_present().await;
            if has_image && !had_image {
                let obs = Observation { ts: state.clock.now_ms(), kind: ObservationKind::ClipboardImage };
                if obs_tx.send(obs).await.is_err() {
                    break;
                }
            }
            had_image = has_image;
        }
    });
}
