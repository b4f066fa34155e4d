// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admission & Cooldown (C7): gates classifier output before dispatch.
//!
//! Owns the cooldown map as a single task (spec §9); screen capture is only
//! ever invoked from here, after cooldown has already passed, so its cost is
//! paid at most once per global interval (spec §9).

pub mod cooldown;
pub mod visual;

use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use serde_json::json;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use crate::classifier::Trigger;
use crate::observer::platform::PlatformProbe;
use crate::state::HubState;

struct AdmissionState {
    last_any_fire_ts: Option<i64>,
    last_fire: HashMap<&'static str, i64>,
}

impl AdmissionState {
    fn new() -> Self {
        Self { last_any_fire_ts: None, last_fire: HashMap::new() }
    }

    /// Returns `true` if `trigger` passes both the global and per-trigger
    /// cooldown checks, recording the fire as a side effect when it does
    /// (spec §4.5 steps 1-3).
    fn admit(&mut self, trigger: &Trigger, global_cooldown_ms: i64, default_cooldown_ms: i64) -> bool {
        if let Some(last) = self.last_any_fire_ts {
            if trigger.ts - last < global_cooldown_ms {
                return false;
            }
        }

        let trigger_cooldown = cooldown::cooldown_ms(trigger.name, default_cooldown_ms);
        if let Some(last) = self.last_fire.get(trigger.name) {
            if trigger.ts - last < trigger_cooldown {
                return false;
            }
        }

        self.last_any_fire_ts = Some(trigger.ts);
        self.last_fire.insert(trigger.name, trigger.ts);
        true
    }
}

/// Spawn the admission+dispatch task (spec §5 concurrent task #5): reads
/// triggers from the classifier, applies cooldown gating, optionally enriches
/// visual triggers with a screen capture, and broadcasts admitted triggers.
pub fn spawn(
    state: Arc<HubState>,
    probe: Arc<dyn PlatformProbe>,
    mut trig_rx: mpsc::Receiver<Trigger>,
    fired_tx: broadcast::Sender<Trigger>,
    shutdown: CancellationToken,
) {
    tokio::spawn(async move {
        let mut admission = AdmissionState::new();
        let global_cooldown_ms = state.config.global_cooldown_ms as i64;
        let default_cooldown_ms = state.config.default_cooldown_ms as i64;

        loop {
            let mut trigger = tokio::select! {
                _ = shutdown.cancelled() => break,
                trig = trig_rx.recv() => match trig {
                    Some(trigger) => trigger,
                    None => break,
                },
            };

            if !admission.admit(&trigger, global_cooldown_ms, default_cooldown_ms) {
                continue;
            }
            state.metrics.triggers_admitted_total.fetch_add(1, Ordering::Relaxed);

            if visual::is_visual_trigger(trigger.name) {
                if let Some(capture) = probe.capture_screen().await {
                    trigger.context.insert(
                        "screen".to_owned(),
                        json!({
                            "image": capture.image_base64,
                            "width": capture.width,
                            "height": capture.height,
                        }),
                    );
                }
                if let Some(cursor) = probe.cursor_pos().await {
                    trigger.context.insert("cursor".to_owned(), json!({"x": cursor.x, "y": cursor.y}));
                }
            }

            // A send error only means no receiver is currently subscribed
            // (e.g. during startup race); the dispatcher and brain's batch
            // timer both subscribe before this task starts sending.
            let _ = fired_tx.send(trigger);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Trigger as ClassifierTrigger;

    fn trigger(name: &'static str, ts: i64) -> ClassifierTrigger {
        ClassifierTrigger {
            importance: crate::classifier::importance::classify(name),
            name,
            context: serde_json::Map::new(),
            ts,
            active_title: None,
            active_app: None,
        }
    }

    #[test]
    fn global_cooldown_blocks_any_two_fires_within_window() {
        let mut admission = AdmissionState::new();
        assert!(admission.admit(&trigger("shopping_detected", 0), 8_000, 30_000));
        assert!(!admission.admit(&trigger("coding_detected", 5_000), 8_000, 30_000));
        assert!(admission.admit(&trigger("coding_detected", 8_000), 8_000, 30_000));
    }

    #[test]
    fn per_trigger_cooldown_blocks_repeat_fires_of_the_same_name() {
        let mut admission = AdmissionState::new();
        assert!(admission.admit(&trigger("error_loop", 0), 0, 30_000));
        assert!(!admission.admit(&trigger("error_loop", 60_000), 0, 30_000));
        assert!(admission.admit(&trigger("error_loop", 120_000), 0, 30_000));
    }

    #[test]
    fn distinct_triggers_track_independent_cooldowns() {
        let mut admission = AdmissionState::new();
        assert!(admission.admit(&trigger("error_loop", 0), 0, 30_000));
        assert!(admission.admit(&trigger("weekend_work", 1_000), 0, 30_000));
    }
}
