// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatcher (C9): routes each admitted trigger to the channel peer if one
//! is connected, otherwise to the fallback brain if active, otherwise drops
//! it (spec §4.6). Always emits a parallel `proactive-event` notification to
//! the rendering front-end, regardless of peer state.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::brain::BrainTriggers;
use crate::classifier::Trigger;
use crate::state::{epoch_ms, HubState};

/// Map a subset of trigger names to the outbound `user_event` kinds spec §6
/// names but never elaborates on (SPEC_FULL.md §11). Triggers with no
/// natural `user_event` counterpart (most of the catalogue) map to `None`;
/// `click`/`drag`/`cursor_near`/`double_click` are front-end-originated
/// interaction events the hub never synthesizes and are omitted here (see
/// DESIGN.md).
fn user_event_for(trigger_name: &str) -> Option<&'static str> {
    match trigger_name {
        "idle_entered" | "idle_return" => Some("user_idle"),
        "late_night" | "dawn_coding" | "pre_lunch" | "end_of_work" | "weekend_work" => Some("time_change"),
        "app_switch" => Some("desktop_changed"),
        "wiki_rabbit_hole" | "research_mode" | "repeated_search" | "price_comparison" => Some("browsing"),
        _ => None,
    }
}

pub fn spawn(
    state: Arc<HubState>,
    brain: BrainTriggers,
    mut fired_rx: broadcast::Receiver<Trigger>,
    shutdown: CancellationToken,
) {
    tokio::spawn(async move {
        loop {
            let trigger = tokio::select! {
                _ = shutdown.cancelled() => break,
                recv = fired_rx.recv() => match recv {
                    Ok(trigger) => trigger,
                    Err(broadcast::error::RecvError::Closed) => break,
                    // A slow dispatcher lagging behind admission just skips
                    // ahead; triggers are already cooldown-gated so losing a
                    // few under backpressure is an acceptable degradation.
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                },
            };

            state
                .send_to_peer(&json!({
                    "type": "proactive-event",
                    "payload": {
                        "trigger": trigger.name,
                        "activeTitle": trigger.active_title,
                        "activeApp": trigger.active_app,
                    },
                    "timestamp": epoch_ms(),
                }))
                .await;

            if let Some(event) = user_event_for(trigger.name) {
                state
                    .send_to_peer(&json!({
                        "type": "user_event",
                        "payload": {
                            "event": event,
                            "trigger": trigger.name,
                            "activeTitle": trigger.active_title,
                            "activeApp": trigger.active_app,
                        },
                        "timestamp": epoch_ms(),
                    }))
                    .await;
            }

            if state.has_peer().await {
                state
                    .send_to_peer(&json!({
                        "type": "proactive_trigger",
                        "payload": {
                            "trigger": trigger.name,
                            "context": trigger.context,
                            "timestamp": trigger.ts,
                            "activeTitle": trigger.active_title,
                            "activeApp": trigger.active_app,
                        },
                        "timestamp": epoch_ms(),
                    }))
                    .await;
            } else if brain.is_active() {
                brain.handle(trigger).await;
            }
            // else: dropped, per spec §4.6.
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_and_time_triggers_map_to_user_events() {
        assert_eq!(user_event_for("idle_entered"), Some("user_idle"));
        assert_eq!(user_event_for("late_night"), Some("time_change"));
        assert_eq!(user_event_for("app_switch"), Some("desktop_changed"));
        assert_eq!(user_event_for("wiki_rabbit_hole"), Some("browsing"));
    }

    #[test]
    fn most_triggers_have_no_user_event_counterpart() {
        assert_eq!(user_event_for("shopping_detected"), None);
        assert_eq!(user_event_for("error_loop"), None);
    }
}
