// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound command handling (spec §6: "Inbound command types").
//!
//! Each inbound message either (a) mutates [`PetState`] and echoes
//! `pet_state_update`, (b) is forwarded unchanged as a derived command for
//! the rendering front-end, or (c) answers a query synchronously. Unknown
//! `type`s are logged and otherwise ignored (spec §8 invariant 2); malformed
//! JSON is dropped by the caller before this module ever sees it.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::observer::platform::PlatformProbe;
use crate::state::{epoch_ms, HubState, Mode, PetStatePatch, Position};

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

/// Parse and act on one inbound WebSocket text frame. Returns without
/// replying for fire-and-forget commands; queries reply via `send_to_peer`
/// directly since the sender is, by single-peer construction, the current
/// peer.
pub async fn dispatch(state: &Arc<HubState>, probe: &Arc<dyn PlatformProbe>, raw: &str) {
    let envelope: Envelope = match serde_json::from_str(raw) {
        Ok(e) => e,
        Err(e) => {
            let err = crate::error::HubError::Parse(format!("malformed inbound websocket message: {e}"));
            tracing::debug!(%err, "dropping message");
            return;
        }
    };

    match envelope.kind.as_str() {
        "action" => handle_action(state, envelope.payload).await,
        "move" => handle_move(state, envelope.payload).await,
        "emote" => handle_emote(state, envelope.payload).await,
        "speak" | "think" => echo(state, &envelope.kind, envelope.payload).await,
        "carry_file" | "drop_file" => handle_carry_drop(state, &envelope.kind, envelope.payload).await,
        "smart_file_op" => echo(state, "smart_file_op", envelope.payload).await,
        "set_mode" => handle_set_mode(state, envelope.payload).await,
        "evolve" => handle_evolve(state, envelope.payload).await,
        "set_character" | "reset_character" | "set_persona" => echo(state, &envelope.kind, envelope.payload).await,
        "jump_to" | "rappel" | "release_thread" | "move_to_center" | "walk_on_window" => {
            echo(state, &envelope.kind, envelope.payload).await
        }
        "register_movement" | "custom_move" | "stop_custom_move" | "list_movements" => {
            echo(state, &envelope.kind, envelope.payload).await
        }
        "query_state" => handle_query_state(state).await,
        "query_screen" => handle_query_screen(state, probe).await,
        "query_windows" => handle_query_windows(state, probe).await,
        "ai_decision" => handle_ai_decision(state, envelope.payload).await,
        other => {
            tracing::debug!(kind = other, "unrecognized inbound command type, ignoring");
        }
    }
}

/// Apply a patch and echo the resulting `PetState` as `pet_state_update`
/// (spec §4.8: "every mutation triggers a pet_state_update event").
async fn apply_and_notify(state: &Arc<HubState>, patch: PetStatePatch) {
    let updated = {
        let mut pet = state.pet.write().await;
        pet.apply(patch);
        pet.clone()
    };
    state
        .send_to_peer(&json!({
            "type": "pet_state_update",
            "payload": updated,
            "timestamp": epoch_ms(),
        }))
        .await;
}

/// Forward a payload unchanged under the same `type` (spec §9: "unknown
/// fields are preserved unchanged when forwarding").
async fn echo(state: &Arc<HubState>, kind: &str, payload: Value) {
    state
        .send_to_peer(&json!({
            "type": kind,
            "payload": payload,
            "timestamp": epoch_ms(),
        }))
        .await;
}

#[derive(Debug, Deserialize)]
struct ActionPayload {
    state: String,
    #[serde(default)]
    duration: Option<u64>,
}

async fn handle_action(state: &Arc<HubState>, payload: Value) {
    let Ok(action) = serde_json::from_value::<ActionPayload>(payload) else {
        tracing::debug!("action command had an unparsable payload, dropping");
        return;
    };

    apply_and_notify(state, PetStatePatch { action: Some(action.state), ..Default::default() }).await;

    if let Some(duration_ms) = action.duration {
        let state = Arc::clone(state);
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(duration_ms)).await;
            apply_and_notify(&state, PetStatePatch { action: Some("idle".to_owned()), ..Default::default() }).await;
        });
    }
}

#[derive(Debug, Deserialize)]
struct MovePayload {
    x: i64,
    y: i64,
    #[serde(default)]
    #[allow(dead_code)]
    speed: Option<f64>,
}

async fn handle_move(state: &Arc<HubState>, payload: Value) {
    let Ok(mv) = serde_json::from_value::<MovePayload>(payload) else {
        tracing::debug!("move command had an unparsable payload, dropping");
        return;
    };
    let edge = state.pet.read().await.position.edge;
    apply_and_notify(state, PetStatePatch { position: Some(Position { x: mv.x, y: mv.y, edge }), ..Default::default() })
        .await;
}

#[derive(Debug, Deserialize)]
struct EmotePayload {
    emotion: String,
}

/// Fixed emotion -> action table (spec §6 `emote`).
fn emote_action(emotion: &str) -> &'static str {
    match emotion {
        "happy" => "excited",
        "curious" => "walking",
        "sleepy" => "sleeping",
        "scared" => "scared",
        "playful" => "playing",
        "proud" => "excited",
        "neutral" => "idle",
        "focused" => "idle",
        "affectionate" => "interacting",
        _ => "idle",
    }
}

async fn handle_emote(state: &Arc<HubState>, payload: Value) {
    let Ok(emote) = serde_json::from_value::<EmotePayload>(payload) else {
        tracing::debug!("emote command had an unparsable payload, dropping");
        return;
    };
    let action = emote_action(&emote.emotion);
    apply_and_notify(
        state,
        PetStatePatch { action: Some(action.to_owned()), emotion: Some(emote.emotion), ..Default::default() },
    )
    .await;
}

async fn handle_carry_drop(state: &Arc<HubState>, kind: &str, payload: Value) {
    let action = if kind == "carry_file" { "carrying" } else { "idle" };
    apply_and_notify(state, PetStatePatch { action: Some(action.to_owned()), ..Default::default() }).await;
    echo(state, kind, payload).await;
}

#[derive(Debug, Deserialize)]
struct SetModePayload {
    mode: Mode,
}

async fn handle_set_mode(state: &Arc<HubState>, payload: Value) {
    let Ok(req) = serde_json::from_value::<SetModePayload>(payload) else {
        tracing::debug!("set_mode command had an unparsable payload, dropping");
        return;
    };
    apply_and_notify(state, PetStatePatch { mode: Some(req.mode), ..Default::default() }).await;
}

#[derive(Debug, Deserialize)]
struct EvolvePayload {
    stage: i64,
}

async fn handle_evolve(state: &Arc<HubState>, payload: Value) {
    let Ok(req) = serde_json::from_value::<EvolvePayload>(payload) else {
        tracing::debug!("evolve command had an unparsable payload, dropping");
        return;
    };
    let previous_stage = state.pet.read().await.evolution_stage;
    apply_and_notify(state, PetStatePatch { evolution_stage: Some(req.stage), ..Default::default() }).await;

    if req.stage > previous_stage {
        state
            .send_to_peer(&json!({
                "type": "user_event",
                "payload": {"event": "milestone", "stage": req.stage},
                "timestamp": epoch_ms(),
            }))
            .await;
    }
}

#[derive(Debug, Deserialize, Default)]
struct MoveTo {
    x: i64,
    y: i64,
    #[serde(default)]
    method: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct AiDecisionPayload {
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    speech: Option<String>,
    #[serde(default)]
    emotion: Option<String>,
    #[serde(default, rename = "moveTo")]
    move_to: Option<MoveTo>,
}

/// Composite effect (spec §6 `ai_decision`): any of action/emotion/moveTo
/// update `PetState` in one patch; speech is rendered as a `speak` echo.
async fn handle_ai_decision(state: &Arc<HubState>, payload: Value) {
    let Ok(decision) = serde_json::from_value::<AiDecisionPayload>(payload) else {
        tracing::debug!("ai_decision command had an unparsable payload, dropping");
        return;
    };

    let position = if let Some(mv) = &decision.move_to {
        let edge = state.pet.read().await.position.edge;
        Some(Position { x: mv.x, y: mv.y, edge })
    } else {
        None
    };

    if decision.action.is_some() || decision.emotion.is_some() || position.is_some() {
        apply_and_notify(
            state,
            PetStatePatch { action: decision.action.clone(), emotion: decision.emotion.clone(), position, ..Default::default() },
        )
        .await;
    }

    if let Some(speech) = decision.speech {
        echo(state, "speak", json!({"text": speech})).await;
    }

    if let Some(mv) = decision.move_to {
        echo(state, "move", json!({"x": mv.x, "y": mv.y, "method": mv.method})).await;
    }
}

async fn handle_query_state(state: &Arc<HubState>) {
    let snapshot = state.pet.read().await.clone();
    state
        .send_to_peer(&json!({
            "type": "state_response",
            "payload": snapshot,
            "timestamp": epoch_ms(),
        }))
        .await;
}

async fn handle_query_screen(state: &Arc<HubState>, probe: &Arc<dyn PlatformProbe>) {
    let capture = probe.capture_screen().await;
    let payload = match capture {
        Some(c) => json!({"captured": true, "image": c.image_base64, "width": c.width, "height": c.height}),
        None => json!({"captured": false}),
    };
    state
        .send_to_peer(&json!({"type": "screen_capture", "payload": payload, "timestamp": epoch_ms()}))
        .await;
}

async fn handle_query_windows(state: &Arc<HubState>, probe: &Arc<dyn PlatformProbe>) {
    let windows = probe.window_list().await;
    state
        .send_to_peer(&json!({
            "type": "window_positions",
            "payload": {"windows": windows},
            "timestamp": epoch_ms(),
        }))
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emote_table_matches_spec() {
        assert_eq!(emote_action("happy"), "excited");
        assert_eq!(emote_action("curious"), "walking");
        assert_eq!(emote_action("sleepy"), "sleeping");
        assert_eq!(emote_action("scared"), "scared");
        assert_eq!(emote_action("playful"), "playing");
        assert_eq!(emote_action("proud"), "excited");
        assert_eq!(emote_action("neutral"), "idle");
        assert_eq!(emote_action("focused"), "idle");
        assert_eq!(emote_action("affectionate"), "interacting");
    }

    #[tokio::test]
    async fn malformed_json_is_dropped_without_panicking() {
        use crate::config::HubConfig;
        use tokio_util::sync::CancellationToken;

        let state = Arc::new(HubState::new(HubConfig::default(), CancellationToken::new()));
        let probe: Arc<dyn PlatformProbe> =
            Arc::new(crate::observer::platform::test_support::FakeProbe::default());
        dispatch(&state, &probe, "{not json").await;
        // No panic, and PetState is unchanged (invariant 2).
        assert_eq!(state.pet.read().await.action, "idle");
    }

    #[tokio::test]
    async fn unknown_type_leaves_pet_state_unchanged() {
        use crate::config::HubConfig;
        use tokio_util::sync::CancellationToken;

        let state = Arc::new(HubState::new(HubConfig::default(), CancellationToken::new()));
        let probe: Arc<dyn PlatformProbe> =
            Arc::new(crate::observer::platform::test_support::FakeProbe::default());
        dispatch(&state, &probe, r#"{"type":"not_a_real_command","payload":{}}"#).await;
        let pet = state.pet.read().await;
        assert_eq!(pet.action, "idle");
        assert_eq!(pet.emotion, "neutral");
    }

    #[tokio::test]
    async fn set_mode_mutates_pet_state() {
        use crate::config::HubConfig;
        use tokio_util::sync::CancellationToken;

        let state = Arc::new(HubState::new(HubConfig::default(), CancellationToken::new()));
        let probe: Arc<dyn PlatformProbe> =
            Arc::new(crate::observer::platform::test_support::FakeProbe::default());
        dispatch(&state, &probe, r#"{"type":"set_mode","payload":{"mode":"incarnation"}}"#).await;
        assert_eq!(state.pet.read().await.mode, Mode::Incarnation);
    }

    #[tokio::test]
    async fn evolution_stage_is_clamped_through_evolve_command() {
        use crate::config::HubConfig;
        use tokio_util::sync::CancellationToken;

        let state = Arc::new(HubState::new(HubConfig::default(), CancellationToken::new()));
        let probe: Arc<dyn PlatformProbe> =
            Arc::new(crate::observer::platform::test_support::FakeProbe::default());
        dispatch(&state, &probe, r#"{"type":"evolve","payload":{"stage":-3}}"#).await;
        assert_eq!(state.pet.read().await.evolution_stage, 0);
    }
}
