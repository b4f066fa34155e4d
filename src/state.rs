// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared hub state: the canonical `PetState` (C4) and the single-peer channel
//! registration shared between the channel, dispatcher, and brain.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;

use crate::clock::{Clock, SystemClock};
use crate::config::HubConfig;

/// Mode the companion is operating in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Pet,
    Incarnation,
    Both,
}

/// Which screen edge the companion is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Bottom,
    Top,
    Left,
    Right,
    Surface,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub x: i64,
    pub y: i64,
    pub edge: Edge,
}

impl Default for Position {
    fn default() -> Self {
        Self { x: 0, y: 0, edge: Edge::Bottom }
    }
}

/// The canonical, hub-owned companion state (spec §3, §4.8).
///
/// Mutated only by channel-inbound commands and dispatched brain responses.
/// Every mutation emits a `pet_state_update` event on the channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PetState {
    pub mode: Mode,
    pub position: Position,
    pub action: String,
    pub emotion: String,
    pub evolution_stage: i64,
    #[serde(default)]
    pub memory: serde_json::Map<String, serde_json::Value>,
}

impl Default for PetState {
    fn default() -> Self {
        Self {
            mode: Mode::Pet,
            position: Position::default(),
            action: "idle".to_owned(),
            emotion: "neutral".to_owned(),
            evolution_stage: 0,
            memory: serde_json::Map::new(),
        }
    }
}

/// A field-wise patch applied atomically to `PetState`. Absent fields are left
/// unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PetStatePatch {
    pub mode: Option<Mode>,
    pub position: Option<Position>,
    pub action: Option<String>,
    pub emotion: Option<String>,
    pub evolution_stage: Option<i64>,
    pub memory: Option<serde_json::Map<String, serde_json::Value>>,
}

impl PetState {
    /// Merge a patch in place. Invariants (closed `mode`/`edge` sets,
    /// `evolution_stage >= 0`) are upheld by construction: `Mode`/`Edge` are
    /// closed enums and `evolution_stage` is clamped to zero.
    pub fn apply(&mut self, patch: PetStatePatch) {
        if let Some(mode) = patch.mode {
            self.mode = mode;
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(action) = patch.action {
            self.action = action;
        }
        if let Some(emotion) = patch.emotion {
            self.emotion = emotion;
        }
        if let Some(stage) = patch.evolution_stage {
            self.evolution_stage = stage.max(0);
        }
        if let Some(memory) = patch.memory {
            self.memory = memory;
        }
    }
}

/// Handle to the single connected WebSocket peer.
///
/// Only one peer may be active at a time (spec §4.1). A new connection
/// replaces the existing one (Open Question #1, resolved in DESIGN.md).
pub struct PeerHandle {
    pub id: u64,
    pub tx: mpsc::UnboundedSender<String>,
    pub cancel: CancellationToken,
}

/// Monotonically increasing counter handed out to each new peer connection.
#[derive(Default)]
pub struct PeerIdGen(AtomicU64);

impl PeerIdGen {
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

/// Shared hub state threaded through every task.
pub struct HubState {
    pub config: HubConfig,
    pub shutdown: CancellationToken,
    pub clock: Arc<dyn Clock>,
    pub pet: RwLock<PetState>,
    pub peer: RwLock<Option<PeerHandle>>,
    pub peer_ids: PeerIdGen,
    pub metrics: crate::metrics::Metrics,
}

impl HubState {
    pub fn new(config: HubConfig, shutdown: CancellationToken) -> Self {
        Self {
            config,
            shutdown,
            clock: Arc::new(SystemClock),
            pet: RwLock::new(PetState::default()),
            peer: RwLock::new(None),
            peer_ids: PeerIdGen::default(),
            metrics: crate::metrics::Metrics::default(),
        }
    }

    /// Whether a peer is currently connected. Used by the dispatcher to choose
    /// between the channel and the brain fallback.
    pub async fn has_peer(&self) -> bool {
        self.peer.read().await.is_some()
    }

    /// Send a JSON-serializable event to the current peer, if any. Returns
    /// `true` if a peer was connected and the send was attempted.
    pub async fn send_to_peer(&self, value: &serde_json::Value) -> bool {
        let guard = self.peer.read().await;
        let Some(peer) = guard.as_ref() else { return false };
        let Ok(text) = serde_json::to_string(value) else { return false };
        if peer.tx.send(text).is_err() {
            drop(guard);
            *self.peer.write().await = None;
            return false;
        }
        true
    }
}

/// Current epoch millis, matching the pack's convention for wire timestamps.
pub fn epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_only_touches_named_fields() {
        let mut pet = PetState::default();
        pet.apply(PetStatePatch {
            action: Some("jumping".to_owned()),
            ..Default::default()
        });
        assert_eq!(pet.action, "jumping");
        assert_eq!(pet.emotion, "neutral");
        assert_eq!(pet.mode, Mode::Pet);
    }

    #[test]
    fn evolution_stage_never_negative() {
        let mut pet = PetState::default();
        pet.apply(PetStatePatch { evolution_stage: Some(-5), ..Default::default() });
        assert_eq!(pet.evolution_stage, 0);
    }
}
