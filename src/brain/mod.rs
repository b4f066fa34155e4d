// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Brain Triggers (C8): the in-process fallback "brain" that acts on fired
//! triggers when no channel peer is connected (spec §4.7).

pub mod batch;
pub mod importance;
pub mod model;
pub mod prompt;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::brain::batch::BatchBuffer;
use crate::brain::importance::Importance;
use crate::brain::model::{HttpModelClient, ModelClient, ModelRequest, ModelResponse, StubModelClient};
use crate::brain::prompt::PromptExtras;
use crate::classifier::Trigger;
use crate::state::{epoch_ms, HubState, PetStatePatch};

struct Inner {
    state: Arc<HubState>,
    model: Arc<dyn ModelClient>,
    batch: Mutex<BatchBuffer>,
    cache: Mutex<HashMap<String, ModelResponse>>,
}

/// The in-process fallback brain. Cheap to clone: all fields live behind a
/// shared `Arc` so the batch-timer task and the dispatcher can each hold
/// their own handle.
#[derive(Clone)]
pub struct BrainTriggers(Arc<Inner>);

impl BrainTriggers {
    pub fn new(state: Arc<HubState>) -> Self {
        let model: Arc<dyn ModelClient> = match (&state.config.model_api_base, &state.config.model_api_key) {
            (Some(base), Some(key)) => {
                Arc::new(HttpModelClient::new(base.clone(), key.clone(), state.config.model_timeout()))
            }
            _ => Arc::new(StubModelClient),
        };
        Self(Arc::new(Inner {
            state,
            model,
            batch: Mutex::new(BatchBuffer::default()),
            cache: Mutex::new(HashMap::new()),
        }))
    }

    /// Whether the fallback brain is available to act. Always true in this
    /// implementation: the brain degrades to [`StubModelClient`] rather than
    /// going inactive when no model API is configured (spec leaves the
    /// "active" condition otherwise unspecified; see DESIGN.md).
    pub fn is_active(&self) -> bool {
        true
    }

    /// Handle one admitted trigger (spec §4.7): LOW triggers join the batch
    /// buffer; MEDIUM/HIGH are processed immediately.
    pub async fn handle(&self, trigger: Trigger) {
        match trigger.importance {
            Importance::Low => {
                let armed = self.0.batch.lock().await.push(trigger);
                if armed {
                    // The batch-timer task (spawned via `spawn_batch_timer`)
                    // polls for this on its own cadence; nothing further to
                    // do here. See `spawn_batch_timer` for the timer itself.
                }
            }
            Importance::Medium | Importance::High => {
                self.process_one(trigger).await;
            }
        }
    }

    /// Drain and collapse the batch buffer, if non-empty, processing the
    /// surviving trigger as LOW. Called by the batch-timer task.
    async fn flush_batch(&self) {
        let survivor = self.0.batch.lock().await.drain_collapse();
        if let Some(trigger) = survivor {
            self.process_one(trigger).await;
        }
    }

    async fn process_one(&self, trigger: Trigger) {
        self.0.state.metrics.brain_invocations_total.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let cache_key = format!("{}:{}", trigger.name, trigger.active_app.as_deref().unwrap_or(""));

        if importance::cache_eligible_for_read(trigger.importance) {
            if let Some(cached) = self.0.cache.lock().await.get(&cache_key).cloned() {
                self.execute_response(&trigger, cached).await;
                return;
            }
        }

        let screen_image = trigger
            .context
            .get("screen")
            .and_then(|v| v.get("image"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_owned());

        let prompt = prompt::compose(&trigger, &PromptExtras::default());
        let req = ModelRequest {
            prompt: &prompt,
            importance: trigger.importance,
            vision: screen_image.is_some(),
            screen_image_base64: screen_image.as_deref(),
        };

        let Some(response) = self.0.model.call(req).await else {
            tracing::debug!(trigger = trigger.name, "model call produced no usable response, dropping");
            return;
        };

        if importance::cache_eligible_for_write(trigger.importance) {
            self.0.cache.lock().await.insert(cache_key, response.clone());
        }

        self.execute_response(&trigger, response).await;
    }

    /// Emit the model's derived commands (spec §4.7: "speak, action, emote
    /// via the channel's local event bus"). Mutates `PetState` and notifies
    /// the peer if one is connected; harmless no-op otherwise, since by
    /// construction the brain only runs when the dispatcher found no peer.
    async fn execute_response(&self, trigger: &Trigger, response: ModelResponse) {
        let state = &self.0.state;
        let has_update = response.action.is_some() || response.emotion.is_some();

        if has_update {
            let mut patch = PetStatePatch { action: response.action.clone(), ..Default::default() };
            if let Some(emotion) = &response.emotion {
                patch.emotion = Some(emotion.clone());
            }
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

        if let Some(speech) = response.speech {
            state
                .send_to_peer(&json!({
                    "type": "speak",
                    "payload": {"text": speech, "trigger": trigger.name},
                    "timestamp": epoch_ms(),
                }))
                .await;
        }
    }
}

/// Spawn the batch-timer task (spec §5 concurrent task #6): polls the batch
/// buffer and, once armed, waits out the batch window before flushing.
pub fn spawn_batch_timer(brain: BrainTriggers, shutdown: CancellationToken) {
    let poll_interval = Duration::from_millis(250);
    tokio::spawn(async move {
        let mut armed_at: Option<tokio::time::Instant> = None;
        let batch_window = brain.0.state.config.batch_window();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(poll_interval) => {}
            }

            let is_empty = brain.0.batch.lock().await.is_empty();
            match (is_empty, armed_at) {
                (true, _) => armed_at = None,
                (false, None) => armed_at = Some(tokio::time::Instant::now()),
                (false, Some(since)) if since.elapsed() >= batch_window => {
                    brain.flush_batch().await;
                    armed_at = None;
                }
                (false, Some(_)) => {}
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::HubConfig;
    use tokio_util::sync::CancellationToken;

    fn test_state() -> Arc<HubState> {
        let mut state = HubState::new(HubConfig::default(), CancellationToken::new());
        state.clock = Arc::new(ManualClock::new(0));
        Arc::new(state)
    }

    #[tokio::test]
    async fn low_importance_trigger_is_batched_not_processed_immediately() {
        let brain = BrainTriggers::new(test_state());
        let trigger = Trigger {
            importance: crate::classifier::importance::classify("music_detected"),
            name: "music_detected",
            context: serde_json::Map::new(),
            ts: 0,
            active_title: None,
            active_app: Some("Spotify".to_owned()),
        };
        brain.handle(trigger).await;
        assert!(!brain.0.batch.lock().await.is_empty());
    }

    #[tokio::test]
    async fn high_importance_trigger_is_processed_and_cached_after() {
        let brain = BrainTriggers::new(test_state());
        let trigger = Trigger {
            importance: crate::classifier::importance::classify("error_loop"),
            name: "error_loop",
            context: serde_json::Map::new(),
            ts: 0,
            active_title: Some("Exception - Terminal".to_owned()),
            active_app: Some("Terminal".to_owned()),
        };
        brain.handle(trigger).await;
        // HIGH triggers are never cached (spec §4.7: "Cache writes for
        // everything except HIGH").
        assert!(brain.0.cache.lock().await.is_empty());
    }

    #[tokio::test]
    async fn medium_importance_trigger_writes_to_cache() {
        let brain = BrainTriggers::new(test_state());
        let trigger = Trigger {
            importance: crate::classifier::importance::classify("coding_detected"),
            name: "coding_detected",
            context: serde_json::Map::new(),
            ts: 0,
            active_title: Some("main.rs - VSCode".to_owned()),
            active_app: Some("VSCode".to_owned()),
        };
        brain.handle(trigger).await;
        assert!(!brain.0.cache.lock().await.is_empty());
    }
}
