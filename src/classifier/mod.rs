// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Trigger Classifier (C6): turns raw [`Observation`]s into named
//! [`Trigger`]s. Pure given the same history and observation (spec §4.4) —
//! all mutable state (the history buffers) is owned by the single classifier
//! task (spec §9).

pub mod categories;
pub mod clipboard;
pub mod composite;
pub mod history;
pub mod importance;
pub mod time_triggers;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use serde_json::{json, Map, Value};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::classifier::history::{History, TitleEntry};
use crate::classifier::importance::Importance;
use crate::observer::{Observation, ObservationKind};
use crate::state::HubState;

/// A closed-catalogue, time-stamped event produced by the classifier (spec
/// §3). Consumed by admission, then by the brain or the peer.
#[derive(Debug, Clone)]
pub struct Trigger {
    pub name: &'static str,
    pub context: Map<String, Value>,
    pub ts: i64,
    pub active_title: Option<String>,
    pub active_app: Option<String>,
    pub importance: Importance,
}

impl Trigger {
    fn new(name: &'static str, ts: i64, active_title: Option<String>, active_app: Option<String>) -> Self {
        Self {
            importance: importance::classify(name),
            name,
            context: Map::new(),
            ts,
            active_title,
            active_app,
        }
    }

    fn with_context(mut self, key: &str, value: Value) -> Self {
        self.context.insert(key.to_owned(), value);
        self
    }
}

const ERROR_SUBSTRINGS: &[&str] = &[
    "exception", "traceback", "stack trace", "error:", "panic:", "segmentation fault", "null pointer", "undefined is not a function",
];

/// Extract the trailing app token after the last of ` - `, ` | `, ` — `,
/// ` – ` (spec §4.4 "App-switch extraction").
fn extract_app(title: &str) -> String {
    const DELIMS: &[&str] = &[" - ", " | ", " — ", " – "];
    let mut best: Option<usize> = None;
    for delim in DELIMS {
        if let Some(idx) = title.rfind(delim) {
            let end = idx + delim.len();
            best = Some(best.map_or(end, |b| b.max(end)));
        }
    }
    match best {
        Some(pos) if pos < title.len() => title[pos..].trim().to_owned(),
        _ => title.trim().to_owned(),
    }
}

fn contains_error(lower_title: &str) -> bool {
    ERROR_SUBSTRINGS.iter().any(|s| lower_title.contains(s))
}

/// The classifier's owned state: history buffers plus the app-switch tracker.
pub struct Classifier {
    history: History,
    last_app: Option<String>,
    /// Timestamp of the most recently classified observation. Spec §5
    /// guarantees a single observer's observations arrive in emission order;
    /// a regression here means that guarantee was violated upstream, which
    /// is a logic bug, not a runtime condition (spec §7: `ClassifierConsistency`).
    last_observation_ts: i64,
    /// When the current app was first seen, for `deep_focus`'s 20min app-hold
    /// threshold. Unlike the bounded `titles` ring, this never needs pruning
    /// and so can track hold durations far longer than the ring's capacity.
    app_since_ts: i64,
    /// The current title's classified category (if any) and when it started,
    /// for `deep_focus`'s category gate and `social_scrolling`'s 10min hold.
    category_since: Option<&'static str>,
    category_since_ts: i64,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            history: History::default(),
            last_app: None,
            last_observation_ts: i64::MIN,
            app_since_ts: 0,
            category_since: None,
            category_since_ts: 0,
        }
    }
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one observation, updating history buffers as a side effect
    /// and returning every trigger the observation (plus the updated
    /// history) produces.
    ///
    /// # Panics
    ///
    /// Panics if `obs.ts` precedes the timestamp of the last-classified
    /// observation: spec §7 names this `ClassifierConsistencyError`, the one
    /// error variant allowed to abort the process.
    pub fn classify(&mut self, obs: Observation) -> Vec<Trigger> {
        if obs.ts < self.last_observation_ts {
            let err = crate::error::HubError::ClassifierConsistency(format!(
                "observation ts {} precedes last-classified ts {}, history buffers are no longer time-ordered",
                obs.ts, self.last_observation_ts
            ));
            panic!("{err}");
        }
        self.last_observation_ts = obs.ts;

        self.history.prune_all(obs.ts);
        let mut fired = Vec::new();

        match obs.kind {
            ObservationKind::ClipboardText(text) => {
                self.history.clips.push(obs.ts, ());
                let name = clipboard::classify_clipboard_text(&text);
                let mut trig = Trigger::new(name, obs.ts, None, None)
                    .with_context("length", json!(text.chars().count()));
                if name == "clipboard_url" || name == "clipboard_code" {
                    trig = trig.with_context("preview", json!(text.chars().take(120).collect::<String>()));
                }
                fired.push(trig);

                if self.history.clips.count_within(obs.ts, 60_000) >= 3 {
                    fired.push(Trigger::new("repeated_copy", obs.ts, None, None));
                }
            }

            ObservationKind::ClipboardImage => {
                fired.push(Trigger::new("clipboard_image_copy", obs.ts, None, None));
            }

            ObservationKind::ActiveTitleChanged { title } => {
                // The title just changed, so it has been held for 0ms.
                fired.extend(self.classify_title_observation(obs.ts, title, true, 0));
            }

            ObservationKind::TitleStable { title, duration_secs } => {
                // The observer computes the true hold duration itself (time
                // since its own last-change timestamp, unbounded by any ring);
                // use it directly rather than reconstructing it from history.
                let title_held_ms = (duration_secs as i64).saturating_mul(1_000);
                let mut extra = self.classify_title_observation(obs.ts, title, false, title_held_ms);
                fired.append(&mut extra);
                fired.extend(self.detect_composites(obs.ts, title_held_ms));
            }

            ObservationKind::IdleEntered => {
                fired.push(Trigger::new("idle_entered", obs.ts, None, None));
            }

            ObservationKind::IdleExited { duration_secs } => {
                fired.push(
                    Trigger::new("idle_return", obs.ts, None, None)
                        .with_context("idle_duration_secs", json!(duration_secs)),
                );
            }

            ObservationKind::Tick { hour, minute, weekday } => {
                let active_category = time_triggers::active_category(&self.history);
                for name in time_triggers::detect_all(hour, minute, weekday, active_category) {
                    fired.push(Trigger::new(name, obs.ts, None, self.last_app.clone()));
                }
            }
        }

        fired
    }

    fn classify_title_observation(&mut self, ts: i64, title: String, title_changed: bool, title_held_ms: i64) -> Vec<Trigger> {
        let mut fired = Vec::new();
        let lower = title.to_lowercase();
        let app = extract_app(&title);
        let category = categories::classify_title(&title).map(|cat| cat.name);

        let app_changed = self.last_app.as_deref() != Some(app.as_str());
        if app_changed {
            self.history.app_switches.push(ts, app.clone());
            if self.last_app.is_some() {
                fired.push(Trigger::new("app_switch", ts, Some(title.clone()), Some(app.clone())));
            }
            self.last_app = Some(app.clone());
            self.app_since_ts = ts;
        }

        if self.category_since != category {
            self.category_since = category;
            self.category_since_ts = ts;
        }

        self.history.titles.push(ts, TitleEntry { title: title.clone(), app: app.clone(), category });

        if let Some(cat) = category {
            self.history.categories.push(ts, cat);
            if let Some(def) = categories::CATEGORIES.iter().find(|c| c.name == cat) {
                fired.push(Trigger::new(def.trigger, ts, Some(title.clone()), Some(app.clone())));
            }
            if cat == "search" {
                self.history.searches.push(ts, title.clone());
            }
        }

        if contains_error(&lower) {
            self.history.errors.push(ts, ());
            fired.push(Trigger::new("error_detected", ts, Some(title.clone()), Some(app.clone())));
            if self.history.errors.count_within(ts, 300_000) >= 3 {
                fired.push(Trigger::new("error_loop", ts, Some(title.clone()), Some(app.clone())));
            }
        }

        if title_changed {
            fired.extend(self.detect_composites(ts, title_held_ms));
        }

        fired
    }

    /// Run the composite detectors, supplying the durable hold-duration state
    /// (spec §4.4's `long_focus`/`deep_focus`/`social_scrolling`) alongside
    /// the bounded history the other composites read.
    fn detect_composites(&self, ts: i64, title_held_ms: i64) -> Vec<&'static str> {
        let social_held_ms = if self.category_since == Some("social") { ts - self.category_since_ts } else { 0 };
        let focus = composite::FocusState {
            title_held_ms,
            app_held_ms: ts - self.app_since_ts,
            focus_category: self.category_since,
            social_held_ms,
        };
        composite::detect_all(&self.history, ts, &focus)
    }
}

/// Spawn the classifier task: reads observations, emits triggers onto
/// `trig_tx` (bounded; admission is expected to keep up since it only does
/// cheap map lookups except for the rare screen-capture enrichment).
pub fn spawn(
    mut classifier: Classifier,
    state: Arc<HubState>,
    mut obs_rx: mpsc::Receiver<Observation>,
    trig_tx: mpsc::Sender<Trigger>,
    shutdown: CancellationToken,
) {
    tokio::spawn(async move {
        loop {
            let obs = tokio::select! {
                _ = shutdown.cancelled() => break,
                obs = obs_rx.recv() => match obs {
                    Some(obs) => obs,
                    None => break,
                },
            };

            state.metrics.observations_total.fetch_add(1, Ordering::Relaxed);
            let triggers = classifier.classify(obs);
            state.metrics.triggers_classified_total.fetch_add(triggers.len() as u64, Ordering::Relaxed);

            for trigger in triggers {
                if trig_tx.send(trigger).await.is_err() {
                    return;
                }
            }
        }
    });
}
