// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! LOW-importance batch buffer (spec §4.7): a FIFO with a single 10s
//! single-shot timer armed by the first insertion. On expiry the buffer
//! collapses to one survivor trigger.

use crate::admission::visual::is_visual_trigger;
use crate::classifier::Trigger;

#[derive(Default)]
pub struct BatchBuffer {
    entries: Vec<Trigger>,
}

impl BatchBuffer {
    /// Push a LOW trigger. Returns `true` if this insertion armed the timer
    /// (i.e. the buffer was previously empty).
    pub fn push(&mut self, trigger: Trigger) -> bool {
        let armed = self.entries.is_empty();
        self.entries.push(trigger);
        armed
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drain the buffer, collapsing to a single survivor: prefer a
    /// visual-capable trigger (spec §4.7: "prefer one whose name is in the
    /// visual set"), else the newest by timestamp.
    pub fn drain_collapse(&mut self) -> Option<Trigger> {
        if self.entries.is_empty() {
            return None;
        }
        let entries = std::mem::take(&mut self.entries);
        let visual_survivor = entries.iter().rposition(|t| is_visual_trigger(t.name));
        let survivor_idx = visual_survivor.unwrap_or(entries.len() - 1);
        entries.into_iter().nth(survivor_idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trigger(name: &'static str, ts: i64) -> Trigger {
        Trigger {
            importance: crate::classifier::importance::classify(name),
            name,
            context: serde_json::Map::new(),
            ts,
            active_title: None,
            active_app: None,
        }
    }

    #[test]
    fn first_push_arms_the_timer_subsequent_pushes_dont() {
        let mut batch = BatchBuffer::default();
        assert!(batch.push(trigger("music_detected", 0)));
        assert!(!batch.push(trigger("reading_detected", 3_000)));
    }

    #[test]
    fn collapse_prefers_visual_capable_trigger_over_newest() {
        let mut batch = BatchBuffer::default();
        batch.push(trigger("music_detected", 0));
        batch.push(trigger("coding_detected", 3_000)); // visual-capable
        batch.push(trigger("music_detected", 7_000)); // newest, not visual
        let survivor = batch.drain_collapse().expect("non-empty");
        assert_eq!(survivor.name, "coding_detected");
        assert!(batch.is_empty());
    }

    #[test]
    fn collapse_falls_back_to_newest_when_nothing_is_visual() {
        let mut batch = BatchBuffer::default();
        batch.push(trigger("music_detected", 0));
        batch.push(trigger("finance_detected", 7_000));
        let survivor = batch.drain_collapse().expect("non-empty");
        assert_eq!(survivor.name, "finance_detected");
    }

    #[test]
    fn collapse_on_empty_buffer_returns_none() {
        let mut batch = BatchBuffer::default();
        assert!(batch.drain_collapse().is_none());
    }
}
