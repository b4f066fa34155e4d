// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded, time-pruned history buffers backing the composite detectors.
//!
//! Each buffer is a capacity-bounded ring plus age-based pruning (spec §3:
//! "pruning by age (60-300s depending on pattern) on every access"). Capacity
//! bounds memory; age pruning bounds what the detectors see as "recent".

use std::collections::VecDeque;

/// A single `(timestamp, value)` ring, bounded by count.
#[derive(Debug, Clone)]
pub struct Ring<T> {
    cap: usize,
    items: VecDeque<(i64, T)>,
}

impl<T> Ring<T> {
    pub fn new(cap: usize) -> Self {
        Self { cap, items: VecDeque::with_capacity(cap) }
    }

    pub fn push(&mut self, ts: i64, value: T) {
        self.items.push_back((ts, value));
        while self.items.len() > self.cap {
            self.items.pop_front();
        }
    }

    /// Drop entries older than `max_age_ms` relative to `now`.
    pub fn prune(&mut self, now: i64, max_age_ms: i64) {
        while let Some((ts, _)) = self.items.front() {
            if now - *ts > max_age_ms {
                self.items.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &(i64, T)> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Count entries newer than `now - window_ms`.
    pub fn count_within(&self, now: i64, window_ms: i64) -> usize {
        self.items.iter().filter(|(ts, _)| now - *ts <= window_ms).count()
    }

    pub fn last(&self) -> Option<&(i64, T)> {
        self.items.back()
    }
}

impl<T: Eq + std::hash::Hash + Clone> Ring<T> {
    /// Count of distinct values among entries newer than `now - window_ms`.
    pub fn distinct_within(&self, now: i64, window_ms: i64) -> usize {
        self.items
            .iter()
            .filter(|(ts, _)| now - *ts <= window_ms)
            .map(|(_, v)| v.clone())
            .collect::<std::collections::HashSet<_>>()
            .len()
    }
}

/// A title seen by the active-window observer, stamped with its classified
/// category (if any) and extracted app name.
#[derive(Debug, Clone)]
pub struct TitleEntry {
    pub title: String,
    pub app: String,
    pub category: Option<&'static str>,
}

/// Observation history feeding the composite and time detectors. Owned
/// exclusively by the classifier task (spec §9: "owned by one task each").
#[derive(Debug)]
pub struct History {
    /// Clipboard copy events, newest last. Capacity 20 (spec §3).
    pub clips: Ring<()>,
    /// Active-window titles, newest last. Capacity 50 (spec §3).
    pub titles: Ring<TitleEntry>,
    /// Category stamps (one per classified title), newest last. Capacity 30.
    pub categories: Ring<&'static str>,
    /// App names, one entry per detected app change (not every title change).
    pub app_switches: Ring<String>,
    /// Timestamps of `error_detected` classifications, for `error_loop`.
    pub errors: Ring<()>,
    /// Search-category titles, for `repeated_search` distinct-title counting.
    pub searches: Ring<String>,
}

impl Default for History {
    fn default() -> Self {
        Self {
            clips: Ring::new(20),
            titles: Ring::new(50),
            categories: Ring::new(30),
            app_switches: Ring::new(50),
            errors: Ring::new(30),
            searches: Ring::new(30),
        }
    }
}

impl History {
    /// Prune each buffer against the widest window a ring-based detector
    /// reads from it (spec §3: "pruning by age (60-300s depending on
    /// pattern)"). The 10-20min `long_focus`/`deep_focus`/`social_scrolling`
    /// hold durations are *not* among these windows: they are tracked as
    /// durable classifier-owned timestamps (`composite::FocusState`), not
    /// reconstructed from these bounded, short-window rings.
    pub fn prune_all(&mut self, now: i64) {
        self.clips.prune(now, 60_000);
        self.titles.prune(now, 600_000);
        self.categories.prune(now, 300_000);
        self.app_switches.prune(now, 60_000);
        self.errors.prune(now, 300_000);
        self.searches.prune(now, 60_000);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_bounds_by_capacity() {
        let mut r: Ring<i32> = Ring::new(3);
        for i in 0..5 {
            r.push(i as i64, i);
        }
        assert_eq!(r.len(), 3);
        let values: Vec<i32> = r.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![2, 3, 4]);
    }

    #[test]
    fn ring_prunes_by_age() {
        let mut r: Ring<i32> = Ring::new(10);
        r.push(0, 1);
        r.push(1_000, 2);
        r.push(2_000, 3);
        r.prune(2_000, 1_500);
        let values: Vec<i32> = r.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![2, 3]);
    }

    #[test]
    fn distinct_within_counts_unique_values_in_window() {
        let mut r: Ring<&str> = Ring::new(10);
        r.push(0, "a");
        r.push(10, "a");
        r.push(20, "b");
        r.push(100_000, "c");
        assert_eq!(r.distinct_within(20, 60_000), 2);
    }
}
