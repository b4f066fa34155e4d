// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Composite detectors (spec §4.4): window-based patterns computed from the
//! shared title/category history rather than from a single observation.
//!
//! Each detector is a pure function over a [`History`] snapshot and the
//! current time, per spec §9: "expose a single read-only view to all
//! detectors" rather than having each recompute its own buffers.

use crate::classifier::categories::{FUN_SET, WORK_SET};
use crate::classifier::history::History;

/// Durable hold-duration state the classifier tracks outside the bounded,
/// age-pruned history rings. `long_focus`/`deep_focus`/`social_scrolling`
/// need hold windows of 10-20 minutes; the title ring alone (capacity 50 at
/// one push per 5s tick) only ever spans ~250s, so these three detections
/// must be driven off timestamps the classifier keeps for exactly this
/// purpose rather than reconstructed by scanning the ring (spec §4.4).
pub struct FocusState {
    pub title_held_ms: i64,
    pub app_held_ms: i64,
    pub focus_category: Option<&'static str>,
    pub social_held_ms: i64,
}

/// One detector evaluation: all composites run every time a title or
/// category history update is pushed, and each yields at most one name.
pub fn detect_all(history: &History, now: i64, focus: &FocusState) -> Vec<&'static str> {
    let mut fired = Vec::new();
    if wiki_rabbit_hole(history, now) {
        fired.push("wiki_rabbit_hole");
    }
    if price_comparison(history, now) {
        fired.push("price_comparison");
    }
    if research_mode(history, now) {
        fired.push("research_mode");
    }
    if procrastination(history, now) {
        fired.push("procrastination");
    }
    if repeated_search(history, now) {
        fired.push("repeated_search");
    }
    if rapid_switching(history, now) {
        fired.push("rapid_switching");
    }
    if let Some(name) = long_focus_or_deep_focus(focus) {
        fired.push(name);
    }
    if social_scrolling(focus) {
        fired.push("social_scrolling");
    }
    fired
}

fn distinct_category_titles_within(history: &History, category: &str, window_ms: i64, now: i64) -> usize {
    history
        .titles
        .iter()
        .filter(|(ts, entry)| now - *ts <= window_ms && entry.category == Some(category))
        .map(|(_, entry)| entry.title.as_str())
        .collect::<std::collections::HashSet<_>>()
        .len()
}

/// `>= 3` distinct wiki-category titles in 60s.
fn wiki_rabbit_hole(history: &History, now: i64) -> bool {
    distinct_category_titles_within(history, "wiki", 60_000, now) >= 3
}

/// `>= 3` distinct shopping-category titles in 60s.
fn price_comparison(history: &History, now: i64) -> bool {
    distinct_category_titles_within(history, "shopping", 60_000, now) >= 3
}

/// `>= 1` search title plus `>= 2` clipboard copies, both within 30s.
fn research_mode(history: &History, now: i64) -> bool {
    let has_search = history
        .titles
        .iter()
        .any(|(ts, entry)| now - *ts <= 30_000 && entry.category == Some("search"));
    has_search && history.clips.count_within(now, 30_000) >= 2
}

/// `>= 3` alternations between the work-set and fun-set categories in 60s.
fn procrastination(history: &History, now: i64) -> bool {
    let recent: Vec<&'static str> = history
        .categories
        .iter()
        .filter(|(ts, _)| now - *ts <= 60_000)
        .map(|(_, cat)| *cat)
        .collect();

    let mut alternations = 0;
    let mut last_side: Option<bool> = None; // true = work, false = fun
    for cat in recent {
        let side = if WORK_SET.contains(&cat) {
            Some(true)
        } else if FUN_SET.contains(&cat) {
            Some(false)
        } else {
            None
        };
        let Some(side) = side else { continue };
        if let Some(prev) = last_side {
            if prev != side {
                alternations += 1;
            }
        }
        last_side = Some(side);
    }
    alternations >= 3
}

/// `>= 3` distinct search titles in 60s.
fn repeated_search(history: &History, now: i64) -> bool {
    history.searches.distinct_within(now, 60_000) >= 3
}

/// `>= 5` app changes in 60s.
fn rapid_switching(history: &History, now: i64) -> bool {
    history.app_switches.count_within(now, 60_000) >= 5
}

/// `long_focus`: same title held >= 10min. `deep_focus`: same app, category in
/// `{coding, document, terminal}`, held >= 20min. Deep focus is checked first
/// since it is the stronger (longer) condition and the two are not expected
/// to co-fire for the same observation in practice.
fn long_focus_or_deep_focus(focus: &FocusState) -> Option<&'static str> {
    let is_focus_category = matches!(focus.focus_category, Some("coding") | Some("document") | Some("terminal"));

    if is_focus_category && focus.app_held_ms >= 1_200_000 {
        Some("deep_focus")
    } else if focus.title_held_ms >= 600_000 {
        Some("long_focus")
    } else {
        None
    }
}

/// Social category held >= 10min (an alternate path to `long_focus`, still
/// gated by its own cooldown downstream).
fn social_scrolling(focus: &FocusState) -> bool {
    focus.focus_category == Some("social") && focus.social_held_ms >= 600_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::history::TitleEntry;

    fn push_title(history: &mut History, ts: i64, title: &str, app: &str, category: Option<&'static str>) {
        history.titles.push(ts, TitleEntry { title: title.to_owned(), app: app.to_owned(), category });
        if let Some(cat) = category {
            history.categories.push(ts, cat);
        }
    }

    #[test]
    fn wiki_rabbit_hole_requires_three_distinct_titles() {
        let mut h = History::default();
        push_title(&mut h, 0, "Rust - Wikipedia", "Firefox", Some("wiki"));
        push_title(&mut h, 10_000, "Ferris - Wikipedia", "Firefox", Some("wiki"));
        assert!(!wiki_rabbit_hole(&h, 20_000));
        push_title(&mut h, 20_000, "Crab - Wikipedia", "Firefox", Some("wiki"));
        assert!(wiki_rabbit_hole(&h, 20_000));
    }

    #[test]
    fn procrastination_counts_alternations_not_occurrences() {
        let mut h = History::default();
        push_title(&mut h, 0, "main.rs - VSCode", "VSCode", Some("coding"));
        push_title(&mut h, 5_000, "Cat Video - YouTube", "Firefox", Some("video"));
        push_title(&mut h, 10_000, "main.rs - VSCode", "VSCode", Some("coding"));
        push_title(&mut h, 15_000, "Cat Video - YouTube", "Firefox", Some("video"));
        assert!(procrastination(&h, 15_000));
    }

    #[test]
    fn rapid_switching_counts_app_switches_within_window() {
        let mut h = History::default();
        for (i, app) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            h.app_switches.push(i as i64 * 1_000, (*app).to_owned());
        }
        assert!(rapid_switching(&h, 5_000));
    }

    #[test]
    fn deep_focus_requires_20min_same_app_in_focus_category() {
        let still_long_focus = FocusState {
            title_held_ms: 1_199_000,
            app_held_ms: 1_199_000,
            focus_category: Some("coding"),
            social_held_ms: 0,
        };
        assert_eq!(long_focus_or_deep_focus(&still_long_focus), Some("long_focus"));

        let now_deep_focus = FocusState {
            title_held_ms: 1_200_000,
            app_held_ms: 1_200_000,
            focus_category: Some("coding"),
            social_held_ms: 0,
        };
        assert_eq!(long_focus_or_deep_focus(&now_deep_focus), Some("deep_focus"));
    }

    #[test]
    fn long_focus_does_not_require_a_focus_category() {
        let focus = FocusState { title_held_ms: 600_000, app_held_ms: 0, focus_category: Some("video"), social_held_ms: 0 };
        assert_eq!(long_focus_or_deep_focus(&focus), Some("long_focus"));
    }

    #[test]
    fn social_scrolling_requires_ten_minutes_held() {
        let not_yet = FocusState { title_held_ms: 0, app_held_ms: 0, focus_category: Some("social"), social_held_ms: 599_000 };
        assert!(!social_scrolling(&not_yet));

        let held = FocusState { title_held_ms: 0, app_held_ms: 0, focus_category: Some("social"), social_held_ms: 600_000 };
        assert!(social_scrolling(&held));
    }

    #[test]
    fn hold_durations_unreachable_within_the_bounded_ring_still_fire_via_focus_state() {
        // The title ring is capacity-50 at one push per 5s tick (~250s span),
        // far short of the 600s/1_200s thresholds these detections need.
        // Driving them off `FocusState` (durable classifier-owned timestamps)
        // rather than the ring makes them reachable regardless of ring size.
        let focus = FocusState {
            title_held_ms: 20 * 60_000,
            app_held_ms: 20 * 60_000,
            focus_category: Some("terminal"),
            social_held_ms: 0,
        };
        assert_eq!(long_focus_or_deep_focus(&focus), Some("deep_focus"));
    }
}
