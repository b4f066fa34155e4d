// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Trigger importance table (spec §4.7). Stamped onto each [`super::Trigger`]
//! at classification time; consumed by both admission (no effect there) and
//! Brain Triggers (routing, model tier, token budget, cache eligibility).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    High,
    Medium,
    Low,
}

const HIGH: &[&str] = &[
    "error_loop",
    "checkout_detected",
    "late_night",
    "dawn_coding",
    "idle_return",
    "procrastination",
];

const MEDIUM: &[&str] = &[
    "shopping_detected",
    "coding_detected",
    "social_scrolling",
    "deep_focus",
    "error_detected",
    "wiki_rabbit_hole",
    "price_comparison",
    "focus_break",
];

/// Classify a trigger name's importance. Anything not in the HIGH or MEDIUM
/// tables is LOW (spec §4.7: "all others LOW").
pub fn classify(trigger_name: &str) -> Importance {
    if HIGH.contains(&trigger_name) {
        Importance::High
    } else if MEDIUM.contains(&trigger_name) {
        Importance::Medium
    } else {
        Importance::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_loop_is_high() {
        assert_eq!(classify("error_loop"), Importance::High);
    }

    #[test]
    fn coding_detected_is_medium() {
        assert_eq!(classify("coding_detected"), Importance::Medium);
    }

    #[test]
    fn unlisted_trigger_is_low() {
        assert_eq!(classify("music_detected"), Importance::Low);
    }
}
