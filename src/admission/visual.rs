// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The closed Visual Triggers set (spec §4.5, §8 invariant 5): trigger names
//! that get screen-capture + cursor enrichment at admission time.

const VISUAL_TRIGGERS: &[&str] = &[
    "shopping_detected",
    "checkout_detected",
    "checkout_abandoned",
    "coding_detected",
    "terminal_detected",
    "document_detected",
    "dev_web_detected",
    "error_detected",
    "error_loop",
    "long_focus",
    "deep_focus",
    "focus_break",
    "reading_detected",
    "wiki_detected",
    "wiki_rabbit_hole",
    "search_detected",
    "repeated_search",
    "research_mode",
    "price_comparison",
    "procrastination",
    "social_detected",
    "social_scrolling",
    "video_detected",
    "gaming_detected",
    "news_detected",
    "meeting_detected",
    "email_detected",
    "messaging_detected",
    "forum_detected",
    "job_search_detected",
];

pub fn is_visual_trigger(name: &str) -> bool {
    VISUAL_TRIGGERS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn about_thirty_visual_triggers() {
        assert!(VISUAL_TRIGGERS.len() >= 25, "expected close to 30 visual triggers, got {}", VISUAL_TRIGGERS.len());
    }

    #[test]
    fn shopping_and_errors_are_visual() {
        assert!(is_visual_trigger("shopping_detected"));
        assert!(is_visual_trigger("error_loop"));
    }

    #[test]
    fn idle_triggers_are_not_visual() {
        assert!(!is_visual_trigger("idle_entered"));
        assert!(!is_visual_trigger("idle_return"));
    }
}
