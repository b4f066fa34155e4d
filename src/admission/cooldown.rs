// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-trigger cooldown table (spec §4.5). Shipped verbatim as configuration
//! data. Per spec §9 ("some trigger names appear in the default cooldown
//! table but have no emitting detector in the observed source"), this table
//! intentionally lists more names than the classifier currently emits —
//! entries exist so a future detector can be wired in without touching
//! admission.

/// `(trigger name, cooldown milliseconds)`.
const TABLE: &[(&str, i64)] = &[
    // Representative values called out explicitly in the spec.
    ("clipboard_copy", 10_000),
    ("app_switch", 20_000),
    ("error_detected", 30_000),
    ("error_loop", 120_000),
    ("long_focus", 300_000),
    ("deep_focus", 600_000),
    ("late_night", 600_000),
    ("pre_lunch", 1_800_000),
    ("end_of_work", 1_800_000),
    ("weekend_work", 3_600_000),
    // Clipboard classifications.
    ("clipboard_url", 60_000),
    ("clipboard_code", 60_000),
    ("clipboard_email", 60_000),
    ("clipboard_phone", 60_000),
    ("clipboard_long", 60_000),
    ("clipboard_image_copy", 60_000),
    ("repeated_copy", 120_000),
    // Idle.
    ("idle_entered", 60_000),
    ("idle_return", 60_000),
    // Composite detections.
    ("wiki_rabbit_hole", 180_000),
    ("price_comparison", 180_000),
    ("research_mode", 180_000),
    ("procrastination", 180_000),
    ("repeated_search", 120_000),
    ("rapid_switching", 120_000),
    ("social_scrolling", 300_000),
    // Time triggers.
    ("dawn_coding", 600_000),
    // Brain-only escalations with no classifier-side emitter in this
    // implementation (spec §9 open question #2): cooldown entries are
    // shipped so the table is complete even though nothing fires them yet.
    ("focus_break", 300_000),
    ("checkout_abandoned", 300_000),
    ("browsing_loop", 180_000),
];

/// Look up a trigger's cooldown, falling back to `default_cooldown_ms` and
/// then to any matching category-trigger cooldown from [`super::categories`]
/// if the name isn't in this table.
pub fn cooldown_ms(trigger_name: &str, default_cooldown_ms: i64) -> i64 {
    if let Some((_, ms)) = TABLE.iter().find(|(name, _)| *name == trigger_name) {
        return *ms;
    }
    if let Some(ms) = crate::classifier::categories::cooldown_for_trigger(trigger_name) {
        return ms;
    }
    default_cooldown_ms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_triggers_use_their_table_entry() {
        assert_eq!(cooldown_ms("error_loop", 30_000), 120_000);
        assert_eq!(cooldown_ms("weekend_work", 30_000), 3_600_000);
    }

    #[test]
    fn category_triggers_fall_through_to_category_table() {
        assert_eq!(cooldown_ms("shopping_detected", 30_000), 120_000);
    }

    #[test]
    fn unknown_trigger_uses_default() {
        assert_eq!(cooldown_ms("totally_unheard_of", 30_000), 30_000);
    }
}
