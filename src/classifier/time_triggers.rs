// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time-of-day triggers (spec §4.4), evaluated against the wall-clock
//! ticker's `tick(hour, minute, weekday)` observation.

use chrono::Weekday;

use crate::classifier::categories::WORK_SET;
use crate::classifier::history::History;

/// Evaluate all time triggers for one `tick` observation. `active_category`
/// is the category of the most recently observed title, if any.
pub fn detect_all(hour: u32, minute: u32, weekday: Weekday, active_category: Option<&str>) -> Vec<&'static str> {
    let mut fired = Vec::new();
    if late_night(hour) {
        fired.push("late_night");
    }
    if dawn_coding(hour, active_category) {
        fired.push("dawn_coding");
    }
    if pre_lunch(hour, minute) {
        fired.push("pre_lunch");
    }
    if end_of_work(hour, minute) {
        fired.push("end_of_work");
    }
    if weekend_work(weekday, active_category) {
        fired.push("weekend_work");
    }
    fired
}

fn late_night(hour: u32) -> bool {
    hour >= 23 || hour < 5
}

fn dawn_coding(hour: u32, active_category: Option<&str>) -> bool {
    (2..5).contains(&hour) && matches!(active_category, Some("coding") | Some("terminal"))
}

fn pre_lunch(hour: u32, minute: u32) -> bool {
    (hour == 11 && minute >= 30) || (hour == 12 && minute == 0)
}

fn end_of_work(hour: u32, minute: u32) -> bool {
    (hour == 17 && minute >= 30) || (hour == 18 && minute <= 30)
}

fn weekend_work(weekday: Weekday, active_category: Option<&str>) -> bool {
    matches!(weekday, Weekday::Sat | Weekday::Sun)
        && active_category.map(|c| WORK_SET.contains(&c)).unwrap_or(false)
}

/// Find the most recently observed title's category, if any, to feed
/// [`detect_all`]'s `dawn_coding`/`weekend_work` checks.
pub fn active_category(history: &History) -> Option<&'static str> {
    history.titles.iter().last().and_then(|(_, entry)| entry.category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn late_night_covers_the_wraparound_window() {
        assert!(late_night(23));
        assert!(late_night(0));
        assert!(late_night(4));
        assert!(!late_night(5));
        assert!(!late_night(22));
    }

    #[test]
    fn dawn_coding_requires_coding_or_terminal_category() {
        assert!(dawn_coding(3, Some("coding")));
        assert!(dawn_coding(3, Some("terminal")));
        assert!(!dawn_coding(3, Some("social")));
        assert!(!dawn_coding(6, Some("coding")));
    }

    #[test]
    fn pre_lunch_window_is_eleven_thirty_to_noon() {
        assert!(pre_lunch(11, 30));
        assert!(pre_lunch(12, 0));
        assert!(!pre_lunch(11, 29));
        assert!(!pre_lunch(12, 1));
    }

    #[test]
    fn weekend_work_requires_work_category_on_a_weekend() {
        assert!(weekend_work(Weekday::Sat, Some("coding")));
        assert!(!weekend_work(Weekday::Sat, Some("social")));
        assert!(!weekend_work(Weekday::Mon, Some("coding")));
    }
}
