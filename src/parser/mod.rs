// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command Parser (C2): maps free-text (Korean + English) to one of six
//! tagged records, evaluated in fixed priority order (spec §4.2). Pure,
//! deterministic, and safe against pathological regex input — the `regex`
//! crate's linear-time guarantee plus this module's anchored, precompiled
//! patterns rule out catastrophic backtracking (spec §4.2, §9).

pub mod patterns;

use crate::observer::platform::{KnownFolder, PlatformProbe};
use crate::state::Mode;

/// The parser's six tagged output records (spec §4.2).
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedCommand {
    SetMode { mode: Mode },
    PresetCharacter { name: String },
    CharacterChange { concept: String },
    SmartFileOp { source: String, filter: String, target: String, auto_category: bool },
    Action { action: &'static str },
    Speak { text: String },
}

/// Parse one user-provided string into a [`ParsedCommand`], trying each
/// priority tier in order and returning on the first match.
pub fn parse(input: &str, probe: &dyn PlatformProbe) -> ParsedCommand {
    let trimmed = input.trim();

    if let Some(mode) = try_mode(trimmed) {
        return ParsedCommand::SetMode { mode };
    }
    if let Some(name) = try_preset(trimmed) {
        return ParsedCommand::PresetCharacter { name };
    }
    if let Some(concept) = try_character_change(trimmed) {
        return ParsedCommand::CharacterChange { concept };
    }
    if let Some(command) = try_file_op(trimmed, probe) {
        return command;
    }
    if let Some(action) = try_action(trimmed) {
        return ParsedCommand::Action { action };
    }

    ParsedCommand::Speak { text: input.to_owned() }
}

fn try_mode(input: &str) -> Option<Mode> {
    let caps = patterns::MODE_RE.captures(input)?;
    let word = caps.get(1)?.as_str().replace(' ', "").to_lowercase();
    match word.as_str() {
        "pet" | "펫" => Some(Mode::Pet),
        "incarnation" | "화신" => Some(Mode::Incarnation),
        "both" | "둘다" => Some(Mode::Both),
        _ => None,
    }
}

fn try_preset(input: &str) -> Option<String> {
    let caps = patterns::PRESET_RE.captures(input)?;
    let word = caps.get(1)?.as_str();
    patterns::resolve_preset(word).map(|canonical| canonical.to_owned())
}

fn try_character_change(input: &str) -> Option<String> {
    patterns::CHARACTER_CHANGE_RES
        .iter()
        .find_map(|re| re.captures(input).and_then(|caps| caps.get(1)).map(|m| m.as_str().trim().to_owned()))
}

fn resolve_source(captured: Option<&str>, probe: &dyn PlatformProbe) -> String {
    let alias_word = captured.unwrap_or("desktop");
    match patterns::resolve_alias(alias_word) {
        Some(folder) => probe.known_folder_path(folder).unwrap_or_else(|| alias_word.to_owned()),
        None => alias_word.to_owned(),
    }
}

fn try_file_op(input: &str, probe: &dyn PlatformProbe) -> Option<ParsedCommand> {
    patterns::FILE_OP_RES.iter().find_map(|re| {
        let caps = re.captures(input)?;
        let source = resolve_source(caps.name("source").map(|m| m.as_str()), probe);
        let filter = caps.name("filter").map(|m| m.as_str().to_owned()).unwrap_or_else(|| "*".to_owned());

        let (target, auto_category) = match caps.name("target").map(|m| m.as_str()) {
            Some(t) if !t.eq_ignore_ascii_case("auto") => (t.to_owned(), false),
            _ => ("auto".to_owned(), true),
        };

        Some(ParsedCommand::SmartFileOp { source, filter, target, auto_category })
    })
}

fn try_action(input: &str) -> Option<&'static str> {
    let lower = input.to_lowercase();
    patterns::ACTION_KEYWORDS.iter().find(|(kw, _)| lower.contains(kw.as_str())).map(|(_, action)| *action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::platform::test_support::FakeProbe;

    fn probe() -> FakeProbe {
        FakeProbe::default()
    }

    #[test]
    fn korean_smart_file_op_scenario() {
        let p = probe();
        let result = parse("바탕화면의 .md 파일을 docs 폴더에 넣어줘", &p);
        assert_eq!(
            result,
            ParsedCommand::SmartFileOp {
                source: probe().known_folder_path(KnownFolder::Desktop).unwrap(),
                filter: ".md".to_owned(),
                target: "docs".to_owned(),
                auto_category: false,
            }
        );
    }

    #[test]
    fn english_clean_up_scenario_defaults_to_auto_category() {
        let p = probe();
        let result = parse("clean up desktop", &p);
        assert_eq!(
            result,
            ParsedCommand::SmartFileOp {
                source: probe().known_folder_path(KnownFolder::Desktop).unwrap(),
                filter: "*".to_owned(),
                target: "auto".to_owned(),
                auto_category: true,
            }
        );
    }

    #[test]
    fn mode_change_is_recognized() {
        let p = probe();
        assert_eq!(parse("pet mode", &p), ParsedCommand::SetMode { mode: Mode::Pet });
        assert_eq!(parse("화신 모드로 바꿔", &p), ParsedCommand::SetMode { mode: Mode::Incarnation });
    }

    #[test]
    fn preset_character_is_recognized() {
        let p = probe();
        assert_eq!(parse("고양이로 바꿔", &p), ParsedCommand::PresetCharacter { name: "cat".to_owned() });
    }

    #[test]
    fn character_change_captures_the_concept() {
        let p = probe();
        assert_eq!(
            parse("change my character to a sleepy astronaut", &p),
            ParsedCommand::CharacterChange { concept: "a sleepy astronaut".to_owned() }
        );
    }

    #[test]
    fn action_keyword_is_recognized() {
        let p = probe();
        assert_eq!(parse("go jump around!", &p), ParsedCommand::Action { action: "jumping" });
    }

    #[test]
    fn unmatched_input_falls_back_to_speak() {
        let p = probe();
        assert_eq!(
            parse("how's the weather today?", &p),
            ParsedCommand::Speak { text: "how's the weather today?".to_owned() }
        );
    }

    #[test]
    fn setting_pattern_wins_over_character_pattern_when_both_could_match() {
        // "pet mode" should never be captured as a character-change concept.
        let p = probe();
        assert_eq!(parse("pet mode", &p), ParsedCommand::SetMode { mode: Mode::Pet });
    }

    #[test]
    fn parser_is_case_insensitive_for_ascii_input() {
        let p = probe();
        assert_eq!(parse("PET MODE", &p), ParsedCommand::SetMode { mode: Mode::Pet });
    }

    #[test]
    fn long_pathological_looking_input_parses_quickly() {
        let p = probe();
        let pathological = "a".repeat(5_000) + " - " + &"b".repeat(5_000);
        let start = std::time::Instant::now();
        let _ = parse(&pathological, &p);
        assert!(start.elapsed() < std::time::Duration::from_millis(500));
    }
}
