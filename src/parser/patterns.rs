// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Precompiled, anchored regex patterns for the command parser (spec §4.2,
//! §9: "precompiled patterns and explicit anchors to avoid catastrophic
//! backtracking").

use once_cell::sync::Lazy;
use regex::Regex;

use crate::observer::platform::KnownFolder;

#[allow(clippy::expect_used)]
fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static pattern")
}

// --- Setting / mode / preset character -------------------------------------

pub static MODE_RE: Lazy<Regex> = Lazy::new(|| {
    re(r"(?i)^(?:모드를?\s*)?(pet|incarnation|both|펫|화신|둘\s*다)\s*(?:모드|mode)?(?:로|으로)?\s*(?:바꿔|변경|전환|switch|change)?$")
});

/// Bilingual preset palette aliases (spec §4.2: "fixed palette table (>=10
/// named presets)").
pub static PRESET_TABLE: &[(&str, &str)] = &[
    ("cat", "cat"), ("고양이", "cat"),
    ("dog", "dog"), ("강아지", "dog"),
    ("fox", "fox"), ("여우", "fox"),
    ("dragon", "dragon"), ("용", "dragon"),
    ("robot", "robot"), ("로봇", "robot"),
    ("ghost", "ghost"), ("유령", "ghost"),
    ("bunny", "bunny"), ("토끼", "bunny"),
    ("panda", "panda"), ("판다", "panda"),
    ("tiger", "tiger"), ("호랑이", "tiger"),
    ("unicorn", "unicorn"), ("유니콘", "unicorn"),
];

pub static PRESET_RE: Lazy<Regex> = Lazy::new(|| {
    let alts = PRESET_TABLE.iter().map(|(alias, _)| regex::escape(alias)).collect::<Vec<_>>().join("|");
    re(&format!(r"(?i)^(?:캐릭터를?\s*)?({alts})\s*(?:로|으로)?\s*(?:바꿔|변경|전환|set|change)?$"))
});

pub fn resolve_preset(word: &str) -> Option<&'static str> {
    let lower = word.to_lowercase();
    PRESET_TABLE.iter().find(|(alias, _)| alias.to_lowercase() == lower).map(|(_, canonical)| *canonical)
}

// --- Character change (AI-generated) ---------------------------------------

/// Four Korean patterns + three English patterns, each capturing the concept
/// noun phrase (spec §4.2).
pub static CHARACTER_CHANGE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        re(r"^(.+?)(?:로|으로)\s*캐릭터를?\s*바꿔줘?$"),
        re(r"^캐릭터를?\s*(.+?)(?:로|으로)\s*바꿔줘?$"),
        re(r"^(.+?)\s*컨셉으로\s*바꿔줘?$"),
        re(r"^(.+?)\s*모습으로\s*변신(?:해줘)?$"),
        re(r"(?i)^change\s+(?:my\s+)?character\s+to\s+(.+)$"),
        re(r"(?i)^turn\s+(?:him|her|it|my\s+companion)\s+into\s+(.+)$"),
        re(r"(?i)^make\s+(?:my\s+)?companion\s+(?:a|an)\s+(.+)$"),
    ]
});

// --- Smart file operation ---------------------------------------------------

/// Five patterns capturing `(source?, filter, target, auto_category?)`.
pub static FILE_OP_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // "바탕화면의 .md 파일을 docs 폴더에 넣어줘"
        re(r"^(?P<source>[^\s]+)의\s*(?P<filter>\S+)\s*파일을?\s*(?P<target>\S+?)\s*폴더에\s*넣어줘?$"),
        // "정리해줘" with only a source: "바탕화면 정리해줘"
        re(r"^(?P<source>[^\s]+)\s*정리\s*해?줘?$"),
        // "clean up desktop" / "clean up my downloads"
        re(r"(?i)^clean\s*up\s+(?:my\s+)?(?P<source>\S+)$"),
        // "move .png files from desktop to images"
        re(r"(?i)^move\s+(?P<filter>\S+)\s+files?\s+from\s+(?P<source>\S+)\s+to\s+(?P<target>\S+)$"),
        // "organize downloads"
        re(r"(?i)^organi[sz]e\s+(?:my\s+)?(?P<source>\S+)$"),
    ]
});

/// Known source-folder aliases, both languages (spec §4.2).
pub static KNOWN_ALIASES: &[(&str, KnownFolder)] = &[
    ("desktop", KnownFolder::Desktop),
    ("바탕화면", KnownFolder::Desktop),
    ("downloads", KnownFolder::Downloads),
    ("다운로드", KnownFolder::Downloads),
    ("documents", KnownFolder::Documents),
    ("문서", KnownFolder::Documents),
];

pub fn resolve_alias(word: &str) -> Option<KnownFolder> {
    let lower = word.to_lowercase();
    KNOWN_ALIASES.iter().find(|(alias, _)| *alias == lower || *alias == word).map(|(_, folder)| *folder)
}

// --- Action keyword ----------------------------------------------------------

/// ~20 keywords (both languages) mapped to one of the eight closed actions
/// (spec §4.2).
pub static ACTION_KEYWORDS: &[(&str, &str)] = &[
    ("jump", "jumping"), ("점프", "jumping"), ("뛰어", "jumping"),
    ("sleep", "sleeping"), ("자", "sleeping"), ("잠자", "sleeping"),
    ("excite", "excited"), ("신나", "excited"), ("신남", "excited"),
    ("walk", "walking"), ("걸어", "walking"), ("걷기", "walking"),
    ("climb", "climbing_up"), ("올라가", "climbing_up"),
    ("play", "playing"), ("놀아", "playing"), ("놀기", "playing"),
    ("scare", "scared"), ("무서워", "scared"),
    ("rappel", "rappelling"), ("하강", "rappelling"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_regex_matches_english_and_korean() {
        assert!(MODE_RE.is_match("pet mode"));
        assert!(MODE_RE.is_match("incarnation"));
        assert!(MODE_RE.is_match("화신 모드로 바꿔"));
    }

    #[test]
    fn preset_table_has_at_least_ten_entries() {
        let distinct: std::collections::HashSet<&str> =
            PRESET_TABLE.iter().map(|(_, canonical)| *canonical).collect();
        assert!(distinct.len() >= 10, "expected >= 10 presets, got {}", distinct.len());
    }

    #[test]
    fn resolves_known_aliases_case_insensitively() {
        assert_eq!(resolve_alias("Desktop"), Some(KnownFolder::Desktop));
        assert_eq!(resolve_alias("바탕화면"), Some(KnownFolder::Desktop));
        assert_eq!(resolve_alias("nonsense"), None);
    }
}
