// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Category taxonomy (spec §4.4): a closed set of categories matched by
//! substring against the lower-cased active-window title. Shipped verbatim as
//! configuration data, not computed.

/// One category's definition: its substring patterns, the trigger it emits
/// when matched, and the trigger's default cooldown.
pub struct Category {
    pub name: &'static str,
    pub substrings: &'static [&'static str],
    pub trigger: &'static str,
    pub cooldown_ms: i64,
}

/// The fixed category table. Order matters: first match wins, so more
/// specific categories (`checkout`) are listed ahead of broader ones
/// (`shopping`) that could also match the same title.
pub const CATEGORIES: &[Category] = &[
    Category {
        name: "checkout",
        substrings: &["checkout", "place order", "결제", "주문하기"],
        trigger: "checkout_detected",
        cooldown_ms: 60_000,
    },
    Category {
        name: "coding",
        substrings: &["visual studio code", "vscode", "intellij", "pycharm", "neovim", "- vim"],
        trigger: "coding_detected",
        cooldown_ms: 120_000,
    },
    Category {
        name: "terminal",
        substrings: &["terminal", "iterm", "zsh", "bash", "powershell", "cmd.exe"],
        trigger: "terminal_detected",
        cooldown_ms: 120_000,
    },
    Category {
        name: "document",
        substrings: &["google docs", "microsoft word", ".docx", "notion", "confluence"],
        trigger: "document_detected",
        cooldown_ms: 120_000,
    },
    Category {
        name: "dev_web",
        substrings: &["stack overflow", "stackoverflow", "github", "devdocs", "mdn web docs"],
        trigger: "dev_web_detected",
        cooldown_ms: 120_000,
    },
    Category {
        name: "social",
        substrings: &["twitter", " x.com", "instagram", "facebook", "threads", "reddit"],
        trigger: "social_detected",
        cooldown_ms: 90_000,
    },
    Category {
        name: "video",
        substrings: &["youtube", "netflix", "twitch"],
        trigger: "video_detected",
        cooldown_ms: 90_000,
    },
    Category {
        name: "gaming",
        substrings: &["steam", "epic games", "league of legends", "valorant"],
        trigger: "gaming_detected",
        cooldown_ms: 90_000,
    },
    Category {
        name: "news",
        substrings: &["cnn", "bbc news", "news -", "뉴스"],
        trigger: "news_detected",
        cooldown_ms: 90_000,
    },
    Category {
        name: "shopping",
        substrings: &["amazon", "쿠팡", "coupang", "ebay", "aliexpress", "cart -"],
        trigger: "shopping_detected",
        cooldown_ms: 120_000,
    },
    Category {
        name: "wiki",
        substrings: &["wikipedia", "나무위키", "namu.wiki"],
        trigger: "wiki_detected",
        cooldown_ms: 90_000,
    },
    Category {
        name: "search",
        substrings: &["google search", " - google", "검색 -", "duckduckgo"],
        trigger: "search_detected",
        cooldown_ms: 60_000,
    },
    Category {
        name: "email",
        substrings: &["gmail", "outlook", "inbox -"],
        trigger: "email_detected",
        cooldown_ms: 180_000,
    },
    Category {
        name: "meeting",
        substrings: &["zoom meeting", "google meet", "microsoft teams"],
        trigger: "meeting_detected",
        cooldown_ms: 300_000,
    },
    Category {
        name: "reading",
        substrings: &["medium", "velog", "dev.to", "substack"],
        trigger: "reading_detected",
        cooldown_ms: 180_000,
    },
    Category {
        name: "music",
        substrings: &["spotify", "apple music", "melon", "soundcloud"],
        trigger: "music_detected",
        cooldown_ms: 180_000,
    },
    Category {
        name: "finance",
        substrings: &["toss", "업비트", "upbit", "binance", "robinhood"],
        trigger: "finance_detected",
        cooldown_ms: 180_000,
    },
    Category {
        name: "messaging",
        substrings: &["kakaotalk", "discord", "slack", "telegram"],
        trigger: "messaging_detected",
        cooldown_ms: 90_000,
    },
    Category {
        name: "streaming",
        substrings: &["chzzk", "soop -", "afreecatv"],
        trigger: "streaming_detected",
        cooldown_ms: 180_000,
    },
    Category {
        name: "forum",
        substrings: &["dcinside", "fmkorea", "clien", "hacker news"],
        trigger: "forum_detected",
        cooldown_ms: 120_000,
    },
    Category {
        name: "job_search",
        substrings: &["linkedin", "jobkorea", "saramin", "wanted -"],
        trigger: "job_search_detected",
        cooldown_ms: 180_000,
    },
    Category {
        name: "recipe",
        substrings: &["만개의레시피", "allrecipes", "recipe -"],
        trigger: "recipe_detected",
        cooldown_ms: 300_000,
    },
];

/// Work-set categories, used by the `procrastination` composite detector.
pub const WORK_SET: &[&str] = &["coding", "document", "terminal", "dev_web"];

/// Fun-set categories, used by the `procrastination` composite detector.
pub const FUN_SET: &[&str] = &["social", "video", "gaming", "news"];

/// Classify a window title against [`CATEGORIES`], returning the first match.
pub fn classify_title(title: &str) -> Option<&'static Category> {
    let lower = title.to_lowercase();
    CATEGORIES.iter().find(|cat| cat.substrings.iter().any(|pat| lower.contains(pat)))
}

/// Cooldown lookup for any category trigger by name.
pub fn cooldown_for_trigger(name: &str) -> Option<i64> {
    CATEGORIES.iter().find(|cat| cat.trigger == name).map(|cat| cat.cooldown_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_least_twenty_categories() {
        assert!(CATEGORIES.len() >= 20, "expected >= 20 categories, got {}", CATEGORIES.len());
    }

    #[test]
    fn checkout_wins_over_shopping_for_checkout_titles() {
        let cat = classify_title("Checkout - Amazon.com").expect("should classify");
        assert_eq!(cat.name, "checkout");
    }

    #[test]
    fn shopping_classifies_generic_amazon_titles() {
        let cat = classify_title("Wireless Mouse - Amazon.com").expect("should classify");
        assert_eq!(cat.name, "shopping");
    }

    #[test]
    fn unmatched_title_returns_none() {
        assert!(classify_title("My Local File Manager").is_none());
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert!(classify_title("YOUTUBE - Cat Videos").is_some());
    }
}
