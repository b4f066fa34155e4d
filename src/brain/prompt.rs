// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prompt composition for the fallback brain (spec §4.7): a per-trigger
//! template table plus optional memory/screen/history context appended.

use crate::classifier::Trigger;

/// One-paragraph templates, keyed by trigger name. `{app}`/`{title}`
/// placeholders are filled from the trigger's context. Triggers with no
/// entry fall back to [`GENERIC_TEMPLATE`].
const TEMPLATES: &[(&str, &str)] = &[
    ("checkout_detected", "The user is at checkout on {app}. Gently check in about the purchase, light and non-judgmental."),
    ("shopping_detected", "The user is browsing {app} for products. A brief, curious comment about what they might be looking at."),
    ("price_comparison", "The user has compared prices across several shopping tabs. Note the pattern lightly, no pressure."),
    ("error_detected", "The user hit an error message in {app}: \"{title}\". Offer brief, genuine encouragement."),
    ("error_loop", "The user has hit the same kind of error repeatedly in {app}. Offer to help or suggest a short break."),
    ("late_night", "It's late at night and the user is still at the computer, on {app}. A caring nudge about rest."),
    ("dawn_coding", "The user is coding in the early morning hours on {app}. Acknowledge the early start warmly."),
    ("idle_return", "The user just came back after being away for a while. A small, welcoming greeting."),
    ("procrastination", "The user has been bouncing between work and distraction ({app}) for the last minute. A gentle, non-nagging check-in."),
    ("coding_detected", "The user is writing code in {app}. A small supportive comment, nothing intrusive."),
    ("terminal_detected", "The user is working in a terminal on {app}. Keep any comment brief and low-key."),
    ("document_detected", "The user is writing in a document on {app}. A light, encouraging note."),
    ("dev_web_detected", "The user is reading developer docs or Q&A on {app}. Acknowledge the research quietly."),
    ("deep_focus", "The user has been deeply focused on {app} for a long stretch. A quiet, proud acknowledgement, don't interrupt the flow."),
    ("long_focus", "The user has stayed on {title} for a while. A small comment recognising the focus."),
    ("social_scrolling", "The user has been scrolling {app} for a long while. A gentle, judgment-free check-in."),
    ("social_detected", "The user opened {app}. A light, friendly comment."),
    ("video_detected", "The user is watching something on {app}. A relaxed, curious comment."),
    ("gaming_detected", "The user is playing a game on {app}. An enthusiastic but brief comment."),
    ("news_detected", "The user is reading news on {app}. A neutral, brief acknowledgement."),
    ("wiki_detected", "The user is reading {title} on {app}. A curious comment about the topic."),
    ("wiki_rabbit_hole", "The user has been hopping between wiki articles for a while. A playful comment about the rabbit hole."),
    ("search_detected", "The user is searching for something on {app}. A brief, helpful-sounding comment."),
    ("repeated_search", "The user has searched for several related things in a row. Offer to help narrow it down."),
    ("research_mode", "The user is searching and copying things, likely researching something. A brief supportive note."),
    ("email_detected", "The user is checking email on {app}. A light comment, nothing distracting."),
    ("meeting_detected", "The user has a meeting open in {app}. Keep it brief and unobtrusive."),
    ("reading_detected", "The user is reading an article on {app}. A quiet, curious comment."),
    ("music_detected", "The user opened {app} to listen to music. A relaxed, friendly comment."),
    ("finance_detected", "The user is checking finances on {app}. A calm, brief acknowledgement."),
    ("messaging_detected", "The user is chatting on {app}. Keep any comment minimal."),
    ("job_search_detected", "The user is browsing job listings on {app}. A warm, encouraging note."),
    ("recipe_detected", "The user is looking at a recipe on {app}. A light, appetising comment."),
    ("focus_break", "The user just stepped away from a long focus session. A gentle, welcoming comment."),
    ("clipboard_url", "The user copied a link. A brief, curious remark."),
    ("clipboard_code", "The user copied a snippet of code. A small, technical-friendly remark."),
    ("repeated_copy", "The user has copied several things in a row. A brief comment noticing the flurry of activity."),
    ("app_switch", "The user switched to {app}. A tiny, unobtrusive acknowledgement."),
    ("rapid_switching", "The user has been switching apps rapidly. A gentle, grounding comment."),
    ("weekend_work", "The user is working on {app} during the weekend. A warm, caring nudge about rest."),
    ("pre_lunch", "It's almost lunchtime. A light reminder to eat."),
    ("end_of_work", "The work day is winding down. A light comment about wrapping up."),
];

const GENERIC_TEMPLATE: &str = "The user triggered \"{trigger}\" on {app}. A brief, in-character comment.";

fn lookup_template(trigger_name: &str) -> &'static str {
    TEMPLATES
        .iter()
        .find(|(name, _)| *name == trigger_name)
        .map(|(_, template)| *template)
        .unwrap_or(GENERIC_TEMPLATE)
}

fn fill(template: &str, trigger: &Trigger) -> String {
    let app = trigger.active_app.as_deref().unwrap_or("the screen");
    let title = trigger.active_title.as_deref().unwrap_or(app);
    template
        .replace("{app}", app)
        .replace("{title}", title)
        .replace("{trigger}", trigger.name)
}

/// Extra context available when composing a prompt, beyond the trigger
/// itself (spec §4.7: "optional appended yesterday memory", "optional
/// screen attached marker", "optional last-3 interactions excerpt").
pub struct PromptExtras<'a> {
    pub yesterday_memory: Option<&'a str>,
    pub recent_interactions: &'a [String],
}

impl<'a> Default for PromptExtras<'a> {
    fn default() -> Self {
        Self { yesterday_memory: None, recent_interactions: &[] }
    }
}

/// Compose the full prompt for a trigger: base template, then any extras.
pub fn compose(trigger: &Trigger, extras: &PromptExtras) -> String {
    let mut prompt = fill(lookup_template(trigger.name), trigger);

    if trigger.context.contains_key("screen") {
        prompt.push_str(" [screen attached]");
    }
    if let Some(memory) = extras.yesterday_memory {
        prompt.push_str(&format!(" Yesterday: {memory}."));
    }
    if !extras.recent_interactions.is_empty() {
        let recap = extras.recent_interactions.join(" / ");
        prompt.push_str(&format!(" Recent: {recap}."));
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn trigger(name: &'static str, app: &str, title: &str) -> Trigger {
        Trigger {
            importance: crate::classifier::importance::classify(name),
            name,
            context: serde_json::Map::new(),
            ts: 0,
            active_title: Some(title.to_owned()),
            active_app: Some(app.to_owned()),
        }
    }

    #[test]
    fn known_trigger_uses_its_template() {
        let t = trigger("checkout_detected", "Amazon", "Checkout - Amazon");
        let prompt = compose(&t, &PromptExtras::default());
        assert!(prompt.contains("checkout"));
        assert!(prompt.contains("Amazon"));
    }

    #[test]
    fn unknown_trigger_falls_back_to_generic() {
        let t = trigger("totally_new_trigger", "SomeApp", "SomeApp");
        let prompt = compose(&t, &PromptExtras::default());
        assert!(prompt.contains("totally_new_trigger"));
    }

    #[test]
    fn screen_marker_only_appears_when_context_has_screen() {
        let mut t = trigger("coding_detected", "VSCode", "main.rs - VSCode");
        let without = compose(&t, &PromptExtras::default());
        assert!(!without.contains("[screen attached]"));

        t.context.insert("screen".to_owned(), json!({"image": "x", "width": 1, "height": 1}));
        let with = compose(&t, &PromptExtras::default());
        assert!(with.contains("[screen attached]"));
    }

    #[test]
    fn memory_and_recent_interactions_are_appended_when_present() {
        let t = trigger("idle_return", "Desktop", "Desktop");
        let extras = PromptExtras {
            yesterday_memory: Some("stayed up late debugging"),
            recent_interactions: &["said hi".to_owned()],
        };
        let prompt = compose(&t, &extras);
        assert!(prompt.contains("Yesterday: stayed up late debugging"));
        assert!(prompt.contains("Recent: said hi"));
    }
}
