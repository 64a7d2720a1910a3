//! Keyword reply rules for the scripted assistant.
//!
//! A [`RuleTable`] is an ordered list of [`ReplyRule`]s. Each incoming
//! utterance is lower-cased once and tested against the rules in order; the
//! first rule whose predicate matches builds the reply and no later rule is
//! consulted.
//!
//! # Default Table
//!
//! | # | Rule | Matches (lower-cased) | Grounding |
//! |---|------|-----------------------|-----------|
//! | 1 | `sleep` | contains `sleep` | none |
//! | 2 | `reminder` | contains `reminder` | none |
//! | 3 | `anxiety` | contains `feeling anxious` | none |
//! | 4 | `olympics` | contains `who won` and `olympics` | 2 citations |
//! | 5 | `echo` | anything | none |

use crate::models::{GroundingChunk, GroundingMetadata};

pub const SLEEP_REPLY: &str = "For sleep, I recommend 'Deep Sleep Waves'. It's very popular!";

pub const REMINDER_REPLY: &str = "Okay, I can help set a reminder. Which audio and for what time?";

pub const ANXIETY_REPLY: &str = "I'm sorry to hear you're feeling anxious. 'Anxiety Release Ambient' might help you find some calm.";

pub const OLYMPICS_REPLY: &str = "According to my sources, the most decorated athlete was Jane Doe with 5 gold medals in swimming. For more details, check the official Olympics website.";

/// Citations attached to the Olympics answer, in order: `(uri, title)`.
pub const OLYMPICS_CITATIONS: [(&str, &str); 2] = [
    (
        "https://olympics.com/paris-2024/en/results",
        "Official Paris 2024 Olympic Results",
    ),
    (
        "https://en.wikipedia.org/wiki/2024_Summer_Olympics_medal_table",
        "2024 Summer Olympics medal table - Wikipedia",
    ),
];

/// Text and optional citations produced by a rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedReply {
    pub text: String,
    pub grounding: Option<GroundingMetadata>,
}

impl RoutedReply {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            grounding: None,
        }
    }
}

/// A single `(predicate, builder)` pair.
///
/// `matches` receives the lower-cased utterance; `build` receives the
/// original utterance so replies can quote it verbatim.
#[derive(Clone)]
pub struct ReplyRule {
    pub name: &'static str,
    pub matches: fn(&str) -> bool,
    pub build: fn(&str) -> RoutedReply,
}

impl std::fmt::Debug for ReplyRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplyRule").field("name", &self.name).finish()
    }
}

fn olympics_reply(_text: &str) -> RoutedReply {
    let chunks = OLYMPICS_CITATIONS
        .iter()
        .map(|(uri, title)| GroundingChunk::new(*uri, *title))
        .collect();
    RoutedReply {
        text: OLYMPICS_REPLY.to_string(),
        grounding: GroundingMetadata::from_chunks(chunks),
    }
}

/// Reply used when no keyword rule matches.
pub fn echo_reply(text: &str) -> RoutedReply {
    RoutedReply::plain(format!(
        "I received your message: \"{}\". How else can I assist you today?",
        text
    ))
}

/// Ordered rule list; first match wins.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<ReplyRule>,
    fallback: fn(&str) -> RoutedReply,
}

impl RuleTable {
    /// An empty table that always answers with `fallback`.
    pub fn new(fallback: fn(&str) -> RoutedReply) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    /// Append a rule at the lowest priority.
    pub fn push(&mut self, rule: ReplyRule) -> &mut Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[ReplyRule] {
        &self.rules
    }

    /// Name of the rule that would answer `text`, or `None` for the fallback.
    pub fn matched_rule(&self, text: &str) -> Option<&'static str> {
        let lowered = text.to_lowercase();
        self.rules
            .iter()
            .find(|rule| (rule.matches)(&lowered))
            .map(|rule| rule.name)
    }

    /// Build the reply for `text`.
    pub fn route(&self, text: &str) -> RoutedReply {
        let lowered = text.to_lowercase();
        match self.rules.iter().find(|rule| (rule.matches)(&lowered)) {
            Some(rule) => (rule.build)(text),
            None => (self.fallback)(text),
        }
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        let mut table = Self::new(echo_reply);
        table
            .push(ReplyRule {
                name: "sleep",
                matches: |t| t.contains("sleep"),
                build: |_| RoutedReply::plain(SLEEP_REPLY),
            })
            .push(ReplyRule {
                name: "reminder",
                matches: |t| t.contains("reminder"),
                build: |_| RoutedReply::plain(REMINDER_REPLY),
            })
            .push(ReplyRule {
                name: "anxiety",
                matches: |t| t.contains("feeling anxious"),
                build: |_| RoutedReply::plain(ANXIETY_REPLY),
            })
            .push(ReplyRule {
                name: "olympics",
                matches: |t| t.contains("who won") && t.contains("olympics"),
                build: olympics_reply,
            });
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sleep_rule_case_insensitive() {
        let table = RuleTable::default();
        for text in ["sleep", "I can't SLEEP at all", "Sleepy time"] {
            let reply = table.route(text);
            assert_eq!(reply.text, SLEEP_REPLY);
            assert!(reply.grounding.is_none());
        }
    }

    #[test]
    fn test_reminder_rule() {
        let reply = RuleTable::default().route("I need help with reminder");
        assert_eq!(reply.text, REMINDER_REPLY);
        assert!(reply.grounding.is_none());
    }

    #[test]
    fn test_anxiety_rule() {
        let reply = RuleTable::default().route("Feeling Anxious today");
        assert!(reply.text.contains("Anxiety Release Ambient"));
    }

    #[test]
    fn test_olympics_rule_attaches_citations_in_order() {
        let reply = RuleTable::default().route("Who won the most medals at the Olympics?");
        assert_eq!(reply.text, OLYMPICS_REPLY);
        let chunks = reply.grounding.unwrap();
        let uris: Vec<&str> = chunks.chunks().iter().map(|c| c.source_uri.as_str()).collect();
        assert_eq!(
            uris,
            vec![OLYMPICS_CITATIONS[0].0, OLYMPICS_CITATIONS[1].0]
        );
    }

    #[test]
    fn test_olympics_needs_both_keywords() {
        let table = RuleTable::default();
        assert_eq!(table.matched_rule("who won the game"), None);
        assert_eq!(table.matched_rule("olympics schedule"), None);
    }

    #[test]
    fn test_priority_first_match_wins() {
        let table = RuleTable::default();
        // Contains both "sleep" and "reminder": sleep has priority.
        assert_eq!(table.matched_rule("set a sleep reminder"), Some("sleep"));
        assert_eq!(table.route("set a sleep reminder").text, SLEEP_REPLY);
        // "who won ... olympics" loses to "feeling anxious".
        assert_eq!(
            table.matched_rule("feeling anxious about who won the olympics"),
            Some("anxiety")
        );
    }

    #[test]
    fn test_fallback_echoes_verbatim() {
        let text = "Tell me about Mindful Walking";
        let reply = RuleTable::default().route(text);
        assert!(reply.text.contains(text));
        assert!(reply.grounding.is_none());
        assert_eq!(RuleTable::default().matched_rule(text), None);
    }

    #[test]
    fn test_custom_table() {
        let mut table = RuleTable::new(|_| RoutedReply::plain("default"));
        table.push(ReplyRule {
            name: "focus",
            matches: |t| t.contains("focus"),
            build: |_| RoutedReply::plain("Try 'Focus Flow Beta'."),
        });
        assert_eq!(table.route("need FOCUS").text, "Try 'Focus Flow Beta'.");
        assert_eq!(table.route("hello").text, "default");
        assert_eq!(table.rules().len(), 1);
    }
}
