//! Keyword rules evaluated in priority order by the synthesizer.

use super::random::{RandomSource, choose};
use super::templates::{
    ACKNOWLEDGMENT, CODE_LEAD_IN, CODE_SNIPPETS, GREETING, HELP_OFFER, WEATHER_DISCLAIMER,
};

/// A (predicate, responder) pair in the dispatch table
pub trait ResponseRule: Send + Sync {
    /// Short label used in debug logs
    fn name(&self) -> &'static str;

    /// Test the rule against an already-lowercased prompt
    fn matches(&self, lowered_prompt: &str) -> bool;

    /// Produce the reply for a matching prompt
    fn respond(&self, rng: &dyn RandomSource) -> String;
}

/// What a [`KeywordRule`] answers with
#[derive(Debug, Clone, Copy)]
pub enum Reply {
    /// Always the same text
    Fixed(&'static str),
    /// A lead-in followed by one uniformly chosen entry
    Pick {
        lead_in: &'static str,
        choices: &'static [&'static str],
    },
}

/// Matches when any keyword is a substring of the prompt
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub reply: Reply,
}

impl ResponseRule for KeywordRule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn matches(&self, lowered_prompt: &str) -> bool {
        self.keywords.iter().any(|k| lowered_prompt.contains(k))
    }

    fn respond(&self, rng: &dyn RandomSource) -> String {
        match self.reply {
            Reply::Fixed(text) => text.to_string(),
            Reply::Pick { lead_in, choices } => {
                let body = choose(rng, choices).copied().unwrap_or_default();
                format!("{lead_in}{body}")
            }
        }
    }
}

pub const GREETING_RULE: KeywordRule = KeywordRule {
    name: "greeting",
    keywords: &["hello", "hi"],
    reply: Reply::Fixed(GREETING),
};

pub const HELP_RULE: KeywordRule = KeywordRule {
    name: "help",
    keywords: &["help"],
    reply: Reply::Fixed(HELP_OFFER),
};

pub const THANKS_RULE: KeywordRule = KeywordRule {
    name: "thanks",
    keywords: &["thank"],
    reply: Reply::Fixed(ACKNOWLEDGMENT),
};

pub const WEATHER_RULE: KeywordRule = KeywordRule {
    name: "weather",
    keywords: &["weather"],
    reply: Reply::Fixed(WEATHER_DISCLAIMER),
};

pub const CODE_RULE: KeywordRule = KeywordRule {
    name: "code",
    keywords: &["code", "programming"],
    reply: Reply::Pick {
        lead_in: CODE_LEAD_IN,
        choices: &CODE_SNIPPETS,
    },
};

/// The built-in table: greeting > help > thanks > weather > code
pub fn builtin_rules() -> Vec<Box<dyn ResponseRule>> {
    vec![
        Box::new(GREETING_RULE),
        Box::new(HELP_RULE),
        Box::new(THANKS_RULE),
        Box::new(WEATHER_RULE),
        Box::new(CODE_RULE),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::random::FixedIndex;

    #[test]
    fn test_keyword_rule_matches_substrings() {
        assert!(GREETING_RULE.matches("oh hi there"));
        assert!(GREETING_RULE.matches("this"));
        assert!(!HELP_RULE.matches("helicopter"));
        assert!(CODE_RULE.matches("i love programming"));
    }

    #[test]
    fn test_pick_reply_uses_random_source() {
        let reply = CODE_RULE.respond(&FixedIndex(1));
        assert_eq!(reply, format!("{CODE_LEAD_IN}{}", CODE_SNIPPETS[1]));
    }

    #[test]
    fn test_builtin_order() {
        let names: Vec<&str> = builtin_rules().iter().map(|r| r.name()).collect();
        assert_eq!(names, ["greeting", "help", "thanks", "weather", "code"]);
    }
}
