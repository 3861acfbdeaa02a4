//! Canned text used by the response synthesizer.
//!
//! Every string the synthesizer can emit is assembled from the constants in
//! this module, so the full output space stays enumerable.

/// Separator placed between appended sentences in a generic reply
pub const PARAGRAPH_BREAK: &str = "\n\n";

pub const GREETING: &str = "Hello! How can I assist you today?";

pub const HELP_OFFER: &str = "I'm here to help! What would you like to know about?";

pub const ACKNOWLEDGMENT: &str =
    "You're welcome! Feel free to ask if you have any other questions.";

pub const WEATHER_DISCLAIMER: &str = "I don't have access to real-time weather data, but I can help you understand weather patterns or recommend weather services.";

/// Lead-in placed before every code snippet
pub const CODE_LEAD_IN: &str = "Here's an example related to coding:\n\n";

/// Illustrative snippets, one per sample language
pub const CODE_SNIPPETS: [&str; 3] = [
    "```javascript\nfunction greet(name) {\n  return `Hello, ${name}!`;\n}\n\nconsole.log(greet('World'));\n```\n\nThis is a simple JavaScript function that greets the input name.",
    "```python\ndef fibonacci(n):\n    a, b = 0, 1\n    for _ in range(n):\n        a, b = b, a + b\n    return a\n\nprint(fibonacci(10))  # Output: 55\n```\n\nThis Python function calculates the nth Fibonacci number using an iterative approach.",
    "```typescript\ninterface User {\n  id: number;\n  name: string;\n  email: string;\n}\n\nfunction getUserInfo(user: User): string {\n  return `${user.name} (${user.email})`;\n}\n```\n\nThis TypeScript example shows how to define an interface and use it in a function.",
];

/// An echo template: the prompt is quoted between `before` and `after`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoTemplate {
    pub before: &'static str,
    pub after: &'static str,
}

impl EchoTemplate {
    /// Render the template around a prompt, quoting it verbatim
    pub fn render(&self, prompt: &str) -> String {
        let mut out = String::with_capacity(self.before.len() + prompt.len() + self.after.len());
        out.push_str(self.before);
        out.push_str(prompt);
        out.push_str(self.after);
        out
    }
}

pub const ECHO_TEMPLATES: [EchoTemplate; 5] = [
    EchoTemplate {
        before: "I understand you're asking about \"",
        after: "\". Let me elaborate on that topic based on my knowledge.",
    },
    EchoTemplate {
        before: "That's an interesting question about \"",
        after: "\". Here's what I know about this subject.",
    },
    EchoTemplate {
        before: "Regarding \"",
        after: "\", there are several aspects to consider...",
    },
    EchoTemplate {
        before: "When it comes to \"",
        after: "\", I can provide the following information...",
    },
    EchoTemplate {
        before: "\"",
        after: "\" is a fascinating topic. Here's my perspective based on available information.",
    },
];

/// Appended when the requested output length is above [`ELABORATION_MIN_TOKENS`]
pub const ELABORATION: &str =
    "Furthermore, when we examine this in greater depth, we find additional nuances worth discussing...";

/// Appended when temperature is above [`CREATIVE_MIN_TEMPERATURE`]
pub const CREATIVE: &str =
    "Taking a creative approach, we might also consider some unconventional perspectives...";

/// Appended when temperature is below [`PRECISE_MAX_TEMPERATURE`]
pub const PRECISE: &str =
    "To be precise and factual, let me focus on the core elements without speculation.";

/// `max_tokens` strictly above this adds [`ELABORATION`]
pub const ELABORATION_MIN_TOKENS: u32 = 500;

/// Temperature strictly above this adds [`CREATIVE`]
pub const CREATIVE_MIN_TEMPERATURE: f32 = 1.5;

/// Temperature strictly below this adds [`PRECISE`]
pub const PRECISE_MAX_TEMPERATURE: f32 = 0.5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echo_template_quotes_prompt() {
        let rendered = ECHO_TEMPLATES[2].render("rust lifetimes");
        assert_eq!(
            rendered,
            "Regarding \"rust lifetimes\", there are several aspects to consider..."
        );
    }

    #[test]
    fn test_snippets_are_fenced() {
        for snippet in CODE_SNIPPETS {
            assert!(snippet.starts_with("```"));
            assert_eq!(snippet.matches("```").count(), 2);
        }
    }
}
