//! Model catalog.
//!
//! Single source of truth for the selectable models, their descriptions and
//! the flavor sentence each one adds to generic replies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum_macros::EnumIter;

/// Selectable models
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter,
)]
pub enum ModelId {
    #[default]
    #[serde(rename = "gemini-pro")]
    GeminiPro,
    #[serde(rename = "gemini-ultra")]
    GeminiUltra,
    #[serde(rename = "claude-3")]
    Claude3,
    #[serde(rename = "gpt-4o")]
    Gpt4o,
}

impl ModelId {
    /// All available models, in display order
    pub const ALL: &'static [ModelId] = &[
        ModelId::GeminiPro,
        ModelId::GeminiUltra,
        ModelId::Claude3,
        ModelId::Gpt4o,
    ];

    /// Identifier as used in config files, the CLI and the synthesizer
    pub const fn id(&self) -> &'static str {
        match self {
            Self::GeminiPro => "gemini-pro",
            Self::GeminiUltra => "gemini-ultra",
            Self::Claude3 => "claude-3",
            Self::Gpt4o => "gpt-4o",
        }
    }

    /// Human-readable name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GeminiPro => "Gemini Pro",
            Self::GeminiUltra => "Gemini Ultra",
            Self::Claude3 => "Claude 3",
            Self::Gpt4o => "GPT-4o",
        }
    }

    pub const fn description(&self) -> &'static str {
        match self {
            Self::GeminiPro => "Advanced model with strong reasoning and coding abilities",
            Self::GeminiUltra => "Most capable model for highly complex tasks",
            Self::Claude3 => "Balanced model for general purpose use cases",
            Self::Gpt4o => "Highly capable model with strong reasoning",
        }
    }

    pub const fn capabilities(&self) -> &'static [&'static str] {
        match self {
            Self::GeminiPro => &[
                "Natural language understanding and generation",
                "Code generation and explanation",
                "Complex reasoning tasks",
                "Content summarization",
            ],
            Self::GeminiUltra => &[
                "Advanced reasoning and problem solving",
                "Multi-step instructions",
                "Nuanced content understanding",
                "Expert-level code generation",
                "Creative writing and ideation",
            ],
            Self::Claude3 => &[
                "Balanced reasoning and creativity",
                "Conversational responses",
                "Moderate complexity tasks",
                "Instruction following",
            ],
            Self::Gpt4o => &[
                "Advanced text completion and generation",
                "Strong contextual understanding",
                "Complex query handling",
                "Consistent persona maintenance",
            ],
        }
    }

    /// Sentence appended to generic replies produced "by" this model
    pub const fn flavor(&self) -> &'static str {
        match self {
            Self::GeminiPro => {
                "From my analysis, I can break this down into key components for better understanding."
            }
            Self::GeminiUltra => {
                "This is a multi-faceted topic that I can examine from several analytical perspectives."
            }
            Self::Claude3 => "I aim to provide a balanced and nuanced perspective on this topic.",
            Self::Gpt4o => {
                "Let me provide a comprehensive overview while considering different viewpoints."
            }
        }
    }

    /// Exact, case-sensitive lookup by identifier
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().find(|m| m.id() == id).copied()
    }

    /// Get all model ids as strings
    pub fn all_ids() -> Vec<&'static str> {
        Self::ALL.iter().map(Self::id).collect()
    }
}

impl FromStr for ModelId {
    type Err = ModelError;

    /// Lenient lookup for user input: ids and display names, any case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .find(|m| m.id() == wanted || m.name().to_lowercase() == wanted)
            .copied()
            .ok_or_else(|| ModelError::Unknown(s.to_string()))
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Unknown model: {0}. Supported: gemini-pro, gemini-ultra, claude-3, gpt-4o")]
    Unknown(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_model_from_str() {
        assert_eq!("gemini-pro".parse::<ModelId>().ok(), Some(ModelId::GeminiPro));
        assert_eq!("GPT-4o".parse::<ModelId>().ok(), Some(ModelId::Gpt4o));
        assert_eq!("Gemini Ultra".parse::<ModelId>().ok(), Some(ModelId::GeminiUltra));
        assert!("gpt-5".parse::<ModelId>().is_err());
    }

    #[test]
    fn test_from_id_is_exact() {
        assert_eq!(ModelId::from_id("claude-3"), Some(ModelId::Claude3));
        assert_eq!(ModelId::from_id("Claude-3"), None);
        assert_eq!(ModelId::from_id(" claude-3"), None);
    }

    #[test]
    fn test_all_matches_enum_variants() {
        let iterated: Vec<ModelId> = ModelId::iter().collect();
        assert_eq!(iterated, ModelId::ALL);
    }

    #[test]
    fn test_serde_uses_ids() {
        let json = serde_json::to_string(&ModelId::Gpt4o).expect("serialize model id");
        assert_eq!(json, "\"gpt-4o\"");
        let back: ModelId = serde_json::from_str("\"gemini-ultra\"").expect("deserialize model id");
        assert_eq!(back, ModelId::GeminiUltra);
    }

    #[test]
    fn test_catalog_text() {
        assert_eq!(ModelId::default(), ModelId::GeminiPro);
        assert_eq!(ModelId::GeminiUltra.capabilities().len(), 5);
        assert_eq!(ModelId::Claude3.to_string(), "claude-3");
    }
}
