//! Vendor tags for the built-in wire formats.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ConversionError;

/// A built-in vendor wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI Chat Completions: `tool_calls` arrays, `tool` role.
    #[serde(rename = "openai")]
    OpenAi,
    /// Anthropic Messages: typed content blocks.
    Anthropic,
    /// Google Gemini: `parts` arrays, `model` role.
    Google,
}

impl Provider {
    /// All built-in providers.
    pub const ALL: [Provider; 3] = [Provider::OpenAi, Provider::Anthropic, Provider::Google];

    /// The canonical tag.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
        }
    }

    /// Alternative names accepted when parsing.
    #[must_use]
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::OpenAi => &["gpt"],
            Self::Anthropic => &["claude"],
            Self::Google => &["gemini", "vertex"],
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_lowercase();
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str() == tag || p.aliases().contains(&tag.as_str()))
            .ok_or_else(|| ConversionError::unknown_provider(s))
    }
}
