//! Lookup of wire formats by provider tag.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serdes_wire_core::{ConversionError, Provider};

use crate::format::WireFormat;

/// Wire formats keyed by provider tag.
#[derive(Clone, Default)]
pub struct FormatRegistry {
    formats: HashMap<String, Arc<dyn WireFormat>>,
    aliases: HashMap<String, String>,
}

impl FormatRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in format enabled by features.
    #[must_use]
    pub fn with_defaults() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::new();

        #[cfg(feature = "openai")]
        registry.register_provider(Provider::OpenAi, crate::openai::OpenAiFormat::new());

        #[cfg(feature = "anthropic")]
        registry.register_provider(Provider::Anthropic, crate::anthropic::AnthropicFormat::new());

        #[cfg(feature = "google")]
        registry.register_provider(Provider::Google, crate::google::GoogleFormat::new());

        registry
    }

    /// Register a format under its own name.
    pub fn register<F: WireFormat + 'static>(&mut self, format: F) -> &mut Self {
        let tag = format.name().to_lowercase();
        self.formats.insert(tag, Arc::new(format));
        self
    }

    /// Register an extra name for an already registered tag.
    pub fn alias(&mut self, alias: impl Into<String>, tag: impl Into<String>) -> &mut Self {
        self.aliases
            .insert(alias.into().to_lowercase(), tag.into().to_lowercase());
        self
    }

    #[allow(dead_code)]
    fn register_provider<F: WireFormat + 'static>(&mut self, provider: Provider, format: F) {
        self.register(format);
        for alias in provider.aliases() {
            self.alias(*alias, provider.as_str());
        }
    }

    /// Look up a format by tag or alias, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns a conversion failure naming the tag when nothing matches.
    pub fn get(&self, tag: &str) -> Result<Arc<dyn WireFormat>, ConversionError> {
        let key = tag.trim().to_lowercase();
        let key = self.aliases.get(&key).unwrap_or(&key);
        self.formats
            .get(key)
            .cloned()
            .ok_or_else(|| ConversionError::unknown_provider(tag))
    }

    /// Check if a tag or alias resolves.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.get(tag).is_ok()
    }

    /// Registered tags, sorted.
    #[must_use]
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.formats.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("formats", &self.tags())
            .field("aliases", &self.aliases)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::EncodeOutcome;
    use serde_json::Value as JsonValue;
    use serdes_wire_core::{CodecOptions, InternalMessage, Result};

    struct EchoFormat;

    impl WireFormat for EchoFormat {
        fn name(&self) -> &str {
            "echo"
        }

        fn is_format(&self, _message: &JsonValue) -> bool {
            false
        }

        fn decode(&self, _message: &JsonValue, _options: &CodecOptions) -> Result<Vec<InternalMessage>> {
            Ok(vec![InternalMessage::user("echo")])
        }

        fn encode(&self, _messages: &[InternalMessage], _options: &CodecOptions) -> Result<EncodeOutcome> {
            Ok(EncodeOutcome::default())
        }
    }

    #[test]
    fn test_defaults_and_aliases() {
        let registry = FormatRegistry::with_defaults();
        assert_eq!(registry.tags(), vec!["anthropic", "google", "openai"]);
        assert_eq!(registry.get("Claude").unwrap().name(), "anthropic");
        assert_eq!(registry.get("gemini").unwrap().name(), "google");
        assert_eq!(registry.get("gpt").unwrap().name(), "openai");
    }

    #[test]
    fn test_unknown_tag() {
        let err = FormatRegistry::with_defaults().get("mistral").err().unwrap();
        assert_eq!(err.provider.as_deref(), Some("mistral"));
    }

    #[test]
    fn test_register_fourth_format() {
        let mut registry = FormatRegistry::with_defaults();
        registry.register(EchoFormat).alias("parrot", "echo");
        assert!(registry.contains("echo"));
        let messages = registry
            .get("parrot")
            .unwrap()
            .decode(&JsonValue::Null, &CodecOptions::default())
            .unwrap();
        assert_eq!(messages[0].text(), "echo");
    }
}
