//! Codec options.
//!
//! Every decode and encode call takes a [`CodecOptions`] value. It is plain
//! configuration and can be loaded from JSON; the id generator is not
//! serialized and falls back to [`IdGenerator::random`].

use serde::{Deserialize, Serialize};

use crate::identifier::IdGenerator;

/// Options recognized by every decode/encode call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecOptions {
    /// Run structural checks and fail on violations.
    pub validate: bool,

    /// Encode only: abort on the first invalid message instead of skipping it.
    pub strict: bool,

    /// Copy unrecognized vendor fields into `_meta.original`.
    pub preserve_unknown: bool,

    /// Source of group ids and synthesized tool-call ids.
    #[serde(skip)]
    pub id_generator: IdGenerator,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            validate: true,
            strict: true,
            preserve_unknown: false,
            id_generator: IdGenerator::random(),
        }
    }
}

impl CodecOptions {
    /// Create options with the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable structural validation.
    #[must_use]
    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Set strict encoding.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Shorthand for `strict(false)`.
    #[must_use]
    pub fn lenient(self) -> Self {
        self.strict(false)
    }

    /// Enable or disable preservation of unrecognized fields.
    #[must_use]
    pub fn preserve_unknown(mut self, preserve: bool) -> Self {
        self.preserve_unknown = preserve;
        self
    }

    /// Set the id generator.
    #[must_use]
    pub fn id_generator(mut self, generator: IdGenerator) -> Self {
        self.id_generator = generator;
        self
    }

    /// Produce the next id from the configured generator.
    #[must_use]
    pub fn next_id(&self) -> String {
        self.id_generator.next_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CodecOptions::default();
        assert!(options.validate);
        assert!(options.strict);
        assert!(!options.preserve_unknown);
    }

    #[test]
    fn test_builder() {
        let options = CodecOptions::new()
            .validate(false)
            .lenient()
            .preserve_unknown(true)
            .id_generator(IdGenerator::sequential("id"));

        assert!(!options.validate);
        assert!(!options.strict);
        assert!(options.preserve_unknown);
        assert_eq!(options.next_id(), "id1");
    }

    #[test]
    fn test_deserialize_partial() {
        let options: CodecOptions = serde_json::from_str(r#"{"strict": false}"#).unwrap();
        assert!(!options.strict);
        assert!(options.validate);
        assert_eq!(options.next_id().len(), 8);
    }

    #[test]
    fn test_serialize_skips_generator() {
        let json = serde_json::to_value(CodecOptions::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"validate": true, "strict": true, "preserve_unknown": false})
        );
    }
}
