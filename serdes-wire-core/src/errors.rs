//! Error types for serdes-wire.
//!
//! Two failure kinds exist. A [`ValidationError`] means one message did not
//! conform to its vendor's schema. A [`ConversionError`] means a routing or
//! dispatch problem, or a validation failure re-raised by a strict encode.

use serde_json::Value as JsonValue;
use std::fmt;
use thiserror::Error;

/// Maximum length of the rendered offending value in error messages.
const MAX_VALUE_LEN: usize = 120;

/// The main error type for serdes-wire operations.
#[derive(Error, Debug)]
pub enum WireError {
    /// A message failed structural validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A message could not be routed or converted.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WireError {
    /// Check if this is a validation failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a conversion failure.
    #[must_use]
    pub fn is_conversion(&self) -> bool {
        matches!(self, Self::Conversion(_))
    }
}

/// Result type alias using WireError.
pub type Result<T> = std::result::Result<T, WireError>;

/// A single message did not match its vendor's schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Provider whose schema was violated.
    pub provider: String,
    /// Path of the offending field (e.g. `tool_calls[1].function.name`).
    pub field: String,
    /// Compact rendering of the offending value.
    pub value: String,
    /// What was wrong.
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid {} message: {} (field `{}`, got {})",
            self.provider, self.message, self.field, self.value
        )
    }
}

impl ValidationError {
    /// Create a new validation error.
    pub fn new(
        provider: impl Into<String>,
        field: impl Into<String>,
        value: &JsonValue,
        message: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            field: field.into(),
            value: render_value(value),
            message: message.into(),
        }
    }

    /// Create a validation error for a field that was absent.
    pub fn missing(provider: impl Into<String>, field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            provider: provider.into(),
            message: format!("`{}` is required", field),
            field,
            value: "nothing".to_string(),
        }
    }
}

/// A message or message list could not be routed or converted.
#[derive(Error, Debug, Clone, PartialEq)]
pub struct ConversionError {
    /// Error message.
    pub message: String,
    /// Provider involved, if known.
    pub provider: Option<String>,
    /// Index of the offending message in the input, if any.
    pub index: Option<usize>,
    /// Underlying validation failure.
    #[source]
    pub cause: Option<ValidationError>,
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Conversion failed: {}", self.message)?;
        if let Some(ref provider) = self.provider {
            write!(f, " (provider: {})", provider)?;
        }
        if let Some(index) = self.index {
            write!(f, " at message {}", index)?;
        }
        Ok(())
    }
}

impl ConversionError {
    /// Create a new conversion error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            provider: None,
            index: None,
            cause: None,
        }
    }

    /// No registered format answers to this provider tag.
    pub fn unknown_provider(provider: impl Into<String>) -> Self {
        let provider = provider.into();
        Self::new(format!("no format registered for provider `{}`", provider))
            .with_provider(provider)
    }

    /// Re-raise a validation failure for the message at `index`.
    pub fn invalid_message(index: usize, cause: ValidationError) -> Self {
        Self {
            message: cause.to_string(),
            provider: Some(cause.provider.clone()),
            index: Some(index),
            cause: Some(cause),
        }
    }

    /// Set the provider.
    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Set the message index.
    #[must_use]
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

fn render_value(value: &JsonValue) -> String {
    let rendered = value.to_string();
    if rendered.chars().count() <= MAX_VALUE_LEN {
        return rendered;
    }
    let truncated: String = rendered.chars().take(MAX_VALUE_LEN).collect();
    format!("{}...", truncated)
}
