//! Encode results and the strict/lenient fold.
//!
//! Encoding folds over the input: every unit either produces vendor
//! messages or, in lenient mode, becomes a [`SkippedMessage`]. Skips are
//! returned to the caller and also logged; the output is never padded.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use serdes_wire_core::{CodecOptions, ConversionError, Result, ValidationError};
use tracing::warn;

/// Result of encoding a run of internal messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodeOutcome {
    /// Vendor messages, in conversation order.
    pub messages: Vec<JsonValue>,
    /// Native system slot, for vendors that keep system text outside the
    /// message array.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<JsonValue>,
    /// Messages dropped in lenient mode.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedMessage>,
}

impl EncodeOutcome {
    /// Check if every input message was encoded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Consume the outcome, keeping only the message array.
    #[must_use]
    pub fn into_messages(self) -> Vec<JsonValue> {
        self.messages
    }
}

/// An input message that lenient encoding left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedMessage {
    /// Index in the input array.
    pub index: usize,
    /// Why it was skipped.
    pub reason: String,
}

/// Accumulates encoded messages and applies the strict/lenient policy.
pub(crate) struct EncodeFold<'o> {
    provider: &'static str,
    options: &'o CodecOptions,
    outcome: EncodeOutcome,
    system_texts: Vec<String>,
}

impl<'o> EncodeFold<'o> {
    pub(crate) fn new(provider: &'static str, options: &'o CodecOptions) -> Self {
        Self {
            provider,
            options,
            outcome: EncodeOutcome::default(),
            system_texts: Vec::new(),
        }
    }

    /// Serialize and append a vendor message.
    pub(crate) fn emit<T: Serialize>(&mut self, message: &T) -> Result<()> {
        self.outcome.messages.push(serde_json::to_value(message)?);
        Ok(())
    }

    /// Append a message's encoding, or skip it.
    pub(crate) fn emit_or_skip<T: Serialize>(
        &mut self,
        index: usize,
        result: std::result::Result<T, ValidationError>,
    ) -> Result<()> {
        match result {
            Ok(message) => self.emit(&message),
            Err(err) => self.skip(index, err),
        }
    }

    /// Record a failure: abort in strict mode, skip in lenient mode.
    pub(crate) fn skip(&mut self, index: usize, err: ValidationError) -> Result<()> {
        if self.options.strict {
            return Err(ConversionError::invalid_message(index, err).into());
        }
        warn!(
            target: "serdes_wire::encode",
            provider = self.provider,
            index,
            "Skipping message: {}",
            err
        );
        self.outcome.skipped.push(SkippedMessage {
            index,
            reason: err.to_string(),
        });
        Ok(())
    }

    /// Collect text destined for the vendor's system slot.
    pub(crate) fn push_system(&mut self, text: String) {
        self.system_texts.push(text);
    }

    /// Finish, rendering collected system text with `render`.
    pub(crate) fn finish_with_system(
        mut self,
        render: impl FnOnce(String) -> JsonValue,
    ) -> EncodeOutcome {
        if !self.system_texts.is_empty() {
            self.outcome.system = Some(render(self.system_texts.join("\n\n")));
        }
        self.outcome
    }

    /// Finish without a system slot.
    pub(crate) fn finish(self) -> EncodeOutcome {
        self.outcome
    }
}
