//! Google Gemini wire format.
//!
//! Every message is `{role, parts}`. Text, media, function calls and
//! function responses all share the `parts` array, and the assistant role is
//! called `model`. Gemini does not always assign call ids, so the decoder
//! makes one up when needed and the encoder leaves made-up ids out again.

mod decode;
mod encode;
pub mod types;

use serde_json::Value as JsonValue;
use serdes_wire_core::{CodecOptions, InternalMessage, Result};

use crate::detect::google_signature;
use crate::format::WireFormat;
use crate::outcome::EncodeOutcome;

pub use types::{Content, Part};

pub(crate) const PROVIDER: &str = "google";

/// The Gemini `generateContent` format.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoogleFormat;

impl GoogleFormat {
    /// Create the format.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl WireFormat for GoogleFormat {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn is_format(&self, message: &JsonValue) -> bool {
        let Some(object) = message.as_object() else {
            return false;
        };
        let role = object.get("role").and_then(JsonValue::as_str).unwrap_or_default();
        google_signature(object, role).is_some()
    }

    fn decode(&self, message: &JsonValue, options: &CodecOptions) -> Result<Vec<InternalMessage>> {
        Ok(decode::decode_message(message, options)?)
    }

    fn encode(&self, messages: &[InternalMessage], options: &CodecOptions) -> Result<EncodeOutcome> {
        encode::encode_messages(messages, options)
    }
}
