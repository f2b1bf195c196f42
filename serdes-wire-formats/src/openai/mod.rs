//! OpenAI Chat Completions wire format.
//!
//! A multi-call assistant turn is one message with a `tool_calls` array; it
//! decodes into a group (narrative first, then one message per call). Tool
//! results are independent `tool`-role messages and stay that way on encode.
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use serdes_wire_core::CodecOptions;
//! use serdes_wire_formats::{openai::OpenAiFormat, WireFormat};
//!
//! let format = OpenAiFormat::new();
//! let raw = json!({"role": "tool", "tool_call_id": "call_1", "content": "42"});
//! let messages = format.decode(&raw, &CodecOptions::default()).unwrap();
//! assert!(messages[0].is_tool_result());
//!
//! let outcome = format.encode(&messages, &CodecOptions::default()).unwrap();
//! assert_eq!(outcome.messages, vec![raw]);
//! ```

mod decode;
mod encode;
pub mod types;

use serde_json::Value as JsonValue;
use serdes_wire_core::{CodecOptions, InternalMessage, Result};

use crate::detect::openai_signature;
use crate::format::WireFormat;
use crate::outcome::EncodeOutcome;

pub use types::{ChatMessage, ContentPart, MessageContent, ToolCall};

pub(crate) const PROVIDER: &str = "openai";

/// The OpenAI Chat Completions format.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAiFormat;

impl OpenAiFormat {
    /// Create the format.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl WireFormat for OpenAiFormat {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn is_format(&self, message: &JsonValue) -> bool {
        let Some(object) = message.as_object() else {
            return false;
        };
        let role = object.get("role").and_then(JsonValue::as_str).unwrap_or_default();
        openai_signature(object, role).is_some()
    }

    fn decode(&self, message: &JsonValue, options: &CodecOptions) -> Result<Vec<InternalMessage>> {
        Ok(decode::decode_message(message, options)?)
    }

    fn encode(&self, messages: &[InternalMessage], options: &CodecOptions) -> Result<EncodeOutcome> {
        encode::encode_messages(messages, options)
    }
}
