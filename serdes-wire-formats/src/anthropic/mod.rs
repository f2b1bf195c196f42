//! Anthropic Messages wire format.
//!
//! Content is a string or an array of typed blocks. Tool uses sit in
//! assistant turns and tool results in user turns, next to ordinary text.
//! System instructions are not messages here: the encoder moves them into
//! [`EncodeOutcome::system`] for the request's top-level `system` field.

mod decode;
mod encode;
pub mod types;

use serde_json::Value as JsonValue;
use serdes_wire_core::{CodecOptions, InternalMessage, Result};

use crate::detect::anthropic_signature;
use crate::format::WireFormat;
use crate::outcome::EncodeOutcome;

pub use types::{ContentBlock, Message, MessageContent, ToolResultContent};

pub(crate) const PROVIDER: &str = "anthropic";

/// The Anthropic Messages format.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnthropicFormat;

impl AnthropicFormat {
    /// Create the format.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl WireFormat for AnthropicFormat {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn is_format(&self, message: &JsonValue) -> bool {
        message
            .as_object()
            .and_then(anthropic_signature)
            .is_some()
    }

    fn decode(&self, message: &JsonValue, options: &CodecOptions) -> Result<Vec<InternalMessage>> {
        Ok(decode::decode_message(message, options)?)
    }

    fn encode(&self, messages: &[InternalMessage], options: &CodecOptions) -> Result<EncodeOutcome> {
        encode::encode_messages(messages, options)
    }
}
