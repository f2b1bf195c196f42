//! The wire format trait.
//!
//! Each vendor format implements [`WireFormat`]: a decoder from one raw
//! vendor message to internal messages, an encoder from internal messages to
//! vendor messages, and a structural signature check.

use serde_json::Value as JsonValue;
use serdes_wire_core::{CodecOptions, InternalMessage, MediaKind, Result};

use crate::outcome::EncodeOutcome;

/// A vendor wire format.
pub trait WireFormat: Send + Sync {
    /// Provider tag (e.g., "openai", "anthropic", "google").
    fn name(&self) -> &str;

    /// Check whether a raw message carries this format's structural signature.
    fn is_format(&self, message: &JsonValue) -> bool;

    /// Decode one raw vendor message into one or more internal messages.
    ///
    /// # Errors
    ///
    /// Returns a validation failure when `options.validate` is set and the
    /// message does not conform to the vendor schema.
    fn decode(&self, message: &JsonValue, options: &CodecOptions) -> Result<Vec<InternalMessage>>;

    /// Encode a run of internal messages into vendor messages.
    ///
    /// # Errors
    ///
    /// In strict mode, returns a conversion failure for the first message
    /// that cannot be encoded. Lenient mode skips it and records the skip
    /// in the outcome instead.
    fn encode(&self, messages: &[InternalMessage], options: &CodecOptions) -> Result<EncodeOutcome>;
}

/// Text standing in for a media part the target vendor cannot carry.
pub(crate) fn placeholder_text(kind: MediaKind, media_type: &str) -> String {
    format!("[{}: {}]", kind, media_type)
}
