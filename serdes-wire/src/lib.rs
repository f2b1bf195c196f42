//! # serdes-wire
//!
//! A bidirectional codec for chat messages in the OpenAI, Anthropic and
//! Google Gemini wire formats.
//!
//! Every vendor message decodes into one or more [`InternalMessage`]s, and
//! any run of internal messages encodes back into a vendor's message array.
//! Decoding then encoding with the same vendor reproduces the original
//! message; decoding with one vendor and encoding with another translates a
//! conversation.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use serdes_wire::prelude::*;
//!
//! let options = CodecOptions::new().id_generator(IdGenerator::sequential("g"));
//!
//! let raw = json!({
//!     "role": "assistant",
//!     "content": "Checking both.",
//!     "tool_calls": [
//!         {"id": "call_1", "type": "function", "function": {"name": "weather", "arguments": "{\"city\":\"Oslo\"}"}},
//!         {"id": "call_2", "type": "function", "function": {"name": "time", "arguments": "{}"}}
//!     ]
//! });
//!
//! // One narrative message plus one message per call, in one group.
//! let messages = serdes_wire::to_internal(&raw, None, &options)?;
//! assert_eq!(messages.len(), 3);
//! assert_eq!(serdes_wire::count_tool_calls(&raw), 2);
//!
//! // Back to the same vendor: the original message.
//! let outcome = serdes_wire::from_internal(&messages, "openai", &options)?;
//! assert_eq!(outcome.messages, vec![raw]);
//!
//! // Or to another one.
//! let gemini = serdes_wire::from_internal(&messages, "gemini", &options)?;
//! assert_eq!(gemini.messages[0]["parts"].as_array().map(Vec::len), Some(3));
//! # Ok::<(), serdes_wire::WireError>(())
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description | Default |
//! |---------|-------------|--------|
//! | `openai` | OpenAI Chat Completions messages | ✅ |
//! | `anthropic` | Anthropic Messages API content blocks | ✅ |
//! | `google` | Google Gemini `contents` (alias `gemini`) | ✅ |
//! | `full` | All formats | ❌ |
//!
//! ## Architecture
//!
//! - [`serdes_wire_core`] - Internal message model, options and errors
//! - [`serdes_wire_formats`] - Vendor formats, detection and the registry
//! - this crate - [`Codec`] routing and read-only helpers
//!
//! ## Strict and Lenient Encoding
//!
//! By default an encode stops at the first message the vendor cannot
//! express. With [`CodecOptions::lenient`] such messages are left out and
//! reported in [`EncodeOutcome::skipped`]:
//!
//! ```rust
//! use serdes_wire::prelude::*;
//!
//! let messages = vec![
//!     InternalMessage::user("Hi"),
//!     // A function result without a name cannot be sent to Gemini.
//!     InternalMessage::tool_result("call_9", "42"),
//!     InternalMessage::assistant("Hello"),
//! ];
//! let outcome = serdes_wire::from_internal(&messages, "google", &CodecOptions::new().lenient())?;
//! assert_eq!(outcome.messages.len(), 2);
//! assert_eq!(outcome.skipped[0].index, 1);
//! # Ok::<(), serdes_wire::WireError>(())
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

use std::sync::OnceLock;

use serde_json::Value as JsonValue;

pub mod convert;
pub mod inspect;

// ============================================================================
// Crate Re-exports
// ============================================================================

/// Internal message model, options and errors.
pub use serdes_wire_core as core;

/// Vendor formats, detection and the registry.
pub use serdes_wire_formats as formats;

// ============================================================================
// Type Re-exports (Flat)
// ============================================================================

// Errors
pub use serdes_wire_core::{ConversionError, Result, ValidationError, WireError};

// Messages
pub use serdes_wire_core::{
    ContentPart, FunctionCall, GroupInfo, InternalMessage, MediaKind, MediaPart, MediaSource,
    MessageMeta, OriginalInfo, Role,
};

// Options
pub use serdes_wire_core::{CodecOptions, IdGenerator, Provider};

// Formats
pub use serdes_wire_formats::{
    detect, Detection, EncodeOutcome, FormatRegistry, SkippedMessage, WireFormat,
};

#[cfg(feature = "openai")]
#[cfg_attr(docsrs, doc(cfg(feature = "openai")))]
pub use serdes_wire_formats::OpenAiFormat;

#[cfg(feature = "anthropic")]
#[cfg_attr(docsrs, doc(cfg(feature = "anthropic")))]
pub use serdes_wire_formats::AnthropicFormat;

#[cfg(feature = "google")]
#[cfg_attr(docsrs, doc(cfg(feature = "google")))]
pub use serdes_wire_formats::GoogleFormat;

// Codec
pub use convert::{Codec, FALLBACK_PROVIDER};
pub use inspect::count_invocations;

// ============================================================================
// Default Codec
// ============================================================================

/// The codec behind the free functions, built on first use.
pub fn default_codec() -> &'static Codec {
    static CODEC: OnceLock<Codec> = OnceLock::new();
    CODEC.get_or_init(Codec::new)
}

/// Decode one raw message with the default codec.
///
/// See [`Codec::to_internal`].
///
/// # Errors
///
/// A conversion failure for an unknown `provider`, or the decoder's
/// validation failure.
pub fn to_internal(
    raw: &JsonValue,
    provider: Option<&str>,
    options: &CodecOptions,
) -> Result<Vec<InternalMessage>> {
    default_codec().to_internal(raw, provider, options)
}

/// Encode internal messages with the default codec.
///
/// See [`Codec::from_internal`].
///
/// # Errors
///
/// A conversion failure for an unknown `provider`, or from a strict encode.
pub fn from_internal(
    messages: &[InternalMessage],
    provider: &str,
    options: &CodecOptions,
) -> Result<EncodeOutcome> {
    default_codec().from_internal(messages, provider, options)
}

/// Check whether a message has to go through a decoder.
#[must_use]
pub fn needs_conversion(message: &JsonValue) -> bool {
    default_codec().needs_conversion(message)
}

/// Text of a raw message, one line per text part.
#[must_use]
pub fn extract_text_content(raw: &JsonValue) -> String {
    default_codec().extract_text_content(raw, None)
}

/// Number of tool invocations in a raw message.
#[must_use]
pub fn count_tool_calls(raw: &JsonValue) -> usize {
    default_codec().count_tool_calls(raw, None)
}

// ============================================================================
// Prelude
// ============================================================================

/// Prelude for common imports.
///
/// ```rust
/// use serdes_wire::prelude::*;
/// ```
pub mod prelude {
    pub use crate::convert::Codec;
    pub use serdes_wire_core::prelude::*;
    pub use serdes_wire_formats::{detect, Detection, EncodeOutcome, SkippedMessage, WireFormat};
}
