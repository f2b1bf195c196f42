//! # serdes-wire-formats
//!
//! Vendor wire formats for serdes-wire.
//!
//! Each format implements [`WireFormat`]: it decodes one raw vendor message
//! into internal messages and encodes a run of internal messages back.
//!
//! ## Supported Formats
//!
//! - **OpenAI** (`openai` feature): Chat Completions messages
//! - **Anthropic** (`anthropic` feature): Messages API content blocks
//! - **Google** (`google` feature): Gemini `contents` with `parts`
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use serdes_wire_core::{CodecOptions, IdGenerator};
//! use serdes_wire_formats::{detect, FormatRegistry};
//!
//! let raw = json!({
//!     "role": "assistant",
//!     "content": [
//!         {"type": "text", "text": "Looking it up."},
//!         {"type": "tool_use", "id": "toolu_1", "name": "search", "input": {"q": "serde"}}
//!     ]
//! });
//!
//! let detection = detect(&raw);
//! assert_eq!(detection.provider_tag(), "anthropic");
//!
//! let registry = FormatRegistry::with_defaults();
//! let options = CodecOptions::new().id_generator(IdGenerator::sequential("g"));
//! let messages = registry.get("anthropic")?.decode(&raw, &options)?;
//! assert_eq!(messages.len(), 2);
//!
//! let openai = registry.get("openai")?.encode(&messages, &options)?;
//! assert_eq!(openai.messages[0]["tool_calls"][0]["id"], "toolu_1");
//! # Ok::<(), serdes_wire_core::WireError>(())
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod detect;
pub mod format;
pub mod outcome;
pub mod registry;

mod grouping;
mod preserve;
mod validate;

#[cfg(feature = "openai")]
#[cfg_attr(docsrs, doc(cfg(feature = "openai")))]
pub mod openai;

#[cfg(feature = "anthropic")]
#[cfg_attr(docsrs, doc(cfg(feature = "anthropic")))]
pub mod anthropic;

#[cfg(feature = "google")]
#[cfg_attr(docsrs, doc(cfg(feature = "google")))]
pub mod google;

// Re-exports
pub use detect::{detect, Detection, HEURISTIC_CONFIDENCE, SIGNATURE_CONFIDENCE};
pub use format::WireFormat;
pub use outcome::{EncodeOutcome, SkippedMessage};
pub use registry::FormatRegistry;

#[cfg(feature = "anthropic")]
pub use anthropic::AnthropicFormat;
#[cfg(feature = "google")]
pub use google::GoogleFormat;
#[cfg(feature = "openai")]
pub use openai::OpenAiFormat;
