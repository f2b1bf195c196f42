//! # serdes-wire-core
//!
//! Core types for the serdes-wire message codec.
//!
//! - **Messages**: the canonical [`InternalMessage`] and its content parts
//! - **Errors**: validation and conversion failures
//! - **Options**: [`CodecOptions`] shared by every decode/encode call
//! - **Identifiers**: injectable [`IdGenerator`] for group and tool-call ids
//! - **Providers**: tags of the built-in vendor formats
//!
//! ## Example
//!
//! ```rust
//! use serdes_wire_core::{CodecOptions, IdGenerator, InternalMessage, Provider};
//!
//! let options = CodecOptions::new()
//!     .lenient()
//!     .id_generator(IdGenerator::sequential("id_"));
//!
//! let msg = InternalMessage::tool_result("call_1", "42");
//! assert!(msg.is_tool_result());
//! assert_eq!("gemini".parse::<Provider>().unwrap(), Provider::Google);
//! assert!(!options.strict);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod errors;
pub mod identifier;
pub mod messages;
pub mod options;
pub mod provider;

// Re-exports for convenience
pub use errors::{ConversionError, Result, ValidationError, WireError};
pub use identifier::{generate_short_id, IdGenerator};
pub use messages::{
    ContentPart, FunctionCall, GroupInfo, InternalMessage, MediaKind, MediaPart, MediaSource,
    MessageMeta, OriginalInfo, Role,
};
pub use options::CodecOptions;
pub use provider::Provider;

/// Prelude module for common imports.
///
/// ```rust
/// use serdes_wire_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::errors::{ConversionError, Result, ValidationError, WireError};
    pub use crate::identifier::IdGenerator;
    pub use crate::messages::{
        ContentPart, FunctionCall, GroupInfo, InternalMessage, MediaKind, MediaPart,
        MediaSource, MessageMeta, OriginalInfo, Role,
    };
    pub use crate::options::CodecOptions;
    pub use crate::provider::Provider;
}
