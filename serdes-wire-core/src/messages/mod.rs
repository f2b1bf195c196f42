//! The canonical internal message model.
//!
//! - [`InternalMessage`]: one conversational turn, vendor-neutral
//! - [`ContentPart`]: text or a multimedia reference
//! - [`MessageMeta`]: group membership and vendor provenance
//!
//! ## Example
//!
//! ```rust
//! use serdes_wire_core::messages::{ContentPart, InternalMessage, Role};
//!
//! let msg = InternalMessage::new(
//!     Role::User,
//!     vec![
//!         ContentPart::text("What is in this picture?"),
//!         ContentPart::image_url("image/png", "https://example.com/cat.png"),
//!     ],
//! );
//! assert_eq!(msg.text(), "What is in this picture?");
//! ```

pub mod content;
pub mod media;
pub mod message;
pub mod meta;

pub use content::{ContentPart, MediaPart, MediaSource, CONTENT_PART_TAGS};
pub use media::{media_type_from_extension, media_type_from_url, parse_data_url, to_data_url, MediaKind};
pub use message::{FunctionCall, InternalMessage, Role};
pub use meta::{keys, GroupInfo, MessageMeta, OriginalInfo};
