//! Out-of-band bookkeeping attached to internal messages.
//!
//! `_meta` is not part of the logical conversation. It records which decoded
//! messages came from one vendor message (`group`) and what vendor-specific
//! detail has no slot in the canonical model (`original`).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Keys in [`OriginalInfo::fields`] that the formats interpret themselves.
pub mod keys {
    /// Tool result reported an error (Anthropic `is_error`).
    pub const IS_ERROR: &str = "is_error";
    /// `"array"` when a single text part was sent as a one-element array.
    pub const CONTENT_FORMAT: &str = "content_format";
    /// Vendor role when it differs from the one the encoder would pick.
    pub const ROLE: &str = "role";
    /// The tool-call id was generated, not received.
    pub const ID_SYNTHESIZED: &str = "id_synthesized";
    /// The vendor message carried an explicit empty tool-call list.
    pub const EMPTY_TOOL_CALLS: &str = "empty_tool_calls";
}

/// The `_meta` block of an internal message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageMeta {
    /// Membership in a group that re-fuses into one vendor message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupInfo>,
    /// Provenance and preserved vendor fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original: Option<OriginalInfo>,
}

impl MessageMeta {
    /// Check if nothing is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.group.is_none() && self.original.is_none()
    }
}

/// Position of a message within its group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInfo {
    /// Shared by every member.
    pub id: String,
    /// Zero-based position in the vendor message.
    pub position: usize,
    /// Number of members.
    pub total: usize,
}

impl GroupInfo {
    /// Create group info.
    #[must_use]
    pub fn new(id: impl Into<String>, position: usize, total: usize) -> Self {
        Self {
            id: id.into(),
            position,
            total,
        }
    }
}

/// Provenance plus vendor fields the canonical model cannot represent.
///
/// Codec flags from [`keys`] sit next to `provider`. Unrecognized vendor
/// fields live under `extra`, so a vendor field may share a name with
/// `provider` or a flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginalInfo {
    /// Provider tag the message was decoded from.
    pub provider: String,
    /// Unrecognized vendor fields, copied verbatim.
    #[serde(default, rename = "extra", skip_serializing_if = "IndexMap::is_empty")]
    pub unknown: IndexMap<String, JsonValue>,
    /// Codec flags; see [`keys`].
    #[serde(flatten)]
    pub fields: IndexMap<String, JsonValue>,
}

impl OriginalInfo {
    /// Create provenance for a provider with no preserved fields.
    #[must_use]
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            unknown: IndexMap::new(),
            fields: IndexMap::new(),
        }
    }

    /// Add a codec flag.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Add an unrecognized vendor field.
    #[must_use]
    pub fn with_unknown(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.unknown.insert(key.into(), value.into());
        self
    }

    /// Get a codec flag.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&JsonValue> {
        self.fields.get(key)
    }

    /// Get a boolean field, treating absence as `false`.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.fields
            .get(key)
            .and_then(JsonValue::as_bool)
            .unwrap_or(false)
    }

    /// Unrecognized vendor fields, in decode order.
    pub fn unknown_fields(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.unknown.iter()
    }
}
