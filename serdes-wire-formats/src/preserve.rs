//! Reading `_meta.original` back on the encode side.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use serdes_wire_core::messages::keys;
use serdes_wire_core::InternalMessage;

/// Provenance view of one message as seen by one encoder.
#[derive(Clone, Copy)]
pub(crate) struct Provenance<'a> {
    provider: &'static str,
    message: &'a InternalMessage,
}

impl<'a> Provenance<'a> {
    pub(crate) fn of(provider: &'static str, message: &'a InternalMessage) -> Self {
        Self {
            provider,
            message,
        }
    }

    fn same_provider(&self) -> bool {
        self.message
            .original()
            .is_some_and(|o| o.provider == self.provider)
    }

    fn field(&self, key: &str) -> Option<&'a JsonValue> {
        self.message.original().and_then(|o| o.field(key))
    }

    /// A single text part was originally sent as an array.
    pub(crate) fn wants_array(&self) -> bool {
        self.field(keys::CONTENT_FORMAT).and_then(JsonValue::as_str) == Some("array")
    }

    /// Recorded tool-result error flag.
    pub(crate) fn is_error(&self) -> Option<bool> {
        self.field(keys::IS_ERROR).and_then(JsonValue::as_bool)
    }

    /// The tool-call id was synthesized during decode.
    pub(crate) fn id_synthesized(&self) -> bool {
        self.field(keys::ID_SYNTHESIZED)
            .and_then(JsonValue::as_bool)
            .unwrap_or(false)
    }

    /// The vendor message had an explicit empty tool-call list.
    pub(crate) fn empty_tool_calls(&self) -> bool {
        self.same_provider()
            && self
                .field(keys::EMPTY_TOOL_CALLS)
                .and_then(JsonValue::as_bool)
                .unwrap_or(false)
    }

    /// Vendor role recorded by the same provider.
    pub(crate) fn role(&self) -> Option<&'a str> {
        if !self.same_provider() {
            return None;
        }
        self.field(keys::ROLE).and_then(JsonValue::as_str)
    }

    /// Unrecognized fields recorded by the same provider.
    pub(crate) fn extra(&self) -> IndexMap<String, JsonValue> {
        if !self.same_provider() {
            return IndexMap::new();
        }
        self.message
            .original()
            .map(|o| {
                o.unknown_fields()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}
