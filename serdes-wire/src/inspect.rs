//! Read-only views over raw messages.
//!
//! Both views decode the message first. When decoding fails they fall back
//! to reading the raw shape directly, so callers always get an answer.

use serde_json::Value as JsonValue;
use serdes_wire_core::{CodecOptions, ContentPart, InternalMessage};
use tracing::debug;

use crate::convert::Codec;

impl Codec {
    /// Text of a raw message, one line per text part.
    #[must_use]
    pub fn extract_text_content(&self, raw: &JsonValue, provider: Option<&str>) -> String {
        match self.to_internal(raw, provider, &CodecOptions::default()) {
            Ok(messages) => messages
                .iter()
                .flat_map(|m| m.content.iter().filter_map(ContentPart::as_text))
                .collect::<Vec<_>>()
                .join("\n"),
            Err(err) => {
                debug!(target: "serdes_wire::inspect", error = %err, "Reading text from raw shape");
                raw_texts(raw).join("\n")
            }
        }
    }

    /// Number of tool invocations in a raw message.
    #[must_use]
    pub fn count_tool_calls(&self, raw: &JsonValue, provider: Option<&str>) -> usize {
        match self.to_internal(raw, provider, &CodecOptions::default()) {
            Ok(messages) => count_invocations(&messages),
            Err(err) => {
                debug!(target: "serdes_wire::inspect", error = %err, "Counting tool calls from raw shape");
                raw_tool_calls(raw)
            }
        }
    }
}

fn items<'a>(raw: &'a JsonValue, key: &str) -> impl Iterator<Item = &'a JsonValue> {
    raw.get(key)
        .and_then(JsonValue::as_array)
        .into_iter()
        .flatten()
}

fn raw_texts(raw: &JsonValue) -> Vec<&str> {
    let mut texts = Vec::new();
    if let Some(JsonValue::String(text)) = raw.get("content") {
        texts.push(text.as_str());
    }
    texts.extend(
        items(raw, "content")
            .filter(|block| matches!(block.get("type").and_then(JsonValue::as_str), None | Some("text")))
            .filter_map(|block| block.get("text").and_then(JsonValue::as_str)),
    );
    texts.extend(items(raw, "parts").filter_map(|part| part.get("text").and_then(JsonValue::as_str)));
    if let Some(JsonValue::String(text)) = raw.get("text") {
        texts.push(text.as_str());
    }
    texts
}

fn raw_tool_calls(raw: &JsonValue) -> usize {
    let legacy = usize::from(raw.get("function_call").is_some_and(JsonValue::is_object));
    let calls = items(raw, "tool_calls").count();
    let blocks = items(raw, "content")
        .filter(|block| block.get("type").and_then(JsonValue::as_str) == Some("tool_use"))
        .count();
    let parts = items(raw, "parts")
        .filter(|part| part.get("functionCall").is_some())
        .count();
    let top_level = usize::from(raw.get("functionCall").is_some());
    legacy + calls + blocks + parts + top_level
}

/// Count invocations across already decoded messages.
#[must_use]
pub fn count_invocations(messages: &[InternalMessage]) -> usize {
    messages.iter().filter(|m| m.is_tool_invocation()).count()
}
