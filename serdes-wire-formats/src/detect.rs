//! Best-effort vendor detection for raw messages.
//!
//! Detection never fails. Anything it cannot place is reported as unknown
//! with zero confidence, and callers decide what to do with that.

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use serdes_wire_core::Provider;
use tracing::trace;

/// Confidence of a structural signature match.
pub const SIGNATURE_CONFIDENCE: f64 = 0.95;

/// Confidence of a role-substring match.
pub const HEURISTIC_CONFIDENCE: f64 = 0.8;

/// Block tags that mark an Anthropic content array.
const ANTHROPIC_BLOCK_TAGS: [&str; 4] = ["text", "tool_use", "tool_result", "image"];

/// Gemini keys looked for directly on the message object.
const GOOGLE_TOP_LEVEL_KEYS: [&str; 3] = ["text", "functionCall", "functionResponse"];

/// Outcome of [`detect`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    /// The detected vendor, `None` when unknown.
    pub provider: Option<Provider>,
    /// Between 0 and 1.
    pub confidence: f64,
    /// Which check decided.
    pub reason: String,
}

impl Detection {
    fn found(provider: Provider, confidence: f64, reason: impl Into<String>) -> Self {
        Self {
            provider: Some(provider),
            confidence,
            reason: reason.into(),
        }
    }

    fn unknown(reason: impl Into<String>) -> Self {
        Self {
            provider: None,
            confidence: 0.0,
            reason: reason.into(),
        }
    }

    /// Provider tag, or `"unknown"`.
    #[must_use]
    pub fn provider_tag(&self) -> &'static str {
        self.provider.map_or("unknown", |p| p.as_str())
    }

    /// Check if a vendor was found.
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.provider.is_some()
    }
}

/// Guess which vendor format a raw message is in.
#[must_use]
pub fn detect(message: &JsonValue) -> Detection {
    let detection = detect_inner(message);
    trace!(
        target: "serdes_wire::detect",
        provider = detection.provider_tag(),
        confidence = detection.confidence,
        reason = %detection.reason,
        "Detected message format"
    );
    detection
}

fn detect_inner(message: &JsonValue) -> Detection {
    let Some(object) = message.as_object() else {
        return Detection::unknown("message is not an object");
    };
    let role = match object.get("role") {
        Some(JsonValue::String(role)) => role.as_str(),
        Some(_) => return Detection::unknown("role is not a string"),
        None => return Detection::unknown("role is missing"),
    };

    if let Some(reason) = openai_signature(object, role) {
        return Detection::found(Provider::OpenAi, SIGNATURE_CONFIDENCE, reason);
    }
    if let Some(reason) = anthropic_signature(object) {
        return Detection::found(Provider::Anthropic, SIGNATURE_CONFIDENCE, reason);
    }
    if let Some(reason) = google_signature(object, role) {
        return Detection::found(Provider::Google, SIGNATURE_CONFIDENCE, reason);
    }

    if role.contains("model") {
        return Detection::found(
            Provider::Google,
            HEURISTIC_CONFIDENCE,
            format!("role '{}' contains 'model'", role),
        );
    }
    if role.contains("tool") {
        return Detection::found(
            Provider::OpenAi,
            HEURISTIC_CONFIDENCE,
            format!("role '{}' contains 'tool'", role),
        );
    }

    Detection::unknown("no vendor signature matched")
}

pub(crate) fn openai_signature(object: &Map<String, JsonValue>, role: &str) -> Option<&'static str> {
    if object.get("tool_calls").is_some_and(JsonValue::is_array) {
        return Some("tool_calls array present");
    }
    if object.contains_key("tool_call_id") {
        return Some("tool_call_id present");
    }
    if role == "tool" {
        return Some("role is 'tool'");
    }
    if role == "assistant" && object.get("function_call").is_some_and(JsonValue::is_object) {
        return Some("assistant with legacy function_call");
    }
    None
}

pub(crate) fn anthropic_signature(object: &Map<String, JsonValue>) -> Option<&'static str> {
    let blocks = object.get("content")?.as_array()?;
    let all_known = !blocks.is_empty()
        && blocks.iter().all(|block| {
            block
                .get("type")
                .and_then(JsonValue::as_str)
                .is_some_and(|tag| ANTHROPIC_BLOCK_TAGS.contains(&tag))
        });
    all_known.then_some("content blocks use Anthropic type tags")
}

/// Gemini signature.
///
/// Besides the `model` role and bare top-level part keys, a `parts` array is
/// accepted, since real Gemini messages nest their parts there.
pub(crate) fn google_signature(object: &Map<String, JsonValue>, role: &str) -> Option<&'static str> {
    if role == "model" {
        return Some("role is 'model'");
    }
    if GOOGLE_TOP_LEVEL_KEYS.iter().any(|key| object.contains_key(*key)) {
        return Some("Gemini part key on message");
    }
    if object.get("parts").is_some_and(JsonValue::is_array) {
        return Some("parts array present");
    }
    None
}
