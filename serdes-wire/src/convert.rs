//! Routing raw messages to and from the internal model.
//!
//! A [`Codec`] owns a [`FormatRegistry`] and decides which format handles a
//! message: the one named by the caller, or the one the detector picks.
//! Messages that already have the internal shape pass through untouched.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use serdes_wire_core::messages::CONTENT_PART_TAGS;
use serdes_wire_core::{
    CodecOptions, ConversionError, InternalMessage, MessageMeta, OriginalInfo, Result,
    ValidationError, WireError,
};
use serdes_wire_formats::{detect, EncodeOutcome, FormatRegistry, SkippedMessage, WireFormat};
use tracing::{debug, warn};

/// Format used when detection cannot tell what a message is.
pub const FALLBACK_PROVIDER: &str = "openai";

/// Provider tag used in errors about malformed internal messages.
const INTERNAL: &str = "internal";

/// Converts between vendor messages and internal messages.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use serdes_wire::{Codec, CodecOptions, IdGenerator};
///
/// let codec = Codec::new();
/// let options = CodecOptions::new().id_generator(IdGenerator::sequential("g"));
///
/// let raw = json!({"role": "model", "parts": [{"text": "Bonjour"}]});
/// let messages = codec.to_internal(&raw, None, &options)?;
/// let outcome = codec.from_internal(&messages, "anthropic", &options)?;
/// assert_eq!(outcome.messages, vec![json!({"role": "assistant", "content": "Bonjour"})]);
/// # Ok::<(), serdes_wire::WireError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Codec {
    registry: FormatRegistry,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec {
    /// Create a codec with every built-in format enabled by features.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(FormatRegistry::with_defaults())
    }

    /// Create a codec over a custom registry.
    #[must_use]
    pub fn with_registry(registry: FormatRegistry) -> Self {
        Self { registry }
    }

    /// Get the registry.
    #[must_use]
    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    /// Get the registry for registering more formats.
    pub fn registry_mut(&mut self) -> &mut FormatRegistry {
        &mut self.registry
    }

    /// Check whether a message has to go through a decoder.
    ///
    /// `false` exactly when [`Codec::to_internal`] would hand the message
    /// back as it is: its `content` is a non-empty array of recognized
    /// content parts and it reads as an [`InternalMessage`].
    #[must_use]
    pub fn needs_conversion(&self, message: &JsonValue) -> bool {
        as_internal(message).is_none()
    }

    /// Decode one raw message.
    ///
    /// With `provider` set, that format decodes the message. Otherwise the
    /// detector picks one; when it cannot, the registered formats are asked
    /// in tag order and finally the OpenAI format is used.
    ///
    /// # Errors
    ///
    /// A conversion failure when `provider` names no registered format, or
    /// the validation failure raised by the decoder.
    pub fn to_internal(
        &self,
        raw: &JsonValue,
        provider: Option<&str>,
        options: &CodecOptions,
    ) -> Result<Vec<InternalMessage>> {
        if let Some(message) = as_internal(raw) {
            let message = match provider {
                Some(tag) => stamp(message, self.registry.get(tag)?.name()),
                None => message,
            };
            return Ok(vec![message]);
        }

        let format = match provider {
            Some(tag) => self.registry.get(tag)?,
            None => self.route(raw)?,
        };
        format.decode(raw, options)
    }

    /// Decode a whole conversation, concatenating the results in order.
    ///
    /// # Errors
    ///
    /// Stops at the first message that fails. A validation failure comes
    /// back as a conversion failure carrying the message index.
    pub fn to_internal_all(
        &self,
        raws: &[JsonValue],
        provider: Option<&str>,
        options: &CodecOptions,
    ) -> Result<Vec<InternalMessage>> {
        let mut messages = Vec::with_capacity(raws.len());
        for (index, raw) in raws.iter().enumerate() {
            match self.to_internal(raw, provider, options) {
                Ok(decoded) => messages.extend(decoded),
                Err(WireError::Validation(cause)) => {
                    return Err(ConversionError::invalid_message(index, cause).into())
                }
                Err(err) => return Err(err),
            }
        }
        Ok(messages)
    }

    /// Encode internal messages for a provider.
    ///
    /// # Errors
    ///
    /// A conversion failure when `provider` names no registered format, or
    /// when a strict encode meets a message it cannot express.
    pub fn from_internal(
        &self,
        messages: &[InternalMessage],
        provider: &str,
        options: &CodecOptions,
    ) -> Result<EncodeOutcome> {
        self.registry.get(provider)?.encode(messages, options)
    }

    /// Encode a JSON array of internal messages for a provider.
    ///
    /// Elements that do not read as internal messages follow the same
    /// strict/lenient policy as encode failures. Skip indices refer to the
    /// input array.
    ///
    /// # Errors
    ///
    /// A conversion failure when `value` is not an array, when `provider`
    /// names no registered format, or on the first bad element in strict
    /// mode.
    pub fn from_internal_value(
        &self,
        value: &JsonValue,
        provider: &str,
        options: &CodecOptions,
    ) -> Result<EncodeOutcome> {
        let format = self.registry.get(provider)?;
        let Some(items) = value.as_array() else {
            return Err(ConversionError::new(format!(
                "expected an array of internal messages, got {}",
                json_kind(value)
            ))
            .with_provider(format.name())
            .into());
        };

        let mut messages = Vec::with_capacity(items.len());
        let mut positions = Vec::with_capacity(items.len());
        let mut rejected = Vec::new();
        for (index, item) in items.iter().enumerate() {
            match serde_json::from_value::<InternalMessage>(item.clone()) {
                Ok(message) => {
                    messages.push(message);
                    positions.push(index);
                }
                Err(err) => {
                    let cause =
                        ValidationError::new(INTERNAL, format!("[{}]", index), item, err.to_string());
                    if options.strict {
                        return Err(ConversionError::invalid_message(index, cause).into());
                    }
                    warn!(
                        target: "serdes_wire::encode",
                        provider = INTERNAL,
                        index,
                        "Skipping message: {}",
                        cause
                    );
                    rejected.push(SkippedMessage {
                        index,
                        reason: cause.to_string(),
                    });
                }
            }
        }

        let mut outcome = format.encode(&messages, options)?;
        for skip in &mut outcome.skipped {
            skip.index = positions.get(skip.index).copied().unwrap_or(skip.index);
        }
        outcome.skipped.extend(rejected);
        outcome.skipped.sort_by_key(|skip| skip.index);
        Ok(outcome)
    }

    /// Decode a conversation with one format and encode it with another.
    ///
    /// # Errors
    ///
    /// Any failure of [`Codec::to_internal_all`] or [`Codec::from_internal`].
    pub fn translate(
        &self,
        raws: &[JsonValue],
        from: Option<&str>,
        to: &str,
        options: &CodecOptions,
    ) -> Result<EncodeOutcome> {
        let messages = self.to_internal_all(raws, from, options)?;
        self.from_internal(&messages, to, options)
    }

    fn route(&self, raw: &JsonValue) -> Result<Arc<dyn WireFormat>> {
        let detection = detect(raw);
        if let Some(provider) = detection.provider {
            if let Ok(format) = self.registry.get(provider.as_str()) {
                return Ok(format);
            }
            warn!(
                target: "serdes_wire::route",
                provider = provider.as_str(),
                "Detected format is not registered, falling back to {}",
                FALLBACK_PROVIDER
            );
        }
        for tag in self.registry.tags() {
            let format = self.registry.get(tag)?;
            if format.is_format(raw) {
                debug!(target: "serdes_wire::route", format = tag, "Routed by format signature");
                return Ok(format);
            }
        }
        debug!(
            target: "serdes_wire::route",
            reason = %detection.reason,
            "Unrecognized message, falling back to {}",
            FALLBACK_PROVIDER
        );
        Ok(self.registry.get(FALLBACK_PROVIDER)?)
    }
}

/// Check the internal shape: `content` is a non-empty array and every
/// element is an object tagged with a recognized part type.
pub(crate) fn is_internal_shape(message: &JsonValue) -> bool {
    match message.get("content").and_then(JsonValue::as_array) {
        Some(parts) if !parts.is_empty() => parts.iter().all(|part| {
            part.get("type")
                .and_then(JsonValue::as_str)
                .is_some_and(|tag| CONTENT_PART_TAGS.contains(&tag))
        }),
        _ => false,
    }
}

fn as_internal(message: &JsonValue) -> Option<InternalMessage> {
    if !is_internal_shape(message) {
        return None;
    }
    serde_json::from_value(message.clone()).ok()
}

fn stamp(mut message: InternalMessage, provider: &str) -> InternalMessage {
    let meta = message.meta.get_or_insert_with(MessageMeta::default);
    meta.original
        .get_or_insert_with(|| OriginalInfo::new(provider))
        .provider = provider.to_string();
    message
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use serdes_wire_core::IdGenerator;

    fn options() -> CodecOptions {
        CodecOptions::default().id_generator(IdGenerator::sequential("g"))
    }

    struct EchoFormat;

    impl WireFormat for EchoFormat {
        fn name(&self) -> &str {
            "echo"
        }

        fn is_format(&self, message: &JsonValue) -> bool {
            message.get("echo").is_some()
        }

        fn decode(&self, message: &JsonValue, _options: &CodecOptions) -> Result<Vec<InternalMessage>> {
            let text = message["echo"].as_str().unwrap_or_default();
            Ok(vec![InternalMessage::user(text)])
        }

        fn encode(&self, messages: &[InternalMessage], _options: &CodecOptions) -> Result<EncodeOutcome> {
            Ok(EncodeOutcome {
                messages: messages.iter().map(|m| json!({ "echo": m.text() })).collect(),
                ..Default::default()
            })
        }
    }

    #[test]
    fn test_internal_shape_passes_through() {
        let raw = json!({"role": "user", "content": [{"type": "text", "text": "Hi"}]});
        let codec = Codec::new();
        let messages = codec.to_internal(&raw, None, &options()).unwrap();
        assert_eq!(messages, vec![InternalMessage::user("Hi")]);
        assert!(!codec.needs_conversion(&raw));
    }

    #[test]
    fn test_passthrough_stamps_provider() {
        let raw = json!({"role": "assistant", "content": [{"type": "text", "text": "Hi"}]});
        let messages = Codec::new().to_internal(&raw, Some("Claude"), &options()).unwrap();
        assert_eq!(messages[0].original().unwrap().provider, "anthropic");
    }

    #[test]
    fn test_needs_conversion() {
        let codec = Codec::new();
        assert!(codec.needs_conversion(&json!({"role": "user", "content": "Hi"})));
        assert!(codec.needs_conversion(&json!({"role": "user", "content": []})));
        assert!(codec.needs_conversion(&json!({"role": "user", "content": [{"type": "tool_use"}]})));
        // Anthropic image blocks carry the tag but not the internal layout.
        assert!(codec.needs_conversion(&json!({"role": "user", "content": [
            {"type": "image", "source": {"type": "base64", "media_type": "image/png", "data": "AAAA"}}
        ]})));
        assert!(!codec.needs_conversion(&json!({"role": "user", "content": [
            {"type": "image", "mediaType": "image/png", "source": {"type": "base64", "data": "AAAA"}}
        ]})));
    }

    #[test]
    fn test_unknown_provider() {
        let codec = Codec::new();
        let raw = json!({"role": "user", "content": "Hi"});
        let err = codec.to_internal(&raw, Some("cohere"), &options()).unwrap_err();
        assert!(err.is_conversion());
        let err = codec.from_internal(&[InternalMessage::user("Hi")], "cohere", &options()).unwrap_err();
        assert!(err.to_string().contains("cohere"));
    }

    #[test]
    fn test_unknown_format_falls_back() {
        let raw = json!({"role": "assistant", "content": "Hello"});
        let messages = Codec::new().to_internal(&raw, None, &options()).unwrap();
        assert_eq!(messages, vec![InternalMessage::assistant("Hello")]);
    }

    #[test]
    fn test_registered_format_is_routed_by_signature() {
        let mut codec = Codec::new();
        codec.registry_mut().register(EchoFormat);
        let messages = codec
            .to_internal(&json!({"role": "user", "echo": "ping"}), None, &options())
            .unwrap();
        assert_eq!(messages, vec![InternalMessage::user("ping")]);
        let outcome = codec.from_internal(&messages, "echo", &options()).unwrap();
        assert_eq!(outcome.messages, vec![json!({"echo": "ping"})]);
    }

    #[test]
    fn test_unregistered_detection_falls_back() {
        let mut registry = FormatRegistry::new();
        registry.register(EchoFormat).alias(FALLBACK_PROVIDER, "echo");
        let codec = Codec::with_registry(registry);

        let raw = json!({"role": "model", "text": "Hi"});
        assert_eq!(detect(&raw).provider_tag(), "google");
        let messages = codec.to_internal(&raw, None, &options()).unwrap();
        assert_eq!(messages, vec![InternalMessage::user("")]);
    }

    #[test]
    fn test_to_internal_all_reports_index() {
        let raws = vec![
            json!({"role": "user", "content": "Hi"}),
            json!({"role": "narrator", "content": "x", "tool_call_id": "c"}),
        ];
        let err = Codec::new().to_internal_all(&raws, None, &options()).unwrap_err();
        match err {
            WireError::Conversion(err) => {
                assert_eq!(err.index, Some(1));
                assert_eq!(err.cause.unwrap().field, "role");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_from_internal_value_requires_array() {
        let err = Codec::new()
            .from_internal_value(&json!({"role": "user"}), "openai", &options())
            .unwrap_err();
        assert!(err.is_conversion());
        assert!(err.to_string().contains("an object"));
    }

    #[test]
    fn test_from_internal_value_lenient() {
        let value = json!([
            {"role": "user", "content": [{"type": "text", "text": "a"}]},
            {"role": "narrator", "content": []},
            {"role": "assistant", "content": [{"type": "text", "text": "b"}]}
        ]);
        let codec = Codec::new();
        assert!(codec.from_internal_value(&value, "openai", &options()).is_err());

        let outcome = codec.from_internal_value(&value, "openai", &options().lenient()).unwrap();
        assert_eq!(
            outcome.messages,
            vec![
                json!({"role": "user", "content": "a"}),
                json!({"role": "assistant", "content": "b"}),
            ]
        );
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].index, 1);
    }

    #[test]
    fn test_from_internal_value_remaps_encode_skips() {
        let value = json!([
            {"role": "narrator"},
            {"role": "user", "content": [{"type": "text", "text": "a"}]},
            {"role": "system", "content": [{"type": "image", "mediaType": "image/png", "source": {"type": "url", "url": "https://x/y.png"}}]}
        ]);
        let outcome = Codec::new()
            .from_internal_value(&value, "anthropic", &options().lenient())
            .unwrap();
        assert_eq!(outcome.messages, vec![json!({"role": "user", "content": "a"})]);
        let indices: Vec<usize> = outcome.skipped.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn test_translate() {
        let raws = vec![
            json!({"role": "system", "content": "Be brief."}),
            json!({"role": "user", "content": "Weather?"}),
            json!({"role": "assistant", "content": null, "tool_calls": [
                {"id": "call_1", "type": "function", "function": {"name": "weather", "arguments": "{\"city\":\"Oslo\"}"}}
            ]}),
            json!({"role": "tool", "tool_call_id": "call_1", "content": "-3C"}),
        ];
        let outcome = Codec::new().translate(&raws, Some("openai"), "anthropic", &options()).unwrap();
        assert_eq!(outcome.system, Some(json!("Be brief.")));
        assert_eq!(
            outcome.messages,
            vec![
                json!({"role": "user", "content": "Weather?"}),
                json!({"role": "assistant", "content": [
                    {"type": "tool_use", "id": "call_1", "name": "weather", "input": {"city": "Oslo"}}
                ]}),
                json!({"role": "user", "content": [
                    {"type": "tool_result", "tool_use_id": "call_1", "content": "-3C"}
                ]}),
            ]
        );
    }
}
