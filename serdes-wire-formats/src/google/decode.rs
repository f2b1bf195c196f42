//! Gemini content to internal messages.

use serde_json::Value as JsonValue;
use serdes_wire_core::messages::keys;
use serdes_wire_core::{
    CodecOptions, ContentPart, InternalMessage, MediaKind, MediaPart, OriginalInfo, Role, ValidationError,
};
use tracing::debug;

use super::types::Part;
use super::PROVIDER;
use crate::grouping::Turn;
use crate::validate::{lenient_role, typed, RawMessage};

const KNOWN_FIELDS: [&str; 2] = ["role", "parts"];

pub(super) fn decode_message(
    value: &JsonValue,
    options: &CodecOptions,
) -> Result<Vec<InternalMessage>, ValidationError> {
    let raw = RawMessage::parse(PROVIDER, value)?;
    let role_tag = raw.role()?;
    let role = match role_tag {
        "user" | "function" => Role::User,
        "model" => Role::Assistant,
        other if !options.validate => match lenient_role(other) {
            Role::Function => Role::User,
            role => role,
        },
        other => {
            return Err(raw.invalid(
                "role",
                &JsonValue::String(other.to_string()),
                "expected one of user, model, function",
            ))
        }
    };

    let mut turn = Turn::new(PROVIDER, role);
    if role_tag == "function" {
        turn.preserve(keys::ROLE, JsonValue::from(role_tag));
    }

    match raw.get("parts") {
        Some(JsonValue::Array(parts)) => {
            for (i, value) in parts.iter().enumerate() {
                let field = format!("parts[{}]", i);
                match typed::<Part>(PROVIDER, field.clone(), value) {
                    Ok(part) => decode_part(&field, value, part, role, options, &mut turn)?,
                    Err(e) if options.validate => return Err(e),
                    Err(e) => debug!(target: "serdes_wire::decode", provider = PROVIDER, "Dropping {}: {}", field, e),
                }
            }
        }
        Some(other) if options.validate => {
            return Err(raw.invalid("parts", other, "parts must be an array"));
        }
        None if options.validate => return Err(ValidationError::missing(PROVIDER, "parts")),
        _ => {}
    }

    if options.preserve_unknown {
        for (key, value) in raw.unknown_fields(&KNOWN_FIELDS) {
            turn.preserve_unknown(key, value);
        }
    }

    Ok(turn.finish(options))
}

fn decode_part(
    field: &str,
    value: &JsonValue,
    part: Part,
    role: Role,
    options: &CodecOptions,
    turn: &mut Turn,
) -> Result<(), ValidationError> {
    match part {
        Part::Text { text } => turn.push_content(ContentPart::text(text)),
        Part::InlineData { inline_data } => {
            let kind = MediaKind::from_mime_type(&inline_data.mime_type);
            turn.push_content(ContentPart::media(
                kind,
                MediaPart::base64(inline_data.mime_type, inline_data.data),
            ));
        }
        Part::FileData { file_data } => {
            let kind = MediaKind::from_mime_type(&file_data.mime_type);
            turn.push_content(ContentPart::media(
                kind,
                MediaPart::url(file_data.mime_type, file_data.file_uri),
            ));
        }
        Part::FunctionCall { function_call: call } => {
            if options.validate {
                if role != Role::Assistant {
                    return Err(ValidationError::new(PROVIDER, field, value, "functionCall is only allowed in model turns"));
                }
                if call.name.is_empty() {
                    return Err(ValidationError::missing(PROVIDER, format!("{}.functionCall.name", field)));
                }
                if !(call.args.is_object() || call.args.is_null()) {
                    return Err(ValidationError::new(
                        PROVIDER,
                        format!("{}.functionCall.args", field),
                        &call.args,
                        "args must be an object",
                    ));
                }
            }
            let arguments = if call.args.is_null() {
                "{}".to_string()
            } else {
                call.args.to_string()
            };
            let (id, synthesized) = call_id(call.id, options);
            turn.push_invocation(mark_synthesized(
                InternalMessage::tool_invocation(id, call.name, arguments),
                synthesized,
            ));
        }
        Part::FunctionResponse { function_response: response } => {
            if options.validate {
                if role != Role::User {
                    return Err(ValidationError::new(
                        PROVIDER,
                        field,
                        value,
                        "functionResponse is only allowed in user or function turns",
                    ));
                }
                if response.name.is_empty() {
                    return Err(ValidationError::missing(PROVIDER, format!("{}.functionResponse.name", field)));
                }
            }
            let (id, synthesized) = call_id(response.id, options);
            let result = InternalMessage::tool_result(id, response.response.to_string()).with_name(response.name);
            turn.push_result(mark_synthesized(result, synthesized));
        }
    }
    Ok(())
}

/// Gemini only sometimes assigns call ids; make one up when it did not.
fn call_id(id: Option<String>, options: &CodecOptions) -> (String, bool) {
    match id {
        Some(id) if !id.is_empty() => (id, false),
        _ => (format!("call_{}", options.next_id()), true),
    }
}

fn mark_synthesized(message: InternalMessage, synthesized: bool) -> InternalMessage {
    if synthesized {
        message.with_original(OriginalInfo::new(PROVIDER).with_field(keys::ID_SYNTHESIZED, true))
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;
    use serdes_wire_core::IdGenerator;

    fn options() -> CodecOptions {
        CodecOptions::default().id_generator(IdGenerator::sequential("g"))
    }

    #[test]
    fn test_decode_model_turn_with_calls() {
        let raw = json!({
            "role": "model",
            "parts": [
                {"text": "Checking."},
                {"functionCall": {"name": "weather", "args": {"city": "Paris"}}},
                {"functionCall": {"name": "time", "args": {}, "id": "fc_7"}}
            ]
        });
        let messages = decode_message(&raw, &options()).unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, Role::Assistant);
        assert_eq!(messages[1].tool_call_id.as_deref(), Some("call_g1"));
        assert!(messages[1].original().unwrap().flag(keys::ID_SYNTHESIZED));
        assert_eq!(messages[2].tool_call_id.as_deref(), Some("fc_7"));
        assert!(messages[2].original().is_none());
        assert_eq!(messages[0].group().unwrap().id, "g2");
    }

    #[test]
    fn test_decode_function_response() {
        let raw = json!({
            "role": "function",
            "parts": [{"functionResponse": {"name": "weather", "response": {"temp": 18}, "id": "fc_1"}}]
        });
        let messages = decode_message(&raw, &options()).unwrap();
        assert_eq!(messages.len(), 1);
        let result = &messages[0];
        assert!(result.is_tool_result());
        assert_eq!(result.name.as_deref(), Some("weather"));
        assert_eq!(result.text(), r#"{"temp":18}"#);
        assert_eq!(result.original().unwrap().field(keys::ROLE), Some(&json!("function")));
    }

    #[test]
    fn test_decode_media_kinds() {
        let raw = json!({
            "role": "user",
            "parts": [
                {"inlineData": {"mimeType": "audio/wav", "data": "AAAA"}},
                {"fileData": {"mimeType": "application/pdf", "fileUri": "gs://b/doc.pdf"}}
            ]
        });
        let content = &decode_message(&raw, &options()).unwrap()[0].content;
        assert_eq!(content[0], ContentPart::audio_base64("audio/wav", "AAAA"));
        assert_eq!(content[1].as_media().unwrap().0, MediaKind::Document);
    }

    #[rstest]
    #[case(json!({"role": "assistant", "parts": []}), "role")]
    #[case(json!({"role": "user"}), "parts")]
    #[case(json!({"role": "user", "parts": "hi"}), "parts")]
    #[case(json!({"role": "user", "parts": [{"functionCall": {"name": "f", "args": {}}}]}), "parts[0]")]
    #[case(json!({"role": "model", "parts": [{"functionResponse": {"name": "f", "response": {}}}]}), "parts[0]")]
    #[case(json!({"role": "model", "parts": [{"functionCall": {"name": "f", "args": [1]}}]}), "parts[0].functionCall.args")]
    #[case(json!({"role": "model", "parts": [{"thought": "hm"}]}), "parts[0]")]
    fn test_validation_names_field(#[case] raw: JsonValue, #[case] field: &str) {
        let err = decode_message(&raw, &options()).unwrap_err();
        assert_eq!(err.field, field);
        assert_eq!(err.provider, "google");
    }
}
