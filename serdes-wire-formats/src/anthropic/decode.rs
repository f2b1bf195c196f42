//! Anthropic message to internal messages.

use serde_json::Value as JsonValue;
use serdes_wire_core::messages::{keys, media_type_from_url};
use serdes_wire_core::{
    CodecOptions, ContentPart, InternalMessage, MediaKind, MediaPart, OriginalInfo, Role, ValidationError,
};
use tracing::debug;

use super::types::{self, ContentBlock, ToolResultContent};
use super::PROVIDER;
use crate::grouping::Turn;
use crate::validate::{lenient_role, typed, RawMessage};

const KNOWN_FIELDS: [&str; 2] = ["role", "content"];

pub(super) fn decode_message(
    value: &JsonValue,
    options: &CodecOptions,
) -> Result<Vec<InternalMessage>, ValidationError> {
    let raw = RawMessage::parse(PROVIDER, value)?;
    let role = match raw.role()? {
        "user" => Role::User,
        "assistant" => Role::Assistant,
        other if !options.validate => lenient_role(other),
        other => {
            return Err(raw.invalid(
                "role",
                &JsonValue::String(other.to_string()),
                "expected one of user, assistant",
            ))
        }
    };

    let mut turn = Turn::new(PROVIDER, role);
    match raw.get("content") {
        Some(JsonValue::String(text)) => turn.push_content(ContentPart::text(text.as_str())),
        Some(JsonValue::Array(blocks)) => decode_blocks(role, blocks, options, &mut turn)?,
        None | Some(JsonValue::Null) if !options.validate => {}
        None => return Err(ValidationError::missing(PROVIDER, "content")),
        Some(other) if options.validate => {
            return Err(raw.invalid("content", other, "content must be a string or an array of blocks"))
        }
        Some(_) => {}
    }

    if options.preserve_unknown {
        for (key, value) in raw.unknown_fields(&KNOWN_FIELDS) {
            turn.preserve_unknown(key, value);
        }
    }

    Ok(turn.finish(options))
}

fn decode_blocks(
    role: Role,
    blocks: &[JsonValue],
    options: &CodecOptions,
    turn: &mut Turn,
) -> Result<(), ValidationError> {
    for (i, value) in blocks.iter().enumerate() {
        let field = format!("content[{}]", i);
        let block = match typed::<ContentBlock>(PROVIDER, field.clone(), value) {
            Ok(block) => block,
            Err(e) if options.validate => return Err(e),
            Err(e) => {
                debug!(target: "serdes_wire::decode", provider = PROVIDER, "Dropping {}: {}", field, e);
                continue;
            }
        };

        match block {
            ContentBlock::Text { text } => turn.push_content(ContentPart::text(text)),
            ContentBlock::Image { source } => {
                turn.push_content(ContentPart::media(MediaKind::Image, media_part(source, MediaKind::Image)));
            }
            ContentBlock::Document { source, title } => {
                let mut media = media_part(source, MediaKind::Document);
                media.filename = title;
                turn.push_content(ContentPart::media(MediaKind::Document, media));
            }
            ContentBlock::ToolUse { id, name, input } => {
                if options.validate {
                    if role != Role::Assistant {
                        return Err(ValidationError::new(PROVIDER, field, value, "tool_use is only allowed in assistant turns"));
                    }
                    if id.is_empty() {
                        return Err(ValidationError::missing(PROVIDER, format!("{}.id", field)));
                    }
                    if name.is_empty() {
                        return Err(ValidationError::missing(PROVIDER, format!("{}.name", field)));
                    }
                }
                turn.push_invocation(InternalMessage::tool_invocation(id, name, input.to_string()));
            }
            ContentBlock::ToolResult { tool_use_id, content, is_error } => {
                if options.validate {
                    if role != Role::User {
                        return Err(ValidationError::new(PROVIDER, field, value, "tool_result is only allowed in user turns"));
                    }
                    if tool_use_id.is_empty() {
                        return Err(ValidationError::missing(PROVIDER, format!("{}.tool_use_id", field)));
                    }
                }
                let text = match content {
                    Some(ToolResultContent::Text(text)) => text,
                    Some(blocks @ ToolResultContent::Blocks(_)) if !options.validate => blocks.text(),
                    Some(ToolResultContent::Blocks(_)) => {
                        return Err(ValidationError::new(
                            PROVIDER,
                            format!("{}.content", field),
                            &value["content"],
                            "tool_result content must be a string",
                        ))
                    }
                    None if !options.validate => String::new(),
                    None => return Err(ValidationError::missing(PROVIDER, format!("{}.content", field))),
                };
                let mut result = InternalMessage::tool_result(tool_use_id, text);
                if let Some(flag) = is_error {
                    result = result.with_original(OriginalInfo::new(PROVIDER).with_field(keys::IS_ERROR, flag));
                }
                turn.push_result(result);
            }
        }
    }

    if turn.single_text_narrative() {
        turn.preserve(keys::CONTENT_FORMAT, JsonValue::from("array"));
    }
    Ok(())
}

fn media_part(source: types::MediaSource, kind: MediaKind) -> MediaPart {
    match source {
        types::MediaSource::Base64 { media_type, data } => MediaPart::base64(media_type, data),
        types::MediaSource::Url { url } => MediaPart::url(media_type_from_url(&url, kind), url),
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
    fn test_decode_text_and_tool_use() {
        let raw = json!({
            "role": "assistant",
            "content": [
                {"type": "text", "text": "Let me look."},
                {"type": "tool_use", "id": "toolu_1", "name": "search", "input": {"q": "rust"}},
                {"type": "tool_use", "id": "toolu_2", "name": "fetch", "input": {}}
            ]
        });
        let messages = decode_message(&raw, &options()).unwrap();
        assert_eq!(messages.len(), 3);
        let positions: Vec<_> = messages.iter().map(|m| m.group().unwrap().position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert_eq!(messages[1].function_call.as_ref().unwrap().arguments, r#"{"q":"rust"}"#);
        assert_eq!(messages[2].tool_call_id.as_deref(), Some("toolu_2"));
    }

    #[test]
    fn test_decode_keeps_block_order() {
        let raw = json!({
            "role": "assistant",
            "content": [
                {"type": "text", "text": "a"},
                {"type": "tool_use", "id": "toolu_1", "name": "f", "input": {}},
                {"type": "text", "text": "b"}
            ]
        });
        let messages = decode_message(&raw, &options()).unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].text(), "a");
        assert!(messages[1].is_tool_invocation());
        assert_eq!(messages[2].text(), "b");
        assert_eq!(messages[2].group().unwrap().position, 2);
    }

    #[test]
    fn test_decode_document_titles() {
        let raw = json!({
            "role": "user",
            "content": [
                {"type": "document", "source": {"type": "url", "url": "https://x/a.pdf"}, "title": "a.pdf"},
                {"type": "document", "source": {"type": "url", "url": "https://x/b.pdf"}}
            ]
        });
        let content = &decode_message(&raw, &options()).unwrap()[0].content;
        assert_eq!(content[0].as_media().unwrap().1.filename.as_deref(), Some("a.pdf"));
        assert_eq!(content[1].as_media().unwrap().1.filename, None);
    }

    #[test]
    fn test_decode_tool_results_not_grouped() {
        let raw = json!({
            "role": "user",
            "content": [
                {"type": "tool_result", "tool_use_id": "toolu_1", "content": "ok"},
                {"type": "tool_result", "tool_use_id": "toolu_2", "content": "boom", "is_error": true}
            ]
        });
        let messages = decode_message(&raw, &options()).unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| m.is_tool_result() && m.group().is_none()));
        assert!(messages[1].original().unwrap().flag(keys::IS_ERROR));
        assert!(messages[0].original().is_none());
    }

    #[test]
    fn test_decode_image_sources() {
        let raw = json!({
            "role": "user",
            "content": [
                {"type": "image", "source": {"type": "base64", "media_type": "image/webp", "data": "AAAA"}},
                {"type": "image", "source": {"type": "url", "url": "https://example.com/a.jpg"}}
            ]
        });
        let content = &decode_message(&raw, &options()).unwrap()[0].content;
        assert_eq!(content[0], ContentPart::image_base64("image/webp", "AAAA"));
        assert_eq!(content[1], ContentPart::image_url("image/jpeg", "https://example.com/a.jpg"));
    }

    #[rstest]
    #[case(json!({"role": "system", "content": "x"}), "role")]
    #[case(json!({"role": "user"}), "content")]
    #[case(json!({"role": "user", "content": 1}), "content")]
    #[case(json!({"role": "user", "content": [{"type": "tool_use", "id": "t", "name": "f", "input": {}}]}), "content[0]")]
    #[case(json!({"role": "assistant", "content": [{"type": "tool_result", "tool_use_id": "t", "content": "x"}]}), "content[0]")]
    #[case(json!({"role": "user", "content": [{"type": "tool_result", "tool_use_id": "t"}]}), "content[0].content")]
    #[case(json!({"role": "user", "content": [{"type": "tool_result", "tool_use_id": "t", "content": [{"type": "text", "text": "x"}]}]}), "content[0].content")]
    #[case(json!({"role": "assistant", "content": [{"type": "tool_use", "id": "", "name": "f", "input": {}}]}), "content[0].id")]
    #[case(json!({"role": "assistant", "content": [{"type": "thinking", "thinking": "hm"}]}), "content[0]")]
    fn test_validation_names_field(#[case] raw: JsonValue, #[case] field: &str) {
        let err = decode_message(&raw, &options()).unwrap_err();
        assert_eq!(err.field, field);
    }

    #[test]
    fn test_validate_off_joins_result_blocks() {
        let raw = json!({
            "role": "user",
            "content": [{"type": "tool_result", "tool_use_id": "t", "content": [
                {"type": "text", "text": "line one, "},
                {"type": "text", "text": "line two"}
            ]}]
        });
        let messages = decode_message(&raw, &options().validate(false)).unwrap();
        assert_eq!(messages[0].text(), "line one, line two");
    }
}
