//! Internal messages to Anthropic messages.

use serde_json::Value as JsonValue;
use serdes_wire_core::{
    CodecOptions, ContentPart, InternalMessage, MediaKind, MediaSource, Result, Role, ValidationError,
};

use super::types::{self, ContentBlock, Message, MessageContent};
use super::PROVIDER;
use crate::format::placeholder_text;
use crate::grouping::{plan_units, MemberKind, Members, Unit};
use crate::outcome::{EncodeFold, EncodeOutcome};
use crate::preserve::Provenance;
use crate::validate::{arguments_value, check_internal, system_text};

type Encoded<T> = std::result::Result<T, ValidationError>;

pub(super) fn encode_messages(messages: &[InternalMessage], options: &CodecOptions) -> Result<EncodeOutcome> {
    let mut fold = EncodeFold::new(PROVIDER, options);
    for unit in plan_units(messages) {
        match unit {
            Unit::Single(index, message) if message.role == Role::System => match system_text(PROVIDER, message) {
                Ok(text) => fold.push_system(text),
                Err(err) => fold.skip(index, err)?,
            },
            Unit::Single(index, message) => {
                fold.emit_or_skip(index, encode_single(message, options))?;
            }
            // Consecutive results share one user message.
            Unit::Results(members) => {
                let mut blocks = Vec::with_capacity(members.len());
                for (index, message) in members {
                    match result_block(message, options) {
                        Ok(block) => blocks.push(block),
                        Err(err) => fold.skip(index, err)?,
                    }
                }
                if !blocks.is_empty() {
                    fold.emit(&Message::user_blocks(blocks))?;
                }
            }
            Unit::Group(members) => encode_group(&members, options, &mut fold)?,
        }
    }
    Ok(fold.finish_with_system(JsonValue::String))
}

fn encode_single(message: &InternalMessage, options: &CodecOptions) -> Encoded<Message> {
    if message.is_tool_result() {
        return Ok(Message::user_blocks(vec![result_block(message, options)?]));
    }
    check_internal(PROVIDER, message, options)?;
    let provenance = Provenance::of(PROVIDER, message);

    let content = match (&message.function_call, message.content.as_slice()) {
        (None, [ContentPart::Text { text }]) if !provenance.wants_array() => MessageContent::Text(text.clone()),
        (call, parts) => {
            let mut blocks = content_blocks(parts);
            if call.is_some() {
                blocks.push(tool_use_block(message, options)?);
            }
            MessageContent::Blocks(blocks)
        }
    };

    let mut out = Message::new(role_tag(message.role)?, content);
    out.extra = provenance.extra();
    Ok(out)
}

fn encode_group(
    members: &[(usize, &InternalMessage)],
    options: &CodecOptions,
    fold: &mut EncodeFold<'_>,
) -> Result<()> {
    let split = Members::partition(members);
    let role = split.role();
    let tag = match role_tag(role) {
        Ok(tag) => tag,
        Err(err) => {
            for &(index, _) in members {
                fold.skip(index, err.clone())?;
            }
            return Ok(());
        }
    };

    let mut blocks = Vec::new();
    for &(index, message) in members {
        let encoded = match MemberKind::of(message) {
            MemberKind::Result if role == Role::User => result_block(message, options).map(|block| vec![block]),
            MemberKind::Result => Err(misplaced(index, "tool_result", role)),
            MemberKind::Invocation if role == Role::Assistant => check_internal(PROVIDER, message, options)
                .and_then(|()| tool_use_block(message, options))
                .map(|block| vec![block]),
            MemberKind::Invocation => Err(misplaced(index, "tool_use", role)),
            MemberKind::Narrative => check_internal(PROVIDER, message, options).and_then(|()| {
                let mut encoded = content_blocks(&message.content);
                if message.function_call.is_some() {
                    encoded.push(tool_use_block(message, options)?);
                }
                Ok(encoded)
            }),
        };
        match encoded {
            Ok(encoded) => blocks.extend(encoded),
            Err(err) => fold.skip(index, err)?,
        }
    }
    if blocks.is_empty() {
        return Ok(());
    }

    let mut out = Message::new(tag, MessageContent::Blocks(blocks));
    if let Some(lead) = split.lead() {
        out.extra = Provenance::of(PROVIDER, lead).extra();
    }
    fold.emit(&out)
}

fn misplaced(index: usize, block: &str, role: Role) -> ValidationError {
    ValidationError::new(
        PROVIDER,
        format!("messages[{}]", index),
        &JsonValue::String(role.to_string()),
        format!("{} cannot appear in a {} turn", block, role),
    )
}

fn role_tag(role: Role) -> Encoded<&'static str> {
    match role {
        Role::User | Role::Function => Ok("user"),
        Role::Assistant => Ok("assistant"),
        Role::System => Err(ValidationError::new(
            PROVIDER,
            "role",
            &JsonValue::String(role.to_string()),
            "system messages belong in the system field",
        )),
    }
}

fn tool_use_block(message: &InternalMessage, options: &CodecOptions) -> Encoded<ContentBlock> {
    let Some(call) = &message.function_call else {
        return Err(ValidationError::missing(PROVIDER, "function_call"));
    };
    let id = message
        .tool_call_id
        .clone()
        .unwrap_or_else(|| format!("toolu_{}", options.next_id()));
    let input = arguments_value(PROVIDER, &call.arguments, options)?;
    Ok(ContentBlock::tool_use(id, &call.name, input))
}

fn result_block(message: &InternalMessage, options: &CodecOptions) -> Encoded<ContentBlock> {
    check_internal(PROVIDER, message, options)?;
    let id = message
        .tool_call_id
        .clone()
        .unwrap_or_else(|| format!("toolu_{}", options.next_id()));
    let is_error = Provenance::of(PROVIDER, message).is_error();
    Ok(ContentBlock::tool_result(id, message.text(), is_error))
}

fn content_blocks(parts: &[ContentPart]) -> Vec<ContentBlock> {
    parts.iter().map(content_block).collect()
}

fn content_block(part: &ContentPart) -> ContentBlock {
    let Some((kind, media)) = part.as_media() else {
        return ContentBlock::text(part.as_text().unwrap_or_default());
    };
    let source = match &media.source {
        MediaSource::Base64 { data } => types::MediaSource::Base64 {
            media_type: media.media_type.clone(),
            data: data.clone(),
        },
        MediaSource::Url { url } => types::MediaSource::Url { url: url.clone() },
    };
    match kind {
        MediaKind::Image => ContentBlock::Image { source },
        MediaKind::Document => ContentBlock::Document {
            source,
            title: media.filename.clone(),
        },
        kind => ContentBlock::text(placeholder_text(kind, &media.media_type)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use serdes_wire_core::{GroupInfo, IdGenerator, MediaPart};

    fn options() -> CodecOptions {
        CodecOptions::default().id_generator(IdGenerator::sequential("g"))
    }

    #[test]
    fn test_results_batch_into_one_user_message() {
        let messages = vec![
            InternalMessage::tool_result("toolu_1", "ok"),
            InternalMessage::tool_result("toolu_2", "also ok"),
        ];
        let outcome = encode_messages(&messages, &options()).unwrap();
        assert_eq!(
            outcome.messages,
            vec![json!({
                "role": "user",
                "content": [
                    {"type": "tool_result", "tool_use_id": "toolu_1", "content": "ok"},
                    {"type": "tool_result", "tool_use_id": "toolu_2", "content": "also ok"}
                ]
            })]
        );
    }

    #[test]
    fn test_system_extracted() {
        let messages = vec![
            InternalMessage::system("Be brief."),
            InternalMessage::user("Hi"),
            InternalMessage::system("Be kind."),
        ];
        let outcome = encode_messages(&messages, &options()).unwrap();
        assert_eq!(outcome.messages, vec![json!({"role": "user", "content": "Hi"})]);
        assert_eq!(outcome.system, Some(json!("Be brief.\n\nBe kind.")));
    }

    #[test]
    fn test_non_text_system_rejected() {
        let system = InternalMessage::new(Role::System, vec![ContentPart::image_url("image/png", "https://x")]);
        let messages = vec![system, InternalMessage::user("Hi")];
        assert!(encode_messages(&messages, &options()).is_err());

        let outcome = encode_messages(&messages, &options().lenient()).unwrap();
        assert_eq!(outcome.messages.len(), 1);
        assert_eq!(outcome.skipped[0].index, 0);
        assert_eq!(outcome.system, None);
    }

    #[test]
    fn test_missing_id_synthesized() {
        let mut call = InternalMessage::tool_invocation("x", "f", r#"{"a":1}"#);
        call.tool_call_id = None;
        let outcome = encode_messages(&[call], &options()).unwrap();
        assert_eq!(
            outcome.messages[0]["content"][0],
            json!({"type": "tool_use", "id": "toolu_g1", "name": "f", "input": {"a": 1}})
        );
    }

    #[test]
    fn test_group_blocks_follow_positions() {
        let messages = vec![
            InternalMessage::tool_result("toolu_1", "done").with_group(GroupInfo::new("g", 1, 2)),
            InternalMessage::user("And also this.").with_group(GroupInfo::new("g", 0, 2)),
        ];
        let outcome = encode_messages(&messages, &options()).unwrap();
        assert_eq!(
            outcome.messages[0]["content"],
            json!([
                {"type": "text", "text": "And also this."},
                {"type": "tool_result", "tool_use_id": "toolu_1", "content": "done"}
            ])
        );
    }

    #[test]
    fn test_documents_keep_their_titles() {
        let message = InternalMessage::new(
            Role::User,
            vec![
                ContentPart::media(MediaKind::Document, MediaPart::url("application/pdf", "https://x/a.pdf").with_filename("a.pdf")),
                ContentPart::media(MediaKind::Document, MediaPart::url("application/pdf", "https://x/b.pdf").with_filename("b.pdf")),
            ],
        );
        let outcome = encode_messages(&[message], &options()).unwrap();
        assert_eq!(outcome.messages[0]["content"][0]["title"], "a.pdf");
        assert_eq!(outcome.messages[0]["content"][1]["title"], "b.pdf");
    }

    #[test]
    fn test_audio_becomes_placeholder() {
        let message = InternalMessage::new(
            Role::User,
            vec![ContentPart::text("Listen:"), ContentPart::audio_base64("audio/wav", "AAAA")],
        );
        let outcome = encode_messages(&[message], &options()).unwrap();
        assert_eq!(outcome.messages[0]["content"][1], json!({"type": "text", "text": "[audio: audio/wav]"}));
    }
}
