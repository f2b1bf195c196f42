//! Internal messages to OpenAI messages.

use serdes_wire_core::messages::to_data_url;
use serdes_wire_core::{
    CodecOptions, ContentPart, InternalMessage, MediaKind, MediaSource, Result, Role, ValidationError,
};

use super::types::{self, ChatMessage, MessageContent, ToolCall};
use super::PROVIDER;
use crate::format::placeholder_text;
use crate::grouping::{plan_units, MemberKind, Members, Unit};
use crate::outcome::{EncodeFold, EncodeOutcome};
use crate::preserve::Provenance;
use crate::validate::check_internal;

pub(super) fn encode_messages(messages: &[InternalMessage], options: &CodecOptions) -> Result<EncodeOutcome> {
    let mut fold = EncodeFold::new(PROVIDER, options);
    for unit in plan_units(messages) {
        match unit {
            Unit::Single(index, message) => {
                fold.emit_or_skip(index, encode_single(message, options))?;
            }
            // Each tool result is its own message.
            Unit::Results(members) => {
                for (index, message) in members {
                    fold.emit_or_skip(index, encode_single(message, options))?;
                }
            }
            Unit::Group(members) => encode_group(&members, options, &mut fold)?,
        }
    }
    Ok(fold.finish())
}

fn encode_single(message: &InternalMessage, options: &CodecOptions) -> std::result::Result<ChatMessage, ValidationError> {
    check_internal(PROVIDER, message, options)?;
    let provenance = Provenance::of(PROVIDER, message);
    let content = content_value(&message.content, message.role, provenance.wants_array());

    let mut out = match (message.role, &message.tool_call_id) {
        (Role::Function, Some(id)) => ChatMessage {
            tool_call_id: Some(id.clone()),
            ..ChatMessage::new("tool", content)
        },
        (Role::Function, None) => ChatMessage::new("function", content),
        (role, _) => ChatMessage::new(provenance.role().unwrap_or(role.as_str()), content),
    };

    if let Some(call) = &message.function_call {
        match &message.tool_call_id {
            Some(id) => out.tool_calls = Some(vec![ToolCall::function(id, &call.name, &call.arguments)]),
            None => {
                out.function_call = Some(types::FunctionCall {
                    name: call.name.clone(),
                    arguments: call.arguments.clone(),
                });
            }
        }
    }
    if out.tool_calls.is_none() && provenance.empty_tool_calls() {
        out.tool_calls = Some(Vec::new());
    }
    out.name = message.name.clone();
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

    let mut content = Vec::new();
    let mut tool_calls = Vec::new();
    let mut legacy_call = None;
    let mut name = None;
    let mut fused = 0;
    // Results cannot share a message with anything else. Those positioned
    // after fused members follow the fused message.
    let mut trailing = Vec::new();

    for &(index, message) in members {
        match MemberKind::of(message) {
            MemberKind::Result if fused == 0 => fold.emit_or_skip(index, encode_single(message, options))?,
            MemberKind::Result => trailing.push((index, message)),
            MemberKind::Invocation => match invocation(message, role, options) {
                Ok(call) => {
                    tool_calls.push(call);
                    fused += 1;
                }
                Err(err) => fold.skip(index, err)?,
            },
            MemberKind::Narrative => {
                if let Err(err) = check_internal(PROVIDER, message, options) {
                    fold.skip(index, err)?;
                    continue;
                }
                content.extend(message.content.iter().cloned());
                name = name.or_else(|| message.name.clone());
                if let Some(call) = &message.function_call {
                    match &message.tool_call_id {
                        Some(id) => tool_calls.push(ToolCall::function(id, &call.name, &call.arguments)),
                        None => {
                            legacy_call = Some(types::FunctionCall {
                                name: call.name.clone(),
                                arguments: call.arguments.clone(),
                            })
                        }
                    }
                }
                fused += 1;
            }
        }
    }

    if fused > 0 {
        let provenance = split.lead().map(|lead| Provenance::of(PROVIDER, lead));
        let tag = provenance.and_then(|p| p.role()).unwrap_or(role.as_str());
        let wants_array = provenance.is_some_and(|p| p.wants_array());

        let mut out = ChatMessage::new(tag, content_value(&content, role, wants_array));
        out.name = name;
        out.function_call = legacy_call;
        if !tool_calls.is_empty() {
            out.tool_calls = Some(tool_calls);
        }
        if let Some(provenance) = provenance {
            out.extra = provenance.extra();
        }
        fold.emit(&out)?;
    }

    for (index, message) in trailing {
        fold.emit_or_skip(index, encode_single(message, options))?;
    }
    Ok(())
}

fn invocation(
    message: &InternalMessage,
    role: Role,
    options: &CodecOptions,
) -> std::result::Result<ToolCall, ValidationError> {
    check_internal(PROVIDER, message, options)?;
    if role != Role::Assistant {
        return Err(ValidationError::new(
            PROVIDER,
            "tool_calls",
            &serde_json::Value::String(role.to_string()),
            "only assistant messages may carry tool calls",
        ));
    }
    let Some(call) = &message.function_call else {
        return Err(ValidationError::missing(PROVIDER, "function_call"));
    };
    let id = message
        .tool_call_id
        .clone()
        .unwrap_or_else(|| format!("call_{}", options.next_id()));
    Ok(ToolCall::function(id, &call.name, &call.arguments))
}

/// `null` for an empty assistant turn, a string for one text part, parts otherwise.
fn content_value(parts: &[ContentPart], role: Role, wants_array: bool) -> Option<MessageContent> {
    match parts {
        [] if role == Role::Assistant => None,
        [ContentPart::Text { text }] if !wants_array => Some(MessageContent::Text(text.clone())),
        parts => Some(MessageContent::Parts(
            parts.iter().map(encode_part).collect(),
        )),
    }
}

fn encode_part(part: &ContentPart) -> types::ContentPart {
    let Some((kind, media)) = part.as_media() else {
        return types::ContentPart::text(part.as_text().unwrap_or_default());
    };
    match (kind, &media.source) {
        (MediaKind::Image, MediaSource::Base64 { data }) => {
            types::ContentPart::image_url(to_data_url(&media.media_type, data))
        }
        (MediaKind::Image, MediaSource::Url { url }) => types::ContentPart::image_url(url.as_str()),
        (MediaKind::Audio, MediaSource::Base64 { data }) => types::ContentPart::Audio {
            input_audio: types::AudioContent {
                data: data.clone(),
                format: audio_format(&media.media_type),
            },
        },
        (MediaKind::Document, MediaSource::Base64 { data }) => types::ContentPart::File {
            file: types::FileContent {
                file_data: to_data_url(&media.media_type, data),
                filename: media.filename.clone(),
            },
        },
        (kind, _) => types::ContentPart::text(placeholder_text(kind, &media.media_type)),
    }
}

fn audio_format(media_type: &str) -> String {
    match media_type.strip_prefix("audio/").unwrap_or(media_type) {
        "mpeg" => "mp3".to_string(),
        "x-wav" | "wave" => "wav".to_string(),
        format => format.to_string(),
    }
}
