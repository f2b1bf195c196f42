//! OpenAI message to internal messages.

use serde_json::Value as JsonValue;
use serdes_wire_core::messages::{keys, media_type_from_url, parse_data_url};
use serdes_wire_core::{
    CodecOptions, ContentPart, FunctionCall, InternalMessage, MediaKind, MediaPart, Role, ValidationError,
};
use tracing::debug;

use super::types;
use super::PROVIDER;
use crate::grouping::Turn;
use crate::validate::{check_arguments_json, lenient_role, typed, RawMessage};

const KNOWN_FIELDS: [&str; 6] = ["role", "content", "name", "function_call", "tool_calls", "tool_call_id"];

pub(super) fn decode_message(
    value: &JsonValue,
    options: &CodecOptions,
) -> Result<Vec<InternalMessage>, ValidationError> {
    let raw = RawMessage::parse(PROVIDER, value)?;
    let role_tag = raw.role()?;
    let role = match role_tag {
        "system" | "developer" => Role::System,
        "user" => Role::User,
        "assistant" => Role::Assistant,
        "tool" | "function" => Role::Function,
        other if !options.validate => lenient_role(other),
        other => {
            return Err(raw.invalid(
                "role",
                &JsonValue::String(other.to_string()),
                "expected one of system, developer, user, assistant, tool, function",
            ))
        }
    };

    let mut turn = Turn::new(PROVIDER, role);
    if role_tag == "developer" {
        turn.preserve(keys::ROLE, JsonValue::from(role_tag));
    }

    decode_content(&raw, options, &mut turn)?;
    turn.set_name(string_field(&raw, "name", options)?.map(str::to_string));

    match role_tag {
        "tool" => {
            let id = string_field(&raw, "tool_call_id", options)?;
            if id.is_none() && options.validate {
                return Err(ValidationError::missing(PROVIDER, "tool_call_id"));
            }
            turn.set_tool_call_id(id.map(str::to_string));
        }
        "function" if options.validate && raw.get("name").is_none() => {
            return Err(ValidationError::missing(PROVIDER, "name"));
        }
        _ => {}
    }

    if let Some(tool_calls) = raw.get("tool_calls").filter(|v| !v.is_null()) {
        decode_tool_calls(&raw, role, tool_calls, options, &mut turn)?;
    }

    if let Some(call) = raw.get("function_call").filter(|v| !v.is_null()) {
        if role != Role::Assistant && options.validate {
            return Err(raw.invalid("function_call", call, "only assistant messages may call functions"));
        }
        match typed::<types::FunctionCall>(PROVIDER, "function_call", call) {
            Ok(call) => {
                if options.validate {
                    check_arguments_json(PROVIDER, "function_call.arguments", &call.arguments)?;
                }
                turn.set_function_call(FunctionCall::new(call.name, call.arguments));
            }
            Err(e) if options.validate => return Err(e),
            Err(e) => debug!(target: "serdes_wire::decode", provider = PROVIDER, "Ignoring function_call: {}", e),
        }
    }

    if options.preserve_unknown {
        for (key, value) in raw.unknown_fields(&KNOWN_FIELDS) {
            turn.preserve_unknown(key, value);
        }
    }

    Ok(turn.finish(options))
}

fn string_field<'a>(
    raw: &RawMessage<'a>,
    key: &str,
    options: &CodecOptions,
) -> Result<Option<&'a str>, ValidationError> {
    if options.validate {
        raw.opt_str(key)
    } else {
        Ok(raw.get(key).and_then(JsonValue::as_str))
    }
}

fn decode_tool_calls(
    raw: &RawMessage<'_>,
    role: Role,
    tool_calls: &JsonValue,
    options: &CodecOptions,
    turn: &mut Turn,
) -> Result<(), ValidationError> {
    if role != Role::Assistant && options.validate {
        return Err(raw.invalid("tool_calls", tool_calls, "only assistant messages may carry tool calls"));
    }
    let Some(entries) = tool_calls.as_array() else {
        if options.validate {
            return Err(raw.invalid("tool_calls", tool_calls, "tool_calls must be an array"));
        }
        return Ok(());
    };
    if entries.is_empty() {
        turn.preserve(keys::EMPTY_TOOL_CALLS, JsonValue::Bool(true));
    }

    for (i, entry) in entries.iter().enumerate() {
        let field = format!("tool_calls[{}]", i);
        let call = match typed::<types::ToolCall>(PROVIDER, field.clone(), entry) {
            Ok(call) => call,
            Err(e) if options.validate => return Err(e),
            Err(e) => {
                debug!(target: "serdes_wire::decode", provider = PROVIDER, "Ignoring {}: {}", field, e);
                continue;
            }
        };
        if options.validate {
            if call.tool_type != "function" {
                return Err(raw.invalid(
                    format!("{}.type", field),
                    &JsonValue::String(call.tool_type),
                    "expected \"function\"",
                ));
            }
            if call.id.is_empty() {
                return Err(ValidationError::missing(PROVIDER, format!("{}.id", field)));
            }
            check_arguments_json(PROVIDER, &format!("{}.function.arguments", field), &call.function.arguments)?;
        }
        turn.push_invocation(InternalMessage::tool_invocation(
            call.id,
            call.function.name,
            call.function.arguments,
        ));
    }
    Ok(())
}

fn decode_content(
    raw: &RawMessage<'_>,
    options: &CodecOptions,
    turn: &mut Turn,
) -> Result<(), ValidationError> {
    match raw.get("content") {
        None | Some(JsonValue::Null) => Ok(()),
        Some(JsonValue::String(text)) => {
            turn.push_content(ContentPart::text(text.as_str()));
            Ok(())
        }
        Some(JsonValue::Array(parts)) => {
            let mut decoded = Vec::with_capacity(parts.len());
            for (i, part) in parts.iter().enumerate() {
                let field = format!("content[{}]", i);
                let result = typed::<types::ContentPart>(PROVIDER, field.clone(), part)
                    .and_then(|part| decode_part(&field, part));
                match result {
                    Ok(part) => decoded.push(part),
                    Err(e) if options.validate => return Err(e),
                    Err(e) => debug!(target: "serdes_wire::decode", provider = PROVIDER, "Dropping {}: {}", field, e),
                }
            }
            if matches!(decoded.as_slice(), [ContentPart::Text { .. }]) {
                turn.preserve(keys::CONTENT_FORMAT, JsonValue::from("array"));
            }
            for part in decoded {
                turn.push_content(part);
            }
            Ok(())
        }
        Some(other) if options.validate => Err(raw.invalid(
            "content",
            other,
            "content must be a string, an array of parts, or null",
        )),
        Some(_) => Ok(()),
    }
}

fn decode_part(field: &str, part: types::ContentPart) -> Result<ContentPart, ValidationError> {
    Ok(match part {
        types::ContentPart::Text { text } => ContentPart::text(text),
        types::ContentPart::ImageUrl { image_url } => match parse_data_url(&image_url.url) {
            Some((media_type, data)) => ContentPart::image_base64(media_type, data),
            None => {
                let media_type = media_type_from_url(&image_url.url, MediaKind::Image);
                ContentPart::image_url(media_type, image_url.url)
            }
        },
        types::ContentPart::Audio { input_audio } => {
            ContentPart::audio_base64(format!("audio/{}", input_audio.format), input_audio.data)
        }
        types::ContentPart::File { file } => {
            let (media_type, data) = parse_data_url(&file.file_data).ok_or_else(|| {
                ValidationError::new(
                    PROVIDER,
                    format!("{}.file.file_data", field),
                    &JsonValue::String(file.file_data.clone()),
                    "file_data must be a base64 data URL",
                )
            })?;
            let mut media = MediaPart::base64(media_type, data);
            media.filename = file.filename;
            ContentPart::Document(media)
        }
    })
}
