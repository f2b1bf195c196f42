//! Internal messages to Gemini content.

use std::collections::HashMap;

use serde_json::{json, Value as JsonValue};
use serdes_wire_core::{CodecOptions, ContentPart, InternalMessage, MediaSource, Result, Role, ValidationError};

use super::types::{self, Content, Part};
use super::PROVIDER;
use crate::grouping::{plan_units, MemberKind, Members, Unit};
use crate::outcome::{EncodeFold, EncodeOutcome};
use crate::preserve::Provenance;
use crate::validate::{arguments_value, check_internal, system_text};

type Encoded<T> = std::result::Result<T, ValidationError>;

/// Function names by call id, for results that do not carry one.
struct CallNames<'a>(HashMap<&'a str, &'a str>);

impl<'a> CallNames<'a> {
    fn collect(messages: &'a [InternalMessage]) -> Self {
        Self(
            messages
                .iter()
                .filter_map(|m| Some((m.tool_call_id.as_deref()?, m.function_call.as_ref()?.name.as_str())))
                .collect(),
        )
    }

    fn resolve<'m>(&'m self, message: &'m InternalMessage) -> Option<&'m str> {
        message
            .name
            .as_deref()
            .or_else(|| self.0.get(message.tool_call_id.as_deref()?).copied())
    }
}

pub(super) fn encode_messages(messages: &[InternalMessage], options: &CodecOptions) -> Result<EncodeOutcome> {
    let names = CallNames::collect(messages);
    let mut fold = EncodeFold::new(PROVIDER, options);
    for unit in plan_units(messages) {
        match unit {
            Unit::Single(index, message) if message.role == Role::System => {
                match system_text(PROVIDER, message) {
                    Ok(text) => fold.push_system(text),
                    Err(err) => fold.skip(index, err)?,
                }
            }
            Unit::Single(index, message) => {
                fold.emit_or_skip(index, encode_single(message, &names, options))?;
            }
            // Consecutive results share one content entry.
            Unit::Results(members) => {
                let mut parts = Vec::with_capacity(members.len());
                for &(index, message) in &members {
                    match response_part(message, &names, options) {
                        Ok(part) => parts.push(part),
                        Err(err) => fold.skip(index, err)?,
                    }
                }
                if !parts.is_empty() {
                    let role = members
                        .first()
                        .and_then(|(_, m)| Provenance::of(PROVIDER, m).role())
                        .unwrap_or("user");
                    fold.emit(&Content::new(role, parts))?;
                }
            }
            Unit::Group(members) => encode_group(&members, &names, options, &mut fold)?,
        }
    }
    Ok(fold.finish_with_system(|text| json!({ "parts": [{ "text": text }] })))
}

fn encode_single(message: &InternalMessage, names: &CallNames<'_>, options: &CodecOptions) -> Encoded<Content> {
    if message.is_tool_result() {
        let part = response_part(message, names, options)?;
        let role = Provenance::of(PROVIDER, message).role().unwrap_or("user");
        return Ok(Content::new(role, vec![part]));
    }
    check_internal(PROVIDER, message, options)?;
    let provenance = Provenance::of(PROVIDER, message);

    let mut parts = content_parts(&message.content);
    if message.function_call.is_some() {
        parts.push(call_part(message, options)?);
    }
    let mut out = Content::new(provenance.role().unwrap_or(role_tag(message.role)), parts);
    out.extra = provenance.extra();
    Ok(out)
}

fn encode_group(
    members: &[(usize, &InternalMessage)],
    names: &CallNames<'_>,
    options: &CodecOptions,
    fold: &mut EncodeFold<'_>,
) -> Result<()> {
    let split = Members::partition(members);
    let role = split.role();
    let mut parts = Vec::new();
    let mut fused = 0;

    for &(index, message) in members {
        let encoded = match MemberKind::of(message) {
            MemberKind::Narrative => check_internal(PROVIDER, message, options).and_then(|()| {
                let mut encoded = content_parts(&message.content);
                if message.function_call.is_some() {
                    encoded.push(call_part(message, options)?);
                }
                Ok(encoded)
            }),
            MemberKind::Invocation if role == Role::Assistant => check_internal(PROVIDER, message, options)
                .and_then(|()| call_part(message, options))
                .map(|part| vec![part]),
            MemberKind::Invocation => Err(misplaced(index, "functionCall", role)),
            MemberKind::Result if role == Role::Assistant => Err(misplaced(index, "functionResponse", role)),
            MemberKind::Result => response_part(message, names, options).map(|part| vec![part]),
        };
        match encoded {
            Ok(encoded) => {
                parts.extend(encoded);
                fused += 1;
            }
            Err(err) => fold.skip(index, err)?,
        }
    }

    if fused == 0 {
        return Ok(());
    }
    let provenance = split.lead().map(|lead| Provenance::of(PROVIDER, lead));
    let tag = provenance.and_then(|p| p.role()).unwrap_or(role_tag(role));
    let mut out = Content::new(tag, parts);
    if let Some(provenance) = provenance {
        out.extra = provenance.extra();
    }
    fold.emit(&out)
}

fn misplaced(index: usize, part: &str, role: Role) -> ValidationError {
    ValidationError::new(
        PROVIDER,
        format!("messages[{}]", index),
        &JsonValue::String(role.to_string()),
        format!("{} cannot appear in a {} turn", part, role_tag(role)),
    )
}

fn role_tag(role: Role) -> &'static str {
    match role {
        Role::Assistant => "model",
        Role::System | Role::User | Role::Function => "user",
    }
}

/// The call id to emit, unless it was made up during decode.
fn emitted_id(message: &InternalMessage) -> Option<String> {
    if Provenance::of(PROVIDER, message).id_synthesized() {
        None
    } else {
        message.tool_call_id.clone()
    }
}

fn call_part(message: &InternalMessage, options: &CodecOptions) -> Encoded<Part> {
    let Some(call) = &message.function_call else {
        return Err(ValidationError::missing(PROVIDER, "function_call"));
    };
    let args = arguments_value(PROVIDER, &call.arguments, options)?;
    if options.validate && !args.is_object() {
        return Err(ValidationError::new(
            PROVIDER,
            "function_call.arguments",
            &args,
            "Gemini function arguments must be a JSON object",
        ));
    }
    Ok(Part::FunctionCall {
        function_call: types::FunctionCall {
            id: emitted_id(message),
            name: call.name.clone(),
            args,
        },
    })
}

fn response_part(message: &InternalMessage, names: &CallNames<'_>, options: &CodecOptions) -> Encoded<Part> {
    check_internal(PROVIDER, message, options)?;
    let Some(name) = names.resolve(message) else {
        return Err(ValidationError::missing(PROVIDER, "name"));
    };
    let text = message.text();
    let response = match serde_json::from_str::<JsonValue>(&text) {
        Ok(value @ JsonValue::Object(_)) => value,
        _ => json!({ "content": text }),
    };
    Ok(Part::FunctionResponse {
        function_response: types::FunctionResponse {
            id: emitted_id(message),
            name: name.to_string(),
            response,
        },
    })
}

fn content_parts(parts: &[ContentPart]) -> Vec<Part> {
    parts
        .iter()
        .map(|part| match part.as_media() {
            None => Part::text(part.as_text().unwrap_or_default()),
            Some((_, media)) => match &media.source {
                MediaSource::Base64 { data } => Part::inline_data(media.media_type.as_str(), data.as_str()),
                MediaSource::Url { url } => Part::file_data(media.media_type.as_str(), url.as_str()),
            },
        })
        .collect()
}
