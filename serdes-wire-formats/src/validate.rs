//! Structural checks shared by the decoders and encoders.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};
use serdes_wire_core::{CodecOptions, InternalMessage, Role, ValidationError};

/// Read access to one raw vendor message, producing field-named failures.
pub(crate) struct RawMessage<'a> {
    provider: &'static str,
    object: &'a Map<String, JsonValue>,
}

impl<'a> RawMessage<'a> {
    /// The message must be a JSON object.
    pub(crate) fn parse(
        provider: &'static str,
        value: &'a JsonValue,
    ) -> Result<Self, ValidationError> {
        value
            .as_object()
            .map(|object| Self { provider, object })
            .ok_or_else(|| ValidationError::new(provider, "$", value, "message must be an object"))
    }

    /// The `role` field, which must be a string.
    pub(crate) fn role(&self) -> Result<&'a str, ValidationError> {
        match self.object.get("role") {
            Some(JsonValue::String(role)) => Ok(role),
            Some(other) => Err(self.invalid("role", other, "role must be a string")),
            None => Err(ValidationError::missing(self.provider, "role")),
        }
    }

    /// A top-level field.
    pub(crate) fn get(&self, key: &str) -> Option<&'a JsonValue> {
        self.object.get(key)
    }

    /// A top-level string field, `None` when absent or null.
    pub(crate) fn opt_str(&self, key: &str) -> Result<Option<&'a str>, ValidationError> {
        match self.object.get(key) {
            None | Some(JsonValue::Null) => Ok(None),
            Some(JsonValue::String(s)) => Ok(Some(s)),
            Some(other) => Err(self.invalid(key, other, "expected a string")),
        }
    }

    /// Fields outside `known`.
    pub(crate) fn unknown_fields(&self, known: &[&str]) -> IndexMap<String, JsonValue> {
        self.object
            .iter()
            .filter(|(k, _)| !known.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Build a failure for this provider.
    pub(crate) fn invalid(
        &self,
        field: impl Into<String>,
        value: &JsonValue,
        message: impl Into<String>,
    ) -> ValidationError {
        ValidationError::new(self.provider, field, value, message)
    }
}

/// Deserialize a nested vendor object into its wire type.
pub(crate) fn typed<T: DeserializeOwned>(
    provider: &'static str,
    field: impl Into<String>,
    value: &JsonValue,
) -> Result<T, ValidationError> {
    T::deserialize(value).map_err(|e| ValidationError::new(provider, field, value, e.to_string()))
}

/// Map a role outside the vendor's set when validation is off.
pub(crate) fn lenient_role(role: &str) -> Role {
    let role = role.to_lowercase();
    if role == "system" || role == "developer" {
        Role::System
    } else if role.contains("assist") || role.contains("model") {
        Role::Assistant
    } else if role.contains("tool") || role.contains("function") {
        Role::Function
    } else {
        Role::User
    }
}

/// Arguments must be a string holding valid JSON.
pub(crate) fn check_arguments_json(
    provider: &'static str,
    field: &str,
    arguments: &str,
) -> Result<(), ValidationError> {
    serde_json::from_str::<JsonValue>(arguments)
        .map(|_| ())
        .map_err(|e| {
            ValidationError::new(
                provider,
                field,
                &JsonValue::String(arguments.to_string()),
                format!("arguments are not valid JSON: {}", e),
            )
        })
}

/// Vendor-independent checks on an internal message before encoding.
pub(crate) fn check_internal(
    provider: &'static str,
    message: &InternalMessage,
    options: &CodecOptions,
) -> Result<(), ValidationError> {
    if !options.validate {
        return Ok(());
    }
    if let Some(call) = &message.function_call {
        if message.role != Role::Assistant {
            return Err(ValidationError::new(
                provider,
                "function_call",
                &JsonValue::String(message.role.to_string()),
                "only assistant messages may carry a function call",
            ));
        }
        if call.name.is_empty() {
            return Err(ValidationError::missing(provider, "function_call.name"));
        }
        check_arguments_json(provider, "function_call.arguments", &call.arguments)?;
    }
    if message.role == Role::Function && message.tool_call_id.is_none() && message.name.is_none() {
        return Err(ValidationError::missing(provider, "tool_call_id"));
    }
    Ok(())
}

/// Text for a vendor's native system slot; only text parts fit there.
pub(crate) fn system_text(provider: &'static str, message: &InternalMessage) -> Result<String, ValidationError> {
    if let Some(part) = message.content.iter().find(|part| !part.is_text()) {
        return Err(ValidationError::new(
            provider,
            "system",
            &JsonValue::String(part.type_tag().to_string()),
            "system content must be text",
        ));
    }
    Ok(message.text())
}

/// Parse invocation arguments into a JSON value for vendors that want objects.
///
/// Invalid JSON is a failure when validating and an empty object otherwise.
pub(crate) fn arguments_value(
    provider: &'static str,
    arguments: &str,
    options: &CodecOptions,
) -> Result<JsonValue, ValidationError> {
    match serde_json::from_str(arguments) {
        Ok(value) => Ok(value),
        Err(_) if !options.validate => Ok(JsonValue::Object(Map::new())),
        Err(e) => Err(ValidationError::new(
            provider,
            "function_call.arguments",
            &JsonValue::String(arguments.to_string()),
            format!("arguments are not valid JSON: {}", e),
        )),
    }
}
