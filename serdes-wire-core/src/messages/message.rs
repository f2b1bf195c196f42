//! The canonical internal message.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::content::ContentPart;
use super::meta::{GroupInfo, MessageMeta, OriginalInfo};

/// Role of an internal message.
///
/// Vendor `tool` roles become [`Role::Function`] with a `tool_call_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions.
    System,
    /// End-user turn.
    User,
    /// Model turn.
    Assistant,
    /// Tool/function result.
    Function,
}

impl Role {
    /// The lowercase tag.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Function => "function",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Function name.
    pub name: String,
    /// JSON-serialized arguments.
    pub arguments: String,
}

impl FunctionCall {
    /// Create a function call.
    #[must_use]
    pub fn new(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Parse the arguments as JSON.
    pub fn parsed_arguments(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.arguments)
    }
}

/// One conversational turn in vendor-neutral form.
///
/// Created by decoders and read by encoders; nothing mutates one in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternalMessage {
    /// Who produced the turn.
    pub role: Role,
    /// Ordered content; empty is valid (e.g. a bare tool invocation).
    #[serde(default)]
    pub content: Vec<ContentPart>,
    /// Function name for function results, optional speaker name for users.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The invocation this assistant message represents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    /// Correlates an invocation and its result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Bookkeeping outside the conversation.
    #[serde(
        rename = "_meta",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub meta: Option<MessageMeta>,
}

impl InternalMessage {
    /// Create a message with the given role and content.
    #[must_use]
    pub fn new(role: Role, content: Vec<ContentPart>) -> Self {
        Self {
            role,
            content,
            name: None,
            function_call: None,
            tool_call_id: None,
            meta: None,
        }
    }

    /// Create a system message with text.
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, vec![ContentPart::text(text)])
    }

    /// Create a user message with text.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![ContentPart::text(text)])
    }

    /// Create an assistant message with text.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, vec![ContentPart::text(text)])
    }

    /// Create an assistant message representing one tool invocation.
    #[must_use]
    pub fn tool_invocation(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            function_call: Some(FunctionCall::new(name, arguments)),
            tool_call_id: Some(id.into()),
            ..Self::new(Role::Assistant, Vec::new())
        }
    }

    /// Create a function-role tool result.
    #[must_use]
    pub fn tool_result(tool_call_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::new(Role::Function, vec![ContentPart::text(text)])
        }
    }

    /// Set the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the group membership.
    #[must_use]
    pub fn with_group(mut self, group: GroupInfo) -> Self {
        self.meta.get_or_insert_with(MessageMeta::default).group = Some(group);
        self
    }

    /// Set the provenance record.
    #[must_use]
    pub fn with_original(mut self, original: OriginalInfo) -> Self {
        self.meta.get_or_insert_with(MessageMeta::default).original = Some(original);
        self
    }

    /// Group membership, if any.
    #[must_use]
    pub fn group(&self) -> Option<&GroupInfo> {
        self.meta.as_ref().and_then(|m| m.group.as_ref())
    }

    /// Provenance record, if any.
    #[must_use]
    pub fn original(&self) -> Option<&OriginalInfo> {
        self.meta.as_ref().and_then(|m| m.original.as_ref())
    }

    /// Concatenated text of all text parts.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentPart::as_text)
            .collect::<Vec<_>>()
            .join("")
    }

    /// Check if this is an assistant tool invocation.
    #[must_use]
    pub fn is_tool_invocation(&self) -> bool {
        self.role == Role::Assistant && self.function_call.is_some()
    }

    /// Check if this is a tool/function result.
    #[must_use]
    pub fn is_tool_result(&self) -> bool {
        self.role == Role::Function
    }

    /// Check if content is exactly one text part.
    #[must_use]
    pub fn is_single_text(&self) -> bool {
        matches!(self.content.as_slice(), [ContentPart::Text { .. }])
    }
}
