//! OpenAI Chat Completions message types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message author.
    pub role: String,
    /// Message content; `null` for an assistant turn with only tool calls.
    pub content: Option<MessageContent>,
    /// Name of the author (or of the function, for legacy `function` role).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Legacy single function call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    /// Tool calls made by the assistant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// ID of the tool call being responded to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Preserved fields from a previous decode.
    #[serde(flatten)]
    pub extra: IndexMap<String, JsonValue>,
}

impl ChatMessage {
    /// Create a message with the given role and content.
    pub fn new(role: impl Into<String>, content: Option<MessageContent>) -> Self {
        Self {
            role: role.into(),
            content,
            name: None,
            function_call: None,
            tool_calls: None,
            tool_call_id: None,
            extra: IndexMap::new(),
        }
    }

    /// Create a tool response message.
    pub fn tool(tool_call_id: impl Into<String>, content: MessageContent) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::new("tool", Some(content))
        }
    }
}

/// Message content (can be text or multipart).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Simple text content.
    Text(String),
    /// Multipart content.
    Parts(Vec<ContentPart>),
}

/// Content part for multipart messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    /// Text content.
    #[serde(rename = "text")]
    Text {
        /// The text content.
        text: String,
    },
    /// Image URL content.
    #[serde(rename = "image_url")]
    ImageUrl {
        /// Image URL details.
        image_url: ImageUrlContent,
    },
    /// Audio content.
    #[serde(rename = "input_audio")]
    Audio {
        /// Audio data.
        input_audio: AudioContent,
    },
    /// Inline file.
    #[serde(rename = "file")]
    File {
        /// File data.
        file: FileContent,
    },
}

impl ContentPart {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create an image URL part.
    pub fn image_url(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: ImageUrlContent {
                url: url.into(),
                detail: None,
            },
        }
    }
}

/// Image URL content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUrlContent {
    /// The image URL, possibly a `data:` URL.
    pub url: String,
    /// Detail level (auto, low, high).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Audio content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioContent {
    /// Base64-encoded audio data.
    pub data: String,
    /// Audio format (wav, mp3).
    pub format: String,
}

/// Inline file content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileContent {
    /// A `data:` URL holding the file.
    pub file_data: String,
    /// Original file name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// Tool call in a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool call ID.
    pub id: String,
    /// Tool type.
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Function call details.
    pub function: FunctionCall,
}

impl ToolCall {
    /// Create a function tool call.
    pub fn function(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tool_type: "function".to_string(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

/// Function call details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Function name.
    pub name: String,
    /// Arguments as JSON string.
    pub arguments: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_assistant_with_tool_calls_serializes_null_content() {
        let mut msg = ChatMessage::new("assistant", None);
        msg.tool_calls = Some(vec![ToolCall::function("call_1", "f", "{}")]);
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "role": "assistant",
                "content": null,
                "tool_calls": [{"id": "call_1", "type": "function", "function": {"name": "f", "arguments": "{}"}}]
            })
        );
    }

    #[test]
    fn test_extra_fields_flatten() {
        let mut msg = ChatMessage::tool("call_1", MessageContent::Text("42".into()));
        msg.extra.insert("refusal".into(), JsonValue::Null);
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["refusal"], JsonValue::Null);
        assert_eq!(value["tool_call_id"], "call_1");
    }

    #[test]
    fn test_content_part_tags() {
        let part: ContentPart = serde_json::from_value(json!({
            "type": "input_audio",
            "input_audio": {"data": "AAA=", "format": "wav"}
        }))
        .unwrap();
        assert!(matches!(part, ContentPart::Audio { .. }));
        assert_eq!(
            serde_json::to_value(ContentPart::image_url("https://x/y.png")).unwrap(),
            json!({"type": "image_url", "image_url": {"url": "https://x/y.png"}})
        );
    }
}
