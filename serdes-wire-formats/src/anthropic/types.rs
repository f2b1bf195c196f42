//! Anthropic Messages API message types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A message in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role: "user" or "assistant".
    pub role: String,
    /// Message content.
    pub content: MessageContent,
    /// Preserved fields from a previous decode.
    #[serde(flatten)]
    pub extra: IndexMap<String, JsonValue>,
}

impl Message {
    /// Create a message.
    pub fn new(role: impl Into<String>, content: MessageContent) -> Self {
        Self {
            role: role.into(),
            content,
            extra: IndexMap::new(),
        }
    }

    /// Create a user message holding content blocks.
    pub fn user_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self::new("user", MessageContent::Blocks(blocks))
    }
}

/// Message content (string or blocks).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Simple text.
    Text(String),
    /// Content blocks.
    Blocks(Vec<ContentBlock>),
}

/// Content block types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Text content.
    Text {
        /// The text.
        text: String,
    },

    /// Image content.
    Image {
        /// Image source.
        source: MediaSource,
    },

    /// Document content (PDF, etc.).
    Document {
        /// Document source.
        source: MediaSource,
        /// Document title.
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },

    /// Tool use (in assistant messages).
    ToolUse {
        /// Tool call ID.
        id: String,
        /// Tool name.
        name: String,
        /// Tool input.
        input: JsonValue,
    },

    /// Tool result (in user messages).
    ToolResult {
        /// Tool use ID being responded to.
        tool_use_id: String,
        /// Result content.
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<ToolResultContent>,
        /// Whether this is an error.
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

impl ContentBlock {
    /// Create a text block.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text { text: s.into() }
    }

    /// Create a tool use block.
    pub fn tool_use(id: impl Into<String>, name: impl Into<String>, input: JsonValue) -> Self {
        Self::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    /// Create a tool result block.
    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>, is_error: Option<bool>) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: Some(ToolResultContent::Text(content.into())),
            is_error,
        }
    }
}

/// Image or document source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaSource {
    /// Inline data.
    Base64 {
        /// Media type (e.g., "image/jpeg").
        media_type: String,
        /// Base64-encoded data.
        data: String,
    },
    /// Remote URL.
    Url {
        /// The URL.
        url: String,
    },
}

/// Tool result content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolResultContent {
    /// Simple text result.
    Text(String),
    /// Multiple content blocks.
    Blocks(Vec<ToolResultBlock>),
}

impl ToolResultContent {
    /// Concatenated text of the result.
    pub fn text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Blocks(blocks) => blocks
                .iter()
                .filter_map(|block| match block {
                    ToolResultBlock::Text { text } => Some(text.as_str()),
                    ToolResultBlock::Image { .. } => None,
                })
                .collect::<Vec<_>>()
                .join(""),
        }
    }
}

/// Tool result block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolResultBlock {
    /// Text result.
    Text {
        /// The text.
        text: String,
    },
    /// Image result.
    Image {
        /// Image source.
        source: MediaSource,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_tool_result_serialization() {
        let block = ContentBlock::tool_result("toolu_1", "failed", Some(true));
        assert_eq!(
            serde_json::to_value(&block).unwrap(),
            json!({"type": "tool_result", "tool_use_id": "toolu_1", "content": "failed", "is_error": true})
        );
    }

    #[test]
    fn test_media_source_tags() {
        let block: ContentBlock = serde_json::from_value(json!({
            "type": "image",
            "source": {"type": "base64", "media_type": "image/png", "data": "AAAA"}
        }))
        .unwrap();
        match block {
            ContentBlock::Image { source: MediaSource::Base64 { media_type, .. } } => {
                assert_eq!(media_type, "image/png");
            }
            other => panic!("unexpected block: {:?}", other),
        }
    }

    #[test]
    fn test_tool_result_blocks_text() {
        let content: ToolResultContent =
            serde_json::from_value(json!([{"type": "text", "text": "a"}, {"type": "text", "text": "b"}])).unwrap();
        assert_eq!(content.text(), "ab");
    }
}
