//! Gemini `generateContent` message types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Content in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    /// Role: "user", "model" or "function".
    pub role: String,
    /// Content parts.
    pub parts: Vec<Part>,
    /// Preserved fields from a previous decode.
    #[serde(flatten)]
    pub extra: IndexMap<String, JsonValue>,
}

impl Content {
    /// Create content with the given role and parts.
    pub fn new(role: impl Into<String>, parts: Vec<Part>) -> Self {
        Self {
            role: role.into(),
            parts,
            extra: IndexMap::new(),
        }
    }
}

/// Content part.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    /// Text content.
    Text {
        /// The text.
        text: String,
    },
    /// Inline binary data.
    InlineData {
        /// The blob data.
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
    /// Reference to uploaded file.
    FileData {
        /// The file reference.
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
    /// Function call from model.
    FunctionCall {
        /// The function call.
        #[serde(rename = "functionCall")]
        function_call: FunctionCall,
    },
    /// Function response to model.
    FunctionResponse {
        /// The function response.
        #[serde(rename = "functionResponse")]
        function_response: FunctionResponse,
    },
}

impl Part {
    /// Create text part.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text { text: s.into() }
    }

    /// Create inline data part.
    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::InlineData {
            inline_data: Blob {
                mime_type: mime_type.into(),
                data: data.into(),
            },
        }
    }

    /// Create file data part.
    pub fn file_data(mime_type: impl Into<String>, file_uri: impl Into<String>) -> Self {
        Self::FileData {
            file_data: FileData {
                mime_type: mime_type.into(),
                file_uri: file_uri.into(),
            },
        }
    }
}

/// Inline binary data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    /// MIME type.
    pub mime_type: String,
    /// Base64-encoded data.
    pub data: String,
}

/// File reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    /// MIME type.
    pub mime_type: String,
    /// File URI (gs:// or uploaded file URI).
    pub file_uri: String,
}

/// Function call from the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Call ID, when the API assigned one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Function name.
    pub name: String,
    /// Function arguments.
    #[serde(default)]
    pub args: JsonValue,
}

/// Function response to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionResponse {
    /// ID of the call being answered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Function name.
    pub name: String,
    /// Response data.
    pub response: JsonValue,
}
