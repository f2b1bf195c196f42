//! Content parts of an internal message.

use serde::{Deserialize, Serialize};

use super::media::MediaKind;

/// Tags of every recognized content part, in declaration order.
pub const CONTENT_PART_TAGS: [&str; 5] = ["text", "image", "audio", "video", "document"];

/// One typed unit of a message's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentPart {
    /// Plain text.
    Text {
        /// The text.
        text: String,
    },
    /// Image attachment.
    Image(MediaPart),
    /// Audio attachment.
    Audio(MediaPart),
    /// Video attachment.
    Video(MediaPart),
    /// Document attachment.
    Document(MediaPart),
}

impl ContentPart {
    /// Create a text part.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text { text: s.into() }
    }

    /// Create a media part of the given kind.
    #[must_use]
    pub fn media(kind: MediaKind, media: MediaPart) -> Self {
        match kind {
            MediaKind::Image => Self::Image(media),
            MediaKind::Audio => Self::Audio(media),
            MediaKind::Video => Self::Video(media),
            MediaKind::Document => Self::Document(media),
        }
    }

    /// Create an image part from base64 data.
    #[must_use]
    pub fn image_base64(media_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::Image(MediaPart::base64(media_type, data))
    }

    /// Create an image part from a URL.
    #[must_use]
    pub fn image_url(media_type: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Image(MediaPart::url(media_type, url))
    }

    /// Create an audio part from base64 data.
    #[must_use]
    pub fn audio_base64(media_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::Audio(MediaPart::base64(media_type, data))
    }

    /// Create a document part from base64 data.
    #[must_use]
    pub fn document_base64(media_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::Document(MediaPart::base64(media_type, data))
    }

    /// The `type` tag of this part.
    #[must_use]
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Image(_) => "image",
            Self::Audio(_) => "audio",
            Self::Video(_) => "video",
            Self::Document(_) => "document",
        }
    }

    /// Get as text if this is a text part.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }

    /// Get the media kind and payload if this is a media part.
    #[must_use]
    pub fn as_media(&self) -> Option<(MediaKind, &MediaPart)> {
        match self {
            Self::Text { .. } => None,
            Self::Image(m) => Some((MediaKind::Image, m)),
            Self::Audio(m) => Some((MediaKind::Audio, m)),
            Self::Video(m) => Some((MediaKind::Video, m)),
            Self::Document(m) => Some((MediaKind::Document, m)),
        }
    }

    /// Check if this is a text part.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text { .. })
    }
}

/// Payload of a multimedia part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaPart {
    /// MIME type (e.g. `image/png`).
    #[serde(rename = "mediaType")]
    pub media_type: String,
    /// Where the bytes live.
    pub source: MediaSource,
    /// File name, when the vendor sent one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl MediaPart {
    /// Inline base64 payload.
    #[must_use]
    pub fn base64(media_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            source: MediaSource::Base64 { data: data.into() },
            filename: None,
        }
    }

    /// Remote payload.
    #[must_use]
    pub fn url(media_type: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            source: MediaSource::Url { url: url.into() },
            filename: None,
        }
    }

    /// Set the file name.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// Location of media bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MediaSource {
    /// Inline base64 data.
    Base64 {
        /// The base64 payload.
        data: String,
    },
    /// Remote URL.
    Url {
        /// The URL.
        url: String,
    },
}
