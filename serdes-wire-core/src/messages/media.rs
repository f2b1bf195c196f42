//! Media kinds and MIME type inference.
//!
//! Vendors disagree on how much they say about an attachment. Gemini only
//! gives a `mimeType`, OpenAI image parts only give a URL. These helpers map
//! whatever is available onto the four canonical media kinds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The multimedia content-part kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image.
    Image,
    /// Audio clip.
    Audio,
    /// Video clip.
    Video,
    /// Document (PDF, text, anything else).
    Document,
}

impl MediaKind {
    /// The `type` tag used by the internal content part.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Document => "document",
        }
    }

    /// Classify a MIME type by its top-level type.
    ///
    /// Unparseable or non-media types are treated as documents.
    #[must_use]
    pub fn from_mime_type(media_type: &str) -> Self {
        match media_type.parse::<mime::Mime>() {
            Ok(m) if m.type_() == mime::IMAGE => Self::Image,
            Ok(m) if m.type_() == mime::AUDIO => Self::Audio,
            Ok(m) if m.type_() == mime::VIDEO => Self::Video,
            _ => Self::Document,
        }
    }

    /// MIME type assumed when nothing better is known.
    #[must_use]
    pub fn default_media_type(&self) -> &'static str {
        match self {
            Self::Image => "image/png",
            Self::Audio => "audio/mpeg",
            Self::Video => "video/mp4",
            Self::Document => "application/pdf",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guess a MIME type from a file extension.
#[must_use]
pub fn media_type_from_extension(ext: &str) -> Option<&'static str> {
    let media_type = match ext.to_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "html" => "text/html",
        "md" => "text/markdown",
        _ => return None,
    };
    Some(media_type)
}

/// Guess a MIME type from the last path segment of a URL.
///
/// Query strings and fragments are ignored; falls back to `kind`'s default.
#[must_use]
pub fn media_type_from_url(url: &str, kind: MediaKind) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/')
        .next()
        .and_then(|segment| segment.rsplit_once('.'))
        .and_then(|(_, ext)| media_type_from_extension(ext))
        .unwrap_or_else(|| kind.default_media_type())
        .to_string()
}

/// Split a `data:<mime>;base64,<payload>` URL into media type and payload.
#[must_use]
pub fn parse_data_url(url: &str) -> Option<(String, String)> {
    let rest = url.strip_prefix("data:")?;
    let (header, data) = rest.split_once(',')?;
    let media_type = header.strip_suffix(";base64")?;
    Some((media_type.to_string(), data.to_string()))
}

/// Build a `data:` URL from a media type and base64 payload.
#[must_use]
pub fn to_data_url(media_type: &str, data: &str) -> String {
    format!("data:{};base64,{}", media_type, data)
}
