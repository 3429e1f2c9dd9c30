//! Metadata Service Data Structures

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;
use crate::source::VideoId;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 5624;

/// Address of the metadata service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Endpoint {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Root URL of the service, e.g. `http://localhost:5624/`
    #[must_use]
    pub fn base_url(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("http://[{}]:{}/", self.host, self.port)
        } else {
            format!("http://{}:{}/", self.host, self.port)
        }
    }
}

/// Media kind of a rendition, taken from its mime type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Video,
    Audio,
    /// Either kind; used by single-URL selection
    Any,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Any => "audio/video",
        })
    }
}

/// How renditions are picked from the candidate pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Best video rendition plus best audio rendition
    #[default]
    Partitioned,
    /// Single best rendition of the whole pool, no audio split
    Single,
}

impl SelectionMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Partitioned => "partitioned",
            Self::Single => "single",
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "partitioned" | "split" => Ok(Self::Partitioned),
            "single" => Ok(Self::Single),
            other => Err(format!("unknown selection mode: {other}")),
        }
    }
}

// ============================================================================
// API Response Types
// ============================================================================

/// Accept an explicit `null` where a plain value is expected
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Metadata service response, as received
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(default)]
    pub data: Option<PayloadData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayloadData {
    #[serde(rename = "statusCode", default)]
    pub status_code: Option<i64>,
    #[serde(default)]
    pub player_response: Option<PlayerResponse>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    #[serde(default)]
    pub playability_status: Option<PlayabilityStatus>,
    #[serde(default)]
    pub streaming_data: Option<RawStreamingData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayabilityStatus {
    #[serde(default, deserialize_with = "null_as_default")]
    pub playable_in_embed: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStreamingData {
    #[serde(default)]
    pub formats: Option<Vec<RenditionDescriptor>>,
    #[serde(default)]
    pub adaptive_formats: Option<Vec<RenditionDescriptor>>,
}

/// One entry of a format list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenditionDescriptor {
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bitrate: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
}

impl RenditionDescriptor {
    /// Mime type up to the first `;`, if any
    #[must_use]
    pub fn base_type(&self) -> Option<&str> {
        let base = self.mime_type.as_deref()?.split(';').next()?.trim();
        (!base.is_empty()).then_some(base)
    }

    #[must_use]
    pub fn is_kind(&self, kind: MediaKind) -> bool {
        match (kind, self.base_type()) {
            (MediaKind::Video, Some(base)) => base.starts_with("video/"),
            (MediaKind::Audio, Some(base)) => base.starts_with("audio/"),
            (MediaKind::Any, _) => true,
            (_, None) => false,
        }
    }
}

/// Candidate lists of a validated payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamingData {
    /// Muxed audio+video renditions
    pub formats: Vec<RenditionDescriptor>,
    /// Audio-only and video-only renditions
    pub adaptive_formats: Vec<RenditionDescriptor>,
}

impl StreamingData {
    /// Union of combined and adaptive renditions, combined first
    pub fn candidates(&self) -> impl Iterator<Item = &RenditionDescriptor> {
        self.formats.iter().chain(&self.adaptive_formats)
    }
}

// ============================================================================
// Resolution Output
// ============================================================================

/// The playable stream picked for a video
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedStream {
    pub video_url: String,
    pub mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

/// Successful resolution with any advisories raised along the way
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub video_id: VideoId,
    pub stream: ResolvedStream,
    pub warnings: Vec<ValidationError>,
}

impl Resolution {
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
