//! YouTube Live Streams API types.
//!
//! ## [`LiveStream`] - Technical Infrastructure
//! - **Technical config**: Ingestion protocol, resolution, frame rate
//! - **Ingestion details**: Stream URLs and stream key
//! - **Health monitoring**: Activity status and ingestion health
//! - **Relationship**: One stream can be bound to many broadcasts over time

use crate::error::YtError;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A `liveStream` resource represents the video pipeline that carries content to YouTube.
///
/// See: <https://developers.google.com/youtube/v3/live/docs/liveStreams#resource>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStream {
    /// The ID that YouTube assigns to uniquely identify the stream.
    pub id: String,
    pub snippet: LiveStreamSnippet,
    /// Ingestion settings. Present when the `cdn` part was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdn: Option<CdnSettings>,
    /// Present when the `status` part was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LiveStreamStatus>,
}

/// See: <https://developers.google.com/youtube/v3/live/docs/liveStreams#snippet>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStreamSnippet {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_default_stream: Option<bool>,
}

/// How video reaches YouTube for this stream.
///
/// See: <https://developers.google.com/youtube/v3/live/docs/liveStreams#cdn>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdnSettings {
    /// Legacy resolution preset such as `720p`; superseded by `resolution` and `frameRate`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub ingestion_type: IngestionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingestion_info: Option<IngestionInfo>,
}

/// Where the encoder should send video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionInfo {
    /// The stream key.
    #[serde(default)]
    pub stream_name: String,
    #[serde(default)]
    pub ingestion_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_ingestion_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtmps_ingestion_address: Option<String>,
}

/// The ingestion protocol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestionType {
    #[default]
    Rtmp,
    Dash,
    Webrtc,
    Hls,
}

impl fmt::Display for IngestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rtmp => write!(f, "rtmp"),
            Self::Dash => write!(f, "dash"),
            Self::Webrtc => write!(f, "webrtc"),
            Self::Hls => write!(f, "hls"),
        }
    }
}

impl FromStr for IngestionType {
    type Err = YtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rtmp" => Ok(Self::Rtmp),
            "dash" => Ok(Self::Dash),
            "webrtc" => Ok(Self::Webrtc),
            "hls" => Ok(Self::Hls),
            _ => Err(YtError::message(format!("unknown ingestion type: {s}"))),
        }
    }
}

/// Contains information about the live stream's status.
///
/// See: <https://developers.google.com/youtube/v3/live/docs/liveStreams#status>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStreamStatus {
    pub stream_status: StreamStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_status: Option<LiveStreamHealth>,
}

/// The status of a live stream.
///
/// See: <https://developers.google.com/youtube/v3/live/docs/liveStreams#status.streamStatus>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StreamStatus {
    /// The stream is receiving data.
    Active,
    /// The stream exists but lacks valid CDN settings.
    Created,
    /// An error condition exists on the stream.
    Error,
    /// The stream is not receiving data.
    Inactive,
    /// The stream has valid CDN settings.
    Ready,
}

impl fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Created => write!(f, "created"),
            Self::Error => write!(f, "error"),
            Self::Inactive => write!(f, "inactive"),
            Self::Ready => write!(f, "ready"),
        }
    }
}

/// Ingestion health as reported alongside the stream status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStreamHealth {
    pub status: HealthStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_time_seconds: Option<String>,
}

/// See: <https://developers.google.com/youtube/v3/live/docs/liveStreams#status.healthStatus.status>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HealthStatus {
    /// No configuration issues more severe than "low".
    Good,
    /// No configuration issues more severe than "medium".
    Ok,
    /// The stream has issues of "high" severity.
    Bad,
    /// YouTube has no status information for the stream, e.g. because it is inactive.
    NoData,
    Revoked,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Good => write!(f, "good"),
            Self::Ok => write!(f, "ok"),
            Self::Bad => write!(f, "bad"),
            Self::NoData => write!(f, "noData"),
            Self::Revoked => write!(f, "revoked"),
        }
    }
}

impl LiveStream {
    pub fn stream_status(&self) -> Option<StreamStatus> {
        self.status.as_ref().map(|s| s.stream_status)
    }

    /// Health of the ingestion; streams YouTube has nothing to say about report `noData`.
    pub fn health_status(&self) -> HealthStatus {
        self.status
            .as_ref()
            .and_then(|s| s.health_status.as_ref())
            .map_or(HealthStatus::NoData, |h| h.status)
    }
}

/// Request body for `liveStreams.insert`.
///
/// See: <https://developers.google.com/youtube/v3/live/docs/liveStreams/insert>
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStreamInsert {
    snippet: StreamSnippetBody,
    cdn: CdnBody,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct StreamSnippetBody {
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct CdnBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    ingestion_type: IngestionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frame_rate: Option<String>,
}

impl LiveStreamInsert {
    /// An RTMP stream with variable resolution and frame rate.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            snippet: StreamSnippetBody {
                title: title.into(),
                description: None,
            },
            cdn: CdnBody {
                format: None,
                ingestion_type: IngestionType::Rtmp,
                resolution: Some("variable".to_string()),
                frame_rate: Some("variable".to_string()),
            },
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.snippet.description = Some(description.into());
        self
    }

    pub fn ingestion_type(mut self, ingestion_type: IngestionType) -> Self {
        self.cdn.ingestion_type = ingestion_type;
        self
    }

    /// Use a fixed format preset (e.g. `1080p`) instead of variable resolution and frame rate.
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.cdn.format = Some(format.into());
        self.cdn.resolution = None;
        self.cdn.frame_rate = None;
        self
    }
}

/// Request body for `liveStreams.update`.
///
/// Only the title and ingestion settings can change; anything else needs a new stream.
///
/// See: <https://developers.google.com/youtube/v3/live/docs/liveStreams/update>
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStreamUpdate {
    id: String,
    snippet: StreamSnippetBody,
    cdn: CdnBody,
}

impl LiveStreamUpdate {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        format: impl Into<String>,
        ingestion_type: IngestionType,
    ) -> Self {
        Self {
            id: id.into(),
            snippet: StreamSnippetBody {
                title: title.into(),
                description: None,
            },
            cdn: CdnBody {
                format: Some(format.into()),
                ingestion_type,
                resolution: None,
                frame_rate: None,
            },
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}
