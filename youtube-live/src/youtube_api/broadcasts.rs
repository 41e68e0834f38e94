//! YouTube Live Broadcasts API types.
//!
//! ## [`LiveBroadcast`] - Viewer-Facing Events
//! - **What viewers see**: Title, description, scheduled time
//! - **Public metadata**: Privacy settings, auto-start/auto-stop behavior
//! - **Event lifecycle**: Created → Ready → Testing → Live → Complete
//! - **Relationship**: Bound to at most one [`LiveStream`](super::streams::LiveStream)

use crate::error::YtError;
use crate::timestamp;
use jiff::Timestamp;
use jiff::tz::TimeZone;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A `liveBroadcast` resource represents a viewer-facing live streaming event on YouTube.
///
/// Broadcasts must be bound to a live stream to actually transmit video, but the broadcast
/// defines the public-facing aspects of the live event.
///
/// See: <https://developers.google.com/youtube/v3/live/docs/liveBroadcasts#resource>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveBroadcast {
    /// The ID that YouTube assigns to uniquely identify the broadcast.
    pub id: String,
    /// Contains basic details about the broadcast.
    pub snippet: LiveBroadcastSnippet,
    /// Contains information about the broadcast's status.
    pub status: LiveBroadcastStatus,
    /// Contains information about the broadcast's video content and its bound stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_details: Option<LiveBroadcastContentDetails>,
}

/// Basic details about the broadcast.
///
/// See: <https://developers.google.com/youtube/v3/live/docs/liveBroadcasts#snippet>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveBroadcastSnippet {
    /// The broadcast's title.
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// The ID of the channel that is publishing the broadcast.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    /// When the broadcast was added to YouTube's live broadcast schedule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<Timestamp>,
    /// When the broadcast is scheduled to start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_start_time: Option<Timestamp>,
    /// When the broadcast is scheduled to end. Unset means "indefinitely".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_end_time: Option<Timestamp>,
    /// Unset until the broadcast has actually started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_start_time: Option<Timestamp>,
    /// Unset until the broadcast has actually ended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_end_time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_chat_id: Option<String>,
}

/// Information about the live broadcast's status.
///
/// See: <https://developers.google.com/youtube/v3/live/docs/liveBroadcasts#status>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveBroadcastStatus {
    /// The broadcast's lifecycle status.
    pub life_cycle_status: BroadcastLifeCycleStatus,
    /// The broadcast's privacy status.
    pub privacy_status: BroadcastPrivacyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recording_status: Option<String>,
    /// Whether the broadcast is made for kids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub made_for_kids: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_declared_made_for_kids: Option<bool>,
}

/// Video content settings and the stream binding.
///
/// See: <https://developers.google.com/youtube/v3/live/docs/liveBroadcasts#contentDetails>
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveBroadcastContentDetails {
    /// The ID of the stream bound to this broadcast, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound_stream_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound_stream_last_update_time: Option<Timestamp>,
    /// Whether the broadcast starts as soon as its stream goes active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_auto_start: Option<bool>,
    /// Whether the broadcast completes about a minute after its stream stops.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_auto_stop: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_dvr: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_from_start: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitor_stream: Option<MonitorStream>,
}

/// The monitor stream lets the broadcaster preview the broadcast during `testing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorStream {
    pub enable_monitor_stream: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadcast_stream_delay_ms: Option<u32>,
}

/// The broadcast's current lifecycle status.
///
/// See: <https://developers.google.com/youtube/v3/live/docs/liveBroadcasts#status.lifeCycleStatus>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BroadcastLifeCycleStatus {
    /// The broadcast was created but has incomplete settings.
    Created,
    /// The broadcast settings are complete and it can transition to `live` or `testing`.
    Ready,
    /// The broadcast is transitioning to `testing`.
    TestStarting,
    /// The broadcast is only visible to the partner.
    Testing,
    /// The broadcast is transitioning to `live`.
    LiveStarting,
    /// The broadcast is active.
    Live,
    /// The broadcast has finished.
    Complete,
    /// The broadcast was removed by an admin action.
    Revoked,
}

impl BroadcastLifeCycleStatus {
    /// Whether viewers are (or are about to be) watching.
    pub fn is_live(self) -> bool {
        matches!(self, Self::Live | Self::LiveStarting)
    }

    /// The transition that moves a broadcast in this state toward `live`.
    ///
    /// `None` for broadcasts that already are live or can never be live again.
    pub fn transition_toward_live(self) -> Option<BroadcastStatus> {
        match self {
            Self::Created | Self::Ready | Self::TestStarting | Self::Testing => {
                Some(BroadcastStatus::Live)
            }
            Self::LiveStarting | Self::Live | Self::Complete | Self::Revoked => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Ready => "ready",
            Self::TestStarting => "testStarting",
            Self::Testing => "testing",
            Self::LiveStarting => "liveStarting",
            Self::Live => "live",
            Self::Complete => "complete",
            Self::Revoked => "revoked",
        }
    }
}

impl fmt::Display for BroadcastLifeCycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The broadcast's privacy status.
///
/// See: <https://developers.google.com/youtube/v3/live/docs/liveBroadcasts#status.privacyStatus>
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BroadcastPrivacyStatus {
    /// The broadcast is public and can be viewed by anyone.
    Public,
    /// The broadcast is unlisted and can only be viewed by people with the link.
    Unlisted,
    /// The broadcast can only be viewed by the owner and authorized viewers.
    #[default]
    Private,
}

impl fmt::Display for BroadcastPrivacyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Unlisted => write!(f, "unlisted"),
            Self::Private => write!(f, "private"),
        }
    }
}

impl FromStr for BroadcastPrivacyStatus {
    type Err = YtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "unlisted" => Ok(Self::Unlisted),
            "private" => Ok(Self::Private),
            _ => Err(YtError::message(format!("unknown privacy status: {s}"))),
        }
    }
}

/// Target values for `liveBroadcasts.transition`.
///
/// See: <https://developers.google.com/youtube/v3/live/docs/liveBroadcasts/transition>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BroadcastStatus {
    /// Start broadcast testing mode.
    Testing,
    /// Make broadcast visible to audience.
    Live,
    /// Mark broadcast as complete/over.
    Complete,
}

impl BroadcastStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Testing => "testing",
            Self::Live => "live",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for BroadcastStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BroadcastStatus {
    type Err = YtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "testing" => Ok(Self::Testing),
            "live" => Ok(Self::Live),
            "complete" => Ok(Self::Complete),
            _ => Err(YtError::message(format!("unknown broadcast status: {s}"))),
        }
    }
}

/// The `broadcastStatus` filter for `liveBroadcasts.list`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BroadcastFilter {
    #[default]
    All,
    /// Currently active broadcasts.
    Active,
    /// Broadcasts that have already ended.
    Completed,
    /// Broadcasts that have not started yet.
    Upcoming,
}

impl BroadcastFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Upcoming => "upcoming",
        }
    }
}

impl FromStr for BroadcastFilter {
    type Err = YtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "upcoming" => Ok(Self::Upcoming),
            _ => Err(YtError::message(format!("unknown broadcast filter: {s}"))),
        }
    }
}

/// Request body for `liveBroadcasts.insert`.
///
/// See: <https://developers.google.com/youtube/v3/live/docs/liveBroadcasts/insert>
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveBroadcastInsert {
    snippet: InsertSnippet,
    status: PrivacyOnly,
    content_details: AutoStopOnly,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertSnippet {
    title: String,
    description: String,
    scheduled_start_time: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrivacyOnly {
    privacy_status: BroadcastPrivacyStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct AutoStopOnly {
    #[serde(skip_serializing_if = "Option::is_none")]
    enable_auto_stop: Option<bool>,
}

impl LiveBroadcastInsert {
    /// A private broadcast scheduled for `start`, expressed in local time.
    pub fn new(title: impl Into<String>, description: impl Into<String>, start: Timestamp) -> Self {
        Self::new_in(title, description, start, TimeZone::system())
    }

    /// Like [`Self::new`], but expresses `start` in the given time zone.
    pub fn new_in(
        title: impl Into<String>,
        description: impl Into<String>,
        start: Timestamp,
        tz: TimeZone,
    ) -> Self {
        Self {
            snippet: InsertSnippet {
                title: title.into(),
                description: description.into(),
                scheduled_start_time: timestamp::format_in(start, tz),
            },
            status: PrivacyOnly {
                privacy_status: BroadcastPrivacyStatus::default(),
            },
            content_details: AutoStopOnly {
                enable_auto_stop: None,
            },
        }
    }

    pub fn privacy(mut self, privacy: BroadcastPrivacyStatus) -> Self {
        self.status.privacy_status = privacy;
        self
    }

    pub fn enable_auto_stop(mut self, enable: bool) -> Self {
        self.content_details.enable_auto_stop = Some(enable);
        self
    }

    pub fn title(&self) -> &str {
        &self.snippet.title
    }
}

/// Request body for `liveBroadcasts.update`.
///
/// The API replaces every mutable field of the parts it is given, so the body is always
/// built from a complete [`LiveBroadcast`] and then adjusted.
///
/// See: <https://developers.google.com/youtube/v3/live/docs/liveBroadcasts/update>
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveBroadcastUpdate {
    id: String,
    snippet: UpdateSnippet,
    status: PrivacyOnly,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_details: Option<LiveBroadcastContentDetails>,
    #[serde(skip)]
    tz: TimeZone,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateSnippet {
    title: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scheduled_start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scheduled_end_time: Option<String>,
}

impl LiveBroadcastUpdate {
    /// Builds an update that rewrites `broadcast` as-is, with times expressed in `tz`.
    pub fn from_broadcast_in(broadcast: &LiveBroadcast, tz: TimeZone) -> Self {
        let format = |ts: Option<Timestamp>| ts.map(|ts| timestamp::format_in(ts, tz.clone()));
        Self {
            id: broadcast.id.clone(),
            snippet: UpdateSnippet {
                title: broadcast.snippet.title.clone(),
                description: broadcast.snippet.description.clone(),
                scheduled_start_time: format(broadcast.snippet.scheduled_start_time),
                scheduled_end_time: format(broadcast.snippet.scheduled_end_time),
            },
            status: PrivacyOnly {
                privacy_status: broadcast.status.privacy_status,
            },
            content_details: broadcast.content_details.clone(),
            tz,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.snippet.title = title.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.snippet.description = description.into();
        self
    }

    pub fn scheduled_start_time(mut self, start: Timestamp) -> Self {
        self.snippet.scheduled_start_time = Some(timestamp::format_in(start, self.tz.clone()));
        self
    }

    pub fn privacy(mut self, privacy: BroadcastPrivacyStatus) -> Self {
        self.status.privacy_status = privacy;
        self
    }
}

impl From<&LiveBroadcast> for LiveBroadcastUpdate {
    fn from(broadcast: &LiveBroadcast) -> Self {
        Self::from_broadcast_in(broadcast, TimeZone::system())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::tz::Offset;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn plus_two() -> TimeZone {
        TimeZone::fixed(Offset::from_seconds(2 * 3600).unwrap())
    }

    fn sample_broadcast() -> serde_json::Value {
        json!({
            "kind": "youtube#liveBroadcast",
            "etag": "abc",
            "id": "bc-1",
            "snippet": {
                "publishedAt": "2024-03-01T10:00:00Z",
                "channelId": "UC123",
                "title": "Friday stream",
                "description": "We build things",
                "scheduledStartTime": "2024-03-09T18:00:00Z",
                "liveChatId": "chat-1"
            },
            "status": {
                "lifeCycleStatus": "ready",
                "privacyStatus": "unlisted",
                "recordingStatus": "notRecording",
                "madeForKids": false,
                "selfDeclaredMadeForKids": false
            },
            "contentDetails": {
                "boundStreamId": "st-1",
                "enableAutoStart": false,
                "enableAutoStop": true,
                "monitorStream": {
                    "enableMonitorStream": true,
                    "broadcastStreamDelayMs": 0
                }
            }
        })
    }

    #[test]
    fn decodes_full_broadcast() {
        let broadcast: LiveBroadcast = serde_json::from_value(sample_broadcast()).unwrap();
        assert_eq!(broadcast.id, "bc-1");
        assert_eq!(
            broadcast.status.life_cycle_status,
            BroadcastLifeCycleStatus::Ready
        );
        assert_eq!(
            broadcast.content_details.unwrap().bound_stream_id.as_deref(),
            Some("st-1")
        );
    }

    #[test]
    fn lifecycle_vocabulary() {
        for (wire, status) in [
            ("\"liveStarting\"", BroadcastLifeCycleStatus::LiveStarting),
            ("\"testStarting\"", BroadcastLifeCycleStatus::TestStarting),
            ("\"revoked\"", BroadcastLifeCycleStatus::Revoked),
        ] {
            let decoded: BroadcastLifeCycleStatus = serde_json::from_str(wire).unwrap();
            assert_eq!(decoded, status);
            assert_eq!(format!("\"{status}\""), wire);
        }

        assert!(BroadcastLifeCycleStatus::Live.is_live());
        assert!(BroadcastLifeCycleStatus::LiveStarting.is_live());
        assert!(!BroadcastLifeCycleStatus::Testing.is_live());
        assert_eq!(
            BroadcastLifeCycleStatus::Created.transition_toward_live(),
            Some(BroadcastStatus::Live)
        );
        assert_eq!(
            BroadcastLifeCycleStatus::Complete.transition_toward_live(),
            None
        );
    }

    #[test]
    fn insert_body() {
        let start: Timestamp = "2024-03-09T18:00:00Z".parse().unwrap();
        let body = LiveBroadcastInsert::new_in("Friday stream", "We build things", start, plus_two())
            .privacy(BroadcastPrivacyStatus::Public)
            .enable_auto_stop(false);

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "snippet": {
                    "title": "Friday stream",
                    "description": "We build things",
                    "scheduledStartTime": "2024-03-09T20:00:00+02:00"
                },
                "status": { "privacyStatus": "public" },
                "contentDetails": { "enableAutoStop": false }
            })
        );
    }

    #[test]
    fn update_body_carries_whole_resource() {
        let broadcast: LiveBroadcast = serde_json::from_value(sample_broadcast()).unwrap();
        let body = LiveBroadcastUpdate::from_broadcast_in(&broadcast, plus_two())
            .title("Saturday stream");

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "id": "bc-1",
                "snippet": {
                    "title": "Saturday stream",
                    "description": "We build things",
                    "scheduledStartTime": "2024-03-09T20:00:00+02:00"
                },
                "status": { "privacyStatus": "unlisted" },
                "contentDetails": {
                    "boundStreamId": "st-1",
                    "enableAutoStart": false,
                    "enableAutoStop": true,
                    "monitorStream": {
                        "enableMonitorStream": true,
                        "broadcastStreamDelayMs": 0
                    }
                }
            })
        );
    }

    #[test]
    fn parses_cli_vocabulary() {
        assert_eq!("live".parse::<BroadcastStatus>().unwrap(), BroadcastStatus::Live);
        assert_eq!(
            "upcoming".parse::<BroadcastFilter>().unwrap(),
            BroadcastFilter::Upcoming
        );
        assert!("sideways".parse::<BroadcastPrivacyStatus>().is_err());
    }
}
