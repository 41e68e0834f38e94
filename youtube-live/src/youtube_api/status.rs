//! Point-in-time view of a broadcast and the stream bound to it.

use crate::youtube_api::broadcasts::{BroadcastLifeCycleStatus, LiveBroadcast};
use crate::youtube_api::streams::{HealthStatus, LiveStream, StreamStatus};
use std::fmt;

/// What YouTube reported for a broadcast/stream pair during one poll.
///
/// Never stored; each poll produces a fresh one and the launcher acts on it immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub broadcast_status: BroadcastLifeCycleStatus,
    pub stream_status: StreamStatus,
    pub health_status: HealthStatus,
}

impl StatusSnapshot {
    /// Combines a freshly fetched broadcast and stream.
    ///
    /// Returns `None` when the stream resource carries no status part.
    pub fn from_resources(broadcast: &LiveBroadcast, stream: &LiveStream) -> Option<Self> {
        Some(Self {
            broadcast_status: broadcast.status.life_cycle_status,
            stream_status: stream.stream_status()?,
            health_status: stream.health_status(),
        })
    }
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "broadcast {}, stream {}, health {}",
            self.broadcast_status, self.stream_status, self.health_status
        )
    }
}
