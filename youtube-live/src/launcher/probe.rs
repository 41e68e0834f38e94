use super::BroadcastControl;
use crate::error::YtError;
use crate::youtube_api::broadcasts::LiveBroadcast;
use crate::youtube_api::status::StatusSnapshot;
use crate::youtube_api::streams::LiveStream;

/// What a single status read says about whether the broadcast is on air.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveSignal {
    /// The broadcast is `live` or `liveStarting`.
    Live,
    /// Anything else, along with what YouTube reported.
    NotLive(StatusSnapshot),
}

/// Reads the status of `broadcast` and `stream` once and classifies it.
///
/// Errors from the read are returned unchanged; retrying is up to the caller.
pub async fn probe<C: BroadcastControl>(
    control: &C,
    broadcast: &LiveBroadcast,
    stream: &LiveStream,
) -> Result<LiveSignal, YtError> {
    let snapshot = control.broadcast_status(broadcast, stream).await?;
    tracing::trace!(broadcast_id = %broadcast.id, %snapshot, "probed broadcast status");

    if snapshot.broadcast_status.is_live() {
        Ok(LiveSignal::Live)
    } else {
        Ok(LiveSignal::NotLive(snapshot))
    }
}
