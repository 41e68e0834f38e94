use super::BroadcastControl;
use crate::error::YtError;
use crate::youtube_api::broadcasts::{BroadcastStatus, LiveBroadcast};

/// Asks YouTube to move the broadcast to `status`.
///
/// A refusal reported by the API becomes a [`YtError::Message`] naming the status that could
/// not be reached. Transport failures and decode failures are returned unchanged. Nothing is
/// rolled back if the broadcast ends up somewhere unexpected.
pub async fn transition<C: BroadcastControl>(
    control: &C,
    broadcast_id: &str,
    status: BroadcastStatus,
) -> Result<LiveBroadcast, YtError> {
    match control.transition_live_broadcast(broadcast_id, status).await {
        Ok(broadcast) => {
            tracing::info!(
                broadcast_id,
                target = %status,
                lifecycle = %broadcast.status.life_cycle_status,
                "transitioned broadcast"
            );
            Ok(broadcast)
        }
        Err(YtError::Api { message, .. }) => Err(YtError::message(format!(
            "failed transition to the {status} status [{message}]"
        ))),
        Err(e) => Err(e),
    }
}
