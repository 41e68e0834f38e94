//! YouTube Data API v3 live streaming client.
//!
//! # Core Concepts: Broadcasts vs Streams
//!
//! ## [`broadcasts::LiveBroadcast`] - Viewer-Facing Events
//! - **What viewers see**: Title, description, scheduled time
//! - **Event lifecycle**: Created → Ready → Testing → Live → Complete
//! - **Relationship**: Each broadcast = exactly one YouTube video
//!
//! ## [`streams::LiveStream`] - Technical Infrastructure
//! - **Technical config**: Ingestion protocol, resolution, frame rate
//! - **Health monitoring**: Stream status and ingestion health
//! - **Relationship**: One stream can power multiple broadcasts over time
//!
//! ## Typical Workflow
//! 1. Create a [`streams::LiveStream`] (done once, reusable)
//! 2. Create a [`broadcasts::LiveBroadcast`] for each live event
//! 3. Bind the broadcast to the stream
//! 4. Start the encoder and hand both to [`crate::launcher::LiveLauncher`], which moves the
//!    broadcast to `live` once the stream is active
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use youtube_live::token::StaticToken;
//! use youtube_live::youtube_api::{BroadcastFilter, ClientConfig, YouTubeClient};
//! use tokio_stream::StreamExt;
//!
//! # async fn example() -> Result<(), youtube_live::YtError> {
//! let client = YouTubeClient::new(
//!     StaticToken::new("ya29..."),
//!     ClientConfig::default(),
//!     reqwest::Client::new(),
//! );
//!
//! let broadcasts = client.live_broadcasts(BroadcastFilter::Upcoming);
//! let mut broadcasts = std::pin::pin!(broadcasts);
//! while let Some(broadcast) = broadcasts.next().await {
//!     let broadcast = broadcast?;
//!     println!("{} ({})", broadcast.snippet.title, broadcast.status.life_cycle_status);
//! }
//! # Ok(())
//! # }
//! ```

pub mod broadcasts;
pub mod client;
pub mod normalize;
pub mod status;
pub mod streams;
pub mod types;

#[cfg(test)]
pub(crate) mod test_server;

pub use client::{ClientConfig, YouTubeClient};
pub use status::StatusSnapshot;
pub use types::{ListResponse, PageInfo};

pub use broadcasts::{
    BroadcastFilter, BroadcastLifeCycleStatus, BroadcastPrivacyStatus, BroadcastStatus,
    LiveBroadcast, LiveBroadcastInsert, LiveBroadcastSnippet, LiveBroadcastStatus,
    LiveBroadcastUpdate,
};

pub use streams::{
    HealthStatus, IngestionType, LiveStream, LiveStreamInsert, LiveStreamSnippet,
    LiveStreamStatus, LiveStreamUpdate, StreamStatus,
};
