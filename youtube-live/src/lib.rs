//! Create, bind, and drive YouTube live broadcasts.
//!
//! [`youtube_api::YouTubeClient`] wraps the Live Streaming endpoints of the YouTube Data API,
//! and [`launcher::LiveLauncher`] polls a bound broadcast until it is live, transitioning it
//! along the way. Both report failures as a [`YtError`].

pub mod error;
pub mod launcher;
pub mod oauth;
pub mod timestamp;
pub mod token;
pub mod youtube_api;

pub use error::YtError;
