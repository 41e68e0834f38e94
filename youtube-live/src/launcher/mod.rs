//! Drives a bound broadcast to `live` by polling its status.
//!
//! [`LiveLauncher::launch`] takes a broadcast and the stream bound to it, checks their status
//! right away, and then keeps checking every [`LauncherConfig::poll_interval`]. Each check
//! either finds the broadcast already live, or reports what it saw and asks YouTube to
//! transition it to `live`. Observers follow along through [`LiveLauncher::subscribe`].
//!
//! Checks run one at a time on a single task: timer firings that come due while a check is
//! still waiting on YouTube collapse into a single check once it finishes. Failures are
//! reported as [`LaunchEvent::Error`] and the next check happens on schedule; nothing here
//! gives up on its own.

pub mod probe;
pub mod transition;

use crate::error::YtError;
use crate::token::TokenProvider;
use crate::youtube_api::broadcasts::{BroadcastStatus, LiveBroadcast};
use crate::youtube_api::client::YouTubeClient;
use crate::youtube_api::status::StatusSnapshot;
use crate::youtube_api::streams::LiveStream;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub use probe::{LiveSignal, probe};
pub use transition::transition;

/// Events buffered per subscriber before the oldest are dropped.
const EVENT_CAPACITY: usize = 64;

/// `tokio::time::interval` panics on a zero period.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// The two remote operations the launcher needs.
///
/// [`YouTubeClient`] is the real implementation.
pub trait BroadcastControl: Send + Sync + 'static {
    /// Reads the broadcast's lifecycle status and the stream's status and health.
    fn broadcast_status(
        &self,
        broadcast: &LiveBroadcast,
        stream: &LiveStream,
    ) -> impl Future<Output = Result<StatusSnapshot, YtError>> + Send;

    /// Moves the broadcast to `status`.
    fn transition_live_broadcast(
        &self,
        broadcast_id: &str,
        status: BroadcastStatus,
    ) -> impl Future<Output = Result<LiveBroadcast, YtError>> + Send;
}

impl<P: TokenProvider + 'static> BroadcastControl for YouTubeClient<P> {
    fn broadcast_status(
        &self,
        broadcast: &LiveBroadcast,
        stream: &LiveStream,
    ) -> impl Future<Output = Result<StatusSnapshot, YtError>> + Send {
        YouTubeClient::broadcast_status(self, broadcast, stream)
    }

    fn transition_live_broadcast(
        &self,
        broadcast_id: &str,
        status: BroadcastStatus,
    ) -> impl Future<Output = Result<LiveBroadcast, YtError>> + Send {
        YouTubeClient::transition_live_broadcast(self, broadcast_id, status)
    }
}

#[derive(Debug, Clone)]
pub struct LauncherConfig {
    /// Time between status checks after the first one.
    pub poll_interval: Duration,
    /// End the polling task as soon as the broadcast is live, rather than idling until
    /// [`LiveLauncher::stop`].
    pub stop_when_live: bool,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            stop_when_live: false,
        }
    }
}

/// What a [`LiveLauncher`] tells its subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum LaunchEvent {
    /// The broadcast went live. Sent at most once per [`LiveLauncher::launch`].
    EnteredLive,
    /// A check found the broadcast not yet live. Always sent before any transition attempt.
    StatusChanged(StatusSnapshot),
    /// A check or transition failed; the message is ready for display.
    Error(String),
}

/// Polls one broadcast/stream pair until the broadcast is live.
///
/// Create one per pair you want to watch; they share nothing.
#[derive(Debug)]
pub struct LiveLauncher<C> {
    control: Arc<C>,
    config: LauncherConfig,
    events: broadcast::Sender<LaunchEvent>,
    is_live: Arc<watch::Sender<bool>>,
    target: Option<Arc<Target<C>>>,
    run: Option<Run>,
}

#[derive(Debug)]
struct Run {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl<C: BroadcastControl> LiveLauncher<C> {
    pub fn new(control: C, config: LauncherConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (is_live, _) = watch::channel(false);
        Self {
            control: Arc::new(control),
            config,
            events,
            is_live: Arc::new(is_live),
            target: None,
            run: None,
        }
    }

    /// Receives every event emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<LaunchEvent> {
        self.events.subscribe()
    }

    /// Whether the current (or last) launch has reached `live`.
    pub fn is_live(&self) -> bool {
        *self.is_live.borrow()
    }

    /// Follows [`Self::is_live`] as it changes.
    pub fn watch_live(&self) -> watch::Receiver<bool> {
        self.is_live.subscribe()
    }

    /// Whether the polling task is still scheduled.
    pub fn is_running(&self) -> bool {
        self.run.as_ref().is_some_and(|run| !run.task.is_finished())
    }

    /// The broadcast and stream of the most recent launch, kept after [`Self::stop`].
    pub fn target(&self) -> Option<(&LiveBroadcast, &LiveStream)> {
        self.target
            .as_deref()
            .map(|target| (&target.broadcast, &target.stream))
    }

    /// Starts driving `broadcast` to `live`.
    ///
    /// Any earlier launch is stopped first and the live flag is reset. The first check runs
    /// before this returns; the rest run in the background every `poll_interval`.
    pub async fn launch(&mut self, broadcast: LiveBroadcast, stream: LiveStream) {
        self.stop().await;
        self.is_live.send_replace(false);

        tracing::info!(
            broadcast_id = %broadcast.id,
            stream_id = %stream.id,
            "launching broadcast"
        );

        let target = Arc::new(Target {
            control: Arc::clone(&self.control),
            broadcast,
            stream,
            events: self.events.clone(),
            is_live: Arc::clone(&self.is_live),
        });
        self.target = Some(Arc::clone(&target));

        target.tick().await;
        if self.config.stop_when_live && target.is_live() {
            return;
        }

        let cancel = CancellationToken::new();
        let period = self.config.poll_interval.max(MIN_POLL_INTERVAL);
        let task = tokio::spawn(poll(
            target,
            period,
            self.config.stop_when_live,
            cancel.clone(),
        ));
        self.run = Some(Run { cancel, task });
    }

    /// Stops polling.
    ///
    /// A check that is waiting on YouTube is abandoned, and no events are sent once this
    /// returns. The live flag and target are left as they were.
    pub async fn stop(&mut self) {
        let Some(run) = self.run.take() else {
            return;
        };

        run.cancel.cancel();
        if let Err(e) = run.task.await
            && e.is_panic()
        {
            tracing::error!(error = %e, "launcher task panicked");
        }
        tracing::debug!("launcher stopped");
    }
}

impl<C> Drop for LiveLauncher<C> {
    fn drop(&mut self) {
        if let Some(run) = &self.run {
            run.cancel.cancel();
        }
    }
}

/// Everything a single check needs.
#[derive(Debug)]
struct Target<C> {
    control: Arc<C>,
    broadcast: LiveBroadcast,
    stream: LiveStream,
    events: broadcast::Sender<LaunchEvent>,
    is_live: Arc<watch::Sender<bool>>,
}

impl<C: BroadcastControl> Target<C> {
    fn is_live(&self) -> bool {
        *self.is_live.borrow()
    }

    async fn tick(&self) {
        if self.is_live() {
            tracing::trace!(broadcast_id = %self.broadcast.id, "already live, skipping check");
            return;
        }

        let snapshot = match probe(&*self.control, &self.broadcast, &self.stream).await {
            Ok(LiveSignal::Live) => {
                self.enter_live();
                return;
            }
            Ok(LiveSignal::NotLive(snapshot)) => snapshot,
            Err(e) => {
                self.report(e);
                return;
            }
        };

        tracing::debug!(broadcast_id = %self.broadcast.id, %snapshot, "broadcast not live yet");
        self.emit(LaunchEvent::StatusChanged(snapshot));

        let Some(status) = snapshot.broadcast_status.transition_toward_live() else {
            self.report(YtError::message(format!(
                "broadcast is {} and can no longer go live",
                snapshot.broadcast_status
            )));
            return;
        };

        match transition(&*self.control, &self.broadcast.id, status).await {
            Ok(_) => self.enter_live(),
            Err(e) => self.report(e),
        }
    }

    fn enter_live(&self) {
        let entered = self.is_live.send_if_modified(|live| {
            if *live {
                false
            } else {
                *live = true;
                true
            }
        });

        if entered {
            tracing::info!(broadcast_id = %self.broadcast.id, "broadcast is live");
            self.emit(LaunchEvent::EnteredLive);
        }
    }

    fn report(&self, error: YtError) {
        let message = error.display_message();
        tracing::warn!(broadcast_id = %self.broadcast.id, "{}", message);
        self.emit(LaunchEvent::Error(message));
    }

    fn emit(&self, event: LaunchEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }
}

async fn poll<C: BroadcastControl>(
    target: Arc<Target<C>>,
    period: Duration,
    stop_when_live: bool,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = target.tick() => {}
        }

        if stop_when_live && target.is_live() {
            tracing::debug!(broadcast_id = %target.broadcast.id, "live, no more checks needed");
            break;
        }
    }
}
