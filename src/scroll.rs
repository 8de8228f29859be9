//! Scroll-trigger bridge.
//!
//! Visibility detection itself lives outside this crate; this module only
//! carries the contract: an edge-triggered "sentinel became visible" event
//! loads the next page while infinite scrolling is on, there may be more
//! posts, and no fetch is in flight.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::feed::FeedController;

/// How the presentation layer requests subsequent pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollMode {
    /// The user clicks a load-more control.
    Manual,
    /// A visibility sentinel triggers loads automatically.
    Infinite,
}

impl ScrollMode {
    #[must_use]
    pub fn from_infinite_flag(infinite: bool) -> Self {
        if infinite {
            Self::Infinite
        } else {
            Self::Manual
        }
    }

    #[must_use]
    pub fn is_infinite(self) -> bool {
        self == Self::Infinite
    }
}

/// Gate for acting on a sentinel-visibility event.
#[must_use]
pub fn should_trigger(mode: ScrollMode, has_more: bool, loading: bool) -> bool {
    mode.is_infinite() && has_more && !loading
}

/// Forwards sentinel-visibility events to the feed controller.
pub struct SentinelBridge {
    events: mpsc::UnboundedSender<()>,
}

impl SentinelBridge {
    /// Spawn the bridge task for a controller. Events arriving while the
    /// gate is closed are dropped, matching the edge-triggered contract.
    #[must_use]
    pub fn spawn(mode: ScrollMode, controller: Arc<FeedController>) -> Self {
        let (events, mut rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            while rx.recv().await.is_some() {
                let snapshot = controller.snapshot();
                if should_trigger(mode, snapshot.has_more, snapshot.loading()) {
                    controller.sentinel_visible().await;
                } else {
                    debug!(?mode, "Sentinel event ignored");
                }
            }
        });
        Self { events }
    }

    /// Signal that the load-more sentinel became visible.
    pub fn notify_visible(&self) {
        let _ = self.events.send(());
    }
}
