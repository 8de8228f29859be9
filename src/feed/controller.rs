//! The feed controller: fetch lifecycle, pagination and epoch handling.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::{ApiClient, Post};
use crate::feed::query::{build_request, FeedQuery};
use crate::feed::tags::TagProjector;

/// Lifecycle of the current fetch within an epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    Idle,
    Loading,
    Settled,
    Failed,
}

/// Immutable view of the feed state, published to subscribers after every
/// transition.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub posts: Arc<Vec<Post>>,
    pub unique_tags: Arc<Vec<String>>,
    pub total: u64,
    pub skip: u64,
    pub has_more: bool,
    pub phase: FeedPhase,
    pub error: Option<String>,
}

impl FeedSnapshot {
    #[must_use]
    pub fn loading(&self) -> bool {
        self.phase == FeedPhase::Loading
    }

    /// Zero posts with a settled phase is a valid terminal state, not an
    /// error; the presentation layer shows an empty-state message.
    #[must_use]
    pub fn is_empty_result(&self) -> bool {
        self.phase == FeedPhase::Settled && self.posts.is_empty()
    }
}

struct FeedInner {
    query: FeedQuery,
    posts: Vec<Post>,
    posts_revision: u64,
    skip: u64,
    total: u64,
    has_more: bool,
    phase: FeedPhase,
    error: Option<String>,
    projector: TagProjector,
}

impl FeedInner {
    fn new(query: FeedQuery) -> Self {
        Self {
            query,
            posts: Vec::new(),
            posts_revision: 0,
            skip: 0,
            total: 0,
            has_more: true,
            phase: FeedPhase::Idle,
            error: None,
            projector: TagProjector::new(),
        }
    }

    fn snapshot(&mut self) -> FeedSnapshot {
        let unique_tags = self.projector.project(&self.posts, self.posts_revision);
        FeedSnapshot {
            posts: Arc::new(self.posts.clone()),
            unique_tags,
            total: self.total,
            skip: self.skip,
            has_more: self.has_more,
            phase: self.phase,
            error: self.error.clone(),
        }
    }
}

/// Owns search/tag/pagination state for one feed and exposes snapshots
/// over a watch channel.
///
/// A query epoch begins whenever the effective filter changes (or on an
/// explicit [`refresh`](Self::refresh)); each in-flight request is tagged
/// with the epoch counter at issue time and its response is discarded if a
/// newer epoch has started by the time it lands. The inner mutex is never
/// held across an await point.
pub struct FeedController {
    client: ApiClient,
    inner: Mutex<FeedInner>,
    epoch: AtomicU64,
    updates: watch::Sender<FeedSnapshot>,
}

impl FeedController {
    #[must_use]
    pub fn new(client: ApiClient, query: FeedQuery) -> Self {
        let mut inner = FeedInner::new(query);
        let (updates, _) = watch::channel(inner.snapshot());
        Self {
            client,
            inner: Mutex::new(inner),
            epoch: AtomicU64::new(0),
            updates,
        }
    }

    /// Subscribe to state transitions. The receiver always holds the
    /// latest snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.updates.subscribe()
    }

    /// The latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> FeedSnapshot {
        self.updates.borrow().clone()
    }

    /// The query of the current epoch.
    #[must_use]
    pub fn query(&self) -> FeedQuery {
        self.inner.lock().unwrap().query.clone()
    }

    /// Adopt a new effective filter. Begins a new query epoch only when
    /// the filter actually changed.
    pub async fn set_query(&self, query: FeedQuery) {
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.query == query {
                return;
            }
            inner.query = query;
        }
        self.begin_epoch().await;
    }

    /// Unconditionally begin a new epoch for the current query. Used for
    /// the initial load and for manual retry after a failure.
    pub async fn refresh(&self) {
        self.begin_epoch().await;
    }

    /// Fetch the next page, appending to the current epoch's posts. A
    /// no-op while a fetch is already in flight.
    pub async fn load_more(&self) {
        let epoch = self.epoch.load(Ordering::SeqCst);
        self.fetch(false, epoch).await;
    }

    /// Edge-triggered sentinel-visibility notification from the scroll
    /// bridge. Loads the next page only while there may be more posts and
    /// no fetch is in flight.
    pub async fn sentinel_visible(&self) {
        {
            let inner = self.inner.lock().unwrap();
            if !inner.has_more || inner.phase == FeedPhase::Loading {
                return;
            }
        }
        self.load_more().await;
    }

    /// Discard accumulated state, then issue the epoch's first fetch.
    async fn begin_epoch(&self) {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut inner = self.inner.lock().unwrap();
            inner.posts.clear();
            inner.posts_revision += 1;
            inner.skip = 0;
            inner.total = 0;
            inner.has_more = true;
            inner.error = None;
            debug!(epoch, query = ?inner.query, "Beginning query epoch");
        }
        self.fetch(true, epoch).await;
    }

    /// One fetch cycle: `Loading -> {Settled, Failed}`.
    ///
    /// Epoch-triggering fetches (`reset == true`) proceed even while an
    /// older request is in flight; plain load-more calls do not.
    async fn fetch(&self, reset: bool, epoch: u64) {
        let url = {
            let mut inner = self.inner.lock().unwrap();
            if !reset && inner.phase == FeedPhase::Loading {
                debug!("Ignoring load-more while a fetch is in flight");
                return;
            }
            inner.phase = FeedPhase::Loading;
            inner.error = None;
            let current_skip = if reset { 0 } else { inner.skip };
            match build_request(self.client.base_url(), &inner.query, current_skip) {
                Ok(url) => url,
                Err(e) => {
                    inner.phase = FeedPhase::Failed;
                    inner.error = Some(e.to_string());
                    drop(inner);
                    self.publish();
                    return;
                }
            }
        };
        self.publish();

        let result = self.client.fetch_page(url).await;

        let mut inner = self.inner.lock().unwrap();
        if self.epoch.load(Ordering::SeqCst) != epoch {
            debug!(epoch, "Discarding response from abandoned epoch");
            return;
        }

        match result {
            Ok(page) => {
                let received = page.posts.len() as u64;
                if reset {
                    inner.posts = page.posts;
                } else {
                    inner.posts.extend(page.posts);
                }
                inner.posts_revision += 1;
                inner.total = page.total;
                inner.skip = if reset { received } else { inner.skip + received };
                inner.has_more = received == inner.query.page_size;
                inner.phase = FeedPhase::Settled;
                debug!(
                    received,
                    accumulated = inner.posts.len(),
                    has_more = inner.has_more,
                    "Page applied"
                );
            }
            Err(e) => {
                warn!(epoch, "Feed fetch failed: {e}");
                inner.error = Some(e.to_string());
                inner.phase = FeedPhase::Failed;
            }
        }
        drop(inner);
        self.publish();
    }

    fn publish(&self) {
        let snapshot = self.inner.lock().unwrap().snapshot();
        self.updates.send_replace(snapshot);
    }
}
