//! Projection of the distinct tags present in the loaded posts.

use std::collections::HashSet;
use std::sync::Arc;

use crate::api::Post;

/// Memoized unique-tag projection.
///
/// Recomputes only when the posts revision advances; an unchanged revision
/// returns the cached list without touching the posts.
#[derive(Debug, Default)]
pub struct TagProjector {
    revision: Option<u64>,
    cached: Arc<Vec<String>>,
}

impl TagProjector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Distinct tag values across `posts` in first-seen order.
    pub fn project(&mut self, posts: &[Post], revision: u64) -> Arc<Vec<String>> {
        if self.revision == Some(revision) {
            return Arc::clone(&self.cached);
        }

        let mut seen = HashSet::new();
        let mut tags = Vec::new();
        for post in posts {
            for tag in &post.tags {
                if seen.insert(tag.clone()) {
                    tags.push(tag.clone());
                }
            }
        }

        self.revision = Some(revision);
        self.cached = Arc::new(tags);
        Arc::clone(&self.cached)
    }
}
