//! Detail view loading: a post plus its author.

use tracing::warn;

use crate::api::{ApiClient, Post, User};

/// A post expanded for the detail view.
///
/// The author lookup can fail independently of the feed; that failure is
/// scoped to `user_error` and never propagates.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: Post,
    pub user: Option<User>,
    pub user_error: Option<String>,
}

/// Load the detail view for a post, looking up its author.
///
/// Never fails: a user-lookup error is captured in the returned
/// `user_error` instead.
pub async fn load_detail(client: &ApiClient, post: Post) -> PostDetail {
    match client.get_user(post.user_id).await {
        Ok(user) => PostDetail {
            post,
            user: Some(user),
            user_error: None,
        },
        Err(e) => {
            warn!(user_id = post.user_id, "User lookup failed: {e}");
            PostDetail {
                user_error: Some(format!("failed to load user {}: {e}", post.user_id)),
                post,
                user: None,
            }
        }
    }
}
