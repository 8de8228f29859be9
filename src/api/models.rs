use serde::{Deserialize, Serialize};

/// A blog post as returned by the listing, search and tag endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub reactions: Reactions,
    pub user_id: u64,
}

/// Reaction counts attached to a post.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Reactions {
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub dislikes: u64,
}

/// One page of posts from a listing endpoint.
///
/// The `posts` field is absent in some error-shaped responses; it decodes
/// to an empty page rather than failing.
#[derive(Debug, Clone, Deserialize)]
pub struct PostsPage {
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub limit: u64,
}

/// A tag descriptor from the tags-enumeration endpoint.
///
/// The tag selector filters by `slug`; `name` is the display form.
#[derive(Debug, Clone, Deserialize)]
pub struct TagDescriptor {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// A post author, looked up by the detail view.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
}

impl User {
    /// Display form used by the detail view: "First Last (@username)".
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {} (@{})", self.first_name, self.last_name, self.username)
    }
}
