//! HTTP client for the demo blog API.
//!
//! Wraps `reqwest` with the handful of typed endpoints the feed and detail
//! views consume. Request URLs for the paginated listing endpoints are
//! built by [`crate::feed::query`] and executed here.

mod models;

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::constants::FEED_USER_AGENT;

pub use models::{Post, PostsPage, Reactions, TagDescriptor, User};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("server returned status {0}")]
    Status(StatusCode),
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Client for the blog API endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Build a client from the application configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        Self::with_base_url(config.api_base_url.clone(), config.request_timeout)
    }

    /// Build a client against an explicit base URL. Used directly by tests
    /// pointing at a mock server.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn with_base_url(base_url: Url, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(FEED_USER_AGENT)
            .build()?;
        Ok(Self { http, base_url })
    }

    /// Base URL the client targets.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Execute a prebuilt paginated request and decode the page.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or a
    /// body that does not decode as a posts page.
    pub async fn fetch_page(&self, url: Url) -> Result<PostsPage, ApiError> {
        debug!(url = %url, "Fetching posts page");
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        let page: PostsPage = response.json().await?;
        debug!(
            received = page.posts.len(),
            total = page.total,
            "Posts page received"
        );
        Ok(page)
    }

    /// Enumerate all known tags.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or an
    /// undecodable body.
    pub async fn list_tags(&self) -> Result<Vec<TagDescriptor>, ApiError> {
        let url = self.base_url.join("posts/tags")?;
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        Ok(response.json().await?)
    }

    /// Look up a post author by id.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or an
    /// undecodable body.
    pub async fn get_user(&self, id: u64) -> Result<User, ApiError> {
        let url = self.base_url.join(&format!("users/{id}"))?;
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        Ok(response.json().await?)
    }
}
