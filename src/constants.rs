//! Shared constants used across the application.

/// Base URL of the public demo blog API.
pub const DEFAULT_API_BASE_URL: &str = "https://dummyjson.com";

/// User agent string sent with every API request.
pub const FEED_USER_AGENT: &str = "blog-feed-browser/0.1";

/// Default number of posts requested per page.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Default quiescence window for the search debouncer, in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Preference key for the infinite-scroll toggle.
pub const INFINITE_SCROLL_KEY: &str = "infiniteScroll";
