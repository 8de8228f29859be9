//! Blog feed browser library.
//!
//! A client for a public demo blog REST API: owns search/tag/pagination
//! state, debounces search input, fetches and accumulates pages, and
//! exposes snapshots to presentation consumers over a watch channel.

pub mod api;
pub mod config;
pub mod constants;
pub mod debounce;
pub mod feed;
pub mod prefs;
pub mod scroll;
pub mod theme;
