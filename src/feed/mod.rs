//! Feed state: query construction, the controller state machine, derived
//! tags and the detail view loader.

pub mod controller;
pub mod detail;
pub mod query;
pub mod tags;

pub use controller::{FeedController, FeedPhase, FeedSnapshot};
pub use detail::{load_detail, PostDetail};
pub use query::{build_request, FeedQuery, QueryError};
pub use tags::TagProjector;
