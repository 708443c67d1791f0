//! Client-side data access for the todo service.
//!
//! [`TodoQueries`] wraps any [`TodoApi`] (usually [`HttpTodoApi`]) with a
//! [`QueryCache`]. Views subscribe to query keys and refetch when a mutation
//! invalidates them. [`view`] holds the derived values views display.

pub mod api;
pub mod cache;
pub mod queries;
pub mod view;

pub use api::{HttpTodoApi, TodoApi};
pub use cache::{CacheEvent, QueryCache, QueryData, QueryKey, SubscriptionId};
pub use queries::TodoQueries;
pub use view::TodoFilter;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server answered {status}: {message}")]
    Status { status: u16, message: String },
    #[error("todo {0} already has an update in flight")]
    MutationInFlight(i32),
}
