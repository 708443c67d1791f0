//! Persistence for todos.
//!
//! Route handlers only see [`TodoStorage`]; the concrete backend is chosen at
//! ignition (see [`crate::db::stage`]) or injected directly by tests.

mod memory;
mod postgres;

pub use memory::MemoryStorage;
pub use postgres::PgStorage;

use crate::models::{CreateTodo, Todo, TodoStats, UpdateTodo};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("database error: {0}")]
    Query(#[from] diesel::result::Error),
    #[error("migration failed: {0}")]
    Migration(String),
    #[error("background task failed: {0}")]
    Task(#[from] rocket::tokio::task::JoinError),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[rocket::async_trait]
pub trait TodoStorage: Send + Sync {
    /// All todos, most recently created first.
    async fn get_todos(&self) -> Result<Vec<Todo>, StorageError>;

    async fn get_todo(&self, id: i32) -> Result<Option<Todo>, StorageError>;

    async fn create_todo(&self, input: CreateTodo) -> Result<Todo, StorageError>;

    /// Applies the provided fields. `Ok(None)` when no todo has this id.
    async fn update_todo(&self, id: i32, updates: UpdateTodo) -> Result<Option<Todo>, StorageError>;

    /// Returns whether a row was actually removed.
    async fn delete_todo(&self, id: i32) -> Result<bool, StorageError>;

    async fn get_todo_stats(&self) -> Result<TodoStats, StorageError>;
}

/// Shared handle kept in Rocket's managed state.
pub type Storage = Arc<dyn TodoStorage>;
