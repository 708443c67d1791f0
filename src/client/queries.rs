use super::api::TodoApi;
use super::cache::{QueryCache, QueryData, QueryKey};
use super::ClientError;
use crate::models::{CreateTodo, Todo, TodoStats, UpdateTodo};
use crate::services::health::{Liveness, SystemInfo};
use dashmap::DashSet;
use std::future::Future;
use std::sync::Arc;

/// Cached reads and invalidating writes over a [`TodoApi`].
///
/// Reads are served from the cache while fresh. Every successful mutation
/// invalidates the todo list and the stats, so their subscribers refetch.
/// Nothing is updated optimistically.
pub struct TodoQueries<A> {
    api: A,
    cache: Arc<QueryCache>,
    toggles_in_flight: DashSet<i32>,
}

impl<A: TodoApi> TodoQueries<A> {
    pub fn new(api: A) -> Self {
        Self::with_cache(api, Arc::new(QueryCache::new()))
    }

    pub fn with_cache(api: A, cache: Arc<QueryCache>) -> Self {
        TodoQueries {
            api,
            cache,
            toggles_in_flight: DashSet::new(),
        }
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    async fn cached<T, F, Fut>(
        &self,
        key: QueryKey,
        unpack: fn(QueryData) -> Option<T>,
        pack: fn(T) -> QueryData,
        fetch: F,
    ) -> Result<T, ClientError>
    where
        T: Clone,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        if let Some(hit) = self.cache.get(key).and_then(unpack) {
            return Ok(hit);
        }
        let generation = self.cache.generation(key);
        let fresh = fetch().await?;
        // a write during the fetch leaves the key stale for the next read
        self.cache.set_if_current(key, generation, pack(fresh.clone()));
        Ok(fresh)
    }

    pub async fn todos(&self) -> Result<Vec<Todo>, ClientError> {
        self.cached(QueryKey::Todos, QueryData::into_todos, QueryData::Todos, || {
            self.api.list_todos()
        })
        .await
    }

    pub async fn stats(&self) -> Result<TodoStats, ClientError> {
        self.cached(QueryKey::TodoStats, QueryData::into_stats, QueryData::TodoStats, || {
            self.api.todo_stats()
        })
        .await
    }

    pub async fn system_info(&self) -> Result<SystemInfo, ClientError> {
        self.cached(
            QueryKey::SystemInfo,
            QueryData::into_system_info,
            QueryData::SystemInfo,
            || self.api.system_info(),
        )
        .await
    }

    pub async fn liveness(&self) -> Result<Liveness, ClientError> {
        self.cached(QueryKey::Liveness, QueryData::into_liveness, QueryData::Liveness, || {
            self.api.liveness()
        })
        .await
    }

    pub async fn create_todo(&self, input: CreateTodo) -> Result<Todo, ClientError> {
        let created = self.api.create_todo(input).await?;
        self.invalidate_todo_queries();
        Ok(created)
    }

    /// Flips `completed`. A second toggle of the same todo is refused until
    /// the first one has answered or been dropped.
    pub async fn toggle_todo(&self, todo: &Todo) -> Result<Todo, ClientError> {
        let _pending = ToggleGuard::acquire(&self.toggles_in_flight, todo.id)?;
        let updated = self
            .api
            .update_todo(todo.id, UpdateTodo::completed(!todo.completed))
            .await?;
        self.invalidate_todo_queries();
        Ok(updated)
    }

    pub fn is_toggle_pending(&self, id: i32) -> bool {
        self.toggles_in_flight.contains(&id)
    }

    pub async fn delete_todo(&self, id: i32) -> Result<(), ClientError> {
        self.api.delete_todo(id).await?;
        self.invalidate_todo_queries();
        Ok(())
    }

    fn invalidate_todo_queries(&self) {
        self.cache.invalidate(QueryKey::Todos);
        self.cache.invalidate(QueryKey::TodoStats);
    }
}

// Marks a todo as being toggled until dropped, including when the toggle
// future itself is dropped before it finishes.
struct ToggleGuard<'a> {
    pending: &'a DashSet<i32>,
    id: i32,
}

impl<'a> ToggleGuard<'a> {
    fn acquire(pending: &'a DashSet<i32>, id: i32) -> Result<Self, ClientError> {
        if pending.insert(id) {
            Ok(ToggleGuard { pending, id })
        } else {
            Err(ClientError::MutationInFlight(id))
        }
    }
}

impl Drop for ToggleGuard<'_> {
    fn drop(&mut self) {
        self.pending.remove(&self.id);
    }
}
