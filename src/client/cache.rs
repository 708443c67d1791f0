//! Client-side query cache.
//!
//! Each read is cached under a [`QueryKey`]. Mutations mark keys stale with
//! [`QueryCache::invalidate`], and subscribers of that key are told so they
//! can refetch. Stale data stays readable through [`QueryCache::peek`] until
//! the refetch lands.
//!
//! Every invalidation also bumps the key's generation. A fetch that started
//! before an invalidation stores its result with [`QueryCache::set_if_current`],
//! which refuses it, so an answer older than the last write never turns the
//! entry fresh again.

use crate::models::{Todo, TodoStats};
use crate::services::health::{Liveness, SystemInfo};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Todos,
    TodoStats,
    SystemInfo,
    Liveness,
}

impl QueryKey {
    /// Request path that backs this query.
    pub fn path(&self) -> &'static str {
        match self {
            QueryKey::Todos => "/api/todos",
            QueryKey::TodoStats => "/api/todos/stats",
            QueryKey::SystemInfo => "/api/system-info",
            QueryKey::Liveness => "/health/live",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum QueryData {
    Todos(Vec<Todo>),
    TodoStats(TodoStats),
    SystemInfo(SystemInfo),
    Liveness(Liveness),
}

impl QueryData {
    pub fn into_todos(self) -> Option<Vec<Todo>> {
        match self {
            QueryData::Todos(items) => Some(items),
            _ => None,
        }
    }

    pub fn into_stats(self) -> Option<TodoStats> {
        match self {
            QueryData::TodoStats(stats) => Some(stats),
            _ => None,
        }
    }

    pub fn into_system_info(self) -> Option<SystemInfo> {
        match self {
            QueryData::SystemInfo(info) => Some(info),
            _ => None,
        }
    }

    pub fn into_liveness(self) -> Option<Liveness> {
        match self {
            QueryData::Liveness(live) => Some(live),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheEvent {
    Updated(QueryKey),
    Invalidated(QueryKey),
}

pub type Listener = Arc<dyn Fn(CacheEvent) + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Entry {
    data: QueryData,
    stale: bool,
}

#[derive(Default)]
pub struct QueryCache {
    entries: DashMap<QueryKey, Entry>,
    generations: DashMap<QueryKey, u64>,
    listeners: DashMap<QueryKey, Vec<(SubscriptionId, Listener)>>,
    next_subscription: AtomicU64,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh data only; `None` when missing or invalidated.
    pub fn get(&self, key: QueryKey) -> Option<QueryData> {
        self.entries
            .get(&key)
            .filter(|entry| !entry.stale)
            .map(|entry| entry.data.clone())
    }

    /// Last known data, stale or not.
    pub fn peek(&self, key: QueryKey) -> Option<QueryData> {
        self.entries.get(&key).map(|entry| entry.data.clone())
    }

    pub fn is_stale(&self, key: QueryKey) -> bool {
        self.entries.get(&key).map_or(true, |entry| entry.stale)
    }

    pub fn set(&self, key: QueryKey, data: QueryData) {
        self.entries.insert(key, Entry { data, stale: false });
        self.notify(CacheEvent::Updated(key));
    }

    /// Number of invalidations `key` has seen. Read it before fetching.
    pub fn generation(&self, key: QueryKey) -> u64 {
        self.generations.get(&key).map_or(0, |generation| *generation)
    }

    /// Stores `data` only if `key` was not invalidated since `generation`
    /// was read. Returns whether it was stored.
    pub fn set_if_current(&self, key: QueryKey, generation: u64, data: QueryData) -> bool {
        {
            // holding the generation entry keeps invalidate out until the insert is done
            let current = self.generations.entry(key).or_insert(0);
            if *current != generation {
                return false;
            }
            self.entries.insert(key, Entry { data, stale: false });
        }
        self.notify(CacheEvent::Updated(key));
        true
    }

    pub fn invalidate(&self, key: QueryKey) {
        *self.generations.entry(key).or_insert(0) += 1;
        if let Some(mut entry) = self.entries.get_mut(&key) {
            entry.stale = true;
        }
        self.notify(CacheEvent::Invalidated(key));
    }

    pub fn subscribe<F>(&self, key: QueryKey, listener: F) -> SubscriptionId
    where
        F: Fn(CacheEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .entry(key)
            .or_default()
            .push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut removed = false;
        for mut subscribers in self.listeners.iter_mut() {
            let before = subscribers.len();
            subscribers.retain(|(sub, _)| *sub != id);
            removed |= subscribers.len() != before;
        }
        removed
    }

    pub fn subscriber_count(&self, key: QueryKey) -> usize {
        self.listeners.get(&key).map_or(0, |subs| subs.len())
    }

    fn notify(&self, event: CacheEvent) {
        let key = match event {
            CacheEvent::Updated(key) | CacheEvent::Invalidated(key) => key,
        };
        // Listeners are cloned out so a callback may call back into the cache.
        let listeners: Vec<Listener> = match self.listeners.get(&key) {
            Some(subs) => subs.iter().map(|(_, listener)| Arc::clone(listener)).collect(),
            None => return,
        };
        for listener in listeners {
            listener(event);
        }
    }
}
