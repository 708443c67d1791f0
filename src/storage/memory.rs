use super::{StorageError, TodoStorage};
use crate::models::{CreateTodo, Todo, TodoStats, UpdateTodo};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI32, Ordering};

/// Process-local store. Ids start at 1 and are never reused.
pub struct MemoryStorage {
    todos: DashMap<i32, Todo>,
    next_id: AtomicI32,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage {
            todos: DashMap::new(),
            next_id: AtomicI32::new(1),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[rocket::async_trait]
impl TodoStorage for MemoryStorage {
    async fn get_todos(&self) -> Result<Vec<Todo>, StorageError> {
        let mut items: Vec<Todo> = self.todos.iter().map(|entry| entry.value().clone()).collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(items)
    }

    async fn get_todo(&self, id: i32) -> Result<Option<Todo>, StorageError> {
        Ok(self.todos.get(&id).map(|item_ref| item_ref.value().clone()))
    }

    async fn create_todo(&self, input: CreateTodo) -> Result<Todo, StorageError> {
        let new_todo = input.into_new_todo();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let item = Todo {
            id,
            title: new_todo.title,
            description: new_todo.description,
            completed: new_todo.completed,
            priority: new_todo.priority,
            created_at: Utc::now(),
            completed_at: None,
        };
        self.todos.insert(id, item.clone());
        Ok(item)
    }

    async fn update_todo(&self, id: i32, updates: UpdateTodo) -> Result<Option<Todo>, StorageError> {
        let changeset = updates.into_changeset(Utc::now());
        Ok(self.todos.get_mut(&id).map(|mut item_ref_mut| {
            changeset.apply_to(item_ref_mut.value_mut());
            item_ref_mut.value().clone()
        }))
    }

    async fn delete_todo(&self, id: i32) -> Result<bool, StorageError> {
        Ok(self.todos.remove(&id).is_some())
    }

    async fn get_todo_stats(&self) -> Result<TodoStats, StorageError> {
        Ok(TodoStats::tally(self.todos.iter().map(|entry| entry.value().completed)))
    }
}
