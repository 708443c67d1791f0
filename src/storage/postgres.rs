use super::{StorageError, TodoStorage};
use crate::db::PgPool;
use crate::models::{CreateTodo, Todo, TodoChangeset, TodoStats, UpdateTodo};
use chrono::Utc;
use diesel::dsl::now;
use diesel::pg::PgConnection;
use diesel::prelude::*;

pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        PgStorage { pool }
    }

    // diesel is blocking, so every statement runs on the blocking pool
    async fn run<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> Result<T, StorageError> + Send + 'static,
    {
        let pool = self.pool.clone();
        rocket::tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut conn)
        })
        .await?
    }
}

fn find_todo(conn: &mut PgConnection, todo_id: i32) -> Result<Option<Todo>, StorageError> {
    use crate::schema::todos::dsl::*;

    Ok(todos
        .find(todo_id)
        .select(Todo::as_select())
        .first::<Todo>(conn)
        .optional()?)
}

fn write_changeset(
    conn: &mut PgConnection,
    todo_id: i32,
    changeset: TodoChangeset,
) -> Result<Option<Todo>, StorageError> {
    use crate::schema::todos::dsl::*;

    // diesel refuses an UPDATE without columns
    if changeset.is_empty() {
        return find_todo(conn, todo_id);
    }
    let target = diesel::update(todos.find(todo_id));
    let updated = if changeset.completed == Some(true) {
        // created_at comes from the database clock, so completed_at must too
        let changeset = TodoChangeset {
            completed_at: None,
            ..changeset
        };
        target
            .set((&changeset, completed_at.eq(now)))
            .returning(Todo::as_returning())
            .get_result::<Todo>(conn)
            .optional()?
    } else {
        target
            .set(&changeset)
            .returning(Todo::as_returning())
            .get_result::<Todo>(conn)
            .optional()?
    };
    Ok(updated)
}

#[rocket::async_trait]
impl TodoStorage for PgStorage {
    async fn get_todos(&self) -> Result<Vec<Todo>, StorageError> {
        self.run(|conn| {
            use crate::schema::todos::dsl::*;

            Ok(todos
                .order((created_at.desc(), id.desc()))
                .select(Todo::as_select())
                .load::<Todo>(conn)?)
        })
        .await
    }

    async fn get_todo(&self, todo_id: i32) -> Result<Option<Todo>, StorageError> {
        self.run(move |conn| find_todo(conn, todo_id)).await
    }

    async fn create_todo(&self, input: CreateTodo) -> Result<Todo, StorageError> {
        let new_todo = input.into_new_todo();
        self.run(move |conn| {
            use crate::schema::todos::dsl::*;

            Ok(diesel::insert_into(todos)
                .values(&new_todo)
                .returning(Todo::as_returning())
                .get_result::<Todo>(conn)?)
        })
        .await
    }

    async fn update_todo(&self, todo_id: i32, updates: UpdateTodo) -> Result<Option<Todo>, StorageError> {
        let changeset = updates.into_changeset(Utc::now());
        self.run(move |conn| write_changeset(conn, todo_id, changeset))
            .await
    }

    async fn delete_todo(&self, todo_id: i32) -> Result<bool, StorageError> {
        self.run(move |conn| {
            use crate::schema::todos::dsl::*;

            let removed = diesel::delete(todos.find(todo_id)).execute(conn)?;
            Ok(removed > 0)
        })
        .await
    }

    async fn get_todo_stats(&self) -> Result<TodoStats, StorageError> {
        self.run(|conn| {
            use crate::schema::todos::dsl::*;

            let flags = todos.select(completed).load::<bool>(conn)?;
            Ok(TodoStats::tally(flags))
        })
        .await
    }
}
