// cloudtodo/src/db.rs
use crate::storage::{MemoryStorage, PgStorage, Storage, StorageError};
use diesel::pg::PgConnection;
use diesel::r2d2::{self, ConnectionManager};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::{error, info, warn};
use rocket::fairing::AdHoc;
use std::sync::Arc;

// an R2D2 connection pool
pub type PgPool = r2d2::Pool<ConnectionManager<PgConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Initialize the database pool.
pub fn init_pool(database_url: &str) -> Result<PgPool, StorageError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Ok(r2d2::Pool::builder().build(manager)?)
}

pub fn run_migrations(pool: &PgPool) -> Result<(), StorageError> {
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| StorageError::Migration(e.to_string()))?;
    for version in applied {
        info!("applied migration {}", version);
    }
    Ok(())
}

/// Connects, migrates and wraps the pool. Blocking: call it off the async
/// executor.
pub fn connect(database_url: &str) -> Result<PgStorage, StorageError> {
    let pool = init_pool(database_url)?;
    run_migrations(&pool)?;
    Ok(PgStorage::new(pool))
}

// Fairing that picks the storage backend and attaches it to Rocket's managed state
pub fn stage(database_url: Option<String>) -> AdHoc {
    AdHoc::try_on_ignite("Todo Storage", move |rocket| async move {
        let storage: Storage = match database_url {
            Some(url) => {
                match rocket::tokio::task::spawn_blocking(move || connect(&url)).await {
                    Ok(Ok(pg)) => {
                        info!("using PostgreSQL todo storage");
                        Arc::new(pg)
                    }
                    Ok(Err(e)) => {
                        error!("failed to initialise PostgreSQL storage: {}", e);
                        return Err(rocket);
                    }
                    Err(e) => {
                        error!("storage initialisation task failed: {}", e);
                        return Err(rocket);
                    }
                }
            }
            None => {
                warn!("DATABASE_URL is not set; todos are kept in memory and lost on restart");
                Arc::new(MemoryStorage::new())
            }
        };
        Ok(rocket.manage(storage))
    })
}
