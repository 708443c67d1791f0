use once_cell::sync::Lazy;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{catch, catchers, Build, Request, Rocket};

pub mod client;
pub mod config;
pub mod db;
pub mod models;
pub mod schema;
pub mod services;
pub mod storage;

use config::AppConfig;
use services::error::ErrorDetail;
use services::health::{health_routes, info_routes, STARTED_AT};
use services::todos::todo_routes;
use storage::Storage;

#[catch(404)]
fn not_found_catcher(_status: Status, req: &Request<'_>) -> Json<ErrorDetail> {
    Json(ErrorDetail {
        message: format!("No route for {} {}", req.method(), req.uri()),
        errors: Vec::new(),
    })
}

#[catch(500)]
fn internal_server_error_catcher() -> Json<ErrorDetail> {
    Json(ErrorDetail {
        message: "An unexpected error occurred on the server.".to_string(),
        errors: Vec::new(),
    })
}

/// Routes, catchers and configuration, without a storage backend.
pub fn app(config: AppConfig) -> Rocket<Build> {
    Lazy::force(&STARTED_AT);
    rocket::build()
        .manage(config)
        .mount("/health", health_routes())
        .mount("/api", info_routes())
        .mount("/api/todos", todo_routes())
        .register("/", catchers![not_found_catcher, internal_server_error_catcher])
}

// Used by tests to inject a storage double.
pub fn rocket_instance(storage: Storage, config: AppConfig) -> Rocket<Build> {
    app(config).manage(storage)
}

/// Reads the environment and picks the storage backend at ignition.
pub fn rocket_from_env() -> Rocket<Build> {
    let config = AppConfig::from_env();
    let database_url = config.database_url.clone();
    app(config).attach(db::stage(database_url))
}
