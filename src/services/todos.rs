use super::error::ApiError;
use crate::models::{CreateTodo, Todo, TodoStats, UpdateTodo};
use crate::storage::Storage;
use rocket::http::Status;
use rocket::response::status::Created;
use rocket::serde::json::{self, Json};
use rocket::{delete, get, patch, post, routes, State};

const INVALID_ID: &str = "Invalid todo ID";
const NOT_FOUND: &str = "Todo not found";

fn parse_id(id: Result<i32, &str>) -> Result<i32, ApiError> {
    id.map_err(|_| ApiError::bad_request(INVALID_ID, Vec::new()))
}

fn body_error(err: json::Error<'_>) -> Vec<String> {
    match err {
        json::Error::Io(e) => vec![e.to_string()],
        json::Error::Parse(_, e) => vec![e.to_string()],
    }
}

#[get("/")]
pub async fn list_todos(storage: &State<Storage>) -> Result<Json<Vec<Todo>>, ApiError> {
    let items = storage
        .get_todos()
        .await
        .map_err(|e| ApiError::internal("Failed to fetch todos", e))?;
    Ok(Json(items))
}

#[get("/stats")]
pub async fn todo_stats(storage: &State<Storage>) -> Result<Json<TodoStats>, ApiError> {
    let stats = storage
        .get_todo_stats()
        .await
        .map_err(|e| ApiError::internal("Failed to fetch todo statistics", e))?;
    Ok(Json(stats))
}

#[get("/<id>")]
pub async fn get_todo(id: Result<i32, &str>, storage: &State<Storage>) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(id)?;
    match storage.get_todo(id).await {
        Ok(Some(item)) => Ok(Json(item)),
        Ok(None) => Err(ApiError::not_found(NOT_FOUND)),
        Err(e) => Err(ApiError::internal("Failed to fetch todo", e)),
    }
}

#[post("/", data = "<body>")]
pub async fn create_todo(
    body: Result<Json<CreateTodo>, json::Error<'_>>,
    storage: &State<Storage>,
) -> Result<Created<Json<Todo>>, ApiError> {
    let input = body
        .map_err(|e| ApiError::bad_request("Invalid todo data", body_error(e)))?
        .into_inner();
    input
        .validate()
        .map_err(|errors| ApiError::bad_request("Invalid todo data", errors))?;

    let item = storage
        .create_todo(input)
        .await
        .map_err(|e| ApiError::internal("Failed to create todo", e))?;
    Ok(Created::new(format!("/api/todos/{}", item.id)).body(Json(item)))
}

#[patch("/<id>", data = "<body>")]
pub async fn update_todo(
    id: Result<i32, &str>,
    body: Result<Json<UpdateTodo>, json::Error<'_>>,
    storage: &State<Storage>,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(id)?;
    let updates = body
        .map_err(|e| ApiError::bad_request("Invalid update data", body_error(e)))?
        .into_inner();
    updates
        .validate()
        .map_err(|errors| ApiError::bad_request("Invalid update data", errors))?;

    match storage.update_todo(id, updates).await {
        Ok(Some(item)) => Ok(Json(item)),
        Ok(None) => Err(ApiError::not_found(NOT_FOUND)),
        Err(e) => Err(ApiError::internal("Failed to update todo", e)),
    }
}

#[delete("/<id>")]
pub async fn delete_todo(id: Result<i32, &str>, storage: &State<Storage>) -> Result<Status, ApiError> {
    let id = parse_id(id)?;
    match storage.delete_todo(id).await {
        Ok(true) => Ok(Status::NoContent),
        Ok(false) => Err(ApiError::not_found(NOT_FOUND)),
        Err(e) => Err(ApiError::internal("Failed to delete todo", e)),
    }
}

pub fn todo_routes() -> Vec<rocket::Route> {
    routes![list_todos, todo_stats, get_todo, create_todo, update_todo, delete_todo]
}
