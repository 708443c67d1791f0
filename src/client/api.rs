use super::cache::QueryKey;
use super::ClientError;
use crate::models::{CreateTodo, Todo, TodoStats, UpdateTodo};
use crate::services::error::ErrorDetail;
use crate::services::health::{Liveness, SystemInfo};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

/// The HTTP contract of the todo service, as seen by a client.
#[rocket::async_trait]
pub trait TodoApi: Send + Sync {
    async fn list_todos(&self) -> Result<Vec<Todo>, ClientError>;
    async fn todo_stats(&self) -> Result<TodoStats, ClientError>;
    async fn create_todo(&self, input: CreateTodo) -> Result<Todo, ClientError>;
    async fn update_todo(&self, id: i32, updates: UpdateTodo) -> Result<Todo, ClientError>;
    async fn delete_todo(&self, id: i32) -> Result<(), ClientError>;
    async fn system_info(&self) -> Result<SystemInfo, ClientError>;
    async fn liveness(&self) -> Result<Liveness, ClientError>;
}

pub struct HttpTodoApi {
    http: Client,
    base_url: String,
}

impl HttpTodoApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        HttpTodoApi { http, base_url }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn todo_url(&self, id: i32) -> String {
        self.url(&format!("/api/todos/{}", id))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.http.get(self.url(path)).send().await?;
        Ok(check(response).await?.json::<T>().await?)
    }
}

// Turns a non-2xx response into ClientError::Status, keeping the server's message.
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = match response.json::<ErrorDetail>().await {
        Ok(detail) => detail.message,
        Err(_) => status.canonical_reason().unwrap_or("request failed").to_string(),
    };
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

#[rocket::async_trait]
impl TodoApi for HttpTodoApi {
    async fn list_todos(&self) -> Result<Vec<Todo>, ClientError> {
        self.get_json(QueryKey::Todos.path()).await
    }

    async fn todo_stats(&self) -> Result<TodoStats, ClientError> {
        self.get_json(QueryKey::TodoStats.path()).await
    }

    async fn create_todo(&self, input: CreateTodo) -> Result<Todo, ClientError> {
        let response = self.http.post(self.url(QueryKey::Todos.path())).json(&input).send().await?;
        Ok(check(response).await?.json::<Todo>().await?)
    }

    async fn update_todo(&self, id: i32, updates: UpdateTodo) -> Result<Todo, ClientError> {
        let response = self.http.patch(self.todo_url(id)).json(&updates).send().await?;
        Ok(check(response).await?.json::<Todo>().await?)
    }

    async fn delete_todo(&self, id: i32) -> Result<(), ClientError> {
        let response = self.http.delete(self.todo_url(id)).send().await?;
        check(response).await?;
        Ok(())
    }

    async fn system_info(&self) -> Result<SystemInfo, ClientError> {
        self.get_json(QueryKey::SystemInfo.path()).await
    }

    async fn liveness(&self) -> Result<Liveness, ClientError> {
        self.get_json(QueryKey::Liveness.path()).await
    }
}
