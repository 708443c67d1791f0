#[cfg(test)]
mod tests {
    use cloudtodo::config::AppConfig;
    use cloudtodo::models::{CreateTodo, Priority, Todo, TodoStats, UpdateTodo};
    use cloudtodo::services::error::ErrorDetail;
    use cloudtodo::services::health::{Liveness, Readiness, SystemInfo};
    use cloudtodo::storage::{MemoryStorage, Storage, StorageError, TodoStorage};
    use rocket::http::{ContentType, Status};
    use rocket::local::blocking::Client;
    use serde_json::json;
    use std::sync::Arc;

    // Helper function to create a test client over a fresh in-memory store
    fn test_client() -> Client {
        test_client_with(Arc::new(MemoryStorage::new()))
    }

    fn test_client_with(storage: Storage) -> Client {
        let rocket_instance = cloudtodo::rocket_instance(storage, AppConfig::default());
        Client::tracked(rocket_instance).expect("valid rocket instance")
    }

    fn create(client: &Client, body: serde_json::Value) -> Todo {
        let response = client
            .post("/api/todos")
            .header(ContentType::JSON)
            .body(body.to_string())
            .dispatch();
        assert_eq!(response.status(), Status::Created);
        response.into_json::<Todo>().unwrap()
    }

    // Storage double whose every call fails.
    struct BrokenStorage;

    fn down() -> StorageError {
        StorageError::Unavailable("connection refused".to_string())
    }

    #[rocket::async_trait]
    impl TodoStorage for BrokenStorage {
        async fn get_todos(&self) -> Result<Vec<Todo>, StorageError> {
            Err(down())
        }
        async fn get_todo(&self, _id: i32) -> Result<Option<Todo>, StorageError> {
            Err(down())
        }
        async fn create_todo(&self, _input: CreateTodo) -> Result<Todo, StorageError> {
            Err(down())
        }
        async fn update_todo(&self, _id: i32, _updates: UpdateTodo) -> Result<Option<Todo>, StorageError> {
            Err(down())
        }
        async fn delete_todo(&self, _id: i32) -> Result<bool, StorageError> {
            Err(down())
        }
        async fn get_todo_stats(&self) -> Result<TodoStats, StorageError> {
            Err(down())
        }
    }

    #[test]
    fn test_todo_lifecycle() {
        let client = test_client();

        let created = create(&client, json!({ "title": "Buy milk" }));
        assert_eq!(created.id, 1);
        assert_eq!(created.title, "Buy milk");
        assert_eq!(created.description, None);
        assert!(!created.completed);
        assert_eq!(created.priority, Priority::Medium);
        assert!(created.completed_at.is_none());

        let response = client
            .patch("/api/todos/1")
            .header(ContentType::JSON)
            .body(json!({ "completed": true }).to_string())
            .dispatch();
        assert_eq!(response.status(), Status::Ok);
        let updated = response.into_json::<Todo>().unwrap();
        assert!(updated.completed);
        assert!(updated.completed_at.unwrap() >= updated.created_at);

        let response = client.get("/api/todos/stats").dispatch();
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(
            response.into_json::<TodoStats>().unwrap(),
            TodoStats { total: 1, completed: 1, active: 0 }
        );

        let response = client.delete("/api/todos/1").dispatch();
        assert_eq!(response.status(), Status::NoContent);
        assert!(response.into_string().unwrap_or_default().is_empty());

        let response = client.get("/api/todos/1").dispatch();
        assert_eq!(response.status(), Status::NotFound);
        assert_eq!(response.into_json::<ErrorDetail>().unwrap().message, "Todo not found");
    }

    #[test]
    fn test_create_response_shape() {
        let client = test_client();
        let response = client
            .post("/api/todos")
            .header(ContentType::JSON)
            .body(json!({ "title": "Buy milk" }).to_string())
            .dispatch();
        assert_eq!(response.status(), Status::Created);
        assert_eq!(response.headers().get_one("Location"), Some("/api/todos/1"));

        let body = response.into_json::<serde_json::Value>().unwrap();
        assert_eq!(body["id"], 1);
        assert_eq!(body["priority"], "medium");
        assert_eq!(body["completed"], false);
        assert!(body["description"].is_null());
        assert!(body["completedAt"].is_null());
        assert!(body["createdAt"].is_string());
    }

    #[test]
    fn test_create_with_all_fields() {
        let client = test_client();
        let todo = create(
            &client,
            json!({ "title": "Deploy", "description": "roll out v2", "priority": "high", "completed": true }),
        );
        assert_eq!(todo.description.as_deref(), Some("roll out v2"));
        assert_eq!(todo.priority, Priority::High);
        assert!(todo.completed);
        // creation does not derive completedAt
        assert!(todo.completed_at.is_none());
    }

    #[test]
    fn test_create_rejects_invalid_bodies() {
        let client = test_client();
        let bodies = [
            json!({}).to_string(),
            json!({ "title": "" }).to_string(),
            json!({ "title": "   " }).to_string(),
            json!({ "title": "x", "priority": "urgent" }).to_string(),
            json!({ "title": 5 }).to_string(),
            "not json".to_string(),
        ];
        for body in bodies {
            let response = client
                .post("/api/todos")
                .header(ContentType::JSON)
                .body(body.clone())
                .dispatch();
            assert_eq!(response.status(), Status::BadRequest, "body: {}", body);
            let detail = response.into_json::<ErrorDetail>().unwrap();
            assert_eq!(detail.message, "Invalid todo data");
            assert!(!detail.errors.is_empty());
        }

        let stats = client.get("/api/todos/stats").dispatch().into_json::<TodoStats>().unwrap();
        assert_eq!(stats.total, 0);
    }

    #[test]
    fn test_list_todos_most_recent_first() {
        let client = test_client();
        for title in ["first", "second", "third"] {
            create(&client, json!({ "title": title }));
        }

        let response = client.get("/api/todos").dispatch();
        assert_eq!(response.status(), Status::Ok);
        let items = response.into_json::<Vec<Todo>>().unwrap();
        let titles: Vec<&str> = items.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["third", "second", "first"]);
    }

    #[test]
    fn test_stats_match_listing() {
        let client = test_client();
        for title in ["a", "b", "c", "d"] {
            create(&client, json!({ "title": title }));
        }
        for id in [1, 3] {
            client
                .patch(format!("/api/todos/{}", id))
                .header(ContentType::JSON)
                .body(json!({ "completed": true }).to_string())
                .dispatch();
        }
        client.delete("/api/todos/4").dispatch();

        let items = client.get("/api/todos").dispatch().into_json::<Vec<Todo>>().unwrap();
        let stats = client.get("/api/todos/stats").dispatch().into_json::<TodoStats>().unwrap();
        assert_eq!(stats.total, items.len());
        assert_eq!(stats.total, stats.completed + stats.active);
        assert_eq!(stats, TodoStats { total: 3, completed: 2, active: 1 });
    }

    #[test]
    fn test_non_numeric_id_is_bad_request() {
        // BrokenStorage would answer 500 if the handler reached it
        let client = test_client_with(Arc::new(BrokenStorage));

        let response = client.get("/api/todos/abc").dispatch();
        assert_eq!(response.status(), Status::BadRequest);
        assert_eq!(response.into_json::<ErrorDetail>().unwrap().message, "Invalid todo ID");

        let response = client
            .patch("/api/todos/abc")
            .header(ContentType::JSON)
            .body(json!({ "completed": true }).to_string())
            .dispatch();
        assert_eq!(response.status(), Status::BadRequest);

        let response = client.delete("/api/todos/1.5").dispatch();
        assert_eq!(response.status(), Status::BadRequest);
    }

    #[test]
    fn test_update_toggle_back_clears_completed_at() {
        let client = test_client();
        create(&client, json!({ "title": "toggle" }));

        for completed in [true, false] {
            client
                .patch("/api/todos/1")
                .header(ContentType::JSON)
                .body(json!({ "completed": completed }).to_string())
                .dispatch();
        }
        let todo = client.get("/api/todos/1").dispatch().into_json::<Todo>().unwrap();
        assert!(!todo.completed);
        assert!(todo.completed_at.is_none());
    }

    #[test]
    fn test_update_partial_fields() {
        let client = test_client();
        create(&client, json!({ "title": "draft", "description": "old" }));

        let response = client
            .patch("/api/todos/1")
            .header(ContentType::JSON)
            .body(json!({ "title": "final", "description": null, "priority": "low" }).to_string())
            .dispatch();
        assert_eq!(response.status(), Status::Ok);
        let todo = response.into_json::<Todo>().unwrap();
        assert_eq!(todo.title, "final");
        assert_eq!(todo.description, None);
        assert_eq!(todo.priority, Priority::Low);
        assert!(!todo.completed);

        // empty update returns the record untouched
        let response = client
            .patch("/api/todos/1")
            .header(ContentType::JSON)
            .body("{}")
            .dispatch();
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.into_json::<Todo>().unwrap(), todo);
    }

    #[test]
    fn test_update_errors() {
        let client = test_client();
        create(&client, json!({ "title": "x" }));

        let response = client
            .patch("/api/todos/1")
            .header(ContentType::JSON)
            .body(json!({ "title": "" }).to_string())
            .dispatch();
        assert_eq!(response.status(), Status::BadRequest);
        assert_eq!(response.into_json::<ErrorDetail>().unwrap().message, "Invalid update data");

        let response = client
            .patch("/api/todos/1")
            .header(ContentType::JSON)
            .body(json!({ "completed": "yes" }).to_string())
            .dispatch();
        assert_eq!(response.status(), Status::BadRequest);

        let response = client
            .patch("/api/todos/99")
            .header(ContentType::JSON)
            .body(json!({ "completed": true }).to_string())
            .dispatch();
        assert_eq!(response.status(), Status::NotFound);
    }

    #[test]
    fn test_update_rejects_null_for_required_fields() {
        let client = test_client();
        let before = create(&client, json!({ "title": "keep me", "priority": "high" }));

        for body in [
            json!({ "title": null }),
            json!({ "completed": null }),
            json!({ "priority": null }),
        ] {
            let response = client
                .patch("/api/todos/1")
                .header(ContentType::JSON)
                .body(body.to_string())
                .dispatch();
            assert_eq!(response.status(), Status::BadRequest, "{} accepted", body);
            assert_eq!(response.into_json::<ErrorDetail>().unwrap().message, "Invalid update data");
        }

        let after = client.get("/api/todos/1").dispatch().into_json::<Todo>().unwrap();
        assert_eq!(after, before);
    }

    #[test]
    fn test_delete_missing_todo() {
        let client = test_client();
        let response = client.delete("/api/todos/42").dispatch();
        assert_eq!(response.status(), Status::NotFound);
        assert_eq!(response.into_json::<ErrorDetail>().unwrap().message, "Todo not found");
    }

    #[test]
    fn test_storage_failures_are_internal_errors() {
        let client = test_client_with(Arc::new(BrokenStorage));

        let cases = [
            (client.get("/api/todos").dispatch(), "Failed to fetch todos"),
            (client.get("/api/todos/stats").dispatch(), "Failed to fetch todo statistics"),
            (client.get("/api/todos/1").dispatch(), "Failed to fetch todo"),
            (client.delete("/api/todos/1").dispatch(), "Failed to delete todo"),
        ];
        for (response, message) in cases {
            assert_eq!(response.status(), Status::InternalServerError);
            let detail = response.into_json::<ErrorDetail>().unwrap();
            assert_eq!(detail.message, message);
            assert!(detail.errors.is_empty(), "cause must not leak");
        }

        let response = client
            .post("/api/todos")
            .header(ContentType::JSON)
            .body(json!({ "title": "x" }).to_string())
            .dispatch();
        assert_eq!(response.status(), Status::InternalServerError);
        assert_eq!(response.into_json::<ErrorDetail>().unwrap().message, "Failed to create todo");
    }

    #[test]
    fn test_health_probes() {
        let client = test_client_with(Arc::new(BrokenStorage));

        let response = client.get("/health/ready").dispatch();
        assert_eq!(response.status(), Status::Ok);
        let ready = response.into_json::<Readiness>().unwrap();
        assert_eq!(ready.status, "ready");
        assert_eq!(ready.environment, "development");

        let response = client.get("/health/live").dispatch();
        assert_eq!(response.status(), Status::Ok);
        let live = response.into_json::<Liveness>().unwrap();
        assert_eq!(live.status, "live");
        assert!(live.uptime >= 0.0);
    }

    #[test]
    fn test_system_info() {
        let client = test_client();
        let response = client.get("/api/system-info").dispatch();
        assert_eq!(response.status(), Status::Ok);

        let raw = response.into_json::<serde_json::Value>().unwrap();
        assert_eq!(raw["cloudProvider"], "IBM Cloud");
        assert_eq!(raw["replicas"], "1/1");
        assert!(raw["lastDeploy"].is_string());

        let info: SystemInfo = serde_json::from_value(raw).unwrap();
        assert_eq!(info.version, "v1.0.0");
        assert_eq!(info.memory.total, 512);
        assert!((50..250).contains(&info.memory.used));
    }

    #[test]
    fn test_unknown_route_is_json_404() {
        let client = test_client();
        let response = client.get("/api/nothing-here").dispatch();
        assert_eq!(response.status(), Status::NotFound);
        assert_eq!(response.content_type(), Some(ContentType::JSON));
    }
}
