use serde_json::Value;

use crate::adapter::{self, TaskWrite};
use crate::error::ApiError;
use crate::model::{BackendTask, Status, Task};
use crate::transport::Transport;

pub const TASKS_PATH: &str = "/api/tasks";

/// Typed CRUD operations over the task endpoints.
///
/// Every successful response is expected to follow the
/// `{success, data, message?, count?}` envelope (delete excepted). Transport
/// failures propagate unchanged; envelope violations become
/// [`ApiError::InvalidResponse`] so callers can tell "server unreachable"
/// apart from "server answered but broke the contract".
#[derive(Clone)]
pub struct TaskRepository {
    transport: Transport,
}

impl TaskRepository {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    pub async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        let v = self.transport.get(TASKS_PATH).await?;

        if !envelope_success(&v) {
            return Err(ApiError::InvalidResponse(
                "list: envelope success flag is not true".to_string(),
            ));
        }
        let Some(data) = v.get("data").filter(|d| d.is_array()) else {
            return Err(ApiError::InvalidResponse(
                "list: envelope data is not an array".to_string(),
            ));
        };

        let backend: Vec<BackendTask> = serde_json::from_value(data.clone())
            .map_err(|e| ApiError::InvalidResponse(format!("list: malformed task: {e}")))?;
        let tasks = backend.into_iter().map(adapter::to_ui).collect();
        tracing::debug!(target: "tablero.repo", stage = "list.out", count = %v["count"]);
        Ok(tasks)
    }

    pub async fn create_task(
        &self,
        title: &str,
        description: &str,
        completed: bool,
    ) -> Result<Task, ApiError> {
        let body = full_write(title, description, completed);
        let v = self.transport.post(TASKS_PATH, &body).await?;
        parse_task_envelope(&v, "create")
    }

    pub async fn update_task(
        &self,
        id: i64,
        title: &str,
        description: &str,
        completed: bool,
    ) -> Result<Task, ApiError> {
        let body = full_write(title, description, completed);
        let v = self
            .transport
            .put(&format!("{TASKS_PATH}/{id}"), &body)
            .await?;
        parse_task_envelope(&v, "update")
    }

    /// DELETE has no envelope to validate: not failing is success.
    pub async fn delete_task(&self, id: i64) -> Result<(), ApiError> {
        self.transport
            .delete(&format!("{TASKS_PATH}/{id}"))
            .await?;
        Ok(())
    }

    /// Partial update carrying only `{completed}`, kept separate from
    /// [`TaskRepository::update_task`] to preserve both call shapes the
    /// service accepts on the same endpoint.
    pub async fn set_completed(&self, id: i64, completed: bool) -> Result<Task, ApiError> {
        let body = adapter::to_backend(None, None, Some(Status::from_completed(completed)));
        let v = self
            .transport
            .put(&format!("{TASKS_PATH}/{id}"), &body)
            .await?;
        parse_task_envelope(&v, "toggle")
    }
}

fn full_write(title: &str, description: &str, completed: bool) -> TaskWrite {
    adapter::to_backend(
        Some(title),
        Some(description),
        Some(Status::from_completed(completed)),
    )
}

fn envelope_success(v: &Value) -> bool {
    v.get("success").and_then(Value::as_bool).unwrap_or(false)
}

fn parse_task_envelope(v: &Value, what: &str) -> Result<Task, ApiError> {
    if !envelope_success(v) {
        return Err(ApiError::InvalidResponse(format!(
            "{what}: envelope success flag is not true"
        )));
    }
    let Some(data) = v.get("data").filter(|d| !d.is_null()) else {
        return Err(ApiError::InvalidResponse(format!(
            "{what}: envelope data is missing"
        )));
    };
    let backend: BackendTask = serde_json::from_value(data.clone())
        .map_err(|e| ApiError::InvalidResponse(format!("{what}: malformed task: {e}")))?;
    Ok(adapter::to_ui(backend))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use pretty_assertions::assert_eq;

    async fn repo(server: &Server) -> TaskRepository {
        TaskRepository::new(Transport::new(&server.url(), 1_000).unwrap())
    }

    #[tokio::test]
    async fn test_list_tasks_adapts_backend_shape() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/tasks")
            .with_status(200)
            .with_body(
                r#"{"success":true,"count":2,"data":[
                    {"id":1,"title":"Comprar leche","description":"","completed":false,
                     "createdAt":"c","updatedAt":"u"},
                    {"id":2,"title":"Enviar reporte","description":"mensual","completed":true,
                     "createdAt":"c","updatedAt":"u"}]}"#,
            )
            .create_async()
            .await;

        let tasks = repo(&server).await.list_tasks().await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].status, Status::Pending);
        assert_eq!(tasks[1].status, Status::Completed);
        assert_eq!(tasks[1].description, "mensual");
    }

    #[tokio::test]
    async fn test_list_tasks_rejects_failed_envelope() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/tasks")
            .with_status(200)
            .with_body(r#"{"success":false}"#)
            .create_async()
            .await;

        let err = repo(&server).await.list_tasks().await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_list_tasks_rejects_non_array_data() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/tasks")
            .with_status(200)
            .with_body(r#"{"success":true,"data":{"id":1}}"#)
            .create_async()
            .await;

        let err = repo(&server).await.list_tasks().await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_create_task_returns_adapted_task() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/api/tasks")
            .match_body(Matcher::Json(serde_json::json!({
                "title": "Buy milk",
                "description": "",
                "completed": false
            })))
            .with_status(201)
            .with_body(
                r#"{"success":true,"message":"created","data":
                    {"id":7,"title":"Buy milk","description":"","completed":false,
                     "createdAt":"c","updatedAt":"u"}}"#,
            )
            .create_async()
            .await;

        let task = repo(&server)
            .await
            .create_task("Buy milk", "", false)
            .await
            .unwrap();
        assert_eq!(
            task,
            Task {
                id: 7,
                title: "Buy milk".to_string(),
                description: "".to_string(),
                status: Status::Pending,
            }
        );
    }

    #[tokio::test]
    async fn test_create_conflict_surfaces_backend_message() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/api/tasks")
            .with_status(409)
            .with_body(
                r#"{"error":"Conflict","message":"Task with title 'X' already exists",
                    "timestamp":"t","path":"/api/tasks"}"#,
            )
            .create_async()
            .await;

        let err = repo(&server)
            .await
            .create_task("X", "", false)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Task with title 'X' already exists");
    }

    #[tokio::test]
    async fn test_set_completed_sends_partial_body() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("PUT", "/api/tasks/5")
            .match_body(Matcher::Json(serde_json::json!({"completed": true})))
            .with_status(200)
            .with_body(
                r#"{"success":true,"message":"updated","data":
                    {"id":5,"title":"t","description":"d","completed":true,
                     "createdAt":"c","updatedAt":"u"}}"#,
            )
            .create_async()
            .await;

        let task = repo(&server).await.set_completed(5, true).await.unwrap();
        assert_eq!(task.status, Status::Completed);
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_skips_envelope_validation() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("DELETE", "/api/tasks/9")
            .with_status(200)
            .with_body(r#"{"success":false}"#)
            .create_async()
            .await;

        // Absence of a thrown error is success for delete.
        repo(&server).await.delete_task(9).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_missing_data_is_invalid_response() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("PUT", "/api/tasks/2")
            .with_status(200)
            .with_body(r#"{"success":true,"message":"ok"}"#)
            .create_async()
            .await;

        let err = repo(&server)
            .await
            .update_task(2, "t", "d", true)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }
}
