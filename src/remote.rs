use crate::errors::{AppError, AppResult};
use crate::models::{Task, TaskInput, TaskPatch, TaskPriority, TaskStatus};
use crate::validation::{validate_create, validate_update};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const TASKS_TABLE: &str = "tasks";

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub url: String,
    pub anon_key: String,
}

impl RemoteConfig {
    /// Reads `SUPABASE_URL` / `SUPABASE_ANON_KEY`; either missing or empty
    /// means the remote path stays disabled and the app runs local-only.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("SUPABASE_URL").ok()?;
        let anon_key = std::env::var("SUPABASE_ANON_KEY").ok()?;
        if url.trim().is_empty() || anon_key.trim().is_empty() {
            return None;
        }
        Some(Self { url, anon_key })
    }
}

/// Row shape as the remote table returns it. Optional columns are normalized
/// into the grid's `Task` on the way in.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteTaskRow {
    id: String,
    title: String,
    status: TaskStatus,
    priority: TaskPriority,
    assignee: Option<String>,
    due_date: Option<String>,
    progress: Option<f64>,
}

impl From<RemoteTaskRow> for Task {
    fn from(row: RemoteTaskRow) -> Self {
        Task {
            id: row.id,
            title: row.title,
            status: row.status,
            priority: row.priority,
            assignee: row.assignee.unwrap_or_default(),
            due_date: row.due_date.unwrap_or_default(),
            progress: row.progress,
            description: None,
            start_date: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertRow<'a> {
    id: String,
    title: &'a str,
    status: &'a str,
    priority: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    assignee: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    progress: Option<f64>,
}

/// Client for the optional hosted record store. Without credentials it serves
/// a fixed mock list so the UI stays usable; with credentials it issues plain
/// CRUD calls with no retry and no offline queue.
#[derive(Debug, Clone)]
pub struct RemoteTaskStore {
    client: reqwest::Client,
    config: Option<RemoteConfig>,
}

impl RemoteTaskStore {
    pub fn new(config: Option<RemoteConfig>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn from_env() -> Self {
        Self::new(RemoteConfig::from_env())
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    fn endpoint(&self, config: &RemoteConfig) -> String {
        format!("{}/rest/v1/{}", config.url.trim_end_matches('/'), TASKS_TABLE)
    }

    fn authed(&self, config: &RemoteConfig, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &config.anon_key)
            .bearer_auth(&config.anon_key)
    }

    fn not_configured() -> AppError {
        AppError::Transport("remote task store not configured".to_string())
    }

    fn transport(operation: &str, detail: impl std::fmt::Display) -> AppError {
        tracing::error!(%detail, operation, "remote task store call failed");
        AppError::Transport(format!("failed to {}", operation))
    }

    pub async fn list_tasks(&self) -> AppResult<Vec<Task>> {
        let Some(config) = &self.config else {
            tracing::warn!("remote task store not configured, returning mock data");
            return Ok(mock_tasks());
        };

        let response = self
            .authed(
                config,
                self.client
                    .get(self.endpoint(config))
                    .query(&[("select", "*"), ("order", "created_at.desc")]),
            )
            .send()
            .await
            .map_err(|err| Self::transport("fetch tasks", err))?;
        if !response.status().is_success() {
            return Err(Self::transport("fetch tasks", response.status()));
        }
        let rows: Vec<RemoteTaskRow> = response
            .json()
            .await
            .map_err(|err| Self::transport("fetch tasks", err))?;
        Ok(rows.into_iter().map(Task::from).collect())
    }

    pub async fn get_task(&self, id: &str) -> AppResult<Task> {
        let config = self.config.as_ref().ok_or_else(Self::not_configured)?;

        let filter = format!("eq.{}", id);
        let response = self
            .authed(
                config,
                self.client
                    .get(self.endpoint(config))
                    .query(&[("select", "*"), ("id", filter.as_str())]),
            )
            .send()
            .await
            .map_err(|err| Self::transport("fetch task", err))?;
        if !response.status().is_success() {
            return Err(Self::transport("fetch task", response.status()));
        }
        let mut rows: Vec<RemoteTaskRow> = response
            .json()
            .await
            .map_err(|err| Self::transport("fetch task", err))?;
        match rows.pop() {
            Some(row) => Ok(Task::from(row)),
            None => Err(AppError::NotFound(format!("task {}", id))),
        }
    }

    /// Validates, then inserts. A validation failure never reaches the wire.
    pub async fn create_task(&self, input: &TaskInput) -> AppResult<Task> {
        let input = validate_create(input)?;
        let config = self.config.as_ref().ok_or_else(Self::not_configured)?;

        let row = InsertRow {
            id: Uuid::new_v4().to_string(),
            title: &input.title,
            status: &input.status,
            priority: &input.priority,
            assignee: input.assignee.as_deref(),
            due_date: input.due_date.as_deref(),
            progress: input.progress,
        };

        let response = self
            .authed(
                config,
                self.client
                    .post(self.endpoint(config))
                    .header("Prefer", "return=representation")
                    .json(&[row]),
            )
            .send()
            .await
            .map_err(|err| Self::transport("create task", err))?;
        if !response.status().is_success() {
            return Err(Self::transport("create task", response.status()));
        }
        let mut rows: Vec<RemoteTaskRow> = response
            .json()
            .await
            .map_err(|err| Self::transport("create task", err))?;
        rows.pop()
            .map(Task::from)
            .ok_or_else(|| Self::transport("create task", "empty representation"))
    }

    /// Partial update: the same rules as create with every field optional.
    pub async fn update_task(&self, id: &str, patch: &TaskPatch) -> AppResult<Task> {
        let patch = validate_update(patch)?;
        let config = self.config.as_ref().ok_or_else(Self::not_configured)?;

        let filter = format!("eq.{}", id);
        let response = self
            .authed(
                config,
                self.client
                    .patch(self.endpoint(config))
                    .query(&[("id", filter.as_str())])
                    .header("Prefer", "return=representation")
                    .json(&patch),
            )
            .send()
            .await
            .map_err(|err| Self::transport("update task", err))?;
        if !response.status().is_success() {
            return Err(Self::transport("update task", response.status()));
        }
        let mut rows: Vec<RemoteTaskRow> = response
            .json()
            .await
            .map_err(|err| Self::transport("update task", err))?;
        match rows.pop() {
            Some(row) => Ok(Task::from(row)),
            None => Err(AppError::NotFound(format!("task {}", id))),
        }
    }

    pub async fn delete_task(&self, id: &str) -> AppResult<()> {
        let config = self.config.as_ref().ok_or_else(Self::not_configured)?;

        let filter = format!("eq.{}", id);
        let response = self
            .authed(
                config,
                self.client
                    .delete(self.endpoint(config))
                    .query(&[("id", filter.as_str())]),
            )
            .send()
            .await
            .map_err(|err| Self::transport("delete task", err))?;
        if !response.status().is_success() {
            return Err(Self::transport("delete task", response.status()));
        }
        Ok(())
    }
}

fn today() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Fixed stand-in list for the unconfigured path, dated today so the calendar
/// and gantt views have something visible.
pub fn mock_tasks() -> Vec<Task> {
    let today = today();
    let task = |id: &str, title: &str, status, priority, assignee: &str, progress: f64| Task {
        id: id.to_string(),
        title: title.to_string(),
        status,
        priority,
        assignee: assignee.to_string(),
        due_date: today.clone(),
        progress: Some(progress),
        description: None,
        start_date: None,
    };
    vec![
        task("1", "Sample Task", TaskStatus::Todo, TaskPriority::Medium, "User", 30.0),
        task("2", "Another Task", TaskStatus::InProgress, TaskPriority::High, "Admin", 65.0),
        task("3", "Completed Task", TaskStatus::Done, TaskPriority::Low, "User", 100.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_store_serves_the_mock_list() {
        let store = RemoteTaskStore::new(None);
        assert!(!store.is_configured());
        let tasks = store.list_tasks().await.expect("mock list");
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].progress, Some(30.0));
        assert_eq!(tasks[2].status, TaskStatus::Done);
        assert_eq!(tasks[1].due_date, today());
    }

    #[tokio::test]
    async fn unconfigured_writes_fail_with_transport_error() {
        let store = RemoteTaskStore::new(None);
        let err = store.delete_task("1").await.expect_err("must fail");
        assert!(matches!(err, AppError::Transport(_)));
    }

    #[tokio::test]
    async fn create_rejects_invalid_input_before_any_network_call() {
        // configured with an unroutable URL: validation must fail first
        let store = RemoteTaskStore::new(Some(RemoteConfig {
            url: "http://127.0.0.1:1".to_string(),
            anon_key: "key".to_string(),
        }));
        let input = TaskInput {
            title: String::new(),
            status: "Archived".to_string(),
            priority: "High".to_string(),
            assignee: None,
            due_date: None,
            progress: Some(101.0),
        };
        let err = store.create_task(&input).await.expect_err("invalid input");
        match err {
            AppError::Validation(errors) => {
                assert!(errors.field("title").is_some());
                assert!(errors.field("status").is_some());
                assert!(errors.field("progress").is_some());
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn endpoint_joins_url_without_double_slash() {
        let store = RemoteTaskStore::new(None);
        let config = RemoteConfig {
            url: "https://example.supabase.co/".to_string(),
            anon_key: "key".to_string(),
        };
        assert_eq!(
            store.endpoint(&config),
            "https://example.supabase.co/rest/v1/tasks"
        );
    }
}
