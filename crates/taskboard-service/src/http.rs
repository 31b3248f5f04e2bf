use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Response, StatusCode};
use taskboard_core::page::{ColumnQuery, ColumnTasksPage};
use taskboard_core::task::{Task, TaskFormValues, UpdateTask};
use tracing::debug;

use crate::id::generate_task_id;
use crate::{ServiceError, TaskStore};

/// Response header carrying the number of rows matching a listing.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Async HTTP client implementation of TaskStore.
/// Talks to a REST resource service exposing `/tasks`.
pub struct HttpTaskStore {
    base_url: String,
    client: Client,
}

impl HttpTaskStore {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: &str, client: Client) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let resp = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        handle_response(resp).await
    }

    async fn patch_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let resp = self
            .client
            .patch(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        handle_response(resp).await
    }

    async fn delete_req(&self, path: &str) -> Result<(), ServiceError> {
        let resp = self
            .client
            .delete(format!("{}{path}", self.base_url))
            .send()
            .await
            .map_err(transport_error)?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(parse_error(resp).await)
        }
    }
}

fn transport_error(e: reqwest::Error) -> ServiceError {
    ServiceError::Network(e.to_string())
}

async fn handle_response<T: serde::de::DeserializeOwned>(resp: Response) -> Result<T, ServiceError> {
    let status = resp.status();
    if status.is_success() {
        resp.json::<T>().await.map_err(|e| ServiceError::Server {
            status: status.as_u16(),
            message: format!("json decode: {e}"),
        })
    } else {
        Err(parse_error_with_status(status, resp).await)
    }
}

async fn parse_error(resp: Response) -> ServiceError {
    let status = resp.status();
    parse_error_with_status(status, resp).await
}

async fn parse_error_with_status(status: StatusCode, resp: Response) -> ServiceError {
    let body = resp.text().await.unwrap_or_default();
    let msg = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["error"].as_str().map(String::from))
        .unwrap_or(body);

    match status {
        StatusCode::NOT_FOUND => ServiceError::NotFound(msg),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ServiceError::Validation(msg),
        _ => ServiceError::Server {
            status: status.as_u16(),
            message: msg,
        },
    }
}

/// Missing or malformed counts read as zero.
fn total_count(resp: &Response) -> u64 {
    resp.headers()
        .get(TOTAL_COUNT_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

#[async_trait]
impl TaskStore for HttpTaskStore {
    async fn list(&self, query: &ColumnQuery) -> Result<ColumnTasksPage, ServiceError> {
        let mut params: Vec<(&str, String)> = vec![
            ("column", query.column.as_str().to_string()),
            ("_page", query.page.to_string()),
            ("_limit", query.page_size.to_string()),
            ("_sort", "createdAt".to_string()),
            ("_order", "desc".to_string()),
        ];
        if let Some(term) = query.search_term() {
            params.push(("q", term.to_string()));
        }
        debug!(
            "GET /tasks column={} page={} q={:?}",
            query.column.as_str(),
            query.page,
            query.search_term()
        );

        let resp = self
            .client
            .get(format!("{}/tasks", self.base_url))
            .query(&params)
            .send()
            .await
            .map_err(transport_error)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(parse_error_with_status(status, resp).await);
        }
        let total = total_count(&resp);
        let tasks: Vec<Task> = resp.json().await.map_err(|e| ServiceError::Server {
            status: status.as_u16(),
            message: format!("json decode: {e}"),
        })?;
        Ok(ColumnTasksPage::new(tasks, total, query.page, query.page_size))
    }

    async fn create(&self, values: &TaskFormValues) -> Result<Task, ServiceError> {
        let now = Utc::now();
        let task = Task::from_form(generate_task_id(now), now, values.clone());
        debug!("POST /tasks id={}", task.id);
        self.post_json("/tasks", &task).await
    }

    async fn update(&self, id: &str, changes: &UpdateTask) -> Result<Task, ServiceError> {
        debug!("PATCH /tasks/{id}");
        self.patch_json(&format!("/tasks/{id}"), changes).await
    }

    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        debug!("DELETE /tasks/{id}");
        self.delete_req(&format!("/tasks/{id}")).await
    }
}
