use async_trait::async_trait;
use taskboard_core::page::{ColumnQuery, ColumnTasksPage};
use taskboard_core::task::{Task, TaskFormValues, UpdateTask};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Transport failure, no response received.
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx response, or a 2xx response that could not be decoded.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The payload was rejected.
    #[error("validation error: {0}")]
    Validation(String),

    /// The mutation target does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound(_))
    }
}

/// Abstraction over the remote task collection.
///
/// The board synchronization layer programs against this trait.
/// `HttpTaskStore` talks to the REST resource service.
/// `LocalStore` keeps tasks in memory with the same listing semantics.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// One page of a column's tasks, newest first, filtered by the query's search term.
    async fn list(&self, query: &ColumnQuery) -> Result<ColumnTasksPage, ServiceError>;

    /// Create a task; the store assigns the id and creation timestamp before submission.
    async fn create(&self, values: &TaskFormValues) -> Result<Task, ServiceError>;

    async fn update(&self, id: &str, changes: &UpdateTask) -> Result<Task, ServiceError>;

    async fn delete(&self, id: &str) -> Result<(), ServiceError>;
}
