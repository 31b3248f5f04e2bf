use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use taskboard_core::page::{ColumnQuery, ColumnTasksPage};
use taskboard_core::task::{ColumnId, Priority, Task, TaskFormValues, UpdateTask};
use taskboard_service::{LocalStore, ServiceError, TaskStore};
use tokio::sync::Notify;

pub fn task(id: &str, column: ColumnId, minute: i64) -> Task {
    Task {
        id: id.into(),
        title: format!("Task {id}"),
        description: String::new(),
        column,
        priority: Priority::Medium,
        created_at: Utc.with_ymd_and_hms(2024, 4, 1, 8, 0, 0).unwrap() + Duration::minutes(minute),
    }
}

/// Store whose `list` answers with the data as of the request, then
/// holds the response until `release` is called. Writes pass straight
/// through, or fail with a 503 when `fail_writes` is set.
pub struct GatedStore {
    pub inner: LocalStore,
    gate: Notify,
    calls: AtomicUsize,
    fail_writes: AtomicBool,
}

impl GatedStore {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            inner: LocalStore::with_tasks(tasks),
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Let one pending (or the next) `list` response through.
    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), ServiceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(ServiceError::Server {
                status: 503,
                message: "unavailable".into(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TaskStore for GatedStore {
    async fn list(&self, query: &ColumnQuery) -> Result<ColumnTasksPage, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let page = self.inner.list(query).await;
        self.gate.notified().await;
        page
    }

    async fn create(&self, values: &TaskFormValues) -> Result<Task, ServiceError> {
        self.check_writable()?;
        self.inner.create(values).await
    }

    async fn update(&self, id: &str, changes: &UpdateTask) -> Result<Task, ServiceError> {
        self.check_writable()?;
        self.inner.update(id, changes).await
    }

    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        self.check_writable()?;
        self.inner.delete(id).await
    }
}
