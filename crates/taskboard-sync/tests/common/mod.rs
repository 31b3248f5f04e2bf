#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use taskboard_core::page::{ColumnQuery, ColumnTasksPage};
use taskboard_core::task::{ColumnId, Priority, Task, TaskFormValues, UpdateTask};
use taskboard_server::test_helpers::{spawn_test_server_with, TestServer};
use taskboard_service::{HttpTaskStore, ServiceError, TaskStore};
use taskboard_sync::{Board, ClientConfig};
use tokio::sync::Notify;

pub fn task(id: &str, column: ColumnId, minute: i64) -> Task {
    Task {
        id: id.into(),
        title: format!("Task {id}"),
        description: String::new(),
        column,
        priority: Priority::Medium,
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap() + Duration::minutes(minute),
    }
}

pub fn tasks_in(column: ColumnId, prefix: &str, n: usize) -> Vec<Task> {
    (0..n)
        .map(|i| task(&format!("{prefix}{i}"), column, i as i64))
        .collect()
}

/// HTTP store that counts every request it issues. Writes can be held
/// back until released.
pub struct CountingStore {
    inner: HttpTaskStore,
    pub lists: AtomicUsize,
    pub writes: AtomicUsize,
    hold_writes: AtomicBool,
    release: Notify,
}

impl CountingStore {
    pub fn hold_writes(&self, hold: bool) {
        self.hold_writes.store(hold, Ordering::SeqCst);
    }

    pub fn release_write(&self) {
        self.release.notify_one();
    }

    async fn before_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.hold_writes.load(Ordering::SeqCst) {
            self.release.notified().await;
        }
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn lists(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskStore for CountingStore {
    async fn list(&self, query: &ColumnQuery) -> Result<ColumnTasksPage, ServiceError> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.inner.list(query).await
    }

    async fn create(&self, values: &TaskFormValues) -> Result<Task, ServiceError> {
        self.before_write().await;
        self.inner.create(values).await
    }

    async fn update(&self, id: &str, changes: &UpdateTask) -> Result<Task, ServiceError> {
        self.before_write().await;
        self.inner.update(id, changes).await
    }

    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        self.before_write().await;
        self.inner.delete(id).await
    }
}

/// Spawn a seeded server and a board talking to it over HTTP.
pub async fn board_with(tasks: Vec<Task>) -> (TestServer, Arc<CountingStore>, Board) {
    let server = spawn_test_server_with(tasks).await;
    let store = Arc::new(CountingStore {
        inner: HttpTaskStore::new(&server.base_url),
        lists: AtomicUsize::new(0),
        writes: AtomicUsize::new(0),
        hold_writes: AtomicBool::new(false),
        release: Notify::new(),
    });
    let config = ClientConfig {
        api_base: server.base_url.clone(),
        ..ClientConfig::default()
    };
    let board = Board::new(store.clone(), &config);
    (server, store, board)
}

pub fn ids(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|t| t.id.as_str()).collect()
}
