//! Integration tests for HttpTaskStore against a real server.
//!
//! Each test spawns an in-process axum server on 127.0.0.1:0 backed by an
//! in-memory store, then exercises the HTTP client through the full
//! request/response cycle.

use chrono::{Duration, TimeZone, Utc};
use taskboard_core::page::ColumnQuery;
use taskboard_core::task::{ColumnId, Priority, Task, TaskFormValues, UpdateTask};
use taskboard_server::test_helpers::{spawn_test_server, spawn_test_server_with};
use taskboard_service::{HttpTaskStore, ServiceError, TaskStore};

fn task(id: &str, column: ColumnId, minute: i64) -> Task {
    Task {
        id: id.into(),
        title: format!("Task {id}"),
        description: format!("details for {id}"),
        column,
        priority: Priority::Medium,
        created_at: Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap() + Duration::minutes(minute),
    }
}

fn backlog(n: usize) -> Vec<Task> {
    (0..n)
        .map(|i| task(&format!("b{i}"), ColumnId::Backlog, i as i64))
        .collect()
}

#[tokio::test]
async fn list_pages_newest_first_with_total() {
    let server = spawn_test_server_with(backlog(10)).await;
    let store = HttpTaskStore::new(&server.base_url);

    let first = store
        .list(&ColumnQuery::new(ColumnId::Backlog, 1, 8, ""))
        .await
        .unwrap();
    assert_eq!(first.tasks.len(), 8);
    assert_eq!(first.total, 10);
    assert_eq!(first.page, 1);
    assert!(first.has_next_page);
    assert_eq!(first.tasks[0].id, "b9");

    let second = store
        .list(&ColumnQuery::new(ColumnId::Backlog, 2, 8, ""))
        .await
        .unwrap();
    assert_eq!(second.tasks.len(), 2);
    assert!(!second.has_next_page);

    let beyond = store
        .list(&ColumnQuery::new(ColumnId::Backlog, 3, 8, ""))
        .await
        .unwrap();
    assert!(beyond.tasks.is_empty());
    assert!(!beyond.has_next_page);
}

#[tokio::test]
async fn list_search_only_returns_matches() {
    let mut tasks = backlog(3);
    tasks[1].title = "Refactor PARSER".into();
    let server = spawn_test_server_with(tasks).await;
    let store = HttpTaskStore::new(&format!("{}/", server.base_url));

    let page = store
        .list(&ColumnQuery::new(ColumnId::Backlog, 1, 8, "  parser "))
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.tasks[0].id, "b1");
    assert!(page.tasks.iter().all(|t| t.matches_search("parser")));
}

#[tokio::test]
async fn create_then_list_shows_task_once() {
    let server = spawn_test_server().await;
    let store = HttpTaskStore::new(&server.base_url);

    let created = store
        .create(&TaskFormValues {
            title: "Fix bug".into(),
            description: String::new(),
            column: ColumnId::Backlog,
            priority: Priority::High,
        })
        .await
        .unwrap();
    assert!(created.id.starts_with('t'));
    assert_eq!(created.priority, Priority::High);

    let page = store
        .list(&ColumnQuery::new(ColumnId::Backlog, 1, 8, ""))
        .await
        .unwrap();
    let hits = page.tasks.iter().filter(|t| t.id == created.id).count();
    assert_eq!(hits, 1);
    assert_eq!(page.tasks[0].created_at, created.created_at);
}

#[tokio::test]
async fn update_is_partial() {
    let server = spawn_test_server_with(backlog(1)).await;
    let store = HttpTaskStore::new(&server.base_url);

    let updated = store
        .update("b0", &UpdateTask::move_to(ColumnId::Done))
        .await
        .unwrap();
    assert_eq!(updated.column, ColumnId::Done);
    assert_eq!(updated.title, "Task b0");
    assert_eq!(updated.description, "details for b0");
}

#[tokio::test]
async fn delete_twice_surfaces_not_found() {
    let server = spawn_test_server_with(backlog(1)).await;
    let store = HttpTaskStore::new(&server.base_url);

    store.delete("b0").await.unwrap();
    let err = store.delete("b0").await.unwrap_err();
    assert!(err.is_not_found(), "{err:?}");
}

#[tokio::test]
async fn rejected_title_is_a_validation_error() {
    let server = spawn_test_server_with(backlog(1)).await;
    let store = HttpTaskStore::new(&server.base_url);

    let err = store
        .update(
            "b0",
            &UpdateTask {
                title: Some("   ".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)), "{err:?}");
}

#[tokio::test]
async fn non_2xx_is_a_server_error() {
    let server = spawn_test_server_with(backlog(1)).await;
    server.reject_writes(true);
    let store = HttpTaskStore::new(&server.base_url);

    let err = store
        .update("b0", &UpdateTask::move_to(ColumnId::Review))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Server { status: 503, .. }), "{err:?}");
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = HttpTaskStore::new(&format!("http://{addr}"));
    let err = store
        .list(&ColumnQuery::new(ColumnId::Backlog, 1, 8, ""))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Network(_)), "{err:?}");
}
