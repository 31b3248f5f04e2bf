use std::sync::atomic::Ordering;
use std::sync::Arc;

use taskboard_core::task::Task;
use taskboard_service::LocalStore;
use tokio::net::TcpListener;

use crate::AppState;

/// A running test server with base_url and background task handle.
pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    _handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub fn store(&self) -> &LocalStore {
        &self.state.store
    }

    /// Make POST/PATCH/DELETE fail with a 503 until reset.
    pub fn reject_writes(&self, reject: bool) {
        self.state.reject_writes.store(reject, Ordering::SeqCst);
    }
}

/// Spawn an axum test server on a random port with an empty store.
pub async fn spawn_test_server() -> TestServer {
    spawn_test_server_with(Vec::new()).await
}

/// Spawn an axum test server on a random port, seeded with `tasks`.
/// Returns the TestServer with the `base_url` (e.g. "http://127.0.0.1:12345").
pub async fn spawn_test_server_with(tasks: Vec<Task>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");
    let state = crate::app_state(Arc::new(LocalStore::with_tasks(tasks)));
    let handle = tokio::spawn({
        let state = state.clone();
        async move {
            crate::serve(listener, state).await.unwrap();
        }
    });
    TestServer {
        base_url,
        state,
        _handle: handle,
    }
}
