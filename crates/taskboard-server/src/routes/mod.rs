pub mod tasks;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::Router;
use taskboard_service::{LocalStore, ServiceError};

pub struct InnerAppState {
    pub store: Arc<LocalStore>,
    /// When set, every mutating request fails with 503.
    pub reject_writes: AtomicBool,
}

impl InnerAppState {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self {
            store,
            reject_writes: AtomicBool::new(false),
        }
    }

    fn check_writable(&self) -> Result<(), ServiceError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            Err(ServiceError::Server {
                status: 503,
                message: "writes are currently rejected".into(),
            })
        } else {
            Ok(())
        }
    }
}

pub type AppState = Arc<InnerAppState>;

pub fn build_router(state: AppState) -> Router {
    Router::new().merge(tasks::routes()).with_state(state)
}
