//! In-process stand-in for the remote task resource service.
//!
//! Serves `/tasks` with the same query parameters, total-count header and
//! status codes the board client expects, backed by a `LocalStore`.

mod routes;
#[cfg(feature = "test-helpers")]
pub mod test_helpers;

use std::sync::Arc;

use anyhow::Result;
use taskboard_service::LocalStore;
use tokio::net::TcpListener;
use tracing::info;

pub use routes::{build_router, AppState, InnerAppState};

pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    info!("task store listening on http://{}", listener.local_addr()?);
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

pub fn app_state(store: Arc<LocalStore>) -> AppState {
    Arc::new(InnerAppState::new(store))
}
