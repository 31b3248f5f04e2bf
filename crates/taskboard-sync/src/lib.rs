pub mod board;
pub mod cache;
pub mod config;
pub mod coordinator;
pub mod drag;
pub mod error;
pub mod form;
pub mod state;
#[cfg(test)]
mod test_support;

pub use board::Board;
pub use cache::{CacheKey, CacheSnapshot, ColumnQueryCache, ColumnView, LoadOutcome};
pub use config::ClientConfig;
pub use coordinator::{AppliedMove, MoveCoordinator, MoveOutcome, MoveTask};
pub use drag::{closest_corners, DragEvent, DragOrchestrator, DragState, DropData, DropTarget, PointerSensor};
pub use error::BoardError;
pub use form::{FormAction, FormField, SubmitRequest, TaskForm};
pub use state::{BoardState, ModalMode, ModalState};
