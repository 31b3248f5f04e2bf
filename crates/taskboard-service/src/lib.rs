mod http;
mod id;
mod local;
mod traits;

pub use http::{HttpTaskStore, TOTAL_COUNT_HEADER};
pub use id::generate_task_id;
pub use local::{LocalStore, TaskFilter};
pub use traits::{ServiceError, TaskStore};
