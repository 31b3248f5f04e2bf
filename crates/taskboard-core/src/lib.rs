pub mod form;
pub mod page;
pub mod task;

pub use form::{validate, FormErrors};
pub use page::{ColumnQuery, ColumnTasksPage, DEFAULT_PAGE_SIZE};
pub use task::{ColumnId, Priority, Task, TaskFormValues, UpdateTask};
