use taskboard_core::task::{ColumnId, Task};

use crate::cache::CacheKey;

/// Which flavour of form the modal shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalMode {
    #[default]
    Create,
    Edit,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModalState {
    pub open: bool,
    pub mode: ModalMode,
    /// Task being edited; `None` in create mode.
    pub task: Option<Task>,
    pub default_column: ColumnId,
}

/// Interaction state shared by the board's views.
///
/// Owned by the `Board` and handed out by reference; nothing here is
/// global.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardState {
    pub search: String,
    pub modal: ModalState,
    /// Visual feedback only.
    pub dragging_task_id: Option<String>,
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the search text. Every column's cache key changes with it.
    pub fn set_search(&mut self, text: &str) {
        self.search = text.to_string();
    }

    pub fn open_create_modal(&mut self, column: Option<ColumnId>) {
        self.modal = ModalState {
            open: true,
            mode: ModalMode::Create,
            task: None,
            default_column: column.unwrap_or_default(),
        };
    }

    pub fn open_edit_modal(&mut self, task: &Task) {
        self.modal = ModalState {
            open: true,
            mode: ModalMode::Edit,
            task: Some(task.clone()),
            default_column: task.column,
        };
    }

    pub fn close_modal(&mut self) {
        self.modal = ModalState::default();
    }

    pub fn set_dragging_task_id(&mut self, id: Option<String>) {
        self.dragging_task_id = id;
    }

    /// Cache key a column is currently showing.
    pub fn column_key(&self, column: ColumnId) -> CacheKey {
        CacheKey::new(column, &self.search)
    }

    pub fn column_keys(&self) -> Vec<CacheKey> {
        ColumnId::ALL.iter().map(|c| self.column_key(*c)).collect()
    }
}
