use serde::{Deserialize, Serialize};

use crate::task::{ColumnId, Task};

pub const DEFAULT_PAGE_SIZE: u32 = 8;

/// `true` when rows remain after `page` (1-based) of `page_size` rows.
pub fn has_next_page(page: u32, page_size: u32, total: u64) -> bool {
    u64::from(page) * u64::from(page_size) < total
}

/// Parameters of one listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnQuery {
    pub column: ColumnId,
    pub page: u32,
    pub page_size: u32,
    pub search: String,
}

impl ColumnQuery {
    pub fn new(column: ColumnId, page: u32, page_size: u32, search: &str) -> Self {
        Self {
            column,
            page: page.max(1),
            page_size,
            search: search.to_string(),
        }
    }

    /// Trimmed search term, or `None` when the listing is unfiltered.
    pub fn search_term(&self) -> Option<&str> {
        let term = self.search.trim();
        (!term.is_empty()).then_some(term)
    }
}

/// One fetched page of a column's newest-first listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnTasksPage {
    pub tasks: Vec<Task>,
    pub total: u64,
    pub page: u32,
    pub has_next_page: bool,
}

impl ColumnTasksPage {
    pub fn new(tasks: Vec<Task>, total: u64, page: u32, page_size: u32) -> Self {
        Self {
            tasks,
            total,
            page,
            has_next_page: has_next_page(page, page_size, total),
        }
    }

    /// Remove the task with `id`, decrementing `total`. Returns whether it was present.
    pub fn remove_task(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed = self.tasks.len() != before;
        if removed {
            self.total = self.total.saturating_sub(1);
        }
        removed
    }
}
