use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use taskboard_core::form::TITLE_MAX_CHARS;
use taskboard_core::page::{ColumnQuery, ColumnTasksPage};
use taskboard_core::task::{ColumnId, Task, TaskFormValues, UpdateTask};

use crate::id::generate_task_id;
use crate::{ServiceError, TaskStore};

/// Row selection over the in-memory collection.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub column: Option<ColumnId>,
    pub search: Option<String>,
    /// 1-based page; ignored unless `limit` is set.
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub oldest_first: bool,
}

/// In-memory task collection with the remote service's listing semantics:
/// column filter, case-insensitive search on title/description,
/// creation-time ordering, and page slicing with a total count.
#[derive(Debug, Default)]
pub struct LocalStore {
    tasks: RwLock<Vec<Task>>,
}

impl LocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: RwLock::new(tasks),
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &str) -> Result<Task, ServiceError> {
        self.read()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("task {id}")))
    }

    /// Store a fully-formed task whose id was chosen by the caller.
    pub fn insert(&self, task: Task) -> Result<Task, ServiceError> {
        check_title(&task.title)?;
        let mut tasks = self.write();
        if tasks.iter().any(|t| t.id == task.id) {
            return Err(ServiceError::Validation(format!("duplicate id {}", task.id)));
        }
        tasks.push(task.clone());
        Ok(task)
    }

    /// Matching rows for `filter` and the total count before paging.
    pub fn select(&self, filter: &TaskFilter) -> (Vec<Task>, u64) {
        let search = filter.search.as_deref().unwrap_or("");
        let mut rows: Vec<Task> = self
            .read()
            .iter()
            .filter(|t| filter.column.map_or(true, |c| t.column == c))
            .filter(|t| t.matches_search(search))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        if !filter.oldest_first {
            rows.reverse();
        }

        let total = rows.len() as u64;
        if let Some(limit) = filter.limit {
            let page = filter.page.unwrap_or(1).max(1) as usize;
            let start = (page - 1).saturating_mul(limit as usize);
            rows = rows.into_iter().skip(start).take(limit as usize).collect();
        }
        (rows, total)
    }

    pub fn patch(&self, id: &str, changes: &UpdateTask) -> Result<Task, ServiceError> {
        if changes.is_empty() {
            return Err(ServiceError::Validation("no fields to update".into()));
        }
        if let Some(ref title) = changes.title {
            check_title(title)?;
        }
        let mut tasks = self.write();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("task {id}")))?;
        changes.apply_to(task);
        Ok(task.clone())
    }

    pub fn remove(&self, id: &str) -> Result<(), ServiceError> {
        let mut tasks = self.write();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            Err(ServiceError::NotFound(format!("task {id}")))
        } else {
            Ok(())
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Task>> {
        self.tasks.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Task>> {
        self.tasks.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn check_title(title: &str) -> Result<(), ServiceError> {
    if title.trim().is_empty() {
        return Err(ServiceError::Validation("title is required".into()));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(ServiceError::Validation(format!(
            "title exceeds {TITLE_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

#[async_trait]
impl TaskStore for LocalStore {
    async fn list(&self, query: &ColumnQuery) -> Result<ColumnTasksPage, ServiceError> {
        let (tasks, total) = self.select(&TaskFilter {
            column: Some(query.column),
            search: query.search_term().map(String::from),
            page: Some(query.page),
            limit: Some(query.page_size),
            oldest_first: false,
        });
        Ok(ColumnTasksPage::new(tasks, total, query.page, query.page_size))
    }

    async fn create(&self, values: &TaskFormValues) -> Result<Task, ServiceError> {
        let now = Utc::now();
        self.insert(Task::from_form(generate_task_id(now), now, values.clone()))
    }

    async fn update(&self, id: &str, changes: &UpdateTask) -> Result<Task, ServiceError> {
        self.patch(id, changes)
    }

    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        self.remove(id)
    }
}
