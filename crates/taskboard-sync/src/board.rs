use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crossterm::event::KeyEvent;
use futures::future::join_all;
use taskboard_core::task::{ColumnId, Task, TaskFormValues, UpdateTask};
use taskboard_core::validate;
use taskboard_service::{HttpTaskStore, ServiceError, TaskStore};
use tracing::{debug, info, warn};

use crate::cache::{ColumnQueryCache, ColumnView, LoadOutcome};
use crate::config::ClientConfig;
use crate::coordinator::{MoveCoordinator, MoveOutcome};
use crate::drag::{DragEvent, DragOrchestrator};
use crate::error::BoardError;
use crate::form::{FormAction, SubmitRequest, TaskForm};
use crate::state::BoardState;

/// The task board's client-side data layer: listings per column, mutations,
/// the optimistic move flow, and the interaction state around them.
///
/// Internal locks are never held across a network call, so a `Board` can
/// be shared behind an `Arc` by concurrent callers.
pub struct Board {
    store: Arc<dyn TaskStore>,
    cache: Arc<ColumnQueryCache>,
    coordinator: MoveCoordinator,
    state: Mutex<BoardState>,
    drag: Mutex<DragOrchestrator>,
    form: Mutex<Option<OpenForm>>,
    next_form: AtomicU64,
}

/// The modal's form, tagged with the opening it belongs to.
struct OpenForm {
    generation: u64,
    form: TaskForm,
}

fn relock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl Board {
    pub fn new(store: Arc<dyn TaskStore>, config: &ClientConfig) -> Self {
        let cache = Arc::new(ColumnQueryCache::new(
            store.clone(),
            config.page_size,
            config.stale_time,
        ));
        Self {
            coordinator: MoveCoordinator::new(cache.clone(), store.clone()),
            store,
            cache,
            state: Mutex::new(BoardState::new()),
            drag: Mutex::new(DragOrchestrator::new()),
            form: Mutex::new(None),
            next_form: AtomicU64::new(1),
        }
    }

    /// Board over the REST service at `config.api_base`.
    pub fn connect(config: &ClientConfig) -> Self {
        Self::new(Arc::new(HttpTaskStore::new(&config.api_base)), config)
    }

    pub fn cache(&self) -> &ColumnQueryCache {
        &self.cache
    }

    /// Copy of the interaction state.
    pub fn state(&self) -> BoardState {
        relock(&self.state).clone()
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut BoardState) -> R) -> R {
        f(&mut relock(&self.state))
    }

    /// Form currently bound to the modal, if the modal is open.
    pub fn form(&self) -> Option<TaskForm> {
        relock(&self.form).as_ref().map(|open| open.form.clone())
    }

    fn open_form(&self, open: impl FnOnce(&mut BoardState)) {
        let mut slot = relock(&self.form);
        let form = self.with_state(|s| {
            open(s);
            TaskForm::from_modal(&s.modal)
        });
        *slot = Some(OpenForm {
            generation: self.next_form.fetch_add(1, Ordering::Relaxed),
            form,
        });
    }

    fn with_form<R>(&self, f: impl FnOnce(&mut TaskForm) -> R) -> Result<(R, u64), BoardError> {
        let mut slot = relock(&self.form);
        let open = slot.as_mut().ok_or(BoardError::FormClosed)?;
        Ok((f(&mut open.form), open.generation))
    }

    pub fn column(&self, column: ColumnId) -> ColumnView {
        let key = relock(&self.state).column_key(column);
        self.cache.view(&key)
    }

    pub fn columns(&self) -> Vec<(ColumnId, ColumnView)> {
        ColumnId::ALL
            .iter()
            .map(|c| (*c, self.column(*c)))
            .collect()
    }

    /// Observe every column under the current search. Columns load
    /// independently; a failing column keeps its error in its view and
    /// does not affect the others.
    pub async fn load_board(&self) -> Vec<(ColumnId, ColumnView)> {
        let keys = relock(&self.state).column_keys();
        let results = join_all(keys.iter().map(|key| self.cache.observe(key))).await;
        for (key, result) in keys.iter().zip(results) {
            if let Err(e) = result {
                warn!("column {} failed to load: {e}", key.column.as_str());
            }
        }
        self.columns()
    }

    /// Change the search text and load the columns under the new keys.
    pub async fn set_search(&self, text: &str) -> Vec<(ColumnId, ColumnView)> {
        self.with_state(|s| s.set_search(text));
        self.load_board().await
    }

    pub async fn load_more(&self, column: ColumnId) -> Result<LoadOutcome, ServiceError> {
        let key = relock(&self.state).column_key(column);
        self.cache.load_next_page(&key).await
    }

    pub async fn create_task(&self, values: &TaskFormValues) -> Result<Task, BoardError> {
        validate(values)?;
        let task = self.store.create(values).await?;
        info!("created task {} in {}", task.id, task.column.as_str());
        self.cache.invalidate(|k| k.column == task.column);
        Ok(task)
    }

    pub async fn update_task(&self, id: &str, changes: &UpdateTask) -> Result<Task, BoardError> {
        let task = self.store.update(id, changes).await?;
        info!("updated task {id}");
        self.cache.invalidate(|_| true);
        Ok(task)
    }

    /// Delete `id`. A task that is already gone counts as deleted.
    pub async fn delete_task(&self, id: &str) -> Result<(), BoardError> {
        match self.store.delete(id).await {
            Ok(()) => info!("deleted task {id}"),
            Err(e) if e.is_not_found() => debug!("task {id} was already deleted"),
            Err(e) => {
                warn!("deleting task {id} failed: {e}");
                return Err(e.into());
            }
        }
        self.cache.invalidate(|_| true);
        Ok(())
    }

    /// Feed a drag event. A drop into another column runs the optimistic
    /// move; anything else only updates the drag state.
    pub async fn handle_drag(&self, event: DragEvent) -> Result<Option<MoveOutcome>, BoardError> {
        let request = {
            let mut drag = relock(&self.drag);
            let request = drag.handle(event);
            let dragging = drag.dragging_task_id().map(String::from);
            self.with_state(|s| s.set_dragging_task_id(dragging));
            request
        };
        let Some(command) = request else {
            return Ok(None);
        };
        let outcome = self.coordinator.execute(command).await?;
        Ok(Some(outcome))
    }

    pub fn open_create_modal(&self, column: Option<ColumnId>) {
        self.open_form(|s| s.open_create_modal(column));
    }

    pub fn open_edit_modal(&self, task: &Task) {
        self.open_form(|s| s.open_edit_modal(task));
    }

    pub fn close_modal(&self) {
        let mut slot = relock(&self.form);
        *slot = None;
        self.with_state(BoardState::close_modal);
    }

    /// Edit the open form's values in place.
    pub fn edit_form(&self, f: impl FnOnce(&mut TaskFormValues)) -> Result<(), BoardError> {
        self.with_form(|form| f(&mut form.values)).map(|_| ())
    }

    /// Route a key press to the open form. Ctrl+Enter submits and Esc
    /// closes the modal.
    pub async fn handle_form_key(&self, key: KeyEvent) -> Result<FormAction, BoardError> {
        let (action, _) = self.with_form(|form| form.handle_key(key))?;
        match action {
            FormAction::Submit => {
                self.submit().await?;
            }
            FormAction::Cancel => self.close_modal(),
            FormAction::Edited | FormAction::Ignored => {}
        }
        Ok(action)
    }

    /// Submit the open form. Invalid values and a pending submission are
    /// rejected before any request is made. On success the modal closes;
    /// on failure it stays open with the values intact. If the modal was
    /// closed or reopened while the request ran, the form now shown is
    /// left alone.
    pub async fn submit(&self) -> Result<Task, BoardError> {
        let (request, generation) = self.with_form(TaskForm::prepare_submit)?;
        let request = request?;

        let result = match &request {
            SubmitRequest::Create(values) => self.create_task(values).await,
            SubmitRequest::Update { id, changes } => self.update_task(id, changes).await,
        };

        {
            let mut slot = relock(&self.form);
            let same_form = slot.as_ref().is_some_and(|open| open.generation == generation);
            if !same_form {
                debug!("form {generation} was closed while submitting");
            } else if result.is_ok() {
                *slot = None;
                self.with_state(BoardState::close_modal);
            } else if let Some(open) = slot.as_mut() {
                open.form.finish_submit();
            }
        }
        if let Err(e) = &result {
            warn!("form submission failed: {e}");
        }
        result
    }
}
