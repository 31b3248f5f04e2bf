use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use taskboard_core::task::{ColumnId, TaskFormValues, UpdateTask};
use taskboard_core::{validate, FormErrors};

use crate::error::BoardError;
use crate::state::{ModalMode, ModalState};

/// Text field that receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Title,
    Description,
}

/// Result of feeding a key to the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Submit,
    Cancel,
    Edited,
    Ignored,
}

/// Mutation a valid submission turns into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitRequest {
    Create(TaskFormValues),
    Update { id: String, changes: UpdateTask },
}

/// Create/edit form bound to the modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    pub values: TaskFormValues,
    pub errors: FormErrors,
    pub focus: FormField,
    /// Id of the task being edited; `None` when creating.
    editing: Option<String>,
    submitting: bool,
}

impl TaskForm {
    pub fn create(column: ColumnId) -> Self {
        Self {
            values: TaskFormValues::blank(column),
            errors: FormErrors::default(),
            focus: FormField::Title,
            editing: None,
            submitting: false,
        }
    }

    /// Fresh form for the modal: blank in create mode, pre-filled from
    /// the task in edit mode.
    pub fn from_modal(modal: &ModalState) -> Self {
        match (modal.mode, &modal.task) {
            (ModalMode::Edit, Some(task)) => Self {
                values: TaskFormValues::from_task(task),
                editing: Some(task.id.clone()),
                ..Self::create(task.column)
            },
            _ => Self::create(modal.default_column),
        }
    }

    pub fn is_edit(&self) -> bool {
        self.editing.is_some()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter if ctrl => FormAction::Submit,
            KeyCode::Esc => FormAction::Cancel,
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    FormField::Title => FormField::Description,
                    FormField::Description => FormField::Title,
                };
                FormAction::Ignored
            }
            KeyCode::Enter if self.focus == FormField::Description => {
                self.values.description.push('\n');
                FormAction::Edited
            }
            KeyCode::Backspace => {
                self.field_mut().pop();
                FormAction::Edited
            }
            KeyCode::Char(c) if !ctrl => {
                self.field_mut().push(c);
                FormAction::Edited
            }
            _ => FormAction::Ignored,
        }
    }

    fn field_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Title => &mut self.values.title,
            FormField::Description => &mut self.values.description,
        }
    }

    /// Validate and mark the form as submitting.
    ///
    /// Fails without side effects other than recording field errors when
    /// the values are invalid or a submission is already pending.
    pub fn prepare_submit(&mut self) -> Result<SubmitRequest, BoardError> {
        if self.submitting {
            return Err(BoardError::SubmitInFlight);
        }
        if let Err(errors) = validate(&self.values) {
            self.errors = errors.clone();
            return Err(errors.into());
        }
        self.errors = FormErrors::default();
        self.submitting = true;
        Ok(match &self.editing {
            Some(id) => SubmitRequest::Update {
                id: id.clone(),
                changes: self.values.clone().into(),
            },
            None => SubmitRequest::Create(self.values.clone()),
        })
    }

    /// Re-enable submission once the request settled.
    pub fn finish_submit(&mut self) {
        self.submitting = false;
    }
}
