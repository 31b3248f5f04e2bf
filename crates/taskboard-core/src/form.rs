use thiserror::Error;

use crate::task::TaskFormValues;

pub const TITLE_MAX_CHARS: usize = 120;

/// Field-level validation errors of the task form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", .title.as_deref().unwrap_or("form is invalid"))]
pub struct FormErrors {
    pub title: Option<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
    }
}

/// Check the form values. Only the title carries rules; the other
/// fields are constrained by their types.
pub fn validate(values: &TaskFormValues) -> Result<(), FormErrors> {
    let mut errors = FormErrors::default();
    if values.title.trim().is_empty() {
        errors.title = Some("Title is required".into());
    } else if values.title.chars().count() > TITLE_MAX_CHARS {
        errors.title = Some(format!("Title must be under {TITLE_MAX_CHARS} characters"));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
