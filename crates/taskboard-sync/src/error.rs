use taskboard_core::FormErrors;
use taskboard_service::ServiceError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("invalid form: {0}")]
    Validation(FormErrors),

    #[error("a submission is already in flight")]
    SubmitInFlight,

    #[error("no task form is open")]
    FormClosed,
}

impl From<FormErrors> for BoardError {
    fn from(e: FormErrors) -> Self {
        BoardError::Validation(e)
    }
}
