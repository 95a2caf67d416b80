use tabsplit_domain::BillValidationError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("'{name}' is already splitting this bill")]
    DuplicatePerson { name: String },
    #[error("'{name}' is not splitting this bill")]
    UnknownPerson { name: String },
    #[error("no item at index {index} (bill has {len})")]
    ItemOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Validation(#[from] BillValidationError),
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("receipt extraction request failed: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("extraction response carried no receipt data: {detail}")]
    UnusableResponse { detail: String },
}
