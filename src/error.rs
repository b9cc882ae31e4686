use thiserror::Error;

/// Failure raised by any stage of the label pipeline.
///
/// The `Display` text is what ends up in the 500 response body, so each
/// variant renders only its message.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Fetch(String),

    #[error("{0}")]
    Detection(String),

    #[error("{0}")]
    Translation(String),
}

impl HandlerError {
    pub fn kind(&self) -> &'static str {
        match self {
            HandlerError::Validation(_) => "validation",
            HandlerError::Fetch(_) => "fetch",
            HandlerError::Detection(_) => "detection",
            HandlerError::Translation(_) => "translation",
        }
    }
}

pub type HandlerResult<T> = Result<T, HandlerError>;
