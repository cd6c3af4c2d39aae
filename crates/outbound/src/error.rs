use crate::validate::ValidationError;

/// Failure to produce an outbound wire form.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Media could not be stored before sending.
    #[error(transparent)]
    Store(#[from] waba_media::Error),

    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

impl Error {
    #[must_use]
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

pub type OutboundError = Error;
pub type Result<T> = std::result::Result<T, Error>;
