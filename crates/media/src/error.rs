use std::{error::Error as StdError, time::Duration};

use http::StatusCode;

/// Media store failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The referenced object does not exist in the backing store.
    #[error("media not found: {reference}")]
    NotFound { reference: String },

    #[error("media {operation} timed out after {}s", after.as_secs())]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("{message}")]
    InvalidInput { message: String },

    #[error("{context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn external<E>(context: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }

    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Status to report when this error reaches an HTTP client.
    #[must_use]
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            Self::External { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type StoreError = Error;
pub type Result<T> = std::result::Result<T, Error>;
