use thiserror::Error;

use crate::backend::Method;

#[derive(Debug, Error)]
pub enum PageError {
    /// The HTTP call itself failed or the server refused it.
    #[error("{method} {path} failed: {source}")]
    TransportFailure {
        method: Method,
        path: String,
        source: TransportError,
    },

    /// The server answered with something that is not the expected JSON.
    #[error("unexpected response to {path}")]
    Decode {
        path: String,
        source: serde_json::Error,
    },

    /// A form was submitted with a required field left empty.
    #[error("{message}")]
    ValidationFailed {
        field: &'static str,
        message: &'static str,
    },

    #[error("no page for {0:?}")]
    UnknownRoute(String),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error("server answered {status}: {message}")]
    Status { status: u16, message: String },
}

impl PageError {
    /// The HTTP status the server answered with, if it got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            PageError::TransportFailure {
                source: TransportError::Status { status, .. },
                ..
            } => Some(*status),
            _ => None,
        }
    }
}
