use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Kind;

/// Payload shown on the error screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub message: String,
    pub stack: String,
}

impl ErrorDetails {
    pub fn new(message: impl Into<String>, stack: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: stack.into(),
        }
    }

    /// `stack` carries the full cause chain of the error.
    pub fn from_error<E>(err: &E) -> Self
    where
        E: fmt::Display + fmt::Debug + ?Sized,
    {
        Self {
            message: err.to_string(),
            stack: format!("{err:?}"),
        }
    }
}

/// A problem a collaborator reports on purpose, as opposed to a thrown error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderErrorDetails {
    pub title: String,
    pub description: String,
}

impl RenderErrorDetails {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

impl From<RenderErrorDetails> for ErrorDetails {
    fn from(value: RenderErrorDetails) -> Self {
        Self {
            message: value.title,
            stack: value.description,
        }
    }
}

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("docs page configured for kind {kind} without a docs container")]
    DocsPageWithoutContainer { kind: Kind },
}
