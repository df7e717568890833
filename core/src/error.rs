//! Error types for the todo client.
//!
//! # Design
//! `ApiError` describes what went wrong talking to the service. `NotFound`
//! gets a dedicated variant because callers frequently distinguish "the
//! resource does not exist" from "the server returned an unexpected status."
//!
//! `AppError` is what the coordinator surfaces to the error widget. Its
//! `Display` output is the user-facing message, so the variants carry the
//! wording shown on screen.

use std::fmt;

use thiserror::Error;

/// Errors returned by `TodoClient`, transports and `RemoteTodoService`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404: the user or todo does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The response parsed but does not have the shape the operation needs.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The configured base URL cannot carry API paths.
    #[error("invalid base url: {0}")]
    InvalidUrl(String),

    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(String),
}

/// The intent handler an `AppError::Operation` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Edit,
    Toggle,
    SetPriority,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Add => write!(f, "add todo"),
            Operation::Edit => write!(f, "edit todo"),
            Operation::Toggle => write!(f, "toggle todo"),
            Operation::SetPriority => write!(f, "set priority"),
            Operation::Delete => write!(f, "delete todo"),
        }
    }
}

/// Failures the coordinator reports through the error widget.
#[derive(Debug, Error)]
pub enum AppError {
    /// Loading the user list failed during initialization.
    #[error("Cannot read UserList..{0}")]
    Initialization(#[source] ApiError),

    /// Loading the current user's todo list failed.
    #[error("Cannot read todoList from user..{0}")]
    Load(#[source] ApiError),

    /// A mutating intent failed.
    #[error("Cannot {op}..{source}")]
    Operation {
        op: Operation,
        #[source]
        source: ApiError,
    },
}

impl AppError {
    pub fn operation(op: Operation, source: ApiError) -> Self {
        AppError::Operation { op, source }
    }
}
