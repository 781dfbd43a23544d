//! Error types for cachefs

use std::io;

/// Core filesystem error type
#[derive(thiserror::Error, Debug)]
pub enum FsError {
    #[error("not found")]
    NotFound,
    #[error("type mismatch")]
    TypeMismatch,
    #[error("invalid modification")]
    InvalidModification,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FsError {
    /// Build a `Syntax` error for a malformed operation payload.
    pub fn syntax<S: Into<String>>(message: S) -> Self {
        Self::Syntax(message.into())
    }
}

pub type FsResult<T> = Result<T, FsError>;
