//! Shared error types for the services crate.

use thiserror::Error;

use safety_core::model::ProgressError;
use storage::repository::StorageError;

/// Errors emitted by `QuizGenService`.
///
/// Never reaches a quiz session: `fetch_or_fallback` substitutes the built-in
/// question bank for any of these.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizGenError {
    #[error("quiz generation is not configured")]
    Disabled,
    #[error("quiz generation returned an empty response")]
    EmptyResponse,
    #[error("quiz generation request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("quiz generation returned malformed content: {0}")]
    Malformed(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `ProgressService` and the controller operations that
/// write through it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
