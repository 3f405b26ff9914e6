//! # Engine Errors
//!
//! The facade surfaces exactly two failure families: the core settlement
//! taxonomy (passed through untouched so callers can match on it) and
//! record-store collaborator failures.

use thiserror::Error;

/// A failure reported by the persistence collaborator.
///
/// The engine never assumes a transport, so the reason is carried as
/// text from whatever backend the deployment wires in.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not serve the request.
    #[error("record store failure: {reason}")]
    Backend { reason: String },
}

impl StoreError {
    pub fn backend(reason: impl Into<String>) -> Self {
        StoreError::Backend {
            reason: reason.into(),
        }
    }
}

/// Top-level error for facade operations.
#[derive(Debug, Error)]
pub enum TillError {
    /// Settlement failure from till-core, passed through untouched.
    #[error(transparent)]
    Core(#[from] till_core::EngineError),

    /// Record-store collaborator failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Convenience alias for Results with TillError.
pub type EngineResult<T> = Result<T, TillError>;
