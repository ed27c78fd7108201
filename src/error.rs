//! Error taxonomy for the vocabulary tracker.

use thiserror::Error;

/// Rejected user input. Handled locally, never reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("word must not be empty")]
    EmptyWord,
    #[error("meaning must not be empty")]
    EmptyMeaning,
}

/// Failure in the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access the vocabulary file: {0}")]
    Io(#[from] std::io::Error),
    #[error("vocabulary file is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("no entry with id {0}")]
    NotFound(String),
}

/// Starting a quiz without enough entries in the pool.
/// Reported immediately; the session does not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("you need at least {needed} words to start (have {have})")]
pub struct InsufficientPool {
    pub needed: usize,
    pub have: usize,
}

/// Failure of a best-effort translation/suggestion lookup.
/// Always swallowed by the caller; the feature degrades to empty output.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("lookup request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("lookup response had an unexpected shape: {0}")]
    BadShape(&'static str),
}
