//! Error types shared by the scheduler, the session controller and the card store.

use thiserror::Error;

/// Errors raised by the card store adapter.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Card not found: {0}")]
    CardNotFound(String),

    #[error("Deck not found: {0}")]
    DeckNotFound(String),

    #[error("Deck already exists: {0}")]
    DeckExists(String),

    #[error("Malformed card document: {0}")]
    MalformedDocument(String),

    #[error("Card store lock poisoned")]
    Poisoned,
}

/// Errors raised while driving a study session.
#[derive(Error, Debug)]
pub enum StudyError {
    #[error("Invalid rating: {0}")]
    InvalidRating(String),

    #[error("The answer must be revealed before rating")]
    AnswerNotRevealed,

    #[error("The session has no cards left")]
    SessionFinished,
}
