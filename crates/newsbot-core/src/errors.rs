use crate::domain::UserId;

/// Core error type for the news bot.
///
/// Adapter crates should map their specific errors into this type so the
/// conversation flow can decide between a user-facing notice and a log line.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    /// News API or messaging platform failure.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// A selection event arrived before the user picked a category.
    #[error("no active selection for user {0}")]
    SessionMissing(UserId),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
