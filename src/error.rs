use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("store error: {0}")]
    Store(#[from] redis::RedisError),

    #[error("store connection already disposed")]
    Disposed,

    #[error("invalid batch size: {0} (must be at least 1)")]
    InvalidBatchSize(usize),

    #[error("unexpected script reply: {0}")]
    ScriptReply(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
