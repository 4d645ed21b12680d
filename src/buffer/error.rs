use thiserror::Error;

/// Failures raised by a storage backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Fjall error: {0}")]
    Fjall(#[from] fjall::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid key format: {0}")]
    InvalidKey(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum BufferError {
    /// Both retention limits are zero; nothing would ever be trimmed.
    #[error("at least one of max_entries or max_age must be non-zero")]
    InvalidPolicy,

    #[error("failed to open store at {location}: {source}")]
    Open {
        location: String,
        #[source]
        source: StoreError,
    },

    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

pub type Result<T> = std::result::Result<T, BufferError>;
