use thiserror::Error;

pub type Result<T> = std::result::Result<T, VectorStoreError>;

#[derive(Error, Debug)]
pub enum VectorStoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Embedding service error: {0}")]
    ServiceError(String),

    #[error("Embedding bridge error: {0}")]
    BridgeError(String),

    #[error("Expected {expected} embeddings, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Embedding dimension changed from {expected} to {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Vector write cancelled")]
    Cancelled,
}
