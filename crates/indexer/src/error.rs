use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Chunker error: {0}")]
    ChunkerError(#[from] coderag_chunker::ChunkerError),

    #[error("Lexical index error: {0}")]
    LexicalError(#[from] coderag_lexical::LexicalError),

    #[error("Vector store error: {0}")]
    VectorStoreError(#[from] coderag_vector_store::VectorStoreError),

    #[error("Graph error: {0}")]
    GraphError(#[from] coderag_graph::GraphError),

    #[error("Indexing run cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

impl IndexerError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }
}
