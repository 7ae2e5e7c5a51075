//! # CodeRAG Vector Store
//!
//! Embedding sources and the on-disk vector store.
//!
//! ```text
//! ChunkRecord[]
//!     │
//!     └──> VectorWriter (batches of N)
//!            ├─ EmbeddingSource::{Remote | Bridge | Hash}
//!            ├─ CancelSignal checked between batches
//!            └─ vectors.jsonl (temp file + rename)
//! ```

mod cancel;
mod embedding;
mod error;
mod writer;

pub use cancel::{cancel_pair, CancelHandle, CancelSignal};
pub use embedding::{
    BridgeConfig, BridgeEmbedder, Embedder, EmbeddingKind, EmbeddingSource, HashEmbedder,
    RemoteConfig, RemoteEmbedder, DEFAULT_HASH_DIMENSION,
};
pub use error::{Result, VectorStoreError};
pub use writer::{
    read_vectors, vector_store_exists, VectorRecord, VectorWriteStats, VectorWriter,
    VECTORS_FILE_NAME,
};
