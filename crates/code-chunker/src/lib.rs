//! # CodeRAG Chunker
//!
//! Turns a source corpus into chunk records, the common input of the
//! lexical, vector and graph artifacts.
//!
//! ```text
//! Corpus root
//!     │
//!     ├──> FileScanner (.gitignore aware, extension allow-list)
//!     │
//!     ├──> Chunker (fixed line windows)
//!     │      └─> ChunkRecord { path, lines, bytes, content }
//!     │
//!     └──> MetadataStore (path -> mtime)
//!            └─> changed_chunks() / full_snapshot()
//! ```

mod chunker;
mod config;
mod error;
mod language;
mod metadata;
mod producer;
mod record;
mod scanner;

pub use chunker::Chunker;
pub use config::ChunkerConfig;
pub use error::{ChunkerError, Result};
pub use language::Language;
pub use metadata::{file_mtime_ms, fold_path_key, MetadataStore, METADATA_FILE_NAME};
pub use producer::{ChangeSet, ChunkProducer};
pub use record::ChunkRecord;
pub use scanner::FileScanner;
