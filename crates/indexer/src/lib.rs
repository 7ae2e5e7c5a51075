//! # CodeRAG Indexer
//!
//! Orchestrates one indexing run over a source corpus.
//!
//! ```text
//! DecidingRebuild ──(up to date)──────────────────────────────> Done
//!       │
//!       └─> SelectingEmbeddingSource -> CapturingSnapshot
//!             -> WritingLexical -> WritingVector -> WritingGraph
//!             -> PersistingMetadata -> Done
//! ```
//!
//! The rebuild decision ([`decide_rebuild`]) is a pure function of the force
//! flag, the change-detection counts and the artifact probes. Every rebuild
//! works from a full snapshot; change detection only decides whether to start.
//!
//! ## Example
//!
//! ```no_run
//! use coderag_indexer::{CancelSignal, IndexingConfig, IndexingPipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pipeline = IndexingPipeline::new(IndexingConfig::for_root("/path/to/corpus"))?;
//!     let report = pipeline.run(&CancelSignal::never()).await?;
//!
//!     println!("{:?}: {} chunks from {} files", report.outcome, report.chunks, report.files);
//!     Ok(())
//! }
//! ```

mod config;
mod decision;
mod embedding;
mod error;
mod pipeline;
mod report;

pub use config::{IndexingConfig, DEFAULT_BRIDGE_INTERPRETER, DEFAULT_CONFIG_FILE_NAME};
pub use decision::{decide_rebuild, ArtifactProbe, ChangeSummary, RebuildDecision, RebuildReason};
pub use embedding::select_embedding_source;
pub use error::{IndexerError, Result};
pub use pipeline::IndexingPipeline;
pub use report::{PipelineStage, RunOutcome, RunReport, StatusReport};

pub use coderag_vector_store::{cancel_pair, CancelHandle, CancelSignal, EmbeddingKind};
