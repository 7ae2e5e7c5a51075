//! # CodeRAG Graph
//!
//! Chunk-level dependency graph: chunk `a` points at chunk `b` when `a`
//! mentions a symbol that `b` defines.
//!
//! ## Artifacts
//!
//! ```text
//! <base>.csr.bin    forward adjacency (who I depend on)
//! <base>.csc.bin    reverse adjacency (who depends on me)
//! <base>.nodes.tsv  node table: index, chunk id, path, lines, defined symbols
//! ```
//!
//! `<base>` comes from [`normalize_base_path`].

mod adjacency;
mod builder;
mod error;
mod paths;
mod symbols;

pub use adjacency::{Adjacency, ADJACENCY_MAGIC};
pub use builder::{GraphBuilder, GraphNode, GraphStats, NODES_HEADER};
pub use error::{GraphError, Result};
pub use paths::{
    graph_exists, normalize_base_path, GraphArtifacts, CSC_SUFFIX, CSR_SUFFIX,
    DEFAULT_GRAPH_STEM, NODES_SUFFIX,
};
pub use symbols::{ChunkSymbols, SymbolExtractor};
