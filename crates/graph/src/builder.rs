use crate::adjacency::Adjacency;
use crate::error::{GraphError, Result};
use crate::paths::GraphArtifacts;
use crate::symbols::{ChunkSymbols, SymbolExtractor};
use coderag_chunker::ChunkRecord;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Symbols defined by more chunks than this are too ambiguous to link
const MAX_SYMBOL_FANOUT: usize = 8;

pub const NODES_HEADER: &str = "node\tchunk_id\tpath\tstart_line\tend_line\tsymbols";

/// Node of the chunk dependency graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub chunk_id: String,
    pub path: String,
    pub start_line: usize,
    pub end_line: usize,
    pub symbols: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub symbols: usize,
}

/// Builds the chunk dependency graph and writes its artifact triple
pub struct GraphBuilder {
    artifacts: GraphArtifacts,
    max_parallelism: usize,
}

impl GraphBuilder {
    pub fn new(graph_path: impl AsRef<Path>, max_parallelism: usize) -> Self {
        Self {
            artifacts: GraphArtifacts::for_path(graph_path),
            max_parallelism: max_parallelism.max(1),
        }
    }

    pub const fn artifacts(&self) -> &GraphArtifacts {
        &self.artifacts
    }

    /// Build the graph from a full snapshot and replace the artifact triple.
    ///
    /// Chunk `a` gets an edge to chunk `b` when `a` mentions a symbol that `b`
    /// defines. Symbol extraction runs on a pool bounded by `max_parallelism`.
    pub fn build_graph(&self, chunks: &[ChunkRecord]) -> Result<GraphStats> {
        let extractor = SymbolExtractor::new()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_parallelism)
            .build()
            .map_err(|e| GraphError::BuildError(format!("failed to start graph workers: {e}")))?;

        let analyzed: Vec<ChunkSymbols> =
            pool.install(|| chunks.par_iter().map(|c| extractor.extract(c)).collect());

        let graph = link(chunks, &analyzed);
        let stats = GraphStats {
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            symbols: analyzed.iter().map(|s| s.defines.len()).sum(),
        };

        self.write(&graph)?;
        log::info!(
            "Built code graph: {} nodes, {} edges",
            stats.nodes,
            stats.edges
        );
        Ok(stats)
    }

    fn write(&self, graph: &DiGraph<GraphNode, ()>) -> Result<()> {
        let forward = adjacency(graph)?;
        let reverse = forward.transpose()?;

        let mut table = String::from(NODES_HEADER);
        table.push('\n');
        for idx in graph.node_indices() {
            let node = &graph[idx];
            table.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\n",
                idx.index(),
                tsv_field(&node.chunk_id),
                tsv_field(&node.path),
                node.start_line,
                node.end_line,
                node.symbols.join(",")
            ));
        }

        if let Some(parent) = self.artifacts.base.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Stage all three, then swap them in together.
        let staged = [
            (stage(&self.artifacts.csr, &forward.encode()?)?, &self.artifacts.csr),
            (stage(&self.artifacts.csc, &reverse.encode()?)?, &self.artifacts.csc),
            (stage(&self.artifacts.nodes, table.as_bytes())?, &self.artifacts.nodes),
        ];
        for (tmp, target) in staged {
            std::fs::rename(&tmp, target)?;
        }
        Ok(())
    }
}

fn link(chunks: &[ChunkRecord], analyzed: &[ChunkSymbols]) -> DiGraph<GraphNode, ()> {
    let mut graph = DiGraph::with_capacity(chunks.len(), 0);
    let mut definers: HashMap<&str, Vec<NodeIndex>> = HashMap::new();
    let mut nodes = Vec::with_capacity(chunks.len());

    for (chunk, symbols) in chunks.iter().zip(analyzed) {
        let idx = graph.add_node(GraphNode {
            chunk_id: chunk.id(),
            path: chunk.path.clone(),
            start_line: chunk.start_line,
            end_line: chunk.end_line,
            symbols: symbols.defines.iter().cloned().collect(),
        });
        for name in &symbols.defines {
            definers.entry(name.as_str()).or_default().push(idx);
        }
        nodes.push(idx);
    }

    for (&from, symbols) in nodes.iter().zip(analyzed) {
        let mut targets = BTreeSet::new();
        for name in &symbols.references {
            let Some(owners) = definers.get(name.as_str()) else {
                continue;
            };
            if owners.len() > MAX_SYMBOL_FANOUT {
                continue;
            }
            targets.extend(owners.iter().copied().filter(|&to| to != from));
        }
        for to in targets {
            graph.add_edge(from, to, ());
        }
    }

    graph
}

fn adjacency(graph: &DiGraph<GraphNode, ()>) -> Result<Adjacency> {
    let lists: Vec<Vec<u32>> = graph
        .node_indices()
        .map(|idx| -> Result<Vec<u32>> {
            let mut out: Vec<u32> = graph
                .neighbors_directed(idx, Direction::Outgoing)
                .map(|n| u32::try_from(n.index()).map_err(|_| GraphError::TooLarge(n.index())))
                .collect::<Result<_>>()?;
            out.sort_unstable();
            Ok(out)
        })
        .collect::<Result<_>>()?;
    Adjacency::from_lists(&lists)
}

fn stage(target: &Path, bytes: &[u8]) -> Result<PathBuf> {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    let tmp = target.with_file_name(name);

    let mut file = std::fs::File::create(&tmp)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    Ok(tmp)
}

fn tsv_field(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}
