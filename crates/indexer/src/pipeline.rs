use crate::config::IndexingConfig;
use crate::decision::{decide_rebuild, ArtifactProbe, ChangeSummary};
use crate::embedding::select_embedding_source;
use crate::error::{IndexerError, Result};
use crate::report::{PipelineStage, RunOutcome, RunReport, StatusReport};
use coderag_chunker::{file_mtime_ms, fold_path_key, ChangeSet, ChunkProducer, ChunkRecord, MetadataStore};
use coderag_graph::{GraphBuilder, GraphStats};
use coderag_lexical::{LexicalMeta, LexicalWriter};
use coderag_vector_store::{CancelSignal, VectorStoreError, VectorWriter};
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

/// Keeps the lexical index, vector store and graph in step with the corpus.
///
/// A run decides whether anything needs rebuilding and, if so, rebuilds all
/// three artifacts from a full snapshot in the order lexical, vector, graph.
/// The metadata document is saved last, so a run that fails partway leaves
/// the previous timestamps in place and the next run tries again.
///
/// Runs over the same artifact paths must not overlap.
pub struct IndexingPipeline {
    config: IndexingConfig,
    producer: ChunkProducer,
}

impl IndexingPipeline {
    pub fn new(mut config: IndexingConfig) -> Result<Self> {
        config.validate()?;
        config.corpus_root = std::fs::canonicalize(&config.corpus_root).map_err(|e| {
            IndexerError::config(format!(
                "corpus root {} is not accessible: {e}",
                config.corpus_root.display()
            ))
        })?;
        let producer = ChunkProducer::new(&config.corpus_root, config.chunking.clone())?;
        Ok(Self { config, producer })
    }

    pub const fn config(&self) -> &IndexingConfig {
        &self.config
    }

    pub async fn run(&self, cancel: &CancelSignal) -> Result<RunReport> {
        let started = Instant::now();
        let mut report = RunReport::new();
        let force = self.config.force_full_rebuild;

        report.enter(PipelineStage::DecidingRebuild);
        let mut metadata = MetadataStore::new(self.config.metadata_file());
        metadata.ensure_loaded()?;

        let changes = self.detect_changes(&mut metadata)?;
        let summary = ChangeSummary::from(&changes);
        let decision = decide_rebuild(force, &summary, &ArtifactProbe::probe(&self.config));
        report.changed_chunks = summary.changed_chunks;
        report.removed_files = summary.removed_files;
        report.reasons.clone_from(&decision.reasons);

        if !decision.required {
            log::info!("[index] No changes detected. Existing artifacts remain current.");
            return Ok(report.finish(RunOutcome::UpToDate, started));
        }
        log::info!(
            "[index] Rebuild required: {}",
            decision
                .reasons
                .iter()
                .map(|r| r.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        drop(changes);

        report.enter(PipelineStage::SelectingEmbeddingSource);
        let source = select_embedding_source(&self.config)?;
        report.embedding = Some(source.kind());

        report.enter(PipelineStage::CapturingSnapshot);
        log::info!("[index] Capturing full snapshot...");
        let snapshot = self.producer.full_snapshot()?;
        report.chunks = snapshot.len();
        report.files = distinct_paths(&snapshot).len();
        if force {
            report.metadata_failures = record_snapshot_timestamps(&mut metadata, &snapshot);
        }

        report.enter(PipelineStage::WritingLexical);
        log::info!("[index] Writing {} chunks to lexical index...", snapshot.len());
        let lexical = write_lexical(&self.config.lexical_dir(), &snapshot)?;
        log::debug!("[index] Lexical index holds {} terms", lexical.terms);

        report.enter(PipelineStage::WritingVector);
        log::info!("[index] Rebuilding vector store with {}...", source.describe());
        let vectors = VectorWriter::new(self.config.vector_dir(), source, self.config.batch_size());
        let stats = vectors.write(&snapshot, cancel).await.map_err(|e| match e {
            VectorStoreError::Cancelled => IndexerError::Cancelled,
            other => other.into(),
        })?;
        log::debug!(
            "[index] Wrote {} vectors in {} batches",
            stats.records,
            stats.batches
        );

        report.enter(PipelineStage::WritingGraph);
        log::info!("[index] Building graph snapshot...");
        let graph = self.build_graph(snapshot).await?;
        log::debug!("[index] Graph has {} nodes and {} edges", graph.nodes, graph.edges);

        report.enter(PipelineStage::PersistingMetadata);
        metadata.save()?;

        log::info!("[index] Completed.");
        Ok(report.finish(RunOutcome::Rebuilt, started))
    }

    /// Change detection and artifact probes without writing anything
    pub fn status(&self) -> Result<StatusReport> {
        let mut metadata = MetadataStore::new(self.config.metadata_file());
        metadata.ensure_loaded()?;
        let tracked_files = metadata.len();

        let changes = self.detect_changes(&mut metadata)?;
        let summary = ChangeSummary::from(&changes);
        let artifacts = ArtifactProbe::probe(&self.config);
        let decision = decide_rebuild(self.config.force_full_rebuild, &summary, &artifacts);

        Ok(StatusReport {
            decision,
            changes: summary,
            artifacts,
            tracked_files,
        })
    }

    fn detect_changes(&self, metadata: &mut MetadataStore) -> Result<ChangeSet> {
        if self.config.force_full_rebuild {
            log::info!("[index] Force rebuild requested; ignoring incremental change detection.");
            return Ok(ChangeSet::default());
        }
        Ok(self.producer.changed_chunks(metadata)?)
    }

    async fn build_graph(&self, snapshot: Vec<ChunkRecord>) -> Result<GraphStats> {
        let builder = GraphBuilder::new(
            self.config.graph_base(),
            self.config.max_degree_of_parallelism,
        );
        let stats = tokio::task::spawn_blocking(move || builder.build_graph(&snapshot))
            .await
            .map_err(|e| IndexerError::Other(format!("graph build task failed: {e}")))??;
        Ok(stats)
    }
}

/// Replace the lexical index; the writer is released on every path out
fn write_lexical(dir: &Path, chunks: &[ChunkRecord]) -> Result<LexicalMeta> {
    let mut writer = LexicalWriter::open(dir)?;
    writer.reset();
    writer.index_documents(chunks)?;
    Ok(writer.commit()?)
}

/// Record the current mtime of every snapshot path and forget the rest.
/// Returns how many paths could not be stat'ed.
fn record_snapshot_timestamps(metadata: &mut MetadataStore, snapshot: &[ChunkRecord]) -> usize {
    let mut failures = 0;
    let mut live = HashSet::new();

    for path in distinct_paths(snapshot) {
        live.insert(fold_path_key(path));
        match file_mtime_ms(path) {
            Ok(mtime) => metadata.set_timestamp(path, mtime),
            Err(err) => {
                log::warn!("[index] failed to update metadata for {path}: {err}");
                failures += 1;
            }
        }
    }

    let dropped = metadata.retain_live(&live);
    if !dropped.is_empty() {
        log::debug!("[index] Dropped {} stale metadata entries", dropped.len());
    }
    failures
}

/// Paths in first-seen order, compared case-insensitively
fn distinct_paths(chunks: &[ChunkRecord]) -> Vec<&str> {
    let mut seen = HashSet::new();
    chunks
        .iter()
        .map(|c| c.path.as_str())
        .filter(|path| seen.insert(fold_path_key(path)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use coderag_chunker::Language;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn chunk(path: &str, start: usize) -> ChunkRecord {
        ChunkRecord {
            path: path.into(),
            start_line: start,
            end_line: start,
            start_byte: 0,
            end_byte: 1,
            language: Language::Rust,
            content: "x".into(),
        }
    }

    #[test]
    fn distinct_paths_fold_case() {
        let chunks = [chunk("a.rs", 1), chunk("A.RS", 2), chunk("b.rs", 1)];
        assert_eq!(distinct_paths(&chunks), vec!["a.rs", "b.rs"]);
    }

    #[test]
    fn snapshot_timestamps_skip_unstatable_paths() {
        let dir = TempDir::new().unwrap();
        let real = dir.path().join("real.rs");
        std::fs::write(&real, "fn a() {}").unwrap();
        let real = real.to_string_lossy().into_owned();
        let ghost = dir.path().join("ghost.rs").to_string_lossy().into_owned();

        let mut store = MetadataStore::in_dir(dir.path());
        store.set_timestamp("stale.rs", 1);
        let failures =
            record_snapshot_timestamps(&mut store, &[chunk(&real, 1), chunk(&ghost, 1)]);

        assert_eq!(failures, 1);
        assert!(store.get(&real).is_some());
        assert_eq!(store.get(&ghost), None);
        assert_eq!(store.get("stale.rs"), None);
    }
}
