use crate::decision::{ArtifactProbe, ChangeSummary, RebuildDecision, RebuildReason};
use coderag_vector_store::EmbeddingKind;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Steps of one run, in the order they are entered
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    DecidingRebuild,
    SelectingEmbeddingSource,
    CapturingSnapshot,
    WritingLexical,
    WritingVector,
    WritingGraph,
    PersistingMetadata,
    Done,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Nothing changed and every artifact was present; nothing was written
    UpToDate,
    Rebuilt,
}

/// What a successful run did
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub reasons: Vec<RebuildReason>,
    pub stages: Vec<PipelineStage>,
    pub changed_chunks: usize,
    pub removed_files: usize,
    /// Chunks in the full snapshot; zero when up to date
    pub chunks: usize,
    pub files: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<EmbeddingKind>,
    /// Paths whose mtime could not be recorded during a forced rebuild
    pub metadata_failures: usize,
    pub duration_ms: u64,
}

impl RunReport {
    pub(crate) fn new() -> Self {
        Self {
            outcome: RunOutcome::UpToDate,
            reasons: Vec::new(),
            stages: Vec::new(),
            changed_chunks: 0,
            removed_files: 0,
            chunks: 0,
            files: 0,
            embedding: None,
            metadata_failures: 0,
            duration_ms: 0,
        }
    }

    pub(crate) fn enter(&mut self, stage: PipelineStage) {
        log::debug!("[index] stage {stage:?}");
        self.stages.push(stage);
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn finish(mut self, outcome: RunOutcome, started: Instant) -> Self {
        self.outcome = outcome;
        self.duration_ms = started.elapsed().as_millis() as u64;
        self.enter(PipelineStage::Done);
        self
    }

    pub fn rebuilt(&self) -> bool {
        self.outcome == RunOutcome::Rebuilt
    }
}

/// Read-only view of what the next run would do
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusReport {
    pub decision: RebuildDecision,
    pub changes: ChangeSummary,
    pub artifacts: ArtifactProbe,
    /// Paths in the persisted metadata document
    pub tracked_files: usize,
}
