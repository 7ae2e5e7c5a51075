use crate::config::IndexingConfig;
use coderag_chunker::ChangeSet;
use serde::{Deserialize, Serialize};

/// Why a run has to rebuild the artifacts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RebuildReason {
    ForceRequested,
    FilesChanged,
    FilesRemoved,
    LexicalIndexMissing,
    VectorStoreMissing,
    GraphMissing,
}

impl RebuildReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ForceRequested => "force requested",
            Self::FilesChanged => "files changed",
            Self::FilesRemoved => "files removed",
            Self::LexicalIndexMissing => "lexical index missing",
            Self::VectorStoreMissing => "vector store missing",
            Self::GraphMissing => "graph missing",
        }
    }
}

impl std::fmt::Display for RebuildReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counts from change detection; all zero when detection was skipped
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangeSummary {
    pub changed_chunks: usize,
    pub changed_files: usize,
    pub removed_files: usize,
}

impl From<&ChangeSet> for ChangeSummary {
    fn from(changes: &ChangeSet) -> Self {
        Self {
            changed_chunks: changes.chunks.len(),
            changed_files: changes.changed_files.len(),
            removed_files: changes.removed_files.len(),
        }
    }
}

/// Which artifact sets are present on disk
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactProbe {
    pub lexical: bool,
    pub vector: bool,
    pub graph: bool,
}

impl ArtifactProbe {
    pub fn probe(config: &IndexingConfig) -> Self {
        Self {
            lexical: coderag_lexical::lexical_index_exists(config.lexical_dir()),
            vector: coderag_vector_store::vector_store_exists(config.vector_dir()),
            graph: coderag_graph::graph_exists(config.graph_base()),
        }
    }

    pub const fn all_present(&self) -> bool {
        self.lexical && self.vector && self.graph
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RebuildDecision {
    pub required: bool,
    pub reasons: Vec<RebuildReason>,
}

#[must_use]
pub fn decide_rebuild(
    force: bool,
    changes: &ChangeSummary,
    artifacts: &ArtifactProbe,
) -> RebuildDecision {
    let mut reasons = Vec::new();

    if force {
        reasons.push(RebuildReason::ForceRequested);
    }
    if changes.changed_chunks > 0 {
        reasons.push(RebuildReason::FilesChanged);
    }
    if changes.removed_files > 0 {
        reasons.push(RebuildReason::FilesRemoved);
    }
    if !artifacts.lexical {
        reasons.push(RebuildReason::LexicalIndexMissing);
    }
    if !artifacts.vector {
        reasons.push(RebuildReason::VectorStoreMissing);
    }
    if !artifacts.graph {
        reasons.push(RebuildReason::GraphMissing);
    }

    let required = !reasons.is_empty();
    RebuildDecision { required, reasons }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PRESENT: ArtifactProbe = ArtifactProbe {
        lexical: true,
        vector: true,
        graph: true,
    };

    fn changed(chunks: usize, removed: usize) -> ChangeSummary {
        ChangeSummary {
            changed_chunks: chunks,
            changed_files: usize::from(chunks > 0),
            removed_files: removed,
        }
    }

    #[test]
    fn up_to_date_when_nothing_changed() {
        let out = decide_rebuild(false, &changed(0, 0), &PRESENT);
        assert_eq!(out.required, false);
        assert_eq!(out.reasons, Vec::<RebuildReason>::new());
    }

    #[test]
    fn force_alone_requires_rebuild() {
        let out = decide_rebuild(true, &ChangeSummary::default(), &PRESENT);
        assert_eq!(out.required, true);
        assert_eq!(out.reasons, vec![RebuildReason::ForceRequested]);
    }

    #[test]
    fn changed_chunks_require_rebuild() {
        let out = decide_rebuild(false, &changed(4, 0), &PRESENT);
        assert_eq!(out.required, true);
        assert_eq!(out.reasons, vec![RebuildReason::FilesChanged]);
    }

    #[test]
    fn changed_file_without_chunks_is_not_a_trigger() {
        let summary = ChangeSummary {
            changed_chunks: 0,
            changed_files: 1,
            removed_files: 0,
        };
        assert_eq!(decide_rebuild(false, &summary, &PRESENT).required, false);
    }

    #[test]
    fn removed_files_require_rebuild() {
        let out = decide_rebuild(false, &changed(0, 2), &PRESENT);
        assert_eq!(out.reasons, vec![RebuildReason::FilesRemoved]);
    }

    #[test]
    fn each_missing_artifact_is_reported() {
        let lexical = ArtifactProbe { lexical: false, ..PRESENT };
        let vector = ArtifactProbe { vector: false, ..PRESENT };
        let graph = ArtifactProbe { graph: false, ..PRESENT };

        assert_eq!(
            decide_rebuild(false, &changed(0, 0), &lexical).reasons,
            vec![RebuildReason::LexicalIndexMissing]
        );
        assert_eq!(
            decide_rebuild(false, &changed(0, 0), &vector).reasons,
            vec![RebuildReason::VectorStoreMissing]
        );
        assert_eq!(
            decide_rebuild(false, &changed(0, 0), &graph).reasons,
            vec![RebuildReason::GraphMissing]
        );
    }

    #[test]
    fn all_reasons_accumulate_in_order() {
        let missing = ArtifactProbe {
            lexical: false,
            vector: false,
            graph: false,
        };
        let out = decide_rebuild(true, &changed(1, 1), &missing);
        assert_eq!(
            out.reasons,
            vec![
                RebuildReason::ForceRequested,
                RebuildReason::FilesChanged,
                RebuildReason::FilesRemoved,
                RebuildReason::LexicalIndexMissing,
                RebuildReason::VectorStoreMissing,
                RebuildReason::GraphMissing,
            ]
        );
    }

    #[test]
    fn reasons_serialize_snake_case() {
        let json = serde_json::to_string(&RebuildReason::LexicalIndexMissing).unwrap();
        assert_eq!(json, "\"lexical_index_missing\"");
    }
}
