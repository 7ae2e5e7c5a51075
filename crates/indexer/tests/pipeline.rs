use coderag_indexer::{
    cancel_pair, CancelSignal, EmbeddingKind, IndexerError, IndexingConfig, IndexingPipeline,
    PipelineStage, RebuildReason, RunOutcome,
};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, body).unwrap();
}

fn bump_mtime(path: &Path) {
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() + Duration::from_secs(120))
        .unwrap();
}

fn corpus() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/config.rs", "pub struct Settings { depth: usize }\n");
    write(
        dir.path(),
        "src/load.rs",
        "fn load_settings() -> Settings {\n    Settings { depth: 1 }\n}\n",
    );
    write(
        dir.path(),
        "src/main.rs",
        "fn main() {\n    let s = load_settings();\n}\n",
    );
    dir
}

fn config(root: &Path) -> IndexingConfig {
    let mut config = IndexingConfig::for_root(root);
    config.embedding_dimension = 16;
    config.max_degree_of_parallelism = 2;
    config
}

fn pipeline(config: IndexingConfig) -> IndexingPipeline {
    IndexingPipeline::new(config).unwrap()
}

struct Artifacts {
    lexical: PathBuf,
    vectors: PathBuf,
    csr: PathBuf,
    csc: PathBuf,
    nodes: PathBuf,
    metadata: PathBuf,
}

fn artifacts(root: &Path) -> Artifacts {
    let base = root.join(".coderag");
    Artifacts {
        lexical: base.join("lexical"),
        vectors: base.join("vectors").join("vectors.jsonl"),
        csr: base.join("graph.csr.bin"),
        csc: base.join("graph.csc.bin"),
        nodes: base.join("graph.nodes.tsv"),
        metadata: base.join("metadata").join("mtimes.json"),
    }
}

fn metadata(root: &Path) -> BTreeMap<String, u64> {
    let raw = std::fs::read_to_string(artifacts(root).metadata).unwrap();
    serde_json::from_str(&raw).unwrap()
}

fn vector_lines(root: &Path) -> usize {
    std::fs::read_to_string(artifacts(root).vectors)
        .unwrap()
        .lines()
        .filter(|l| !l.trim().is_empty())
        .count()
}

/// Bytes and mtime of every artifact file
fn fingerprint(root: &Path) -> Vec<(PathBuf, Vec<u8>, SystemTime)> {
    let a = artifacts(root);
    let mut files = vec![a.vectors, a.csr, a.csc, a.nodes, a.metadata];
    for entry in std::fs::read_dir(&a.lexical).unwrap() {
        files.push(entry.unwrap().path());
    }
    files.sort();
    files
        .into_iter()
        .map(|p| {
            let bytes = std::fs::read(&p).unwrap();
            let modified = std::fs::metadata(&p).unwrap().modified().unwrap();
            (p, bytes, modified)
        })
        .collect()
}

#[tokio::test]
async fn first_run_builds_everything() {
    let dir = corpus();
    let report = pipeline(config(dir.path()))
        .run(&CancelSignal::never())
        .await
        .unwrap();

    assert_eq!(report.outcome, RunOutcome::Rebuilt);
    assert_eq!(
        report.reasons,
        vec![
            RebuildReason::FilesChanged,
            RebuildReason::LexicalIndexMissing,
            RebuildReason::VectorStoreMissing,
            RebuildReason::GraphMissing,
        ]
    );
    assert_eq!(
        report.stages,
        vec![
            PipelineStage::DecidingRebuild,
            PipelineStage::SelectingEmbeddingSource,
            PipelineStage::CapturingSnapshot,
            PipelineStage::WritingLexical,
            PipelineStage::WritingVector,
            PipelineStage::WritingGraph,
            PipelineStage::PersistingMetadata,
            PipelineStage::Done,
        ]
    );
    assert_eq!(report.files, 3);
    assert_eq!(report.chunks, 3);
    assert_eq!(report.changed_chunks, 3);
    assert_eq!(report.embedding, Some(EmbeddingKind::Hash));
    assert_eq!(report.metadata_failures, 0);

    let a = artifacts(dir.path());
    let lexical = coderag_lexical::read_lexical_meta(&a.lexical).unwrap().unwrap();
    assert_eq!(lexical.documents, 3);
    assert_eq!(vector_lines(dir.path()), 3);
    assert!(a.csr.exists() && a.csc.exists() && a.nodes.exists());

    let recorded = metadata(dir.path());
    assert_eq!(recorded.len(), 3);
    for name in ["config.rs", "load.rs", "main.rs"] {
        assert!(recorded.keys().any(|k| k.ends_with(name)), "{name} not recorded");
    }
}

#[tokio::test]
async fn unchanged_corpus_is_a_no_op() {
    let dir = corpus();
    let pipeline = pipeline(config(dir.path()));
    pipeline.run(&CancelSignal::never()).await.unwrap();
    let before = fingerprint(dir.path());

    let report = pipeline.run(&CancelSignal::never()).await.unwrap();

    assert_eq!(report.outcome, RunOutcome::UpToDate);
    assert!(report.reasons.is_empty());
    assert_eq!(
        report.stages,
        vec![PipelineStage::DecidingRebuild, PipelineStage::Done]
    );
    assert_eq!(report.chunks, 0);
    assert_eq!(report.embedding, None);
    assert_eq!(fingerprint(dir.path()), before);
}

#[tokio::test]
async fn forced_rebuild_rewrites_all_artifacts() {
    let dir = corpus();
    pipeline(config(dir.path()))
        .run(&CancelSignal::never())
        .await
        .unwrap();

    let a = artifacts(dir.path());
    std::fs::write(&a.vectors, "stale\n").unwrap();
    std::fs::write(&a.nodes, "stale\n").unwrap();

    let mut forced = config(dir.path());
    forced.force_full_rebuild = true;
    let report = pipeline(forced).run(&CancelSignal::never()).await.unwrap();

    assert_eq!(report.outcome, RunOutcome::Rebuilt);
    assert_eq!(report.reasons, vec![RebuildReason::ForceRequested]);
    assert_eq!(report.changed_chunks, 0);
    assert_eq!(report.chunks, 3);
    assert_eq!(report.metadata_failures, 0);

    let records = coderag_vector_store::read_vectors(a.vectors.parent().unwrap())
        .await
        .unwrap();
    assert_eq!(records.len(), 3);
    assert!(std::fs::read_to_string(&a.nodes)
        .unwrap()
        .starts_with(coderag_graph::NODES_HEADER));
    assert_eq!(metadata(dir.path()).len(), 3);
}

#[tokio::test]
async fn one_changed_file_rebuilds_whole_corpus() {
    let dir = corpus();
    let pipeline = pipeline(config(dir.path()));
    pipeline.run(&CancelSignal::never()).await.unwrap();
    let old = metadata(dir.path());

    write(dir.path(), "src/main.rs", "fn main() {\n    run();\n}\n");
    bump_mtime(&dir.path().join("src/main.rs"));

    let report = pipeline.run(&CancelSignal::never()).await.unwrap();
    assert_eq!(report.reasons, vec![RebuildReason::FilesChanged]);
    assert_eq!(report.changed_chunks, 1);
    assert_eq!(report.chunks, 3);
    assert_eq!(vector_lines(dir.path()), 3);

    let new = metadata(dir.path());
    let main_key = new.keys().find(|k| k.ends_with("main.rs")).unwrap();
    assert_ne!(new.get(main_key), old.get(main_key));
}

#[tokio::test]
async fn missing_artifact_triggers_rebuild() {
    let dir = corpus();
    let pipeline = pipeline(config(dir.path()));
    pipeline.run(&CancelSignal::never()).await.unwrap();
    let a = artifacts(dir.path());

    std::fs::remove_dir_all(&a.lexical).unwrap();
    let report = pipeline.run(&CancelSignal::never()).await.unwrap();
    assert_eq!(report.reasons, vec![RebuildReason::LexicalIndexMissing]);

    std::fs::remove_file(&a.vectors).unwrap();
    let report = pipeline.run(&CancelSignal::never()).await.unwrap();
    assert_eq!(report.reasons, vec![RebuildReason::VectorStoreMissing]);

    for file in [&a.csr, &a.csc, &a.nodes] {
        std::fs::remove_file(file).unwrap();
        let report = pipeline.run(&CancelSignal::never()).await.unwrap();
        assert_eq!(report.reasons, vec![RebuildReason::GraphMissing]);
        assert!(file.exists());
    }

    let report = pipeline.run(&CancelSignal::never()).await.unwrap();
    assert_eq!(report.outcome, RunOutcome::UpToDate);
}

#[tokio::test]
async fn empty_lexical_dir_counts_as_missing() {
    let dir = corpus();
    let pipeline = pipeline(config(dir.path()));
    pipeline.run(&CancelSignal::never()).await.unwrap();

    let lexical = artifacts(dir.path()).lexical;
    std::fs::remove_dir_all(&lexical).unwrap();
    std::fs::create_dir_all(&lexical).unwrap();

    let report = pipeline.run(&CancelSignal::never()).await.unwrap();
    assert_eq!(report.reasons, vec![RebuildReason::LexicalIndexMissing]);
}

#[tokio::test]
async fn deleted_file_leaves_the_indexes() {
    let dir = corpus();
    let pipeline = pipeline(config(dir.path()));
    pipeline.run(&CancelSignal::never()).await.unwrap();

    std::fs::remove_file(dir.path().join("src/config.rs")).unwrap();
    let report = pipeline.run(&CancelSignal::never()).await.unwrap();

    assert_eq!(report.reasons, vec![RebuildReason::FilesRemoved]);
    assert_eq!(report.removed_files, 1);
    assert_eq!(report.chunks, 2);
    assert_eq!(vector_lines(dir.path()), 2);
    assert_eq!(metadata(dir.path()).len(), 2);
}

#[tokio::test]
async fn remote_endpoint_is_preferred() {
    let dir = corpus();
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    write(dir.path(), "tools/embed.py", "print('unused')\n");
    std::fs::create_dir_all(dir.path().join("model")).unwrap();

    let mut cfg = config(dir.path());
    cfg.embedding_server_url = Some(format!("http://{addr}/embed"));
    cfg.bridge_script_path = Some(PathBuf::from("tools/embed.py"));
    cfg.model_path = Some(PathBuf::from("model"));
    cfg.remote_max_retries = 1;
    cfg.remote_timeout_secs = 2;

    // Nothing listens, so the vector stage fails after the lexical write.
    let err = pipeline(cfg).run(&CancelSignal::never()).await.unwrap_err();
    assert!(matches!(err, IndexerError::VectorStoreError(_)), "{err}");

    let a = artifacts(dir.path());
    assert!(a.lexical.exists());
    assert!(!a.vectors.exists());
    assert!(!a.metadata.exists());
}

#[tokio::test]
async fn bridge_without_model_fails_before_any_write() {
    let dir = corpus();
    write(dir.path(), "tools/embed.py", "print('unused')\n");

    let mut cfg = config(dir.path());
    cfg.bridge_script_path = Some(PathBuf::from("tools/embed.py"));
    cfg.model_path = Some(PathBuf::from("no-such-model"));

    let err = pipeline(cfg).run(&CancelSignal::never()).await.unwrap_err();
    assert!(matches!(err, IndexerError::ConfigError(_)), "{err}");
    assert!(!dir.path().join(".coderag").exists());
}

#[tokio::test]
async fn cancelled_run_never_records_success() {
    let dir = corpus();
    let pipeline = pipeline(config(dir.path()));
    let (handle, signal) = cancel_pair();
    handle.cancel();

    let err = pipeline.run(&signal).await.unwrap_err();
    assert!(matches!(err, IndexerError::Cancelled));

    let a = artifacts(dir.path());
    assert!(!a.metadata.exists());
    assert!(!a.vectors.exists());
    assert!(!a.nodes.exists());

    let report = pipeline.run(&CancelSignal::never()).await.unwrap();
    assert_eq!(report.outcome, RunOutcome::Rebuilt);
    assert!(report.reasons.contains(&RebuildReason::VectorStoreMissing));
    assert!(report.reasons.contains(&RebuildReason::GraphMissing));
    assert_eq!(metadata(dir.path()).len(), 3);
}

#[tokio::test]
async fn cancelled_rebuild_keeps_previous_metadata() {
    let dir = corpus();
    let pipeline = pipeline(config(dir.path()));
    pipeline.run(&CancelSignal::never()).await.unwrap();
    let saved = metadata(dir.path());

    bump_mtime(&dir.path().join("src/load.rs"));
    let (handle, signal) = cancel_pair();
    handle.cancel();
    assert!(matches!(
        pipeline.run(&signal).await,
        Err(IndexerError::Cancelled)
    ));
    assert_eq!(metadata(dir.path()), saved);

    let report = pipeline.run(&CancelSignal::never()).await.unwrap();
    assert_eq!(report.reasons, vec![RebuildReason::FilesChanged]);
    assert_ne!(metadata(dir.path()), saved);
}

#[tokio::test]
async fn status_reports_without_writing() {
    let dir = corpus();
    let pipeline = pipeline(config(dir.path()));

    let status = pipeline.status().unwrap();
    assert!(status.decision.required);
    assert_eq!(status.changes.changed_files, 3);
    assert_eq!(status.tracked_files, 0);
    assert!(!status.artifacts.all_present());
    assert!(!dir.path().join(".coderag").exists());

    pipeline.run(&CancelSignal::never()).await.unwrap();
    let status = pipeline.status().unwrap();
    assert!(!status.decision.required);
    assert_eq!(status.tracked_files, 3);
    assert!(status.artifacts.all_present());
}

#[test]
fn missing_root_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    let err = IndexingPipeline::new(config(&dir.path().join("absent"))).err().unwrap();
    assert!(matches!(err, IndexerError::ConfigError(_)));
}
