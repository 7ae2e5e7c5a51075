mod output;

use anyhow::{Context, Result};
use coderag_indexer::{
    cancel_pair, IndexerError, IndexingConfig, IndexingPipeline, DEFAULT_CONFIG_FILE_NAME,
};
use std::path::{Path, PathBuf};

/// Config from `--config`, else `<root>/coderag.toml` if it exists, else defaults.
/// `root` always wins over the file's `corpus_root`.
pub fn load_config(file: Option<&Path>, root: Option<&Path>) -> Result<IndexingConfig> {
    let file = file.map(Path::to_path_buf).or_else(|| {
        let candidate = root
            .unwrap_or_else(|| Path::new("."))
            .join(DEFAULT_CONFIG_FILE_NAME);
        candidate.is_file().then_some(candidate)
    });

    let mut config = match &file {
        Some(path) => {
            log::debug!("Loading config from {}", path.display());
            IndexingConfig::from_toml_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?
        }
        None => IndexingConfig::default(),
    };

    if let Some(root) = root {
        config.corpus_root = PathBuf::from(root);
    }
    Ok(config)
}

/// Run the pipeline; Ctrl-C cancels the vector stage
pub async fn index(config: IndexingConfig, json: bool) -> Result<()> {
    let pipeline = IndexingPipeline::new(config).context("Failed to set up indexing pipeline")?;

    let (handle, signal) = cancel_pair();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("[index] Interrupt received, cancelling...");
            handle.cancel();
        }
    });

    let result = pipeline.run(&signal).await;
    ctrl_c.abort();

    match result {
        Ok(report) => output::print_run(&report, json),
        Err(IndexerError::Cancelled) => {
            anyhow::bail!("Indexing cancelled; metadata was not updated, the next run will rebuild")
        }
        Err(err) => Err(err).context("Indexing failed"),
    }
}

pub fn status(config: IndexingConfig, json: bool) -> Result<()> {
    let pipeline = IndexingPipeline::new(config).context("Failed to set up indexing pipeline")?;
    let report = pipeline.status().context("Failed to inspect index state")?;
    output::print_status(&report, json)
}
