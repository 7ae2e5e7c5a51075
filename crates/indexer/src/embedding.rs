use crate::config::IndexingConfig;
use crate::error::{IndexerError, Result};
use coderag_vector_store::{
    BridgeConfig, BridgeEmbedder, EmbeddingSource, HashEmbedder, RemoteConfig, RemoteEmbedder,
};
use std::time::Duration;

/// Pick the embedding source for a run without invoking it.
///
/// Priority: embedding server, then a bridge script that exists on disk, then
/// hash embeddings. A usable bridge script without an existing model directory
/// is a configuration error; a model directory without a bridge is ignored.
pub fn select_embedding_source(config: &IndexingConfig) -> Result<EmbeddingSource> {
    if let Some(url) = config.embedding_server() {
        log::info!("[index] Using embedding server at {url}");
        let mut remote = RemoteConfig::new(url);
        remote.timeout = Duration::from_secs(config.remote_timeout_secs.max(1));
        remote.max_retries = config.remote_max_retries;
        return Ok(EmbeddingSource::Remote(RemoteEmbedder::new(remote)?));
    }

    match config.bridge_script() {
        Some(script) if script.is_file() => {
            let model_dir = config.model_dir().ok_or_else(|| {
                IndexerError::config("model_path is required when using the embedding bridge")
            })?;
            if !model_dir.is_dir() {
                return Err(IndexerError::config(format!(
                    "model directory not found: {}",
                    model_dir.display()
                )));
            }

            log::info!("[index] Using embedding subprocess via {}", script.display());
            return Ok(EmbeddingSource::Bridge(BridgeEmbedder::new(BridgeConfig {
                interpreter: config.interpreter(),
                script,
                model_dir,
            })));
        }
        Some(script) => {
            log::warn!("[index] Bridge script {} not found", script.display());
        }
        None => {}
    }

    if config.model_dir().is_some() {
        log::warn!("[index] Embedding bridge not configured; ignoring model path and using hash embeddings.");
    } else {
        log::info!("[index] No model path configured, using hash embeddings.");
    }
    Ok(EmbeddingSource::Hash(HashEmbedder::new(
        config.embedding_dimension,
    )))
}
