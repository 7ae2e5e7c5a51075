use crate::cancel::CancelSignal;
use crate::embedding::{ensure_count, Embedder, EmbeddingSource};
use crate::error::{Result, VectorStoreError};
use coderag_chunker::ChunkRecord;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};

pub const VECTORS_FILE_NAME: &str = "vectors.jsonl";
const VECTORS_TMP_FILE_NAME: &str = "vectors.jsonl.tmp";

/// One line of `vectors.jsonl`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub path: String,
    pub start_line: usize,
    pub end_line: usize,
    pub vector: Vec<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorWriteStats {
    pub records: usize,
    pub batches: usize,
    pub dimension: Option<usize>,
}

/// Rebuilds `<dir>/vectors.jsonl` from a full chunk snapshot
pub struct VectorWriter {
    dir: PathBuf,
    source: EmbeddingSource,
    batch_size: usize,
}

impl VectorWriter {
    pub fn new(dir: impl AsRef<Path>, source: EmbeddingSource, batch_size: usize) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            source,
            batch_size: batch_size.max(1),
        }
    }

    pub const fn source(&self) -> &EmbeddingSource {
        &self.source
    }

    pub fn vectors_path(&self) -> PathBuf {
        self.dir.join(VECTORS_FILE_NAME)
    }

    /// Embed every chunk and replace the store.
    ///
    /// Batches are streamed into a temp file that only replaces the live store
    /// once every batch succeeded. Cancellation is checked before each batch and
    /// also aborts an in-flight request; either way the previous store is kept.
    pub async fn write(
        &self,
        chunks: &[ChunkRecord],
        cancel: &CancelSignal,
    ) -> Result<VectorWriteStats> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let tmp = self.dir.join(VECTORS_TMP_FILE_NAME);

        match self.write_to(&tmp, chunks, cancel).await {
            Ok(stats) => {
                tokio::fs::rename(&tmp, self.vectors_path()).await?;
                Ok(stats)
            }
            Err(err) => {
                if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                    log::debug!("Could not remove {}: {cleanup}", tmp.display());
                }
                Err(err)
            }
        }
    }

    async fn write_to(
        &self,
        tmp: &Path,
        chunks: &[ChunkRecord],
        cancel: &CancelSignal,
    ) -> Result<VectorWriteStats> {
        let file = tokio::fs::File::create(tmp).await?;
        let mut out = BufWriter::new(file);
        let mut stats = VectorWriteStats::default();
        let total_batches = chunks.len().div_ceil(self.batch_size);

        for batch in chunks.chunks(self.batch_size) {
            if cancel.is_cancelled() {
                log::warn!(
                    "Vector rebuild cancelled after {}/{total_batches} batches",
                    stats.batches
                );
                return Err(VectorStoreError::Cancelled);
            }

            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let vectors = tokio::select! {
                res = self.source.embed(&texts) => res?,
                () = cancel.cancelled() => {
                    log::warn!(
                        "Vector rebuild cancelled during batch {}/{total_batches}",
                        stats.batches + 1
                    );
                    return Err(VectorStoreError::Cancelled);
                }
            };
            ensure_count(batch.len(), &vectors)?;

            for (chunk, vector) in batch.iter().zip(vectors) {
                match stats.dimension {
                    None => stats.dimension = Some(vector.len()),
                    Some(expected) if expected != vector.len() => {
                        return Err(VectorStoreError::DimensionMismatch {
                            expected,
                            actual: vector.len(),
                        });
                    }
                    Some(_) => {}
                }

                let record = VectorRecord {
                    id: chunk.id(),
                    path: chunk.path.clone(),
                    start_line: chunk.start_line,
                    end_line: chunk.end_line,
                    vector,
                };
                let mut line = serde_json::to_vec(&record)?;
                line.push(b'\n');
                out.write_all(&line).await?;
                stats.records += 1;
            }

            stats.batches += 1;
            log::debug!("Embedded batch {}/{total_batches}", stats.batches);
        }

        out.flush().await?;
        out.into_inner().sync_all().await?;
        Ok(stats)
    }
}

/// The store "exists" when `<dir>/vectors.jsonl` is present
pub fn vector_store_exists(dir: impl AsRef<Path>) -> bool {
    dir.as_ref().join(VECTORS_FILE_NAME).is_file()
}

/// Read every record of a store
pub async fn read_vectors(dir: impl AsRef<Path>) -> Result<Vec<VectorRecord>> {
    let file = tokio::fs::File::open(dir.as_ref().join(VECTORS_FILE_NAME)).await?;
    let mut lines = BufReader::new(file).lines();
    let mut records = Vec::new();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}
