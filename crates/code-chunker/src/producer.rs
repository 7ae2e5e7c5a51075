use crate::chunker::Chunker;
use crate::config::ChunkerConfig;
use crate::error::{ChunkerError, Result};
use crate::metadata::{file_mtime_ms, fold_path_key, MetadataStore};
use crate::record::ChunkRecord;
use crate::scanner::FileScanner;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Result of comparing the corpus against the metadata store
#[derive(Debug, Default, Clone)]
pub struct ChangeSet {
    /// Chunks of files that are new or whose mtime moved
    pub chunks: Vec<ChunkRecord>,
    pub changed_files: Vec<String>,
    /// Paths the store knew about that no longer exist
    pub removed_files: Vec<String>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty() && self.removed_files.is_empty()
    }
}

/// Turns the files under a corpus root into chunk records
#[derive(Debug, Clone)]
pub struct ChunkProducer {
    root: PathBuf,
    chunker: Chunker,
}

impl ChunkProducer {
    pub fn new(root: impl AsRef<Path>, config: ChunkerConfig) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(ChunkerError::InvalidRoot(format!(
                "Path is not a directory: {}",
                root.display()
            )));
        }
        config.validate()?;

        Ok(Self {
            root,
            chunker: Chunker::new(config),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Chunks for files changed since the timestamps in `metadata`.
    ///
    /// New mtimes are recorded in the store (in memory only) for every file
    /// that was chunked, and entries for vanished files are dropped.
    pub fn changed_chunks(&self, metadata: &mut MetadataStore) -> Result<ChangeSet> {
        let files = FileScanner::new(&self.root, self.chunker.config()).scan();
        let mut changes = ChangeSet::default();
        let mut live = HashSet::with_capacity(files.len());

        for file in &files {
            let path = path_string(file);
            live.insert(fold_path_key(&path));

            let mtime = match file_mtime_ms(file) {
                Ok(mtime) => mtime,
                Err(err) => {
                    log::warn!("Cannot stat {path}: {err}");
                    continue;
                }
            };
            if metadata.get(&path) == Some(mtime) {
                continue;
            }

            match self.chunk_file(file, &path) {
                Ok(Some(chunks)) => {
                    metadata.set_timestamp(&path, mtime);
                    changes.changed_files.push(path);
                    changes.chunks.extend(chunks);
                }
                Ok(None) => {}
                Err(err) => log::warn!("Failed to chunk {path}: {err}"),
            }
        }

        changes.removed_files = metadata.retain_live(&live);

        log::debug!(
            "Change detection: {} changed files, {} changed chunks, {} removed files",
            changes.changed_files.len(),
            changes.chunks.len(),
            changes.removed_files.len()
        );
        Ok(changes)
    }

    /// Every chunk of every file in the corpus
    pub fn full_snapshot(&self) -> Result<Vec<ChunkRecord>> {
        let files = FileScanner::new(&self.root, self.chunker.config()).scan();
        let mut chunks = Vec::new();

        for file in &files {
            let path = path_string(file);
            match self.chunk_file(file, &path) {
                Ok(Some(file_chunks)) => chunks.extend(file_chunks),
                Ok(None) => {}
                Err(err) => log::warn!("Failed to chunk {path}: {err}"),
            }
        }

        Ok(chunks)
    }

    /// `None` for files that are not UTF-8 text
    fn chunk_file(&self, file: &Path, path: &str) -> Result<Option<Vec<ChunkRecord>>> {
        let bytes = std::fs::read(file)?;
        let Ok(content) = String::from_utf8(bytes) else {
            log::warn!("Skipping non UTF-8 file {path}");
            return Ok(None);
        };
        Ok(Some(self.chunker.chunk_str(&content, path)))
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
