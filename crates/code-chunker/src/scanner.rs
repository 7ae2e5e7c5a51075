use crate::config::ChunkerConfig;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// `.gitignore`-aware corpus walker
pub struct FileScanner<'a> {
    root: PathBuf,
    config: &'a ChunkerConfig,
}

impl<'a> FileScanner<'a> {
    pub fn new(root: impl AsRef<Path>, config: &'a ChunkerConfig) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            config,
        }
    }

    /// Accepted source files, sorted so that chunks of one path stay grouped
    pub fn scan(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for entry in WalkBuilder::new(&self.root).build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("Skipping unreadable entry under {}: {err}", self.root.display());
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let path = entry.path();
            if !self.config.accepts(path) {
                continue;
            }
            match entry.metadata() {
                Ok(meta) if meta.len() > self.config.max_file_bytes => {
                    log::debug!("Skipping oversized file {} ({} bytes)", path.display(), meta.len());
                }
                Ok(_) => files.push(path.to_path_buf()),
                Err(err) => log::warn!("Skipping {}: {err}", path.display()),
            }
        }

        files.sort();
        files
    }
}
