use crate::error::Result;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

pub const METADATA_FILE_NAME: &str = "mtimes.json";

#[derive(Debug, Clone, PartialEq, Eq)]
struct MetadataEntry {
    path: String,
    modified_ms: u64,
}

/// Last-known modification time per source path.
///
/// Keys compare case-insensitively; the spelling last written is what gets
/// persisted. The document on disk is a flat JSON object `path -> unix ms`.
#[derive(Debug)]
pub struct MetadataStore {
    file: PathBuf,
    entries: BTreeMap<String, MetadataEntry>,
    loaded: bool,
}

impl MetadataStore {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            entries: BTreeMap::new(),
            loaded: false,
        }
    }

    /// Store backed by `<dir>/mtimes.json`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(METADATA_FILE_NAME))
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Load the persisted document once. A missing file is an empty store; an
    /// unreadable one is logged and treated as empty so the next run rebuilds.
    pub fn ensure_loaded(&mut self) -> Result<()> {
        if self.loaded {
            return Ok(());
        }
        self.loaded = true;

        if !self.file.exists() {
            return Ok(());
        }

        let bytes = std::fs::read(&self.file)?;
        match serde_json::from_slice::<BTreeMap<String, u64>>(&bytes) {
            Ok(map) => {
                for (path, modified_ms) in map {
                    self.set_timestamp(&path, modified_ms);
                }
                log::debug!(
                    "Loaded {} metadata entries from {}",
                    self.entries.len(),
                    self.file.display()
                );
            }
            Err(err) => {
                log::warn!(
                    "Ignoring unreadable metadata file {}: {err}",
                    self.file.display()
                );
            }
        }
        Ok(())
    }

    pub fn get(&self, path: &str) -> Option<u64> {
        self.entries.get(&fold_path_key(path)).map(|e| e.modified_ms)
    }

    /// Create or overwrite the entry for `path`
    pub fn set_timestamp(&mut self, path: &str, modified_ms: u64) {
        self.entries.insert(
            fold_path_key(path),
            MetadataEntry {
                path: path.to_string(),
                modified_ms,
            },
        );
    }

    pub fn remove(&mut self, path: &str) -> bool {
        self.entries.remove(&fold_path_key(path)).is_some()
    }

    /// Drop every entry whose folded key is not in `live`; returns the dropped paths
    pub fn retain_live(&mut self, live: &HashSet<String>) -> Vec<String> {
        let mut removed = Vec::new();
        self.entries.retain(|key, entry| {
            let keep = live.contains(key);
            if !keep {
                removed.push(entry.path.clone());
            }
            keep
        });
        removed
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|e| e.path.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Persist via temp file + rename
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let map: BTreeMap<&str, u64> = self
            .entries
            .values()
            .map(|e| (e.path.as_str(), e.modified_ms))
            .collect();
        let bytes = serde_json::to_vec_pretty(&map)?;

        let tmp = self.file.with_extension("json.tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.file)?;
        log::debug!("Saved {} metadata entries to {}", map.len(), self.file.display());
        Ok(())
    }
}

/// Case-insensitive, separator-agnostic key for a path
pub fn fold_path_key(path: &str) -> String {
    path.replace('\\', "/").to_lowercase()
}

/// Modification time of `path` in unix milliseconds
#[allow(clippy::cast_possible_truncation)]
pub fn file_mtime_ms(path: impl AsRef<Path>) -> Result<u64> {
    let modified = std::fs::metadata(path.as_ref())?.modified()?;
    Ok(modified.duration_since(UNIX_EPOCH)?.as_millis() as u64)
}
