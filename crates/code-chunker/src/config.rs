use crate::error::{ChunkerError, Result};
use crate::language::Language;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Chunking and scanning options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Maximum lines per chunk
    pub max_lines: usize,
    /// Lines repeated at the start of the next chunk
    pub overlap_lines: usize,
    /// Extension allow-list (without dot). Empty means every known language.
    pub extensions: Vec<String>,
    /// Files larger than this are skipped
    pub max_file_bytes: u64,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_lines: 60,
            overlap_lines: 0,
            extensions: Vec::new(),
            max_file_bytes: 1024 * 1024,
        }
    }
}

impl ChunkerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_lines == 0 {
            return Err(ChunkerError::invalid_config("max_lines must be at least 1"));
        }
        if self.overlap_lines >= self.max_lines {
            return Err(ChunkerError::invalid_config(format!(
                "overlap_lines ({}) must be smaller than max_lines ({})",
                self.overlap_lines, self.max_lines
            )));
        }
        Ok(())
    }

    /// Whether a file with this path should be part of the corpus
    pub fn accepts(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        if self.extensions.is_empty() {
            return Language::from_extension(ext).is_known();
        }
        self.extensions
            .iter()
            .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_accepts_known_languages_only() {
        let config = ChunkerConfig::default();
        assert!(config.accepts(Path::new("src/lib.rs")));
        assert!(config.accepts(Path::new("Foo.CS")));
        assert!(!config.accepts(Path::new("notes.txt")));
        assert!(!config.accepts(Path::new("Makefile")));
    }

    #[test]
    fn explicit_allow_list_wins() {
        let config = ChunkerConfig {
            extensions: vec![".txt".into(), "md".into()],
            ..ChunkerConfig::default()
        };
        assert!(config.accepts(Path::new("notes.txt")));
        assert!(config.accepts(Path::new("README.MD")));
        assert!(!config.accepts(Path::new("src/lib.rs")));
    }

    #[test]
    fn overlap_must_be_smaller_than_window() {
        let config = ChunkerConfig {
            max_lines: 4,
            overlap_lines: 4,
            ..ChunkerConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(ChunkerConfig::default().validate().is_ok());
    }
}
