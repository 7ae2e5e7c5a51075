use crate::language::Language;
use serde::{Deserialize, Serialize};

/// One indexable unit of source text. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Path of the source file, as discovered under the corpus root
    pub path: String,
    /// 1-based, inclusive
    pub start_line: usize,
    /// 1-based, inclusive
    pub end_line: usize,
    pub start_byte: usize,
    pub end_byte: usize,
    pub language: Language,
    pub content: String,
}

impl ChunkRecord {
    /// Stable identifier shared by all three artifacts
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}:{}:{}", self.path, self.start_line, self.end_line)
    }

    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.end_line + 1 - self.start_line
    }
}
