use crate::config::ChunkerConfig;
use crate::language::Language;
use crate::record::ChunkRecord;

/// Splits file contents into fixed line windows
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    pub const fn new(config: ChunkerConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Chunk a file's text. Blank files produce no chunks.
    pub fn chunk_str(&self, content: &str, path: &str) -> Vec<ChunkRecord> {
        if content.trim().is_empty() {
            return Vec::new();
        }

        let language = Language::from_path(path);

        // (byte offset of line start, line text including terminator)
        let mut lines: Vec<(usize, &str)> = Vec::new();
        let mut offset = 0;
        for line in content.split_inclusive('\n') {
            lines.push((offset, line));
            offset += line.len();
        }

        let window = self.config.max_lines.max(1);
        let step = window.saturating_sub(self.config.overlap_lines).max(1);

        let mut chunks = Vec::new();
        let mut start = 0;
        while start < lines.len() {
            let end = (start + window).min(lines.len());
            let start_byte = lines[start].0;
            let (last_offset, last_line) = lines[end - 1];
            let end_byte = last_offset + last_line.len();

            chunks.push(ChunkRecord {
                path: path.to_string(),
                start_line: start + 1,
                end_line: end,
                start_byte,
                end_byte,
                language,
                content: content[start_byte..end_byte].to_string(),
            });

            if end == lines.len() {
                break;
            }
            start += step;
        }

        chunks
    }
}
