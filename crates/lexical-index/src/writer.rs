use crate::error::{LexicalError, Result};
use crate::tokenizer::tokenize;
use coderag_chunker::{ChunkRecord, Language};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub const DOCS_FILE_NAME: &str = "docs.jsonl";
pub const POSTINGS_FILE_NAME: &str = "postings.json";
pub const META_FILE_NAME: &str = "meta.json";
pub const LEXICAL_FORMAT_VERSION: u32 = 1;
const OWNED_FILE_NAMES: [&str; 3] = [DOCS_FILE_NAME, POSTINGS_FILE_NAME, META_FILE_NAME];

/// Stored fields of one indexed chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexicalDoc {
    pub doc_id: u32,
    pub chunk_id: String,
    pub path: String,
    pub start_line: usize,
    pub end_line: usize,
    pub language: Language,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexicalMeta {
    pub version: u32,
    pub documents: usize,
    pub terms: usize,
    pub committed_at_unix_ms: u64,
}

/// Scoped writer over a lexical index directory.
///
/// Nothing reaches disk before [`commit`](Self::commit); each file is swapped
/// in with a rename. Dropping the writer uncommitted discards pending work and
/// leaves the previous index as it was.
#[derive(Debug)]
pub struct LexicalWriter {
    dir: PathBuf,
    docs: Vec<LexicalDoc>,
    postings: BTreeMap<String, Vec<u32>>,
    reset_requested: bool,
    dirty: bool,
    committed: bool,
}

impl LexicalWriter {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            docs: Vec::new(),
            postings: BTreeMap::new(),
            reset_requested: false,
            dirty: false,
            committed: false,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Drop pending documents; the next commit replaces the index files
    pub fn reset(&mut self) {
        self.docs.clear();
        self.postings.clear();
        self.reset_requested = true;
        self.dirty = true;
    }

    /// Add chunk records to the pending index; returns the number added
    pub fn index_documents(&mut self, chunks: &[ChunkRecord]) -> Result<usize> {
        if self.committed {
            return Err(LexicalError::AlreadyCommitted);
        }

        for chunk in chunks {
            let doc_id = u32::try_from(self.docs.len())
                .map_err(|_| LexicalError::TooManyDocuments(self.docs.len()))?;

            for term in tokenize(&chunk.content) {
                self.postings.entry(term).or_default().push(doc_id);
            }

            self.docs.push(LexicalDoc {
                doc_id,
                chunk_id: chunk.id(),
                path: chunk.path.clone(),
                start_line: chunk.start_line,
                end_line: chunk.end_line,
                language: chunk.language,
                content: chunk.content.clone(),
            });
        }

        self.dirty = true;
        Ok(chunks.len())
    }

    pub fn pending_documents(&self) -> usize {
        self.docs.len()
    }

    /// Write the pending index to disk
    pub fn commit(&mut self) -> Result<LexicalMeta> {
        if self.committed {
            return Err(LexicalError::AlreadyCommitted);
        }

        if self.reset_requested {
            self.remove_stale_temporaries()?;
        }

        let docs_path = self.dir.join(DOCS_FILE_NAME);
        write_atomic(&docs_path, |out| {
            for doc in &self.docs {
                serde_json::to_writer(&mut *out, doc)?;
                out.write_all(b"\n")?;
            }
            Ok(())
        })?;

        let postings_path = self.dir.join(POSTINGS_FILE_NAME);
        write_atomic(&postings_path, |out| {
            serde_json::to_writer(&mut *out, &self.postings)?;
            Ok(())
        })?;

        let meta = LexicalMeta {
            version: LEXICAL_FORMAT_VERSION,
            documents: self.docs.len(),
            terms: self.postings.len(),
            committed_at_unix_ms: unix_now_ms(),
        };
        let meta_path = self.dir.join(META_FILE_NAME);
        write_atomic(&meta_path, |out| {
            serde_json::to_writer_pretty(&mut *out, &meta)?;
            Ok(())
        })?;

        self.committed = true;
        self.dirty = false;
        log::debug!(
            "Committed lexical index at {} ({} docs, {} terms)",
            self.dir.display(),
            meta.documents,
            meta.terms
        );
        Ok(meta)
    }

    /// Remove temporaries left by an interrupted commit. Only names this
    /// writer produces are touched; the directory may hold unrelated files.
    fn remove_stale_temporaries(&self) -> Result<()> {
        for known in OWNED_FILE_NAMES {
            let tmp = tmp_path(&self.dir.join(known));
            match std::fs::remove_file(&tmp) {
                Ok(()) => log::debug!("Removed stale {}", tmp.display()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }
}

impl Drop for LexicalWriter {
    fn drop(&mut self) {
        if self.dirty && !self.committed {
            log::warn!(
                "Lexical writer for {} released without commit; {} pending documents discarded",
                self.dir.display(),
                self.docs.len()
            );
        }
    }
}

/// Load the committed metadata of an index, if any
pub fn read_lexical_meta(dir: impl AsRef<Path>) -> Result<Option<LexicalMeta>> {
    let path = dir.as_ref().join(META_FILE_NAME);
    if !path.exists() {
        return Ok(None);
    }
    let bytes = std::fs::read(&path)?;
    Ok(Some(serde_json::from_slice(&bytes)?))
}

fn write_atomic<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<std::fs::File>) -> Result<()>,
{
    let tmp = tmp_path(path);
    let file = std::fs::File::create(&tmp)?;
    let mut out = BufWriter::new(file);

    let written = fill(&mut out).and_then(|()| {
        out.flush()?;
        Ok(())
    });
    if let Err(err) = written {
        if let Err(cleanup) = std::fs::remove_file(&tmp) {
            log::debug!("Could not remove {}: {cleanup}", tmp.display());
        }
        return Err(err);
    }
    drop(out);

    std::fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[allow(clippy::cast_possible_truncation)]
fn unix_now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
