use crate::error::{IndexerError, Result};
use coderag_chunker::{ChunkerConfig, METADATA_FILE_NAME};
use coderag_vector_store::DEFAULT_HASH_DIMENSION;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

pub const DEFAULT_CONFIG_FILE_NAME: &str = "coderag.toml";
pub const DEFAULT_BRIDGE_INTERPRETER: &str = "python";

/// Everything one indexing run needs to know.
///
/// Artifact and bridge paths may be relative; they resolve against
/// `corpus_root`. Blank strings in the optional fields count as unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexingConfig {
    pub corpus_root: PathBuf,
    pub metadata_path: PathBuf,
    pub lexical_index_path: PathBuf,
    pub vector_index_path: PathBuf,
    /// Base path of the graph triple, see `coderag_graph::normalize_base_path`
    pub graph_path: PathBuf,
    pub force_full_rebuild: bool,

    pub embedding_server_url: Option<String>,
    pub bridge_script_path: Option<PathBuf>,
    pub bridge_interpreter: Option<PathBuf>,
    pub model_path: Option<PathBuf>,
    pub embedding_batch_size: usize,
    /// Dimension of the hash fallback
    pub embedding_dimension: usize,
    pub remote_max_retries: usize,
    pub remote_timeout_secs: u64,

    pub max_degree_of_parallelism: usize,

    pub chunking: ChunkerConfig,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            corpus_root: PathBuf::from("."),
            metadata_path: PathBuf::from(".coderag/metadata"),
            lexical_index_path: PathBuf::from(".coderag/lexical"),
            vector_index_path: PathBuf::from(".coderag/vectors"),
            graph_path: PathBuf::from(".coderag/graph"),
            force_full_rebuild: false,
            embedding_server_url: None,
            bridge_script_path: None,
            bridge_interpreter: None,
            model_path: None,
            embedding_batch_size: 32,
            embedding_dimension: DEFAULT_HASH_DIMENSION,
            remote_max_retries: 3,
            remote_timeout_secs: 60,
            max_degree_of_parallelism: std::thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(1),
            chunking: ChunkerConfig::default(),
        }
    }
}

impl IndexingConfig {
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            corpus_root: root.into(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| IndexerError::config(format!("invalid config: {e}")))
    }

    /// Load a TOML config file. A relative `corpus_root` is taken relative to
    /// the directory holding the file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            IndexerError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        let mut config = Self::from_toml_str(&content)?;

        if config.corpus_root.is_relative() {
            if let Some(dir) = path.parent() {
                config.corpus_root = dir.join(&config.corpus_root);
            }
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.chunking
            .validate()
            .map_err(|e| IndexerError::config(e.to_string()))?;
        if self.embedding_dimension == 0 {
            return Err(IndexerError::config("embedding_dimension must be at least 1"));
        }

        // The lexical directory must not equal or contain any other data location
        let lexical = normalize(&self.lexical_dir());
        let protected = [
            ("corpus_root", normalize(&self.corpus_root)),
            ("metadata_path", normalize(&self.metadata_dir())),
            ("vector_index_path", normalize(&self.vector_dir())),
        ];
        for (key, path) in protected {
            if path.starts_with(&lexical) {
                return Err(IndexerError::config(format!(
                    "lexical_index_path {} must not equal or contain {key} {}",
                    lexical.display(),
                    path.display()
                )));
            }
        }
        Ok(())
    }

    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.corpus_root.join(path)
        }
    }

    pub fn metadata_dir(&self) -> PathBuf {
        self.resolve(&self.metadata_path)
    }

    pub fn metadata_file(&self) -> PathBuf {
        self.metadata_dir().join(METADATA_FILE_NAME)
    }

    pub fn lexical_dir(&self) -> PathBuf {
        self.resolve(&self.lexical_index_path)
    }

    pub fn vector_dir(&self) -> PathBuf {
        self.resolve(&self.vector_index_path)
    }

    pub fn graph_base(&self) -> PathBuf {
        self.resolve(&self.graph_path)
    }

    pub fn embedding_server(&self) -> Option<&str> {
        self.embedding_server_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn bridge_script(&self) -> Option<PathBuf> {
        non_blank(self.bridge_script_path.as_deref()).map(|p| self.resolve(p))
    }

    pub fn model_dir(&self) -> Option<PathBuf> {
        non_blank(self.model_path.as_deref()).map(|p| self.resolve(p))
    }

    /// Interpreter used to run the bridge script, `python` unless configured
    pub fn interpreter(&self) -> PathBuf {
        non_blank(self.bridge_interpreter.as_deref())
            .map_or_else(|| PathBuf::from(DEFAULT_BRIDGE_INTERPRETER), Path::to_path_buf)
    }

    pub fn batch_size(&self) -> usize {
        self.embedding_batch_size.max(1)
    }
}

fn non_blank(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().to_string_lossy().trim().is_empty())
}

/// Lexical cleanup of `.` and `..` so that overlapping paths compare equal
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
