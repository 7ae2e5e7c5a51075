use std::path::{Path, PathBuf};

pub const CSR_SUFFIX: &str = ".csr.bin";
pub const CSC_SUFFIX: &str = ".csc.bin";
pub const NODES_SUFFIX: &str = ".nodes.tsv";
pub const DEFAULT_GRAPH_STEM: &str = "graph";

/// Base path the three graph files hang off.
///
/// A path naming one of the artifact files is reduced to its base; a
/// directory (existing, or spelled with a trailing separator) gets the default
/// `graph` stem; anything else is already a base.
pub fn normalize_base_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let raw = path.to_string_lossy();

    for suffix in [CSR_SUFFIX, CSC_SUFFIX, NODES_SUFFIX] {
        if let Some(base) = raw.strip_suffix(suffix) {
            if !base.is_empty() {
                return PathBuf::from(base);
            }
        }
    }

    if path.is_dir() || raw.ends_with('/') || raw.ends_with('\\') {
        return path.join(DEFAULT_GRAPH_STEM);
    }

    path.to_path_buf()
}

/// The artifact triple derived from a configured graph path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphArtifacts {
    pub base: PathBuf,
    /// Forward adjacency
    pub csr: PathBuf,
    /// Reverse adjacency
    pub csc: PathBuf,
    /// Node table
    pub nodes: PathBuf,
}

impl GraphArtifacts {
    pub fn for_path(path: impl AsRef<Path>) -> Self {
        let base = normalize_base_path(path);
        Self {
            csr: with_suffix(&base, CSR_SUFFIX),
            csc: with_suffix(&base, CSC_SUFFIX),
            nodes: with_suffix(&base, NODES_SUFFIX),
            base,
        }
    }

    pub fn files(&self) -> [&Path; 3] {
        [&self.csr, &self.csc, &self.nodes]
    }

    pub fn all_exist(&self) -> bool {
        self.files().iter().all(|f| f.is_file())
    }
}

/// All three graph files are present
pub fn graph_exists(path: impl AsRef<Path>) -> bool {
    GraphArtifacts::for_path(path).all_exist()
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut raw = base.as_os_str().to_os_string();
    raw.push(suffix);
    PathBuf::from(raw)
}
