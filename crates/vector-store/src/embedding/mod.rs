//! Embedding sources.
//!
//! One capability, three transports. [`EmbeddingSource`] is the closed set the
//! indexer chooses from once per run; everything downstream only sees
//! [`Embedder::embed`].

mod bridge;
mod hash;
mod remote;

pub use bridge::{BridgeConfig, BridgeEmbedder};
pub use hash::{HashEmbedder, DEFAULT_HASH_DIMENSION};
pub use remote::{RemoteConfig, RemoteEmbedder};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Turns a batch of texts into one vector per text, in order
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingKind {
    Remote,
    Bridge,
    Hash,
}

impl fmt::Display for EmbeddingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Remote => "remote",
            Self::Bridge => "bridge",
            Self::Hash => "hash",
        };
        f.write_str(name)
    }
}

pub enum EmbeddingSource {
    Remote(RemoteEmbedder),
    Bridge(BridgeEmbedder),
    Hash(HashEmbedder),
}

impl EmbeddingSource {
    #[must_use]
    pub const fn kind(&self) -> EmbeddingKind {
        match self {
            Self::Remote(_) => EmbeddingKind::Remote,
            Self::Bridge(_) => EmbeddingKind::Bridge,
            Self::Hash(_) => EmbeddingKind::Hash,
        }
    }

    /// Human-readable description for progress logs
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Remote(remote) => format!("embedding server at {}", remote.endpoint()),
            Self::Bridge(bridge) => {
                format!("embedding subprocess via {}", bridge.config().script.display())
            }
            Self::Hash(hash) => format!("hash embeddings ({} dims)", hash.dimension()),
        }
    }
}

impl fmt::Debug for EmbeddingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EmbeddingSource").field(&self.describe()).finish()
    }
}

#[async_trait]
impl Embedder for EmbeddingSource {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        match self {
            Self::Remote(remote) => remote.embed(texts).await,
            Self::Bridge(bridge) => bridge.embed(texts).await,
            Self::Hash(hash) => hash.embed(texts).await,
        }
    }
}

/// Shared post-condition of every transport
pub(crate) fn ensure_count(expected: usize, vectors: &[Vec<f32>]) -> Result<()> {
    if vectors.len() != expected {
        return Err(crate::error::VectorStoreError::CountMismatch {
            expected,
            actual: vectors.len(),
        });
    }
    Ok(())
}
