use super::{ensure_count, Embedder};
use crate::error::{Result, VectorStoreError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub interpreter: PathBuf,
    pub script: PathBuf,
    pub model_dir: PathBuf,
}

#[derive(Serialize)]
struct BridgeRequest<'a> {
    texts: &'a [String],
}

#[derive(Deserialize)]
struct BridgeResponse {
    #[serde(default)]
    embeddings: Option<Vec<Vec<f32>>>,
    #[serde(default)]
    error: Option<String>,
}

struct BridgeProcess {
    _child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

/// Local embedding model behind a subprocess.
///
/// The process is started on first use as `<interpreter> <script> --model
/// <model_dir>` and kept for the rest of the run. Each batch is one JSON line
/// `{"texts": [..]}` on stdin, answered by one JSON line on stdout carrying
/// either `embeddings` or `error`.
pub struct BridgeEmbedder {
    config: BridgeConfig,
    process: Mutex<Option<BridgeProcess>>,
}

impl BridgeEmbedder {
    #[must_use]
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            process: Mutex::new(None),
        }
    }

    pub const fn config(&self) -> &BridgeConfig {
        &self.config
    }

    fn spawn(&self) -> Result<BridgeProcess> {
        log::debug!(
            "Starting embedding bridge: {} {} --model {}",
            self.config.interpreter.display(),
            self.config.script.display(),
            self.config.model_dir.display()
        );

        let mut child = Command::new(&self.config.interpreter)
            .arg(&self.config.script)
            .arg("--model")
            .arg(&self.config.model_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| VectorStoreError::BridgeError("bridge stdin unavailable".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| VectorStoreError::BridgeError("bridge stdout unavailable".into()))?;

        Ok(BridgeProcess {
            _child: child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }

    async fn round_trip(process: &mut BridgeProcess, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut line = serde_json::to_vec(&BridgeRequest { texts })?;
        line.push(b'\n');
        process.stdin.write_all(&line).await?;
        process.stdin.flush().await?;

        let mut reply = String::new();
        let read = process.stdout.read_line(&mut reply).await?;
        if read == 0 {
            return Err(VectorStoreError::BridgeError(
                "bridge process exited before replying".into(),
            ));
        }

        let response: BridgeResponse = serde_json::from_str(reply.trim())?;
        if let Some(error) = response.error {
            return Err(VectorStoreError::BridgeError(error));
        }
        response
            .embeddings
            .ok_or_else(|| VectorStoreError::BridgeError("reply carried no embeddings".into()))
    }
}

#[async_trait]
impl Embedder for BridgeEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut guard = self.process.lock().await;
        if guard.is_none() {
            *guard = Some(self.spawn()?);
        }
        let Some(process) = guard.as_mut() else {
            return Err(VectorStoreError::BridgeError("bridge process unavailable".into()));
        };

        match Self::round_trip(process, texts).await {
            Ok(vectors) => {
                ensure_count(texts.len(), &vectors)?;
                Ok(vectors)
            }
            Err(err) => {
                // The stream may be out of sync now; start fresh next time.
                *guard = None;
                Err(err)
            }
        }
    }
}
