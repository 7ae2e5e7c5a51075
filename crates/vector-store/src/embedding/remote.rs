use super::{ensure_count, Embedder};
use crate::error::{Result, VectorStoreError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub endpoint: String,
    pub timeout: Duration,
    /// Retries per batch after the first attempt
    pub max_retries: usize,
}

impl RemoteConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(60),
            max_retries: 3,
        }
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Embedding server reached over HTTP.
///
/// Wire format: `POST <endpoint>` with `{"inputs": [..]}`, answered by
/// `{"embeddings": [[..], ..]}` in input order.
#[derive(Debug, Clone)]
pub struct RemoteEmbedder {
    client: Client,
    config: RemoteConfig,
}

impl RemoteEmbedder {
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    async fn request(&self, texts: &[String]) -> std::result::Result<Vec<Vec<f32>>, Attempt> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&EmbedRequest { inputs: texts })
            .send()
            .await
            .map_err(|err| {
                let retry = err.is_timeout() || err.is_connect() || err.is_request();
                Attempt::new(retry, err.into())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(Attempt::new(
                should_retry(status),
                VectorStoreError::ServiceError(format!("{status}: {body}")),
            ));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|err| Attempt::new(false, err.into()))?;
        Ok(parsed.embeddings)
    }
}

struct Attempt {
    retryable: bool,
    error: VectorStoreError,
}

impl Attempt {
    const fn new(retryable: bool, error: VectorStoreError) -> Self {
        Self { retryable, error }
    }
}

#[async_trait]
impl Embedder for RemoteEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut retries = 0usize;
        loop {
            match self.request(texts).await {
                Ok(vectors) => {
                    ensure_count(texts.len(), &vectors)?;
                    return Ok(vectors);
                }
                Err(failed) if failed.retryable && retries < self.config.max_retries => {
                    retries += 1;
                    log::warn!(
                        "Embedding request to {} failed ({}); retry {retries}/{}",
                        self.config.endpoint,
                        failed.error,
                        self.config.max_retries
                    );
                    tokio::time::sleep(retry_backoff(retries)).await;
                }
                Err(failed) => return Err(failed.error),
            }
        }
    }
}

fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn retry_backoff(attempt: usize) -> Duration {
    #[allow(clippy::cast_possible_truncation)]
    let capped = attempt.min(5) as u32;
    Duration::from_millis(250 * (1 << capped))
}
