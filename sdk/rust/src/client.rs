use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

pub const SIGNATURE_HEADER: &str = "X-Resonance-Signature";
pub const TIMESTAMP_HEADER: &str = "X-Resonance-Timestamp";

/// Model used by `chat` when none is given.
pub const DEFAULT_MODEL: &str = "dolphin-r1:24b";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("membrane returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

impl ChatRequest {
    /// A single-turn, non-streaming chat request.
    pub fn single(prompt: &str, model: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            stream: false,
        }
    }
}

pub struct MembraneClient {
    client: Client,
    base_url: String,
    shared_secret: String,
    project_id: String,
}

impl MembraneClient {
    pub fn new(base_url: &str, shared_secret: &str, project_id: &str) -> Self {
        Self::with_client(Client::new(), base_url, shared_secret, project_id)
    }

    /// Use a preconfigured HTTP client (proxies, timeouts, TLS roots).
    pub fn with_client(client: Client, base_url: &str, shared_secret: &str, project_id: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            shared_secret: shared_secret.to_string(),
            project_id: project_id.to_string(),
        }
    }

    /// Current time as fractional epoch seconds, e.g. `1712345678.123`.
    pub fn now_timestamp() -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        format!("{}.{:03}", millis / 1000, millis % 1000)
    }

    /// Signature for `timestamp` under this client's credentials.
    pub fn sign(&self, timestamp: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(timestamp.as_bytes());
        hasher.update(self.project_id.as_bytes());
        hasher.update(self.shared_secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// POST `body` to `path` with a fresh signature.
    pub async fn signed_post(&self, path: &str, body: Vec<u8>) -> Result<Response, reqwest::Error> {
        let timestamp = Self::now_timestamp();
        self.signed_post_at(path, body, &timestamp).await
    }

    /// POST `body` to `path`, signing the given timestamp.
    pub async fn signed_post_at(
        &self,
        path: &str,
        body: Vec<u8>,
        timestamp: &str,
    ) -> Result<Response, reqwest::Error> {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(SIGNATURE_HEADER, self.sign(timestamp))
            .header(TIMESTAMP_HEADER, timestamp)
            .body(body)
            .send()
            .await
    }

    /// Send a single-turn chat to `/api/chat` and return the backend's JSON.
    pub async fn chat(&self, prompt: &str, model: Option<&str>) -> Result<serde_json::Value, ClientError> {
        let request = ChatRequest::single(prompt, model.unwrap_or(DEFAULT_MODEL));
        let resp = self
            .signed_post("/api/chat", serde_json::to_vec(&request)?)
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }

    /// Probe the unauthenticated health endpoint.
    pub async fn health(&self) -> Result<String, ClientError> {
        let resp = self.client.get(format!("{}/", self.base_url)).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }
}
