//! Ollama HTTP クライアント
//!
//! `POST {base_url}/api/generate` に非ストリーミングで 1 回投げて
//! 生成テキストを受け取るだけの薄いクライアント。

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{BackendError, Generator};

/// 生成 1 回あたりのタイムアウト。ローカル LLM は遅いので長めに取る。
const GENERATE_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Ollama 互換エンドポイントへのクライアント。
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    /// クライアントを作る。`base_url` は `http://localhost:11434` のような
    /// ベース URL（末尾スラッシュは除去される）。
    pub fn new(base_url: &str, model: &str) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(GENERATE_TIMEOUT)
            .build()
            .map_err(BackendError::Http)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    /// 使用中のモデル名。
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Generator for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let url = format!("{}/api/generate", self.base_url);
        debug!(model = %self.model, prompt_length = prompt.len(), "sending generate request");

        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout
                } else {
                    BackendError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status));
        }

        let body: GenerateResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout
            } else {
                BackendError::Decode(e)
            }
        })?;

        debug!(response_length = body.response.len(), "generate request completed");
        Ok(body.response.trim().to_string())
    }
}
