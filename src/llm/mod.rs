//! テキスト生成バックエンド
//!
//! オーケストレーターから見た生成は `generate(prompt) -> String` の
//! 1 操作だけ。`Generator` trait がその継ぎ目で、本番実装は
//! Ollama HTTP クライアント、テストではスクリプト化したモックを使う。

pub mod ollama;

use thiserror::Error;

pub use ollama::OllamaClient;

/// 生成バックエンドの失敗。ネットワーク・ステータス・デコードの
/// 区別はログ用で、オーケストレーターにとってはどれも不透明な
/// バックエンド障害として扱われる。タイムアウトだけは区別して伝える。
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("generation request timed out")]
    Timeout,

    #[error("backend returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("backend request failed: {0}")]
    Http(reqwest::Error),

    #[error("failed to decode backend response: {0}")]
    Decode(reqwest::Error),
}

/// テキスト生成の継ぎ目。
#[allow(async_fn_in_trait)]
pub trait Generator {
    /// プロンプト 1 個を送り、生成テキストを返す。非ストリーミング。
    async fn generate(&self, prompt: &str) -> Result<String, BackendError>;
}
