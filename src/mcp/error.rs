//! トランスポートのエラー分類
//!
//! リモートが明示的に返したエラー (`Rpc`)、レスポンスの形が契約に
//! 反している (`Protocol`)、ストリーム自体の失敗 (`Io`)、応答待ちの
//! 期限切れ (`Timeout`) を区別する。呼び出し側はこの区別に応じて
//! 「ターン内で握りつぶす」か「セッションごと落とす」かを決める。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum McpError {
    /// サーバーが JSON-RPC エラーオブジェクトを返した
    #[error("server error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// レスポンスの形が期待する契約と一致しない
    /// （id 不一致、result の欠落、content の形違いなど）
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// ストリームの読み書き・フレーミングの失敗
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// 応答がタイムアウトした。I/O 失敗と区別できる形で伝える。
    #[error("request timed out: {method}")]
    Timeout { method: String },
}

impl McpError {
    /// フレーミング失敗（行が長すぎる等）を I/O エラーとして作るヘルパー。
    pub(crate) fn framing(message: &str) -> Self {
        McpError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            message.to_string(),
        ))
    }
}
