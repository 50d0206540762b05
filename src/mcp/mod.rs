//! stdio JSON-RPC トランスポート
//!
//! クライアント（子プロセスのツールホストと通信）と、クライアント・
//! サーバー双方で共有するワイヤ型を提供する。フレーミングは
//! 1 行 = 1 JSON ドキュメントの改行区切り、やり取りは厳密な
//! 半二重（リクエスト 1 件につきレスポンス 1 件、パイプラインなし）。

pub mod client;
pub mod error;
pub mod types;

pub use client::{McpClient, ToolTransport};
pub use error::McpError;
pub use types::{JsonMap, RpcError, RpcRequest, RpcResponse, Tool, ToolCallParams};
