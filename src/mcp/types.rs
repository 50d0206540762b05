//! JSON-RPC 2.0 ワイヤ型
//!
//! クライアントとツールホストの両方で使う。id は相関トークンとして
//! 不透明に扱う（サーバーは受け取った id をそのまま返す）。

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON オブジェクト（ツール引数のワイヤ表現）
pub type JsonMap = serde_json::Map<String, Value>;

/// 想定するプロトコルバージョン
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// メソッド（またはツール）が見つからない
pub const METHOD_NOT_FOUND: i64 = -32601;
/// パラメータが不正（欠落・型違い・範囲外）
pub const INVALID_PARAMS: i64 = -32602;

/// クライアント → サーバーのリクエスト。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: Value,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl RpcRequest {
    pub fn new(id: u64, method: &str, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Value::from(id),
            method: method.to_string(),
            params,
        }
    }
}

/// サーバー → クライアントのレスポンス。`result` と `error` は排他。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    /// 成功レスポンスを作る。
    pub fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// エラーレスポンスを作る。
    pub fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// JSON-RPC エラーオブジェクト。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

/// ツール定義。サーバーのカタログが生成し、クライアントは
/// システムプロンプトの構築にのみ使う（スキーマは再パースしない）。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tool {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// `tools/call` のパラメータ。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: JsonMap,
}
