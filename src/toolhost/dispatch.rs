//! メソッドディスパッチ
//!
//! リクエスト 1 件を受け取り、必ずレスポンス 1 件を返す純粋な
//! ディスパッチテーブル。ツールの失敗は 1 件のエラーレスポンスに
//! なるだけで、呼び出し元のループには影響しない。

use serde_json::json;
use tracing::{debug, warn};

use super::{catalog, tools};
use crate::mcp::types::{INVALID_PARAMS, METHOD_NOT_FOUND, PROTOCOL_VERSION};
use crate::mcp::{RpcRequest, RpcResponse, ToolCallParams};

/// リクエストをメソッド名でディスパッチする。
pub fn handle_request(req: &RpcRequest) -> RpcResponse {
    debug!(method = %req.method, id = %req.id, "handling request");

    match req.method.as_str() {
        "initialize" => RpcResponse::result(
            req.id.clone(),
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": "omikuji-tools",
                    "version": env!("CARGO_PKG_VERSION"),
                },
            }),
        ),

        "tools/list" => RpcResponse::result(
            req.id.clone(),
            json!({ "tools": catalog::catalog() }),
        ),

        "tools/call" => handle_tool_call(req),

        other => {
            warn!(method = %other, "unknown method");
            RpcResponse::error(
                req.id.clone(),
                METHOD_NOT_FOUND,
                format!("Method not found: {other}"),
            )
        }
    }
}

/// `tools/call` のパラメータ検証とツール実行。
fn handle_tool_call(req: &RpcRequest) -> RpcResponse {
    let params: ToolCallParams = match req
        .params
        .clone()
        .map(serde_json::from_value)
        .transpose()
    {
        Ok(Some(params)) => params,
        Ok(None) | Err(_) => {
            return RpcResponse::error(req.id.clone(), INVALID_PARAMS, "Invalid params");
        }
    };

    let result = match params.name.as_str() {
        "get_random_number" => tools::random_number(&params.arguments),
        "get_random_string" => tools::random_string(&params.arguments),
        "get_random_choice" => tools::random_choice(&params.arguments),
        other => {
            warn!(tool = %other, "unknown tool");
            return RpcResponse::error(
                req.id.clone(),
                METHOD_NOT_FOUND,
                format!("Tool not found: {other}"),
            );
        }
    };

    match result {
        Ok(text) => RpcResponse::result(
            req.id.clone(),
            json!({
                "content": [ { "type": "text", "text": text } ],
            }),
        ),
        Err(message) => {
            warn!(tool = %params.name, error = %message, "tool rejected arguments");
            RpcResponse::error(req.id.clone(), INVALID_PARAMS, message)
        }
    }
}
