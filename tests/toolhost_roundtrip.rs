//! ツールホストのエンドツーエンドテスト
//!
//! ビルド済みの omikuji-tools バイナリを実際に起動し、クライアントと
//! 生プロトコルの両方で 1 往復ずつ検証する。

use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

use serde_json::{json, Value};

use omikuji::mcp::{McpClient, McpError, ToolTransport};

fn host_binary() -> &'static Path {
    Path::new(env!("CARGO_BIN_EXE_omikuji-tools"))
}

#[tokio::test]
async fn client_handshake_list_and_call() {
    let mut client = McpClient::spawn(host_binary(), Duration::from_secs(10))
        .expect("failed to spawn tool server");

    client.initialize().await.expect("initialize failed");

    let tools = client.list_tools().await.expect("tools/list failed");
    let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(
        names,
        ["get_random_number", "get_random_string", "get_random_choice"]
    );
    assert!(tools.iter().all(|t| !t.description.is_empty()));

    let mut args = serde_json::Map::new();
    args.insert("min".to_string(), json!(5.0));
    args.insert("max".to_string(), json!(5.0));
    let text = client
        .call_tool("get_random_number", &args)
        .await
        .expect("tools/call failed");
    assert_eq!(text, "Random number: 5.00");

    let status = client.close().await.expect("close failed");
    assert!(status.success());
}

#[tokio::test]
async fn client_surfaces_tool_errors_without_dying() {
    let mut client = McpClient::spawn(host_binary(), Duration::from_secs(10))
        .expect("failed to spawn tool server");
    client.initialize().await.expect("initialize failed");

    // 範囲が逆転した引数はエラーレスポンスになる
    let mut args = serde_json::Map::new();
    args.insert("min".to_string(), json!(10.0));
    args.insert("max".to_string(), json!(1.0));
    let err = client
        .call_tool("get_random_number", &args)
        .await
        .expect_err("inverted range should fail");
    assert!(err.to_string().contains("min cannot be greater than max"));

    // 接続は生きていて、次の呼び出しは普通に通る
    let mut args = serde_json::Map::new();
    args.insert("choices".to_string(), json!(["only"]));
    let text = client
        .call_tool("get_random_choice", &args)
        .await
        .expect("follow-up call failed");
    assert_eq!(text, "Random choice: only");

    client.close().await.expect("close failed");
}

#[tokio::test]
async fn unknown_tool_is_rejected_by_name() {
    let mut client = McpClient::spawn(host_binary(), Duration::from_secs(10))
        .expect("failed to spawn tool server");
    client.initialize().await.expect("initialize failed");

    let args = serde_json::Map::new();
    let err = client
        .call_tool("no_such_tool", &args)
        .await
        .expect_err("unknown tool should fail");
    assert!(err.to_string().contains("Tool not found: no_such_tool"));

    client.close().await.expect("close failed");
}

#[cfg(unix)]
#[tokio::test]
async fn unresponsive_server_times_out_and_closes_connection() {
    use std::os::unix::fs::PermissionsExt;

    // 何も返さずに黙り込むサーバーの代役
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let script = dir.path().join("stall.sh");
    std::fs::write(&script, "#!/bin/sh\nexec sleep 30\n").expect("failed to write script");
    let mut perms = std::fs::metadata(&script).expect("no metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&script, perms).expect("failed to chmod");

    let mut client =
        McpClient::spawn(&script, Duration::from_millis(200)).expect("failed to spawn");

    // 期限切れは I/O 失敗と区別できる Timeout として返る
    let err = client.initialize().await.expect_err("should time out");
    assert!(matches!(err, McpError::Timeout { .. }), "got {err:?}");

    // タイムアウト後の接続は閉じた扱いで、後続のリクエストは
    // 遅延レスポンスを読みにいかず即座に失敗する
    let err = client
        .list_tools()
        .await
        .expect_err("connection should be closed after timeout");
    assert!(matches!(err, McpError::Io(_)), "got {err:?}");
    assert!(err.to_string().contains("connection already closed"));
}

/// 生のワイヤ形式を同期 I/O で検証する。クライアント実装を経由しない
/// ことで、プロトコルの形そのものを固定する。
#[test]
fn raw_protocol_lines() {
    let mut child = Command::new(host_binary())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn tool server");

    let mut stdin = child.stdin.take().expect("no stdin");
    let mut stdout = BufReader::new(child.stdout.take().expect("no stdout"));

    let mut exchange = |request: Value| -> Value {
        let mut line = request.to_string();
        line.push('\n');
        stdin.write_all(line.as_bytes()).expect("write failed");
        stdin.flush().expect("flush failed");

        let mut response = String::new();
        stdout.read_line(&mut response).expect("read failed");
        serde_json::from_str(&response).expect("response is not json")
    };

    let init = exchange(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {"protocolVersion": "2024-11-05", "capabilities": {}},
    }));
    assert_eq!(init["id"], json!(1));
    assert_eq!(init["result"]["protocolVersion"], json!("2024-11-05"));
    assert_eq!(init["result"]["serverInfo"]["name"], json!("omikuji-tools"));

    // id は数値でなくてもそのまま返る
    let listed = exchange(json!({
        "jsonrpc": "2.0",
        "id": "list-1",
        "method": "tools/list",
    }));
    assert_eq!(listed["id"], json!("list-1"));
    assert_eq!(listed["result"]["tools"].as_array().map(Vec::len), Some(3));

    let called = exchange(json!({
        "jsonrpc": "2.0",
        "id": 3,
        "method": "tools/call",
        "params": {"name": "get_random_string", "arguments": {"length": 8.0, "charset": "numeric"}},
    }));
    let text = called["result"]["content"][0]["text"]
        .as_str()
        .expect("no text content");
    let value = text.strip_prefix("Random string: ").expect("bad prefix");
    assert_eq!(value.len(), 8);
    assert!(value.bytes().all(|b| b.is_ascii_digit()));

    let unknown = exchange(json!({
        "jsonrpc": "2.0",
        "id": 4,
        "method": "wibble",
    }));
    assert_eq!(unknown["error"]["code"], json!(-32601));
    assert_eq!(unknown["error"]["message"], json!("Method not found: wibble"));

    // stdin を閉じればホストは自然に終了する
    drop(stdin);
    let status = child.wait().expect("wait failed");
    assert!(status.success());
}
