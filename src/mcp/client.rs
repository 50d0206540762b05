//! stdio JSON-RPC クライアント
//!
//! ツールホストを子プロセスとして起動し、stdin/stdout を占有して
//! 1 行 = 1 JSON のリクエスト/レスポンスを交換する。接続は厳密な
//! 半二重: 常に 1 リクエストだけが in-flight で、次のリクエストの
//! 前に必ずレスポンスを読み切る。再接続はしない。死んだ接続は
//! 保持側にとって致命的・再試行不能な状態。
//!
//! タイムアウトと I/O・フレーミング失敗の後はストリーム上の位置が
//! 信用できない（遅延レスポンスが次のリクエストの返事として読まれて
//! しまう）ため、接続をその場で畳む。以降のリクエストは読み取りを
//! 試みず「connection already closed」で即座に失敗する。

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::error::McpError;
use super::types::{JsonMap, RpcRequest, RpcResponse, Tool, PROTOCOL_VERSION};

/// レスポンス 1 行の最大バイト数。超過は黙った切り詰めではなく
/// フレーミングエラーにする。
const MAX_RESPONSE_BYTES: u64 = 1024 * 1024;

/// ツールホストとの通信面。オーケストレーターはこの trait 越しに
/// 接続を使う（テストではモックに差し替える）。
#[allow(async_fn_in_trait)]
pub trait ToolTransport {
    /// initialize ハンドシェイクを行う。失敗は接続ごと致命的。
    async fn initialize(&mut self) -> Result<(), McpError>;
    /// 公開されているツールの一覧を取得する。
    async fn list_tools(&mut self) -> Result<Vec<Tool>, McpError>;
    /// ツールを 1 回実行し、テキスト結果を返す。
    async fn call_tool(&mut self, name: &str, arguments: &JsonMap) -> Result<String, McpError>;
}

/// 子プロセス 1 個とその標準ストリームを所有するクライアント。
pub struct McpClient {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    /// 接続内で一意なリクエスト id。半二重なので単調増加で十分。
    next_id: u64,
    request_timeout: Duration,
}

impl McpClient {
    /// ツールホストのバイナリを起動し、クライアントを作る。
    ///
    /// 子プロセスの stderr はログにドレインする（stdout はプロトコル
    /// 専用）。起動失敗はセッション開始前の致命的エラー。
    pub fn spawn(server_path: &Path, request_timeout: Duration) -> Result<Self, McpError> {
        info!(server = %server_path.display(), "spawning tool server");

        let mut child = Command::new(server_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // close() を経ずにドロップされた場合（エラーパス）に
            // 子プロセスを残さない
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| McpError::framing("failed to open child stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| McpError::framing("failed to open child stdout"))?;

        // ホスト側のログ (stderr) を自分のログに流し込む
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(target: "omikuji::toolhost_stderr", "{line}");
                }
            });
        }

        Ok(Self {
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout),
            next_id: 0,
            request_timeout,
        })
    }

    /// stdin を閉じて入力終端を伝えた後、プロセスの終了を待つ。
    ///
    /// 先に書き込み側を閉じないとホストの読み取りループが終わらず、
    /// wait が永遠に返らない。終了ステータスは握りつぶさず返す。
    pub async fn close(mut self) -> Result<ExitStatus, McpError> {
        drop(self.stdin.take());
        let status = self.child.wait().await?;
        info!(%status, "tool server exited");
        Ok(status)
    }

    /// リクエストを 1 件送り、対応するレスポンスの result を返す。
    async fn send_request(
        &mut self,
        method: &str,
        params: Option<Value>,
    ) -> Result<Value, McpError> {
        self.next_id += 1;
        let req = RpcRequest::new(self.next_id, method, params);

        let result = match timeout(self.request_timeout, self.exchange(&req)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(method, timeout = ?self.request_timeout, "request timed out");
                Err(McpError::Timeout {
                    method: method.to_string(),
                })
            }
        };

        // タイムアウト後・I/O 失敗後の遅延レスポンスを次のリクエストの
        // 返事として読んでしまわないよう、接続を畳む
        if let Err(McpError::Timeout { .. } | McpError::Io(_)) = &result {
            self.stdin.take();
        }

        result
    }

    /// 書き込み → 1 行読み取り → 検証、の 1 往復。
    async fn exchange(&mut self, req: &RpcRequest) -> Result<Value, McpError> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| McpError::framing("connection already closed"))?;

        let mut line = serde_json::to_string(req)
            .map_err(|e| McpError::Protocol(format!("failed to encode request: {e}")))?;
        line.push('\n');

        debug!(method = %req.method, id = %req.id, "sending request");
        stdin.write_all(line.as_bytes()).await?;
        stdin.flush().await?;

        let response = self.read_response_line().await?;

        // 半二重なので順序相関で十分だが、id の一致は防御的に検証する
        if response.id != req.id {
            return Err(McpError::Protocol(format!(
                "response id {} does not match request id {}",
                response.id, req.id
            )));
        }

        if let Some(err) = response.error {
            return Err(McpError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        response
            .result
            .ok_or_else(|| McpError::Protocol("response has neither result nor error".to_string()))
    }

    /// レスポンスを 1 行読む。行長の上限を超えたらフレーミングエラー。
    async fn read_response_line(&mut self) -> Result<RpcResponse, McpError> {
        let mut buf = Vec::new();
        let mut limited = (&mut self.stdout).take(MAX_RESPONSE_BYTES + 1);
        let n = limited.read_until(b'\n', &mut buf).await?;

        if n == 0 {
            return Err(McpError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "server closed stdout before responding",
            )));
        }
        if buf.len() as u64 > MAX_RESPONSE_BYTES {
            return Err(McpError::framing("response line too long"));
        }

        serde_json::from_slice(&buf)
            .map_err(|e| McpError::Protocol(format!("invalid response json: {e}")))
    }
}

impl ToolTransport for McpClient {
    async fn initialize(&mut self) -> Result<(), McpError> {
        let params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            },
        });
        self.send_request("initialize", Some(params)).await?;
        info!("tool server initialized");
        Ok(())
    }

    async fn list_tools(&mut self) -> Result<Vec<Tool>, McpError> {
        let result = self.send_request("tools/list", None).await?;

        let tools = result
            .get("tools")
            .and_then(Value::as_array)
            .ok_or_else(|| McpError::Protocol("tools/list result missing tools array".to_string()))?
            .iter()
            .map(|raw| {
                serde_json::from_value::<Tool>(raw.clone())
                    .map_err(|e| McpError::Protocol(format!("malformed tool entry: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = tools.len(), "listed tools");
        Ok(tools)
    }

    async fn call_tool(&mut self, name: &str, arguments: &JsonMap) -> Result<String, McpError> {
        let params = json!({ "name": name, "arguments": arguments });
        let result = self.send_request("tools/call", Some(params)).await?;

        let text = result
            .get("content")
            .and_then(Value::as_array)
            .and_then(|items| items.first())
            .and_then(|item| item.get("text"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                McpError::Protocol("tools/call result has no textual content item".to_string())
            })?;

        Ok(text.to_string())
    }
}
