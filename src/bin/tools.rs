//! omikuji-tools — stdio で JSON-RPC を話すツールホスト
//!
//! stdin から 1 行 1 リクエストを読み、stdout に 1 行 1 レスポンスを返す。
//! ログはすべて stderr 側に出す（stdout はプロトコル専用）。

use std::io::{self, BufRead, Write};

use tracing::{debug, info, warn};

use omikuji::logging;
use omikuji::mcp::RpcRequest;
use omikuji::toolhost::handle_request;

fn main() -> anyhow::Result<()> {
    logging::init_host_logging();
    info!("omikuji-tools started");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // パースできない行にはレスポンスの返しようがない（id 不明）。
        // 再同期も試みず、ループを終えてプロセスごと畳む。
        let request: RpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                warn!(error = %e, "failed to decode request line, shutting down");
                break;
            }
        };

        debug!(method = %request.method, "handling request");
        let response = handle_request(&request);

        serde_json::to_writer(&mut out, &response)?;
        out.write_all(b"\n")?;
        out.flush()?;
    }

    info!("stdin closed, shutting down");
    Ok(())
}
