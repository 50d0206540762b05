//! omikuji — 対話 REPL クライアント
//!
//! ツールホストを子プロセスとして起動し、Ollama への生成リクエストと
//! `TOOL_CALL:` 抽出・実行を 1 ターンずつ回す。

use clap::Parser;
use reedline::{Reedline, Signal};
use tracing::{info, warn};

use omikuji::chat::{ChatSession, TurnReply};
use omikuji::cli::color::red;
use omikuji::cli::prompt::OmikujiPrompt;
use omikuji::cli::{banner, speak};
use omikuji::config::{Cli, Config};
use omikuji::llm::OllamaClient;
use omikuji::logging;
use omikuji::mcp::McpClient;

#[tokio::main]
async fn main() {
    // .env ファイルから環境変数を読み込む
    dotenvy::dotenv().ok();

    // ログシステムの初期化（_guard は main 終了まで保持する必要がある）
    let _guard = logging::init_logging();
    info!("omikuji started");

    if let Err(e) = run().await {
        eprintln!("omikuji: error: {e:#}");
        std::process::exit(1);
    }

    info!("omikuji shutting down");
}

async fn run() -> anyhow::Result<()> {
    let config = Config::load(Cli::parse())?;

    // 接続・ハンドシェイク・カタログ取得の失敗はどれも致命的
    let mcp = McpClient::spawn(&config.server_path, config.request_timeout)?;
    let llm = OllamaClient::new(&config.ollama_url, &config.model)?;
    let mut session = ChatSession::start(llm, mcp).await?;

    banner::print_welcome(&config.model, session.tool_count());

    let mut editor = Reedline::create();
    let prompt = OmikujiPrompt::new(&config.model);

    loop {
        match editor.read_line(&prompt) {
            Ok(Signal::Success(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "quit" || line == "exit" {
                    info!("exit command received");
                    break;
                }

                let spinner = speak::thinking_spinner();
                let reply = session.process_input(line).await;
                spinner.finish_and_clear();

                match reply {
                    Ok(TurnReply::Direct(text)) => {
                        speak::say(&text);
                    }
                    Ok(TurnReply::WithTools { answer, outcomes }) => {
                        speak::say("I consulted some tools for you:");
                        for outcome in &outcomes {
                            speak::tool_result(&outcome.render());
                        }
                        println!();
                        speak::say(&answer);
                    }
                    Err(e) => {
                        // ターン単位のエラー（バックエンド障害など）は
                        // セッションを落とさず次の入力へ
                        warn!(error = %e, "turn failed");
                        eprintln!("{}", red(&format!("omikuji: error: {e:#}")));
                    }
                }
                println!();
            }
            Ok(Signal::CtrlC) => {
                // 現在の行をクリアして続行
            }
            Ok(Signal::CtrlD) => {
                info!("Ctrl-D received, exiting");
                break;
            }
            Err(e) => {
                warn!(error = %e, "REPL error, exiting");
                eprintln!("omikuji: error: {e}");
                break;
            }
        }
    }

    // 書き込み側を先に閉じてからプロセスの終了を待つ
    let mcp = session.into_transport();
    match mcp.close().await {
        Ok(status) if !status.success() => {
            warn!(%status, "tool server exited with non-zero status");
        }
        Ok(_) => {}
        Err(e) => {
            warn!(error = %e, "failed to close tool server cleanly");
        }
    }

    banner::print_goodbye();
    Ok(())
}
