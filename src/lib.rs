//! omikuji — ローカル LLM チャットクライアント & MCP ツールホスト
//!
//! テキスト生成バックエンド (Ollama) の出力から `TOOL_CALL:` 形式の
//! ツール呼び出しを抽出し、stdio JSON-RPC で子プロセスのツールホストに
//! 実行させ、結果を踏まえた再生成を行う。
//!
//! バイナリは 2 つ:
//! - `omikuji` — 対話 REPL クライアント (`src/main.rs`)
//! - `omikuji-tools` — ランダム値ツールを公開するツールホスト (`src/bin/tools.rs`)

pub mod chat;
pub mod cli;
pub mod config;
pub mod llm;
pub mod logging;
pub mod mcp;
pub mod parser;
pub mod toolhost;
