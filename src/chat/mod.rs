//! 会話オーケストレーション
//!
//! 1 ターン = 生成 → ツール呼び出し検出 → ツール実行 → 再生成。
//! `session` が状態遷移を駆動し、`prompts` がプロンプト文面を組む。

pub mod prompts;
pub mod session;

pub use session::{ChatSession, ToolOutcome, TurnReply};
