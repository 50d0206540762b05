//! 会話セッション
//!
//! 1 ターンの流れ: 生成 → ツール呼び出し検出 → （あれば）抽出順に
//! 逐次実行 → 結果を埋め込んで再生成。接続は半二重なのでツールの
//! 並列実行はそもそも不可能であり、抽出順の逐次実行は副作用の
//! 順序をプロンプト文面と一致させるための仕様でもある。

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use super::prompts;
use crate::llm::Generator;
use crate::mcp::{McpError, Tool, ToolTransport};
use crate::parser;

/// ツール呼び出し 1 件の実行結果。
///
/// 成功・失敗の区別はプロンプト組み立てまで構造のまま保持し、
/// 文字列化はプロンプトと表示のときだけ行う（ログには構造で残す）。
#[derive(Debug)]
pub struct ToolOutcome {
    /// 呼び出したツール名
    pub name: String,
    /// テキスト結果、またはそのツール呼び出しだけの失敗
    pub result: Result<String, McpError>,
}

impl ToolOutcome {
    /// フォローアッププロンプトと画面表示に使う文字列表現。
    pub fn render(&self) -> String {
        match &self.result {
            Ok(text) => format!("{} result: {}", self.name, text),
            Err(e) => format!("Error calling {}: {}", self.name, e),
        }
    }
}

/// 1 ターンの結果。
#[derive(Debug)]
pub enum TurnReply {
    /// ツール呼び出しなし。生成テキストをそのまま返す。
    Direct(String),
    /// ツールを使ったターン。最終回答と各ツールの結果を含む。
    WithTools {
        answer: String,
        outcomes: Vec<ToolOutcome>,
    },
}

impl TurnReply {
    /// 最終的にユーザーへ見せるテキスト。
    pub fn answer(&self) -> &str {
        match self {
            TurnReply::Direct(text) => text,
            TurnReply::WithTools { answer, .. } => answer,
        }
    }
}

/// 会話セッション。生成バックエンドとツール接続を 1 本ずつ占有する。
pub struct ChatSession<G, T> {
    llm: G,
    mcp: T,
    /// セッション開始時に 1 回だけ取得したツールカタログ
    tools: Vec<Tool>,
}

impl<G: Generator, T: ToolTransport> ChatSession<G, T> {
    /// initialize ハンドシェイクとカタログ取得を行い、セッションを開始する。
    ///
    /// ここでの失敗はセッション全体に致命的で、そのまま呼び出し元に
    /// 伝播する（再試行・再起動はしない）。
    pub async fn start(llm: G, mut mcp: T) -> Result<Self> {
        mcp.initialize()
            .await
            .context("failed to initialize tool server")?;
        let tools = mcp.list_tools().await.context("failed to list tools")?;
        info!(tool_count = tools.len(), "chat session started");

        Ok(Self { llm, mcp, tools })
    }

    /// 利用可能なツール数。
    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    /// テキストがツール呼び出しを含むかを副作用なしで判定する。
    /// ターン処理内部の検出と完全に同じ文法を使う。
    pub fn has_tool_calls(&self, text: &str) -> bool {
        parser::has_tool_calls(text)
    }

    /// ユーザー入力 1 件を処理し、ターンの結果を返す。
    pub async fn process_input(&mut self, user_input: &str) -> Result<TurnReply> {
        let system = prompts::system_prompt(&self.tools);
        let prompt = prompts::user_prompt(&system, user_input);

        debug!(input_length = user_input.len(), "generating response");
        let response = self
            .llm
            .generate(&prompt)
            .await
            .context("failed to generate response")?;

        let extraction = match parser::extract(&response) {
            Ok(extraction) => extraction,
            Err(e) => {
                // 壊れたツール構文は平文として流す。ターンは落とさない。
                warn!(error = %e, "malformed tool call syntax, returning raw text");
                return Ok(TurnReply::Direct(response));
            }
        };
        if extraction.dropped_segments > 0 {
            warn!(
                dropped = extraction.dropped_segments,
                "dropped argument segments without a key=value shape"
            );
        }

        if extraction.calls.is_empty() {
            debug!("no tool calls detected");
            return Ok(TurnReply::Direct(response));
        }

        info!(call_count = extraction.calls.len(), "executing tool calls");
        let mut outcomes = Vec::with_capacity(extraction.calls.len());
        for call in &extraction.calls {
            debug!(tool = %call.name, "calling tool");
            let result = self.mcp.call_tool(&call.name, &call.to_json_map()).await;
            if let Err(e) = &result {
                // 1 件の失敗はそのツールの結果文字列になるだけで、
                // 残りの呼び出しは続行する
                warn!(tool = %call.name, error = %e, "tool call failed");
            }
            outcomes.push(ToolOutcome {
                name: call.name.clone(),
                result,
            });
        }

        let rendered: Vec<String> = outcomes.iter().map(ToolOutcome::render).collect();
        let final_prompt = prompts::tool_result_prompt(&prompt, &rendered);

        debug!("generating final response with tool results");
        let answer = self
            .llm
            .generate(&final_prompt)
            .await
            .context("failed to generate final response")?;

        Ok(TurnReply::WithTools { answer, outcomes })
    }

    /// セッションを畳んでツール接続を返す（呼び出し元が close する）。
    pub fn into_transport(self) -> T {
        self.mcp
    }
}
