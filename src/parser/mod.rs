//! ツール呼び出し抽出パーサー
//!
//! LLM の生成テキストから `TOOL_CALL: name(key=value, ...)` 形式の
//! ツール呼び出しを抽出する。`value` が引数トークンを型付きの値に変換し、
//! `extract` がテキスト全体の走査と引数分割を担当する。

pub mod extract;
pub mod value;

pub use extract::{extract, has_tool_calls, ExtractError, Extraction, ToolCall};
pub use value::ArgValue;
