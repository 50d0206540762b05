//! REPL の画面まわり
//!
//! プロンプト表示、起動バナー、アシスタント発話の色付き出力。

pub mod banner;
pub mod color;
pub mod prompt;
pub mod speak;
