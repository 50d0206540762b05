//! アシスタント発話の共通出力
//!
//! 発話は 🎋 絵文字 + 白色テキストで統一する。生成待ちの間は
//! スピナーを表示する。

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use super::color::{white, yellow};

/// アシスタントの発話を表示する。
pub fn say(message: &str) {
    println!("🎋 {}", white(message));
}

/// ツール実行結果 1 件を表示する。
pub fn tool_result(rendered: &str) {
    println!("   🎲 {}", yellow(rendered));
}

/// 生成待ちの間に表示するスピナーを生成・開始する。
/// 呼び出し元で `finish_and_clear()` を呼んで停止すること。
pub fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("🎋 {spinner}")
            .expect("invalid spinner template"),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
