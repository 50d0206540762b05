//! ログ初期化モジュール
//!
//! `tracing` + `tracing-subscriber` を使用する。クライアント (REPL) は
//! 画面を汚さないようファイルへ日次ローテーションで出力し、
//! ツールホストは stderr に出力する（stdout はプロトコル専用）。
//! ログレベルは `OMIKUJI_LOG` 環境変数で制御する（デフォルト: `info`）。

use std::path::PathBuf;

use directories::ProjectDirs;
use tracing_subscriber::{fmt, EnvFilter};

/// ログレベルを制御する環境変数名
const LOG_ENV: &str = "OMIKUJI_LOG";

/// ログの出力先ディレクトリを決定する。
///
/// プラットフォーム標準のデータディレクトリ配下 `.../omikuji/logs` を
/// 使い、取得できない場合はカレントディレクトリの `var/logs` に
/// フォールバックする。
fn log_dir() -> PathBuf {
    if let Some(dirs) = ProjectDirs::from("", "", "omikuji") {
        return dirs.data_local_dir().join("logs");
    }
    PathBuf::from("var").join("logs")
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// REPL クライアント用のログ初期化。
///
/// `omikuji.log.YYYY-MM-DD` に日次ローテーションで出力する。
///
/// # Returns
/// `WorkerGuard` を返す。`main()` で保持し続けること
/// （ドロップするとバッファ済みログが書かれなくなる）。
pub fn init_logging() -> tracing_appender::non_blocking::WorkerGuard {
    let dir = log_dir();
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!(
            "omikuji: warning: failed to create log directory {}: {e}",
            dir.display()
        );
    }

    let appender = tracing_appender::rolling::daily(&dir, "omikuji.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    fmt()
        .with_env_filter(env_filter())
        .with_writer(non_blocking)
        .with_ansi(false) // ファイル出力に ANSI カラーコードを含めない
        .init();

    guard
}

/// ツールホスト用のログ初期化。stderr に出力する。
///
/// stdout は JSON-RPC のレスポンス専用なので、ログが混ざると
/// クライアント側のフレーミングが壊れる。
pub fn init_host_logging() {
    fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
