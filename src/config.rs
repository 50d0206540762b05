//! 設定管理
//!
//! 優先順位: コマンドライン引数 > 環境変数 > 設定ファイル > デフォルト。
//! 設定ファイルは `~/.config/omikuji/config.toml`（存在しなければ
//! テンプレートを生成してデフォルト値を使う）。
//!
//! # 設定ファイル例
//!
//! ```toml
//! [ollama]
//! url = "http://localhost:11434"
//! model = "gemma3:12b"
//!
//! [mcp]
//! request_timeout_secs = 60
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;
use serde::Deserialize;
use tracing::{debug, info, warn};

/// デフォルトの生成モデル
const DEFAULT_MODEL: &str = "gemma3:12b";
/// デフォルトの Ollama ベース URL
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
/// デフォルトのツール呼び出しタイムアウト（秒）
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// コマンドライン引数。
#[derive(Debug, Parser)]
#[command(name = "omikuji", version, about = "Local LLM chat with MCP tool calling")]
pub struct Cli {
    /// ツールホストバイナリのパス（例: ./target/debug/omikuji-tools）
    pub server_path: PathBuf,

    /// 使用する生成モデル名
    pub model: Option<String>,

    /// Ollama のベース URL
    #[arg(long)]
    pub ollama_url: Option<String>,
}

/// 設定ファイルの中身。
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct FileConfig {
    ollama: OllamaSection,
    mcp: McpSection,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct OllamaSection {
    url: Option<String>,
    model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct McpSection {
    request_timeout_secs: u64,
}

impl Default for McpSection {
    fn default() -> Self {
        Self {
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// 解決済みの実行時設定。
#[derive(Debug, Clone)]
pub struct Config {
    /// ツールホストバイナリのパス
    pub server_path: PathBuf,
    /// 生成モデル名
    pub model: String,
    /// Ollama のベース URL
    pub ollama_url: String,
    /// ツール呼び出し 1 件あたりのタイムアウト
    pub request_timeout: Duration,
}

impl Config {
    /// CLI 引数・環境変数・設定ファイルを合成して設定を解決する。
    ///
    /// ファイルの読み込み先は固定パス（`FileConfig::config_path`）。
    pub fn load(cli: Cli) -> Result<Self> {
        let file = FileConfig::load(&FileConfig::config_path());
        Self::resolve(cli, file)
    }

    /// 読み込み済みのファイル設定と CLI 引数から設定を解決する。
    /// ファイルシステムには触れない（テストはこちらを使う）。
    fn resolve(cli: Cli, file: FileConfig) -> Result<Self> {
        let model = cli
            .model
            .or(file.ollama.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        // OLLAMA_URL 環境変数は設定ファイルより強く、--ollama-url より弱い
        let ollama_url = cli
            .ollama_url
            .or_else(|| std::env::var("OLLAMA_URL").ok().filter(|s| !s.is_empty()))
            .or(file.ollama.url)
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());

        let config = Self {
            server_path: cli.server_path,
            model,
            ollama_url,
            request_timeout: Duration::from_secs(file.mcp.request_timeout_secs),
        };
        config.validate()?;

        info!(
            server = %config.server_path.display(),
            model = %config.model,
            ollama_url = %config.ollama_url,
            "config resolved"
        );
        Ok(config)
    }

    /// 設定の整合性を検査する。
    fn validate(&self) -> Result<()> {
        if self.server_path.as_os_str().is_empty() {
            bail!("tool server path is required");
        }
        if self.model.is_empty() {
            bail!("model name is required");
        }
        if self.ollama_url.is_empty() {
            bail!("Ollama URL is required");
        }
        if self.request_timeout.is_zero() {
            bail!("request_timeout_secs must be greater than zero");
        }
        Ok(())
    }
}

impl FileConfig {
    /// 指定パスから設定ファイルを読み込む。
    ///
    /// 存在しなければテンプレートを生成してデフォルト値を返す。
    /// パースエラーは警告してデフォルト値を使う（起動は止めない）。
    fn load(path: &std::path::Path) -> Self {
        debug!(path = %path.display(), "loading config file");

        if !path.exists() {
            Self::create_default_config(path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<FileConfig>(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to parse config file");
                    eprintln!("omikuji: warning: failed to parse config file: {e}");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read config file");
                eprintln!("omikuji: warning: failed to read config file: {e}");
                Self::default()
            }
        }
    }

    /// 設定ファイルのパス。
    ///
    /// dotfiles として管理しやすいよう XDG_CONFIG_HOME に依存しない
    /// 固定パス `~/.config/omikuji/config.toml` を使う。
    fn config_path() -> PathBuf {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".config/omikuji/config.toml")
    }

    /// 設定ファイルが存在しない場合にテンプレートを生成する。
    /// 失敗しても起動は継続する。
    fn create_default_config(path: &std::path::Path) {
        const TEMPLATE: &str = r#"# omikuji configuration

[ollama]
# url = "http://localhost:11434"
# model = "gemma3:12b"

[mcp]
# request_timeout_secs = 60
"#;

        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(path = %parent.display(), error = %e, "failed to create config directory");
                return;
            }
        }
        if let Err(e) = std::fs::write(path, TEMPLATE) {
            warn!(path = %path.display(), error = %e, "failed to write default config");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(server: &str, model: Option<&str>, url: Option<&str>) -> Cli {
        Cli {
            server_path: PathBuf::from(server),
            model: model.map(|s| s.to_string()),
            ollama_url: url.map(|s| s.to_string()),
        }
    }

    #[test]
    fn file_config_parses_partial_toml() {
        let parsed: FileConfig = toml::from_str("[ollama]\nmodel = \"llama3\"\n").unwrap();
        assert_eq!(parsed.ollama.model.as_deref(), Some("llama3"));
        assert!(parsed.ollama.url.is_none());
        assert_eq!(parsed.mcp.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn cli_overrides_take_precedence() {
        let file: FileConfig =
            toml::from_str("[ollama]\nurl = \"http://file:1\"\nmodel = \"file-model\"\n").unwrap();
        let config = Config::resolve(
            cli("./tools", Some("custom-model"), Some("http://example:9999")),
            file,
        )
        .unwrap();
        assert_eq!(config.model, "custom-model");
        assert_eq!(config.ollama_url, "http://example:9999");
    }

    #[test]
    fn file_model_fills_in_when_cli_omits_it() {
        let file: FileConfig = toml::from_str("[ollama]\nmodel = \"file-model\"\n").unwrap();
        let config =
            Config::resolve(cli("./tools", None, Some("http://example:9999")), file).unwrap();
        assert_eq!(config.model, "file-model");
    }

    #[test]
    fn empty_server_path_is_rejected() {
        assert!(Config::resolve(cli("", None, None), FileConfig::default()).is_err());
    }

    #[test]
    fn missing_file_writes_template_at_given_path_only() {
        // 読み込み先は引数で渡したパスに閉じる。ホームディレクトリの
        // 実設定にはテストから一切触れない。
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".config/omikuji/config.toml");

        let loaded = FileConfig::load(&path);
        assert!(path.exists());
        assert!(loaded.ollama.model.is_none());

        // 生成されたテンプレートは全行コメントアウトの有効な TOML
        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: FileConfig = toml::from_str(&content).unwrap();
        assert!(parsed.ollama.url.is_none());
        assert_eq!(parsed.mcp.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }
}
