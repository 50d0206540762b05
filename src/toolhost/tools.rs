//! ランダム値ツールの実装
//!
//! 各ツールは引数の JSON オブジェクトを受け取り、検証して
//! テキスト結果を返す。必須引数の欠落や範囲外はエラーメッセージで
//! 拒否する（ディスパッチ側で invalid params のエラーコードになる）。
//! オプション引数はデフォルト値で補う。

use rand::Rng;
use serde_json::Value;

use crate::mcp::JsonMap;

const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ALPHA: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const NUMERIC: &[u8] = b"0123456789";

/// min〜max（両端含む）の乱数を生成する。
///
/// `min` / `max` は省略可能（デフォルト 0〜100）。数値でない値は
/// 無視してデフォルトに落とす。`min > max` は拒否する。
pub fn random_number(args: &JsonMap) -> Result<String, String> {
    let min = args.get("min").and_then(Value::as_f64).unwrap_or(0.0);
    let max = args.get("max").and_then(Value::as_f64).unwrap_or(100.0);

    if min > max {
        return Err("min cannot be greater than max".to_string());
    }

    let n: f64 = rand::rng().random_range(min..=max);
    Ok(format!("Random number: {n:.2}"))
}

/// 指定した長さ・文字種のランダム文字列を生成する。
pub fn random_string(args: &JsonMap) -> Result<String, String> {
    let length = args
        .get("length")
        .and_then(Value::as_f64)
        .map(|f| f as i64)
        .unwrap_or(10);
    if !(1..=100).contains(&length) {
        return Err("length must be between 1 and 100".to_string());
    }

    let charset = args
        .get("charset")
        .and_then(Value::as_str)
        .unwrap_or("alphanumeric");
    let chars: &[u8] = match charset {
        "alphanumeric" => ALPHANUMERIC,
        "alpha" => ALPHA,
        "numeric" => NUMERIC,
        _ => {
            return Err(
                "invalid charset, must be one of: alphanumeric, alpha, numeric".to_string(),
            )
        }
    };

    let mut rng = rand::rng();
    let s: String = (0..length)
        .map(|_| chars[rng.random_range(0..chars.len())] as char)
        .collect();
    Ok(format!("Random string: {s}"))
}

/// 選択肢のリストから 1 つをランダムに選ぶ。`choices` は必須かつ非空。
pub fn random_choice(args: &JsonMap) -> Result<String, String> {
    let choices = args
        .get("choices")
        .ok_or_else(|| "choices parameter is required".to_string())?;
    let choices = choices
        .as_array()
        .ok_or_else(|| "choices must be an array".to_string())?;
    if choices.is_empty() {
        return Err("choices array cannot be empty".to_string());
    }

    let picked = &choices[rand::rng().random_range(0..choices.len())];
    let text = match picked.as_str() {
        Some(s) => s.to_string(),
        // 文字列以外の要素は JSON 表現のまま出す
        None => picked.to_string(),
    };
    Ok(format!("Random choice: {text}"))
}
