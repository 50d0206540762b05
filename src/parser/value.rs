//! 引数トークンの型付き値への変換
//!
//! 分割済みの引数トークン 1 個を `ArgValue` に変換する。
//! この変換にエラーパスはない: 数値に見えて数値でないトークンは
//! そのまま文字列として扱う（生成ノイズへの意図的な寛容さ）。

use serde::Serialize;

/// ツール呼び出し引数の値。
///
/// ワイヤ形式 (JSON) に合わせた 3 種のみ:
/// 文字列、倍精度浮動小数点数、文字列の配列。
/// ネストした配列やオブジェクトは文法上サポートしない。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    /// 文字列（クォート除去済み、内部エスケープはそのまま）
    Str(String),
    /// 数値。整数トークンも小数トークンも f64 に統一される。
    /// JSON の数値型が double のみであることに合わせた仕様であり、
    /// `5` と `5.0` は変換後に区別できない。
    Number(f64),
    /// 文字列の配列。要素は数値変換されない。
    List(Vec<String>),
}

/// トリム済みの引数トークン 1 個を `ArgValue` に変換する。
///
/// 1. 両端がダブルクォートなら 1 層だけ除去
/// 2. `[...]` ならカンマ分割して `List`
/// 3. 符号付き整数または小数なら `Number`
/// 4. それ以外は `Str` のまま
pub fn parse_value(token: &str) -> ArgValue {
    let token = strip_quotes(token);

    if token.len() >= 2 && token.starts_with('[') && token.ends_with(']') {
        return ArgValue::List(parse_list_items(&token[1..token.len() - 1]));
    }

    if is_numeric_token(token) {
        if let Ok(n) = token.parse::<f64>() {
            return ArgValue::Number(n);
        }
    }

    ArgValue::Str(token.to_string())
}

/// 両端のダブルクォートを 1 層だけ除去する。片側だけの場合は除去しない。
fn strip_quotes(token: &str) -> &str {
    if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
        &token[1..token.len() - 1]
    } else {
        token
    }
}

/// トークンが符号付き整数または小数の構文かを判定する。
///
/// `[+-]? 数字+ (. 数字+)?` のみを受理する。指数表記や `inf`/`NaN` は
/// 文字列として扱う（`f64::from_str` より狭い構文を意図的に採用）。
fn is_numeric_token(token: &str) -> bool {
    let digits = token.strip_prefix(['+', '-']).unwrap_or(token);
    if digits.is_empty() {
        return false;
    }
    match digits.split_once('.') {
        Some((int_part, frac_part)) => {
            !int_part.is_empty()
                && !frac_part.is_empty()
                && int_part.bytes().all(|b| b.is_ascii_digit())
                && frac_part.bytes().all(|b| b.is_ascii_digit())
        }
        None => digits.bytes().all(|b| b.is_ascii_digit()),
    }
}

/// 配列の中身をカンマ分割し、各要素をトリム + クォート除去して返す。
///
/// 親の引数リストと同じ分割規則（クォート状態とエスケープを尊重）だが、
/// 配列はネストしないため括弧深度は追跡しない。この分割は失敗しない:
/// 閉じられていないクォートは抽出段階（`extract`）で既に拒否されている。
fn parse_list_items(content: &str) -> Vec<String> {
    if content.is_empty() {
        return Vec::new();
    }

    let mut items = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for ch in content.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '\\' => {
                escaped = true;
                current.push(ch);
            }
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            ',' if !in_quotes => {
                items.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        items.push(current);
    }

    items
        .iter()
        .map(|item| strip_quotes(item.trim()).to_string())
        .collect()
}
