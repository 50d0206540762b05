//! `TOOL_CALL:` 構文の抽出
//!
//! 生成テキストを 1 文字ずつ走査する手書きのスキャナ。
//! 正規表現ではなく明示的な状態機械（括弧深度・クォート状態・
//! エスケープ先読み）を使うことで、文法を明確にし、敵対的な入力での
//! バックトラック爆発を避ける。
//!
//! 抽出は呼び出し単位で all-or-nothing: 1 箇所でも不正な引数本体が
//! あれば入力全体の抽出が失敗し、部分的な結果は返さない。

use thiserror::Error;

use super::value::{parse_value, ArgValue};

/// 呼び出しマーカー。この直後に識別子と括弧付き引数が続く。
const MARKER: &str = "TOOL_CALL:";

/// 引数本体の構文エラー。
///
/// いずれも抽出全体を中断させる。部分的なツール呼び出しリストを
/// 返すことはない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// 引数本体の終端で `[` / `]` が釣り合っていない
    #[error("unmatched brackets in tool call arguments")]
    UnmatchedBracket,
    /// 引数本体の終端でダブルクォートが閉じられていない
    #[error("unmatched quotes in tool call arguments")]
    UnmatchedQuote,
    /// 配列のネスト（深度 2 以上）。文法上サポートしない。
    #[error("nested arrays are not supported in tool call arguments")]
    NestedArray,
}

/// 抽出された 1 個のツール呼び出し。生成後は不変。
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    /// ツール名（空でないことが保証される）
    pub name: String,
    /// キー → 値の順序付きリスト。重複キーは最後の出現が勝つ。
    pub arguments: Vec<(String, ArgValue)>,
}

impl ToolCall {
    /// 引数をワイヤ形式の JSON オブジェクトに変換する。
    pub fn to_json_map(&self) -> serde_json::Map<String, serde_json::Value> {
        self.arguments
            .iter()
            .map(|(k, v)| {
                let json = serde_json::to_value(v).unwrap_or(serde_json::Value::Null);
                (k.clone(), json)
            })
            .collect()
    }

    /// キーで値を引く（テスト・デバッグ用）。
    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        self.arguments
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// キー・値ペアを追加する。既存キーは値を上書きする（最後の出現が勝つ）。
    fn push_arg(&mut self, key: String, value: ArgValue) {
        if let Some(slot) = self.arguments.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.arguments.push((key, value));
        }
    }
}

/// 抽出結果。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Extraction {
    /// テキスト中の出現順（左→右）のツール呼び出し。この順序が実行順になる。
    pub calls: Vec<ToolCall>,
    /// `key=value` の形を成さず捨てられたセグメント数。
    /// 生成ノイズへの寛容さを観測可能にするためのカウンタ。
    pub dropped_segments: usize,
}

/// テキストからすべてのツール呼び出しを抽出する。
///
/// 入力の純粋関数（同じ入力には常に同じ結果）。マーカーの後に
/// 識別子と `(` が続かない場合、その出現は呼び出しとして扱わず
/// 読み飛ばす。引数本体の括弧・クォートが壊れている場合は
/// `ExtractError` で全体が失敗する。
pub fn extract(text: &str) -> Result<Extraction, ExtractError> {
    let mut extraction = Extraction::default();
    let mut search_from = 0;

    while let Some(found) = text[search_from..].find(MARKER) {
        let after_marker = search_from + found + MARKER.len();
        // マーカーは消費済みとしておく（本体が不成立でも再走査しない）
        search_from = after_marker;

        let rest = &text[after_marker..];
        let ident_start = rest.len() - rest.trim_start().len();
        let ident_len = rest[ident_start..]
            .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
            .unwrap_or(rest.len() - ident_start);
        if ident_len == 0 {
            continue;
        }
        let name = &rest[ident_start..ident_start + ident_len];

        let body_start = ident_start + ident_len;
        if rest[body_start..].as_bytes().first() != Some(&b'(') {
            continue;
        }

        match scan_body(&rest[body_start + 1..])? {
            Some((body, consumed)) => {
                let mut call = ToolCall {
                    name: name.to_string(),
                    arguments: Vec::new(),
                };
                for segment in split_arguments(body)? {
                    match parse_pair(&segment) {
                        Some((key, value)) => call.push_arg(key, value),
                        None => extraction.dropped_segments += 1,
                    }
                }
                extraction.calls.push(call);
                search_from = after_marker + body_start + 1 + consumed;
            }
            // 閉じ括弧が見つからない（が括弧・クォートは釣り合っている）
            // → 呼び出しとして成立しないだけなので黙って読み飛ばす
            None => continue,
        }
    }

    Ok(extraction)
}

/// テキストがツール呼び出しを含むかを副作用なしで判定する。
///
/// `extract` と完全に同じ文法で判定し、抽出エラーは「呼び出しなし」
/// として扱う（壊れたツール構文は平文として流れる）。
pub fn has_tool_calls(text: &str) -> bool {
    extract(text).map(|x| !x.calls.is_empty()).unwrap_or(false)
}

/// `(` の直後から引数本体を走査する。
///
/// 括弧深度 0 かつクォート外で最初に現れる `)` が本体の終端。
/// 終端に達する前に入力が尽きた場合、括弧・クォートが釣り合って
/// いれば `None`（呼び出し不成立）、釣り合っていなければエラー。
fn scan_body(rest: &str) -> Result<Option<(&str, usize)>, ExtractError> {
    let mut depth = 0u32;
    let mut in_quotes = false;
    let mut escaped = false;

    for (idx, ch) in rest.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '"' => in_quotes = !in_quotes,
            '[' if !in_quotes => {
                depth += 1;
                if depth > 1 {
                    return Err(ExtractError::NestedArray);
                }
            }
            ']' if !in_quotes => {
                if depth == 0 {
                    return Err(ExtractError::UnmatchedBracket);
                }
                depth -= 1;
            }
            ')' if !in_quotes && depth == 0 => {
                return Ok(Some((&rest[..idx], idx + ch.len_utf8())));
            }
            _ => {}
        }
    }

    if in_quotes {
        return Err(ExtractError::UnmatchedQuote);
    }
    if depth > 0 {
        return Err(ExtractError::UnmatchedBracket);
    }
    Ok(None)
}

/// 引数本体をカンマで分割する。
///
/// 括弧深度 0 かつクォート外のカンマのみが区切り。`\` は次の
/// 1 文字をエスケープし、両方ともセグメントにそのまま残る。
fn split_arguments(body: &str) -> Result<Vec<String>, ExtractError> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut depth = 0u32;
    let mut in_quotes = false;
    let mut escaped = false;

    for ch in body.chars() {
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
            '[' if !in_quotes => {
                depth += 1;
                if depth > 1 {
                    return Err(ExtractError::NestedArray);
                }
                current.push(ch);
            }
            ']' if !in_quotes => {
                if depth == 0 {
                    return Err(ExtractError::UnmatchedBracket);
                }
                depth -= 1;
                current.push(ch);
            }
            ',' if !in_quotes && depth == 0 => {
                segments.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }

    if in_quotes {
        return Err(ExtractError::UnmatchedQuote);
    }
    if depth > 0 {
        return Err(ExtractError::UnmatchedBracket);
    }
    if !current.is_empty() {
        segments.push(current);
    }

    Ok(segments)
}

/// セグメントを `key=value` に分解する。
///
/// 最初の `=` で分割する（値側に `=` を含んでよい）。`=` がない、
/// またはキーが空のセグメントは `None`（呼び出し元で捨てられ、
/// カウントされる）。
fn parse_pair(segment: &str) -> Option<(String, ArgValue)> {
    let (key, value) = segment.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), parse_value(value.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── 基本の抽出 ──

    #[test]
    fn extract_single_call_with_typed_arguments() {
        let text = r#"Sure! TOOL_CALL: f(a=1, b="x", c=[1,"y"])"#;
        let result = extract(text).unwrap();
        assert_eq!(result.calls.len(), 1);

        let call = &result.calls[0];
        assert_eq!(call.name, "f");
        assert_eq!(call.get("a"), Some(&ArgValue::Number(1.0)));
        assert_eq!(call.get("b"), Some(&ArgValue::Str("x".to_string())));
        assert_eq!(
            call.get("c"),
            Some(&ArgValue::List(vec!["1".to_string(), "y".to_string()]))
        );
    }

    #[test]
    fn extract_call_with_empty_arguments() {
        let result = extract("TOOL_CALL: ping()").unwrap();
        assert_eq!(result.calls.len(), 1);
        assert_eq!(result.calls[0].name, "ping");
        assert!(result.calls[0].arguments.is_empty());
    }

    #[test]
    fn whitespace_after_marker_is_optional() {
        let result = extract("TOOL_CALL:get_random_number(min=1, max=10)").unwrap();
        assert_eq!(result.calls[0].name, "get_random_number");
    }

    #[test]
    fn marker_without_call_is_ignored() {
        assert!(extract("the TOOL_CALL: syntax looks like this").unwrap().calls.is_empty());
        assert!(extract("TOOL_CALL: ").unwrap().calls.is_empty());
        assert!(extract("TOOL_CALL: name_without_parens").unwrap().calls.is_empty());
    }

    #[test]
    fn unterminated_body_with_balanced_state_is_not_a_call() {
        // 閉じ括弧がないだけならエラーではなく不成立
        let result = extract("TOOL_CALL: f(a=1").unwrap();
        assert!(result.calls.is_empty());
    }

    // ── 順序と冪等性 ──

    #[test]
    fn multiple_calls_preserve_left_to_right_order() {
        let text = "first TOOL_CALL: alpha(x=1) then TOOL_CALL: beta(y=2) done";
        let result = extract(text).unwrap();
        let names: Vec<&str> = result.calls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta"]);
    }

    #[test]
    fn extraction_is_idempotent() {
        let text = r#"TOOL_CALL: f(a=1) and TOOL_CALL: g(b=[x, y])"#;
        assert_eq!(extract(text).unwrap(), extract(text).unwrap());
    }

    // ── 引数分割の状態機械 ──

    #[test]
    fn comma_inside_brackets_does_not_split() {
        let result = extract(r#"TOOL_CALL: pick(choices=["a", "b", "c"])"#).unwrap();
        assert_eq!(
            result.calls[0].get("choices"),
            Some(&ArgValue::List(vec![
                "a".to_string(),
                "b".to_string(),
                "c".to_string()
            ]))
        );
    }

    #[test]
    fn comma_inside_quotes_does_not_split() {
        let result = extract(r#"TOOL_CALL: f(msg="hello, world", n=1)"#).unwrap();
        assert_eq!(
            result.calls[0].get("msg"),
            Some(&ArgValue::Str("hello, world".to_string()))
        );
        assert_eq!(result.calls[0].get("n"), Some(&ArgValue::Number(1.0)));
    }

    #[test]
    fn close_paren_inside_quotes_does_not_end_body() {
        let result = extract(r#"TOOL_CALL: f(msg="smile :)")"#).unwrap();
        assert_eq!(
            result.calls[0].get("msg"),
            Some(&ArgValue::Str("smile :)".to_string()))
        );
    }

    #[test]
    fn escaped_quote_does_not_toggle_quote_state() {
        let result = extract(r#"TOOL_CALL: f(msg="a\"b")"#).unwrap();
        assert_eq!(
            result.calls[0].get("msg"),
            Some(&ArgValue::Str(r#"a\"b"#.to_string()))
        );
    }

    // ── 不正入力は all-or-nothing ──

    #[test]
    fn unmatched_bracket_fails_whole_extraction() {
        assert_eq!(
            extract("TOOL_CALL: f(a=[1,2)"),
            Err(ExtractError::UnmatchedBracket)
        );
    }

    #[test]
    fn unmatched_quote_fails_whole_extraction() {
        assert_eq!(
            extract(r#"TOOL_CALL: f(a="oops)"#),
            Err(ExtractError::UnmatchedQuote)
        );
    }

    #[test]
    fn nested_array_is_rejected() {
        assert_eq!(
            extract("TOOL_CALL: f(a=[[1,2],3])"),
            Err(ExtractError::NestedArray)
        );
    }

    #[test]
    fn valid_call_before_malformed_call_yields_no_partial_result() {
        let text = "TOOL_CALL: good(a=1) then TOOL_CALL: bad(b=[1,2)";
        assert_eq!(extract(text), Err(ExtractError::UnmatchedBracket));
    }

    // ── セグメントの寛容な破棄 ──

    #[test]
    fn segment_without_equals_is_dropped_and_counted() {
        let result = extract("TOOL_CALL: f(a=1, noise, b=2)").unwrap();
        let call = &result.calls[0];
        assert_eq!(call.arguments.len(), 2);
        assert_eq!(result.dropped_segments, 1);
    }

    #[test]
    fn segment_with_empty_key_is_dropped() {
        let result = extract("TOOL_CALL: f(=1, a=2)").unwrap();
        assert_eq!(result.calls[0].arguments.len(), 1);
        assert_eq!(result.dropped_segments, 1);
    }

    #[test]
    fn duplicate_key_last_occurrence_wins() {
        let result = extract("TOOL_CALL: f(a=1, a=2)").unwrap();
        assert_eq!(result.calls[0].arguments.len(), 1);
        assert_eq!(result.calls[0].get("a"), Some(&ArgValue::Number(2.0)));
    }

    #[test]
    fn value_may_contain_equals() {
        let result = extract("TOOL_CALL: f(expr=a=b)").unwrap();
        assert_eq!(
            result.calls[0].get("expr"),
            Some(&ArgValue::Str("a=b".to_string()))
        );
    }

    // ── 検出の一致 ──

    #[test]
    fn has_tool_calls_agrees_with_extract() {
        assert!(has_tool_calls("TOOL_CALL: f(a=1)"));
        assert!(!has_tool_calls("plain text"));
        assert!(!has_tool_calls("the TOOL_CALL: convention"));
        // 抽出エラーは「呼び出しなし」として扱う
        assert!(!has_tool_calls("TOOL_CALL: f(a=[1,2)"));
    }

    // ── ワイヤ形式への変換 ──

    #[test]
    fn to_json_map_preserves_types() {
        let result = extract(r#"TOOL_CALL: f(n=5, s=hi, l=["a"])"#).unwrap();
        let map = result.calls[0].to_json_map();
        assert_eq!(map.get("n"), Some(&serde_json::json!(5.0)));
        assert_eq!(map.get("s"), Some(&serde_json::json!("hi")));
        assert_eq!(map.get("l"), Some(&serde_json::json!(["a"])));
    }
}
