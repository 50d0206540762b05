//! 固定のツールカタログ
//!
//! `tools/list` が返す静的なツール定義。スキーマは JSON Schema 風の
//! 形でクライアントに公開される（クライアント側はプロンプト構築に
//! name / description のみ使用し、スキーマは再パースしない契約）。

use serde_json::json;

use crate::mcp::Tool;

/// 公開している全ツールの定義を返す。
pub fn catalog() -> Vec<Tool> {
    vec![
        Tool {
            name: "get_random_number".to_string(),
            description: "Generate a random number within specified range".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "min": {
                        "type": "number",
                        "description": "Minimum value (inclusive)",
                        "default": 0,
                    },
                    "max": {
                        "type": "number",
                        "description": "Maximum value (inclusive)",
                        "default": 100,
                    },
                },
            }),
        },
        Tool {
            name: "get_random_string".to_string(),
            description: "Generate a random string of specified length".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "length": {
                        "type": "integer",
                        "description": "Length of the random string",
                        "default": 10,
                        "minimum": 1,
                        "maximum": 100,
                    },
                    "charset": {
                        "type": "string",
                        "description": "Character set to use (alphanumeric, alpha, numeric)",
                        "default": "alphanumeric",
                        "enum": ["alphanumeric", "alpha", "numeric"],
                    },
                },
            }),
        },
        Tool {
            name: "get_random_choice".to_string(),
            description: "Pick a random item from a list of choices".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "choices": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "List of choices to pick from",
                        "minItems": 1,
                    },
                },
                "required": ["choices"],
            }),
        },
    ]
}
