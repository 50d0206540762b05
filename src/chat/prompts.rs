//! プロンプト構築
//!
//! システムプロンプト（ツールカタログの説明 + `TOOL_CALL:` 構文の
//! 指示）、ユーザープロンプト、ツール結果を埋め込んだ
//! フォローアッププロンプトの 3 種を組み立てる。

use crate::mcp::Tool;

/// ツールカタログを埋め込んだシステムプロンプトを組み立てる。
pub fn system_prompt(tools: &[Tool]) -> String {
    let descriptions: Vec<String> = tools
        .iter()
        .map(|tool| format!("- {}: {}", tool.name, tool.description))
        .collect();

    format!(
        r#"You are an AI assistant with access to the following tools:

{}

When you want to use a tool, include a tool call in your response using this exact format:
TOOL_CALL: tool_name(parameter1=value1, parameter2=value2)

For example:
- To get a random number: TOOL_CALL: get_random_number(min=1, max=10)
- To get a random string: TOOL_CALL: get_random_string(length=8, charset=alpha)
- To pick from choices: TOOL_CALL: get_random_choice(choices=["apple", "banana", "orange"])

You can use multiple tools in one response if needed. Be helpful and use tools when they would be useful to answer the user's question."#,
        descriptions.join("\n")
    )
}

/// システムプロンプトとユーザー入力から 1 回目の生成プロンプトを作る。
pub fn user_prompt(system_prompt: &str, user_input: &str) -> String {
    format!("{system_prompt}\n\nUser: {user_input}\n\nAssistant:")
}

/// 元のプロンプトにツール結果を順序どおり埋め込み、
/// 最終回答を生成させるプロンプトを作る。
pub fn tool_result_prompt(original_prompt: &str, tool_results: &[String]) -> String {
    format!(
        "{original_prompt}\n\nTool Results:\n{}\n\nBased on these tool results, provide a final response to the user.\n\nAssistant:",
        tool_results.join("\n")
    )
}
