//! 起動・終了バナー

use super::color::{bold_magenta, white, yellow};
use super::speak::say;

/// 起動時の Welcome バナーを表示する。
pub fn print_welcome(model: &str, tool_count: usize) {
    let version = env!("CARGO_PKG_VERSION");

    let art_lines: &[&str] = &[
        r#"                 _ _           _ _ "#,
        r#"  ___  _ __ ___ (_) | ___   _ (_|_)"#,
        r#" / _ \| '_ ` _ \| | |/ / | | || | |"#,
        r#"| (_) | | | | | | |   <| |_| || | |"#,
        r#" \___/|_| |_| |_|_|_|\_\\__,_|/ |_|"#,
        r#"                            |__/   "#,
    ];

    println!();
    for line in art_lines {
        println!("{}", bold_magenta(line));
    }
    println!(
        "  {} {}",
        white("local LLM chat with tool calling"),
        yellow(&format!("v{version}"))
    );
    println!();

    say(&format!(
        "Connected to the tool server with {tool_count} tools available. Using model: {model}."
    ));
    say("Type your question, or `exit` to leave.");
    println!();
}

/// 終了時の挨拶を表示する。
pub fn print_goodbye() {
    say("May fortune favor you. Goodbye!");
}
