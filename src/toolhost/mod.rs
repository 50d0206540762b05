//! ツールホスト（stdio JSON-RPC サーバー側）
//!
//! stdin の行ストリームをリクエストとして読み、メソッド名で
//! ディスパッチし、リクエスト 1 件につきレスポンス 1 行を stdout に
//! 書く。`dispatch` は純粋な関数で、入出力ループは
//! `src/bin/tools.rs` が持つ。

pub mod catalog;
pub mod dispatch;
pub mod tools;

pub use dispatch::handle_request;
