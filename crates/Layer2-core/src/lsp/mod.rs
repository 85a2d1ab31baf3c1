//! LSP Integration - 경량 Language Server Protocol 통합
//!
//! ElixirLS 같은 stdio 언어 서버와 통신하는 최소 클라이언트
//!
//! ## 구성
//!
//! - `traits.rs` - `LanguageClient` / `ClientFactory` 계약, 서버 / 클라이언트 옵션
//! - `client.rs` - stdio JSON-RPC 구현 (`StdioLanguageClient`)
//! - `requests.rs` - `textDocument/references`, `textDocument/formatting`
//! - `position.rs` - 문자 오프셋 ↔ UTF-16 Position, TextEdit 적용
//! - `types.rs` - Position / Range / Location / TextEdit
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use exnova_core::lsp::{
//!     requests, ClientFactory, ClientOptions, Position, ServerOptions, StdioClientFactory,
//! };
//!
//! let client = StdioClientFactory.create(
//!     "elixirLS",
//!     "Elixir",
//!     ServerOptions::stdio("elixir-ls/language_server.sh"),
//!     ClientOptions { syntaxes: vec!["elixir".into()], ..Default::default() },
//! )?;
//! client.start().await?;
//!
//! let refs = requests::find_references(
//!     client.as_ref(),
//!     "file:///project/lib/app.ex",
//!     Position::new(10, 5),
//!     false,
//! ).await?;
//! ```

mod client;
mod position;
pub mod requests;
mod traits;
mod types;

pub use client::{LspClientState, StdioClientFactory, StdioLanguageClient, DEFAULT_REQUEST_TIMEOUT};
pub use position::{apply_text_edits, offset_to_position, position_to_offset};
pub use traits::{
    ClientFactory, ClientOptions, LanguageClient, ServerOptions, StopCallback, Transport,
};
pub use types::*;
