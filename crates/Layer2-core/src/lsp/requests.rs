//! 타입 있는 LSP 요청 헬퍼

use super::traits::LanguageClient;
use super::types::{parse_locations, parse_text_edits, FormattingOptions, Location, Position, TextEdit};
use exnova_foundation::Result;
use serde_json::json;

pub const REFERENCES: &str = "textDocument/references";
pub const FORMATTING: &str = "textDocument/formatting";

/// 참조 찾기 (`textDocument/references`)
pub async fn find_references(
    client: &dyn LanguageClient,
    uri: &str,
    position: Position,
    include_declaration: bool,
) -> Result<Vec<Location>> {
    let params = json!({
        "textDocument": { "uri": uri },
        "position": position,
        "context": { "includeDeclaration": include_declaration }
    });

    parse_locations(client.send_request(REFERENCES, params).await?)
}

/// 문서 전체 포맷 (`textDocument/formatting`)
pub async fn format_document(
    client: &dyn LanguageClient,
    uri: &str,
    options: FormattingOptions,
) -> Result<Vec<TextEdit>> {
    let params = json!({
        "textDocument": { "uri": uri },
        "options": options
    });

    parse_text_edits(client.send_request(FORMATTING, params).await?)
}
