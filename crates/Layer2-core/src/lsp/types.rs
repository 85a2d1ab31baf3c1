//! LSP Types - 필요한 LSP 타입만 직접 정의
//!
//! lsp-types 크레이트 없이 위치 / 범위 / 편집 / 포맷 옵션만 포함

use exnova_foundation::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

// ============================================================================
// 핵심 위치 타입
// ============================================================================

/// 텍스트 위치 (0-based, UTF-16 offset)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// 라인 번호 (0부터 시작)
    pub line: u32,

    /// 컬럼 (0부터, UTF-16 코드 유닛 기준)
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// 텍스트 범위
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// 단일 위치 범위
    pub fn point(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }
}

/// 파일 내 위치
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// 파일 URI (file:///path/to/file)
    pub uri: String,

    /// 범위
    pub range: Range,
}

impl Location {
    pub fn new(uri: impl Into<String>, range: Range) -> Self {
        Self {
            uri: uri.into(),
            range,
        }
    }

    /// URI에서 파일 경로 추출
    pub fn file_path(&self) -> Option<String> {
        uri_to_path(&self.uri)
    }
}

// ============================================================================
// 포맷팅
// ============================================================================

/// 텍스트 편집 (`textDocument/formatting` 결과)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    pub range: Range,
    pub new_text: String,
}

impl TextEdit {
    pub fn new(range: Range, new_text: impl Into<String>) -> Self {
        Self {
            range,
            new_text: new_text.into(),
        }
    }
}

/// 포맷 옵션
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattingOptions {
    pub tab_size: u32,
    pub insert_spaces: bool,
}

impl Default for FormattingOptions {
    /// Elixir 관례: 공백 2칸
    fn default() -> Self {
        Self {
            tab_size: 2,
            insert_spaces: true,
        }
    }
}

// ============================================================================
// 결과 파싱
// ============================================================================

/// Location 결과 파싱 (null / 단일 / 배열)
pub fn parse_locations(value: Value) -> Result<Vec<Location>> {
    match value {
        Value::Null => Ok(vec![]),
        Value::Array(_) => serde_json::from_value(value)
            .map_err(|e| Error::Lsp(format!("Failed to parse locations: {}", e))),
        Value::Object(_) => serde_json::from_value::<Location>(value)
            .map(|loc| vec![loc])
            .map_err(|e| Error::Lsp(format!("Failed to parse location: {}", e))),
        other => Err(Error::Lsp(format!("Unexpected locations result: {}", other))),
    }
}

/// TextEdit 결과 파싱 (null이면 변경 없음)
pub fn parse_text_edits(value: Value) -> Result<Vec<TextEdit>> {
    if value.is_null() {
        return Ok(vec![]);
    }
    serde_json::from_value(value).map_err(|e| Error::Lsp(format!("Failed to parse text edits: {}", e)))
}

// ============================================================================
// URI 변환
// ============================================================================

/// 파일 경로를 file:// URI로 변환
///
/// 절대 경로는 퍼센트 인코딩된 URI로, 상대 경로는 그대로 붙인다.
pub fn path_to_uri(path: &Path) -> String {
    match url::Url::from_file_path(path) {
        Ok(url) => url.to_string(),
        Err(()) => format!("file://{}", path.to_string_lossy().replace('\\', "/")),
    }
}

/// file:// URI를 파일 경로로 변환
pub fn uri_to_path(uri: &str) -> Option<String> {
    let url = url::Url::parse(uri).ok()?;
    if url.scheme() != "file" {
        return None;
    }
    url.to_file_path()
        .ok()
        .map(|p| p.to_string_lossy().to_string())
}

// ============================================================================
// 테스트
// ============================================================================
