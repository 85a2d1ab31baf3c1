//! Error types for exnova
//!
//! - `Error`: 인프라 에러 (프로세스, LSP, 설정, 에디터)
//! - `ExtensionError`: 확장 기능 수준의 닫힌 에러 분류 (tag + reason)

mod extension;

pub use extension::ExtensionError;

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// exnova 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 외부 프로세스 / LSP
    // ========================================================================
    #[error("Process error: {0}")]
    Process(String),

    #[error("LSP error: {0}")]
    Lsp(String),

    // ========================================================================
    // 에디터 관련
    // ========================================================================
    #[error("Editor error: {0}")]
    Editor(String),

    // ========================================================================
    // 실행 관련
    // ========================================================================
    #[error("Timeout: {0}")]
    Timeout(String),

    // ========================================================================
    // 일반
    // ========================================================================
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // 기타
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

// ============================================================================
// From 구현 (추가 변환)
// ============================================================================

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}
