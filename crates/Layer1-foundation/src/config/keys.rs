//! 설정 키와 명령 식별자
//!
//! 각 설정은 워크스페이스 / 글로벌 범위에서 독립적으로 덮어쓸 수 있다.

/// 저장 시 자동 포맷 (bool)
pub const FORMAT_ON_SAVE: &str = "elixir.config.formatOnSave";

/// `mix` 실행 파일 경로 (string, 비어 있으면 없는 것으로 취급)
pub const MIX_PATH: &str = "elixir.config.mixPath";

// ============================================================================
// 명령 식별자
// ============================================================================

pub const COMMAND_FORMAT_DOCUMENT: &str = "elixir.commands.formatDocument";
pub const COMMAND_FORMAT_WITH_SERVER: &str = "elixir.commands.formatDocumentWithServer";
pub const COMMAND_FIND_REFERENCES: &str = "elixir.commands.findReferences";
pub const COMMAND_RESTART: &str = "elixir.commands.restart";
