//! Commands - 에디터 명령 핸들러
//!
//! 모든 핸들러는 같은 모양이다:
//!
//! 1. 전제 조건 확인 (`OptionExt::fold`) - 없으면 로그만 남기고 건너뜀
//! 2. 외부 호출을 `Task::try_catch`로 감싸서 실행
//! 3. 결과를 `ResultExt::fold` - 실패면 `report_error`, 성공이면 에디터에 반영
//!
//! 에디터 변경은 외부 호출이 끝난 뒤 성공 분기에서 한 번만 일어난다.

mod format;
mod references;
mod server_format;

pub use format::{format_document, safe_format};
pub use references::{find_references, safe_find_references};
pub use server_format::{format_with_server, safe_format_with_server};

use crate::extension::ClientReader;
use crate::host::{Console, ProcessRunner, TextEditor, TextRange, Workspace};
use std::sync::Arc;

/// 핸들러가 호출 시점에 받는 협력자
#[derive(Clone)]
pub struct CommandContext {
    pub console: Arc<dyn Console>,
    pub workspace: Arc<dyn Workspace>,
    pub process: Arc<dyn ProcessRunner>,
    pub client: ClientReader,
    /// 해석된 `mix` 경로 (워크스페이스 > 글로벌)
    pub mix_path: Option<String>,
}

/// 포맷 결과로 범위를 한 번에 교체
async fn replace_text(
    ctx: &CommandContext,
    editor: Arc<dyn TextEditor>,
    range: TextRange,
    formatted: String,
) {
    match editor.edit(range, formatted).await {
        Ok(()) => ctx
            .console
            .log(&format!("Formatted {}", editor.display_name())),
        Err(e) => ctx
            .console
            .error(&format!("Failed to replace editor text in-memory: {}", e)),
    }
}
