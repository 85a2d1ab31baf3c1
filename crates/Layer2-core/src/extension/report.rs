//! 확장 에러 보고

use crate::host::Console;
use exnova_foundation::ExtensionError;
use tracing::debug;

/// 확장 에러를 콘솔에 출력
///
/// 모든 분류를 명시적으로 다룬다 (새 분류가 생기면 컴파일 에러).
pub fn report_error(console: &dyn Console, err: &ExtensionError) {
    debug!(tag = err.tag(), "Reporting extension error");

    match err {
        ExtensionError::MakeExecutable { reason } => console.error(reason),
        ExtensionError::Start { reason } => console.error(reason),
        ExtensionError::Shutdown { reason } => console.error(reason),
        ExtensionError::InvokeFormatter { reason } => console.error(reason),
        ExtensionError::InvokeReferences { reason } => console.error(reason),
    }
}
