//! Console - 확장 콘솔 출력
//!
//! 사용자에게 보이는 로그 줄은 모두 `Console`을 거친다.
//! 기본 구현은 tracing 이벤트로 내보낸다 (target: `exnova::console`).

use tracing::{error, info};

/// 확장 콘솔
pub trait Console: Send + Sync {
    fn log(&self, message: &str);
    fn error(&self, message: &str);
}

/// tracing 기반 콘솔
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingConsole;

impl Console for TracingConsole {
    fn log(&self, message: &str) {
        info!(target: "exnova::console", "{}", message);
    }

    fn error(&self, message: &str) {
        error!(target: "exnova::console", "{}", message);
    }
}
