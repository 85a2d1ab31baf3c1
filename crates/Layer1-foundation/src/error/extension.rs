//! ExtensionError - 확장 기능 에러 분류
//!
//! 외부 효과(프로세스, LSP 요청, 편집)의 실패는 `Task` 경계에서 이 타입으로
//! 변환된다. 변형 집합은 닫혀 있으며, 소비하는 쪽은 와일드카드 없이 `match`한다.

use thiserror::Error;

/// 확장 기능 에러 (tag + reason)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtensionError {
    /// 번들 스크립트 실행 권한 부여 실패
    #[error("{reason}")]
    MakeExecutable { reason: String },

    /// 언어 서버 시작 실패
    #[error("{reason}")]
    Start { reason: String },

    /// 언어 서버 종료 실패
    #[error("{reason}")]
    Shutdown { reason: String },

    /// 포매터 실행 실패
    #[error("{reason}")]
    InvokeFormatter { reason: String },

    /// 참조 찾기 요청 실패
    #[error("{reason}")]
    InvokeReferences { reason: String },
}

impl ExtensionError {
    pub fn make_executable(reason: impl Into<String>) -> Self {
        Self::MakeExecutable {
            reason: reason.into(),
        }
    }

    pub fn start(reason: impl Into<String>) -> Self {
        Self::Start {
            reason: reason.into(),
        }
    }

    pub fn shutdown(reason: impl Into<String>) -> Self {
        Self::Shutdown {
            reason: reason.into(),
        }
    }

    pub fn invoke_formatter(reason: impl Into<String>) -> Self {
        Self::InvokeFormatter {
            reason: reason.into(),
        }
    }

    pub fn invoke_references(reason: impl Into<String>) -> Self {
        Self::InvokeReferences {
            reason: reason.into(),
        }
    }

    /// 안정적인 태그 문자열
    pub fn tag(&self) -> &'static str {
        match self {
            Self::MakeExecutable { .. } => "makeExecutableError",
            Self::Start { .. } => "startError",
            Self::Shutdown { .. } => "shutdownError",
            Self::InvokeFormatter { .. } => "invokeFormatterError",
            Self::InvokeReferences { .. } => "invokeReferencesError",
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            Self::MakeExecutable { reason }
            | Self::Start { reason }
            | Self::Shutdown { reason }
            | Self::InvokeFormatter { reason }
            | Self::InvokeReferences { reason } => reason,
        }
    }
}
