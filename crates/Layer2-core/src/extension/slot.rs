//! Client Slot - 현재 언어 서버 클라이언트 보관소
//!
//! 쓰기는 라이프사이클만 한다. 명령 핸들러는 `ClientReader`로 읽기만 한다.

use crate::lsp::LanguageClient;
use parking_lot::RwLock;
use std::sync::Arc;

type Shared = Arc<RwLock<Option<Arc<dyn LanguageClient>>>>;

/// 클라이언트 보관소 (라이프사이클 소유)
#[derive(Default)]
pub struct ClientSlot {
    inner: Shared,
}

impl ClientSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set(&self, client: Arc<dyn LanguageClient>) {
        *self.inner.write() = Some(client);
    }

    pub(crate) fn take(&self) -> Option<Arc<dyn LanguageClient>> {
        self.inner.write().take()
    }

    pub fn is_present(&self) -> bool {
        self.inner.read().is_some()
    }

    pub fn reader(&self) -> ClientReader {
        ClientReader {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// 읽기 전용 핸들 (호출 시점의 클라이언트를 본다)
#[derive(Clone, Default)]
pub struct ClientReader {
    inner: Shared,
}

impl ClientReader {
    pub fn current(&self) -> Option<Arc<dyn LanguageClient>> {
        self.inner.read().clone()
    }
}
