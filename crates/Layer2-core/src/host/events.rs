//! Event Hub - 에디터 추가 이벤트

use super::disposable::{Disposable, Listeners};
use super::editor::{EditorHandler, TextEditor};
use std::sync::Arc;
use tracing::trace;

/// 호스트 이벤트 허브
#[derive(Default)]
pub struct EventHub {
    did_add_text_editor: Listeners<EditorHandler>,
}

impl EventHub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// 에디터가 열릴 때마다 호출될 리스너 등록
    pub fn on_did_add_text_editor(&self, listener: EditorHandler) -> Disposable {
        self.did_add_text_editor.add(listener)
    }

    /// 에디터 추가를 알린다 (리스너를 등록 순서대로 실행)
    pub async fn add_text_editor(&self, editor: Arc<dyn TextEditor>) {
        trace!("Text editor added: {}", editor.uri());
        for listener in self.did_add_text_editor.snapshot() {
            listener(Arc::clone(&editor)).await;
        }
    }

    pub fn listener_count(&self) -> usize {
        self.did_add_text_editor.len()
    }
}
