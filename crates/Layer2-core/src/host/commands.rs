//! Command Registry - 명령 식별자 → 핸들러

use super::disposable::Disposable;
use super::editor::{EditorHandler, TextEditor};
use exnova_foundation::{Error, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

struct Registration {
    token: u64,
    handler: EditorHandler,
}

/// 명령 레지스트리
///
/// 같은 식별자로 다시 등록하면 이전 핸들러를 대체한다.
/// 이전 등록의 Disposable은 더 이상 아무것도 제거하지 않는다.
#[derive(Default)]
pub struct CommandRegistry {
    commands: RwLock<HashMap<String, Registration>>,
    next_token: AtomicU64,
}

impl CommandRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn register(self: &Arc<Self>, id: impl Into<String>, handler: EditorHandler) -> Disposable {
        let id = id.into();
        let token = self.next_token.fetch_add(1, Ordering::SeqCst);

        let previous = self
            .commands
            .write()
            .insert(id.clone(), Registration { token, handler });
        if previous.is_some() {
            warn!("Command {} registered twice; replacing handler", id);
        }
        debug!("Registered command {}", id);

        let registry: Weak<Self> = Arc::downgrade(self);
        Disposable::new(move || {
            if let Some(registry) = registry.upgrade() {
                let mut commands = registry.commands.write();
                if commands.get(&id).is_some_and(|r| r.token == token) {
                    commands.remove(&id);
                }
            }
        })
    }

    /// 명령 실행 (핸들러가 끝날 때까지 기다린다)
    pub async fn invoke(&self, id: &str, editor: Arc<dyn TextEditor>) -> Result<()> {
        let handler = self
            .commands
            .read()
            .get(id)
            .map(|r| Arc::clone(&r.handler))
            .ok_or_else(|| Error::NotFound(format!("Command {}", id)))?;

        handler(editor).await;
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.commands.read().contains_key(id)
    }

    /// 등록된 명령 식별자 (정렬됨)
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.commands.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}
