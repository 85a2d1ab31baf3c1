//! Disposable - 등록 해제 핸들
//!
//! 명령, 리스너, 콜백 등록은 모두 `Disposable`을 돌려준다.
//! `dispose()`를 호출해야 해제된다 (drop만으로는 해제되지 않음).

use parking_lot::Mutex;
use std::sync::Arc;

/// 한 번만 실행되는 정리 작업
pub struct Disposable {
    cleanup: Option<Box<dyn FnOnce() + Send>>,
}

impl Disposable {
    pub fn new(cleanup: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cleanup: Some(Box::new(cleanup)),
        }
    }

    /// 아무것도 하지 않는 Disposable
    pub fn noop() -> Self {
        Self { cleanup: None }
    }

    pub fn dispose(mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
    }
}

impl std::fmt::Debug for Disposable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Disposable")
            .field("pending", &self.cleanup.is_some())
            .finish()
    }
}

// ============================================================================
// CompositeDisposable
// ============================================================================

/// 여러 Disposable 묶음
///
/// 등록의 역순으로 해제한다. 해제 후에도 다시 `add` 할 수 있다.
#[derive(Debug, Default)]
pub struct CompositeDisposable {
    items: Mutex<Vec<Disposable>>,
}

impl CompositeDisposable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, disposable: Disposable) {
        self.items.lock().push(disposable);
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dispose(&self) {
        // 락을 잡은 채로 정리 작업을 실행하지 않는다
        let items = std::mem::take(&mut *self.items.lock());
        for item in items.into_iter().rev() {
            item.dispose();
        }
    }
}

// ============================================================================
// Listeners - 해제 가능한 리스너 목록
// ============================================================================

struct ListenerList<T> {
    next_id: u64,
    entries: Vec<(u64, T)>,
}

/// 등록 순서를 유지하는 리스너 목록
pub struct Listeners<T> {
    inner: Arc<Mutex<ListenerList<T>>>,
}

impl<T> Clone for Listeners<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ListenerList {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }
}

impl<T: Clone + Send + 'static> Listeners<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 리스너 추가 (반환된 Disposable로 제거)
    pub fn add(&self, listener: T) -> Disposable {
        let id = {
            let mut list = self.inner.lock();
            list.next_id += 1;
            let id = list.next_id;
            list.entries.push((id, listener));
            id
        };

        let weak = Arc::downgrade(&self.inner);
        Disposable::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.lock().entries.retain(|(entry_id, _)| *entry_id != id);
            }
        })
    }

    /// 현재 리스너 복사본 (호출 중 락을 잡지 않기 위해)
    pub fn snapshot(&self) -> Vec<T> {
        self.inner
            .lock()
            .entries
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
