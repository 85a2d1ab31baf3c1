//! Config Store - 범위별 원시 설정 저장소

use crate::storage::JsonStore;
use crate::Result;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::path::PathBuf;

/// 설정 파일명
pub const SETTINGS_FILE: &str = "settings.json";

/// 원시 설정 조회 (워크스페이스 / 글로벌 각각 하나씩)
///
/// 값의 타입은 보장하지 않는다. 디코딩은 `settings.rs`에서 한다.
pub trait ConfigStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
}

// ============================================================================
// SettingsStore
// ============================================================================

/// 평평한 `key -> JSON value` 맵
///
/// 파일에서 한 번 읽고 메모리에 유지한다. `save()`를 호출해야 디스크에 쓴다.
#[derive(Debug, Default)]
pub struct SettingsStore {
    /// None이면 메모리 전용
    store: Option<JsonStore>,
    values: RwLock<Map<String, Value>>,
}

impl SettingsStore {
    /// 메모리 전용 저장소
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// JSON 저장소에서 로드 (파일이 없으면 빈 설정)
    pub fn open(store: JsonStore) -> Result<Self> {
        let values = store
            .load_optional::<Map<String, Value>>(SETTINGS_FILE)?
            .unwrap_or_default();

        Ok(Self {
            store: Some(store),
            values: RwLock::new(values),
        })
    }

    /// 글로벌 설정 로드
    pub fn global() -> Result<Self> {
        Self::open(JsonStore::global()?)
    }

    /// 워크스페이스 설정 로드
    pub fn workspace(root: impl Into<PathBuf>) -> Result<Self> {
        Self::open(JsonStore::workspace(root))
    }

    /// 빌더 스타일 설정
    pub fn with(self, key: impl Into<String>, value: Value) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.values.write().insert(key.into(), value);
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.values.write().remove(key)
    }

    /// 전체 설정 스냅샷
    pub fn entries(&self) -> Map<String, Value> {
        self.values.read().clone()
    }

    /// 설정 파일 위치 (메모리 전용이면 None)
    pub fn location(&self) -> Option<PathBuf> {
        self.store.as_ref().map(|s| s.file_path(SETTINGS_FILE))
    }

    /// 디스크에 저장 (메모리 전용이면 아무것도 안 함)
    pub fn save(&self) -> Result<()> {
        match &self.store {
            Some(store) => store.save(SETTINGS_FILE, &*self.values.read()),
            None => Ok(()),
        }
    }
}

impl ConfigStore for SettingsStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.read().get(key).cloned()
    }
}
