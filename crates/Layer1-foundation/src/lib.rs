//! # exnova-foundation
//!
//! Foundation layer for exnova:
//! - Error: 인프라 에러 (`Error`) + 확장 에러 분류 (`ExtensionError`)
//! - Fp: Optional / Result 헬퍼, 지연 비동기 계산 `Task`, 순차 결합자
//! - Config: 워크스페이스 / 글로벌 설정 해석
//! - Storage: JsonStore (설정 파일)
//!
//! ## 구조
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  SettingsStore (workspace)  SettingsStore (global)
//! │            │                      │          │
//! │            └──────── resolve ─────┘          │
//! │                        │                     │
//! │                 UserPreferences              │
//! │                                              │
//! │  Task::try_catch ──▶ Result<A, ExtensionError>
//! │  sequence_seq([Task, Task, ...])             │
//! └──────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod fp;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, ExtensionError, Result};

// ============================================================================
// Fp (함수형 핵심)
// ============================================================================
pub use fp::{from_nullable, sequence_seq, OptionExt, ResultExt, Task};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{
    keys, resolve, select_format_on_save, select_mix_path, ConfigStore, Preferences,
    SettingsStore, UserPreferences, SETTINGS_FILE,
};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::JsonStore;
