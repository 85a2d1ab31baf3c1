//! Config - 설정 관리
//!
//! - `keys.rs` - 설정 키 / 명령 식별자
//! - `store.rs` - `ConfigStore` trait, `SettingsStore` (JSON 파일 백업)
//! - `settings.rs` - 워크스페이스 > 글로벌 우선순위 해석

pub mod keys;
mod settings;
mod store;

pub use settings::{resolve, select_format_on_save, select_mix_path, Preferences, UserPreferences};
pub use store::{ConfigStore, SettingsStore, SETTINGS_FILE};
