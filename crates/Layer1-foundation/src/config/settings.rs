//! Settings Resolver - 원시 설정을 타입 있는 Optional 설정으로
//!
//! 스칼라마다: 범위별 원시 값 → `from_nullable` → serde 디코딩 (실패 시 absent)
//! → 문자열 설정은 빈 문자열도 absent.

use super::keys;
use super::store::ConfigStore;
use crate::fp::{from_nullable, OptionExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// 한 범위(워크스페이스 또는 글로벌)의 설정
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub mix_path: Option<String>,
    pub format_on_save: Option<bool>,
}

impl Preferences {
    /// 원시 저장소에서 디코딩
    pub fn decode(store: &dyn ConfigStore) -> Self {
        Self {
            mix_path: read_setting::<String>(store, keys::MIX_PATH).filter(|path| !path.is_empty()),
            format_on_save: read_setting::<bool>(store, keys::FORMAT_ON_SAVE),
        }
    }
}

/// 활성화 시 한 번 만들어지고 이후 바뀌지 않는다
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserPreferences {
    pub workspace: Preferences,
    pub global: Preferences,
}

/// 두 범위를 각각 디코딩
pub fn resolve(workspace: &dyn ConfigStore, global: &dyn ConfigStore) -> UserPreferences {
    UserPreferences {
        workspace: Preferences::decode(workspace),
        global: Preferences::decode(global),
    }
}

/// 저장 시 포맷 여부
///
/// 어느 한 범위에라도 값이 *존재*하면 true다. 값이 `false`여도 마찬가지.
/// 기존 동작을 그대로 유지한다.
pub fn select_format_on_save(prefs: &UserPreferences) -> bool {
    prefs.workspace.format_on_save.is_some() || prefs.global.format_on_save.is_some()
}

/// `mix` 경로 (워크스페이스 우선, 없으면 글로벌)
pub fn select_mix_path(prefs: &UserPreferences) -> Option<String> {
    prefs
        .workspace
        .mix_path
        .clone()
        .alt(|| prefs.global.mix_path.clone())
}

fn read_setting<T: DeserializeOwned>(store: &dyn ConfigStore, key: &str) -> Option<T> {
    from_nullable(store.get(key)).and_then(|raw| decode(key, raw))
}

fn decode<T: DeserializeOwned>(key: &str, raw: Value) -> Option<T> {
    serde_json::from_value(raw).map_or_else(
        |e| {
            debug!("Ignoring setting {} that failed to decode: {}", key, e);
            None
        },
        Some,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SettingsStore;
    use serde_json::json;

    fn prefs(mix_path: Option<&str>, format_on_save: Option<bool>) -> Preferences {
        Preferences {
            mix_path: mix_path.map(str::to_string),
            format_on_save,
        }
    }

    #[test]
    fn test_decode_typed_values() {
        let store = SettingsStore::in_memory()
            .with(keys::MIX_PATH, json!("/usr/bin/mix"))
            .with(keys::FORMAT_ON_SAVE, json!(true));

        assert_eq!(
            Preferences::decode(&store),
            prefs(Some("/usr/bin/mix"), Some(true))
        );
    }

    #[test]
    fn test_decode_failures_become_absent() {
        let store = SettingsStore::in_memory()
            .with(keys::MIX_PATH, json!(42))
            .with(keys::FORMAT_ON_SAVE, json!("yes"));

        assert_eq!(Preferences::decode(&store), Preferences::default());
    }

    #[test]
    fn test_null_and_empty_string_are_absent() {
        let store = SettingsStore::in_memory()
            .with(keys::MIX_PATH, json!(""))
            .with(keys::FORMAT_ON_SAVE, Value::Null);

        assert_eq!(Preferences::decode(&store), Preferences::default());
    }

    #[test]
    fn test_select_mix_path_precedence() {
        let both = UserPreferences {
            workspace: prefs(Some("/workspace/mix"), None),
            global: prefs(Some("/global/mix"), None),
        };
        assert_eq!(select_mix_path(&both).as_deref(), Some("/workspace/mix"));

        let global_only = UserPreferences {
            workspace: prefs(None, None),
            global: prefs(Some("/global/mix"), None),
        };
        assert_eq!(select_mix_path(&global_only).as_deref(), Some("/global/mix"));

        assert_eq!(select_mix_path(&UserPreferences::default()), None);
    }

    #[test]
    fn test_select_format_on_save_uses_presence() {
        // 값이 false여도 존재하면 true (기존 동작)
        let workspace_false = UserPreferences {
            workspace: prefs(None, Some(false)),
            global: prefs(None, None),
        };
        assert!(select_format_on_save(&workspace_false));

        let global_true = UserPreferences {
            workspace: prefs(None, None),
            global: prefs(None, Some(true)),
        };
        assert!(select_format_on_save(&global_true));

        assert!(!select_format_on_save(&UserPreferences::default()));
    }

    #[test]
    fn test_resolve_reads_both_scopes() {
        let workspace = SettingsStore::in_memory().with(keys::FORMAT_ON_SAVE, json!(true));
        let global = SettingsStore::in_memory().with(keys::MIX_PATH, json!("/opt/mix"));

        let resolved = resolve(&workspace, &global);
        assert_eq!(resolved.workspace, prefs(None, Some(true)));
        assert_eq!(resolved.global, prefs(Some("/opt/mix"), None));
    }
}
