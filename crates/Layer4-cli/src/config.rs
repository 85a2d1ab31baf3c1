//! `exnova config` - 설정 보기 / 바꾸기

use exnova_foundation::{resolve, select_format_on_save, select_mix_path, SettingsStore};
use serde_json::{json, Value};
use std::path::Path;

/// 해석된 설정과 설정 파일 위치 출력
pub fn show(workspace: &Path) -> anyhow::Result<()> {
    let workspace_config = SettingsStore::workspace(workspace)?;
    let global_config = SettingsStore::global()?;
    let prefs = resolve(&workspace_config, &global_config);

    let report = json!({
        "workspace": {
            "file": workspace_config.location(),
            "settings": prefs.workspace,
        },
        "global": {
            "file": global_config.location(),
            "settings": prefs.global,
        },
        "effective": {
            "mixPath": select_mix_path(&prefs),
            "formatOnSave": select_format_on_save(&prefs),
        }
    });

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// 설정 하나를 쓰고 저장
pub fn set(workspace: &Path, key: &str, raw: &str, global: bool) -> anyhow::Result<()> {
    let store = if global {
        SettingsStore::global()?
    } else {
        SettingsStore::workspace(workspace)?
    };

    store.set(key, parse_value(raw));
    store.save()?;

    if let Some(path) = store.location() {
        println!("Updated {} in {}", key, path.display());
    }
    Ok(())
}

/// JSON으로 읽고, 실패하면 문자열 그대로
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
