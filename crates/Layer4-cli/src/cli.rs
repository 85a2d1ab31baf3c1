//! Non-interactive editor commands
//!
//! 명령 하나마다: 활성화 → 파일 열기 → 레지스트리로 명령 실행 → 결과 출력 / 저장 → 비활성화

use anyhow::Context;
use exnova_core::lsp::position_to_offset;
use exnova_core::{
    BufferEditor, Extension, HeadlessWorkspace, Host, Lifecycle, Position, TextEditor, TextRange,
};
use exnova_foundation::{keys, SettingsStore};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// 전역 옵션
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub extension_path: PathBuf,
    pub workspace: PathBuf,
    pub mix_path: Option<String>,
    pub dev: bool,
    pub auto_restart: bool,
}

#[derive(Debug, Clone, Copy)]
pub enum EditorCommand {
    Format { write: bool },
    FormatServer { write: bool },
    References { line: u32, column: u32 },
    Save,
}

/// 호스트 구성 (설정은 워크스페이스 / 글로벌 파일에서)
fn build_host(options: &RunOptions) -> anyhow::Result<Host> {
    let workspace_config = SettingsStore::workspace(&options.workspace)?;
    if let Some(mix) = &options.mix_path {
        // 이번 실행에만 적용, 저장하지 않는다
        workspace_config.set(keys::MIX_PATH, Value::String(mix.clone()));
    }

    let global_config = SettingsStore::global().unwrap_or_else(|e| {
        warn!("Failed to load global settings: {}", e);
        SettingsStore::in_memory()
    });

    let workspace = HeadlessWorkspace::new(Some(options.workspace.clone()))
        .with_dev_mode(options.dev)
        .with_panel_choice(options.auto_restart.then_some(0));

    Ok(Host::builder()
        .workspace(Arc::new(workspace))
        .workspace_config(Arc::new(workspace_config))
        .global_config(Arc::new(global_config))
        .extension_path(&options.extension_path)
        .build())
}

/// 편집 명령 실행
pub async fn run_editor_command(
    options: &RunOptions,
    command: EditorCommand,
    file: &Path,
) -> anyhow::Result<()> {
    let host = build_host(options)?;
    let extension = Extension::new(host.clone());

    extension.activate().await;

    let outcome = run_in_editor(&host, command, file).await;

    extension.deactivate().await;
    outcome
}

async fn run_in_editor(host: &Host, command: EditorCommand, file: &Path) -> anyhow::Result<()> {
    let editor = Arc::new(
        BufferEditor::open(file)
            .await
            .with_context(|| format!("Failed to open {}", file.display()))?,
    );

    match command {
        EditorCommand::Format { write } => {
            host.commands
                .invoke(keys::COMMAND_FORMAT_DOCUMENT, editor.clone())
                .await?;
            emit(&editor, write).await
        }
        EditorCommand::FormatServer { write } => {
            host.commands
                .invoke(keys::COMMAND_FORMAT_WITH_SERVER, editor.clone())
                .await?;
            emit(&editor, write).await
        }
        EditorCommand::References { line, column } => {
            let position = Position::new(line.saturating_sub(1), column.saturating_sub(1));
            let offset = position_to_offset(&editor.text(), position);
            debug!("Selecting offset {} for {:?}", offset, position);

            editor.set_selection(TextRange::point(offset));
            host.commands
                .invoke(keys::COMMAND_FIND_REFERENCES, editor)
                .await?;
            Ok(())
        }
        EditorCommand::Save => {
            host.events.add_text_editor(editor.clone()).await;
            editor.save().await?;
            Ok(())
        }
    }
}

/// 결과를 파일에 쓰거나 stdout으로
async fn emit(editor: &Arc<BufferEditor>, write: bool) -> anyhow::Result<()> {
    if write {
        editor.save().await?;
    } else {
        print!("{}", editor.text());
    }
    Ok(())
}
