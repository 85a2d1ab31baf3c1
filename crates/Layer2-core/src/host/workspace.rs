//! Workspace - 호스트 워크스페이스 (알림, 액션 패널, 참조 결과)

use crate::lsp::Location;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{info, warn};

#[async_trait]
pub trait Workspace: Send + Sync {
    /// 워크스페이스 루트 (폴더 없이 열렸으면 None)
    fn root_path(&self) -> Option<PathBuf>;

    /// 개발 모드 여부 (시작 알림 표시)
    fn in_dev_mode(&self) -> bool {
        false
    }

    fn notify(&self, title: &str, body: &str);

    /// 버튼이 있는 패널을 띄우고 선택된 버튼 인덱스를 돌려준다 (닫으면 None)
    async fn show_action_panel(&self, message: &str, buttons: &[String]) -> Option<usize>;

    /// 참조 결과 표시
    fn show_references(&self, locations: &[Location]);
}

// ============================================================================
// HeadlessWorkspace
// ============================================================================

/// UI 없는 워크스페이스 (CLI)
///
/// 알림과 결과는 로그로 남기고, 액션 패널은 미리 정한 답을 고른다.
#[derive(Debug, Clone, Default)]
pub struct HeadlessWorkspace {
    root: Option<PathBuf>,
    dev_mode: bool,
    panel_choice: Option<usize>,
}

impl HeadlessWorkspace {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self {
            root,
            ..Self::default()
        }
    }

    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    /// 액션 패널에서 항상 고를 버튼 (None이면 닫음)
    pub fn with_panel_choice(mut self, choice: Option<usize>) -> Self {
        self.panel_choice = choice;
        self
    }
}

#[async_trait]
impl Workspace for HeadlessWorkspace {
    fn root_path(&self) -> Option<PathBuf> {
        self.root.clone()
    }

    fn in_dev_mode(&self) -> bool {
        self.dev_mode
    }

    fn notify(&self, title: &str, body: &str) {
        info!("[{}] {}", title, body);
    }

    async fn show_action_panel(&self, message: &str, buttons: &[String]) -> Option<usize> {
        warn!("{}", message);

        let choice = self.panel_choice.filter(|index| *index < buttons.len());
        match choice {
            Some(index) => info!("Choosing \"{}\"", buttons[index]),
            None => info!("Dismissed"),
        }
        choice
    }

    fn show_references(&self, locations: &[Location]) {
        for location in locations {
            let file = location.file_path().unwrap_or_else(|| location.uri.clone());
            info!(
                "{}:{}:{}",
                file,
                location.range.start.line + 1,
                location.range.start.character + 1
            );
        }
    }
}
