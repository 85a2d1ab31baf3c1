//! Text Editor - 편집기 버퍼 추상화
//!
//! 오프셋은 모두 문자(char) 단위다. LSP 위치(UTF-16)로의 변환은
//! `lsp::position`에서 한다.

use super::disposable::{Disposable, Listeners};
use crate::lsp::path_to_uri;
use async_trait::async_trait;
use exnova_foundation::{Error, Result};
use futures::future::BoxFuture;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// 에디터를 받는 비동기 핸들러 (명령, 저장 전 훅, 에디터 추가 이벤트)
pub type EditorHandler = Arc<dyn Fn(Arc<dyn TextEditor>) -> BoxFuture<'static, ()> + Send + Sync>;

/// 문자 오프셋 범위 `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// 커서 위치 (빈 범위)
    pub fn point(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// TextEditor trait
// ============================================================================

#[async_trait]
pub trait TextEditor: Send + Sync {
    /// 문서 URI (저장 안 된 문서도 URI는 있다)
    fn uri(&self) -> String;

    /// 디스크 경로 (저장 안 된 문서는 None)
    fn path(&self) -> Option<PathBuf>;

    /// 문법 식별자 (예: "elixir")
    fn syntax(&self) -> Option<String>;

    /// 문서 길이 (문자 수)
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn text_in_range(&self, range: TextRange) -> String;

    fn selected_range(&self) -> TextRange;

    /// 범위를 교체한다
    async fn edit(&self, range: TextRange, replacement: String) -> Result<()>;

    /// 저장 직전에 실행될 핸들러 등록
    fn on_will_save(&self, handler: EditorHandler) -> Disposable;

    fn full_range(&self) -> TextRange {
        TextRange::new(0, self.len())
    }

    fn text(&self) -> String {
        self.text_in_range(self.full_range())
    }

    /// 로그용 이름 (경로가 없으면 URI)
    fn display_name(&self) -> String {
        self.path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| self.uri())
    }
}

/// 확장자로 문법 추정
pub fn syntax_for_path(path: &Path) -> Option<&'static str> {
    match path.extension()?.to_str()? {
        "ex" | "exs" => Some("elixir"),
        "eex" | "leex" => Some("eex"),
        "heex" => Some("heex"),
        _ => None,
    }
}

// ============================================================================
// BufferEditor - 메모리 버퍼 + 파일 저장
// ============================================================================

/// 메모리 버퍼 에디터
///
/// 헤드리스 호스트(CLI)와 테스트에서 쓴다.
pub struct BufferEditor {
    uri: String,
    path: Option<PathBuf>,
    syntax: Option<String>,
    text: RwLock<String>,
    selection: RwLock<TextRange>,
    will_save: Listeners<EditorHandler>,
    version: AtomicU64,
}

impl BufferEditor {
    /// 저장 안 된 버퍼
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            uri: "untitled:Untitled-1".to_string(),
            path: None,
            syntax: None,
            text: RwLock::new(text.into()),
            selection: RwLock::new(TextRange::default()),
            will_save: Listeners::new(),
            version: AtomicU64::new(0),
        }
    }

    /// 파일 열기 (문법은 확장자로 추정)
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = tokio::fs::canonicalize(path.as_ref()).await.map_err(|e| {
            Error::NotFound(format!("{}: {}", path.as_ref().display(), e))
        })?;
        let text = tokio::fs::read_to_string(&path).await?;

        debug!("Opened {} ({} bytes)", path.display(), text.len());

        Ok(Self {
            uri: path_to_uri(&path),
            syntax: syntax_for_path(&path).map(str::to_string),
            path: Some(path),
            ..Self::new(text)
        })
    }

    pub fn with_syntax(mut self, syntax: impl Into<String>) -> Self {
        self.syntax = Some(syntax.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.uri = path_to_uri(&path);
        self.path = Some(path);
        self
    }

    pub fn with_selection(self, range: TextRange) -> Self {
        self.set_selection(range);
        self
    }

    pub fn set_selection(&self, range: TextRange) {
        *self.selection.write() = range;
    }

    /// 편집할 때마다 1씩 증가
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    /// 저장 전 핸들러를 실행한 뒤 파일에 쓴다
    pub async fn save(self: &Arc<Self>) -> Result<()> {
        let editor: Arc<dyn TextEditor> = self.clone();
        for handler in self.will_save.snapshot() {
            handler(Arc::clone(&editor)).await;
        }

        let path = self
            .path
            .as_ref()
            .ok_or_else(|| Error::Editor("Cannot save an untitled document".to_string()))?;

        let text = self.text.read().clone();
        tokio::fs::write(path, text).await?;
        debug!("Saved {}", path.display());
        Ok(())
    }
}

#[async_trait]
impl TextEditor for BufferEditor {
    fn uri(&self) -> String {
        self.uri.clone()
    }

    fn path(&self) -> Option<PathBuf> {
        self.path.clone()
    }

    fn syntax(&self) -> Option<String> {
        self.syntax.clone()
    }

    fn len(&self) -> usize {
        self.text.read().chars().count()
    }

    fn text_in_range(&self, range: TextRange) -> String {
        self.text
            .read()
            .chars()
            .skip(range.start)
            .take(range.len())
            .collect()
    }

    fn selected_range(&self) -> TextRange {
        *self.selection.read()
    }

    async fn edit(&self, range: TextRange, replacement: String) -> Result<()> {
        let mut text = self.text.write();

        let start = byte_offset(&text, range.start);
        let end = byte_offset(&text, range.end);
        match (start, end) {
            (Some(start), Some(end)) if start <= end => {
                text.replace_range(start..end, &replacement);
                self.version.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            _ => Err(Error::Editor(format!(
                "Range {}..{} is out of bounds",
                range.start, range.end
            ))),
        }
    }

    fn on_will_save(&self, handler: EditorHandler) -> Disposable {
        self.will_save.add(handler)
    }
}

/// 문자 오프셋 → 바이트 오프셋 (끝 위치 포함)
fn byte_offset(text: &str, char_offset: usize) -> Option<usize> {
    text.char_indices()
        .map(|(index, _)| index)
        .chain(std::iter::once(text.len()))
        .nth(char_offset)
}
