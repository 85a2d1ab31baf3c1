//! exnova-core: Core Runtime for exnova
//!
//! Layer2 - 호스트 계약과 확장 런타임
//!
//! # 주요 모듈
//!
//! - `host`: 호스트 협력자 (콘솔, 프로세스, 에디터, 워크스페이스, 명령, 이벤트)
//! - `lsp`: 경량 LSP 클라이언트 (stdio JSON-RPC)
//! - `commands`: 에디터 명령 핸들러 (포맷, 서버 포맷, 참조 찾기)
//! - `extension`: 라이프사이클 (활성화 / 비활성화 / 비정상 종료 처리)
//!
//! # 사용 예시
//!
//! ```ignore
//! use exnova_core::{BufferEditor, Extension, Host, Lifecycle};
//! use exnova_foundation::keys;
//!
//! let host = Host::builder()
//!     .extension_path("/opt/exnova")
//!     .workspace_config(Arc::new(SettingsStore::workspace(&root)?))
//!     .build();
//!
//! let extension = Extension::new(host.clone());
//! extension.activate().await;
//!
//! let editor = Arc::new(BufferEditor::open("lib/app.ex").await?);
//! host.commands.invoke(keys::COMMAND_FORMAT_DOCUMENT, editor).await?;
//!
//! extension.deactivate().await;
//! ```

pub mod commands;
pub mod extension;
pub mod host;
pub mod lsp;

// ============================================================================
// Re-exports: Host
// ============================================================================
pub use host::{
    BufferEditor, CommandRegistry, CompositeDisposable, Console, Disposable, EditorHandler,
    EventHub, HeadlessWorkspace, Host, HostBuilder, ProcessOutput, ProcessRequest, ProcessRunner,
    TextEditor, TextRange, TokioProcessRunner, TracingConsole, Workspace,
};

// ============================================================================
// Re-exports: LSP
// ============================================================================
pub use lsp::{
    ClientFactory, ClientOptions, LanguageClient, Location, Position, Range, ServerOptions,
    StdioClientFactory, StdioLanguageClient, StopCallback, TextEdit, Transport,
};

// ============================================================================
// Re-exports: Extension
// ============================================================================
pub use commands::CommandContext;
pub use extension::{report_error, ClientReader, Extension, Lifecycle, LifecycleState};
