//! Host - 확장이 의존하는 호스트 환경
//!
//! 에디터 호스트가 제공하는 협력자들을 trait으로 추상화한다.
//!
//! - `console.rs` - 확장 콘솔 (`Console`, `TracingConsole`)
//! - `process.rs` - 외부 프로세스 실행 (`ProcessRunner`)
//! - `editor.rs` - 텍스트 에디터 (`TextEditor`, `BufferEditor`)
//! - `workspace.rs` - 알림 / 액션 패널 / 참조 표시 (`Workspace`)
//! - `commands.rs` - 명령 레지스트리
//! - `events.rs` - 에디터 추가 이벤트
//! - `disposable.rs` - 등록 해제 핸들
//! - `context.rs` - 위 협력자 묶음 (`Host`)

mod commands;
mod console;
mod context;
mod disposable;
mod editor;
mod events;
mod process;
mod workspace;

pub use commands::CommandRegistry;
pub use console::{Console, TracingConsole};
pub use context::{Host, HostBuilder};
pub use disposable::{CompositeDisposable, Disposable, Listeners};
pub use editor::{syntax_for_path, BufferEditor, EditorHandler, TextEditor, TextRange};
pub use events::EventHub;
pub use process::{
    ProcessOutput, ProcessRequest, ProcessRunner, TokioProcessRunner, DEFAULT_PROCESS_TIMEOUT,
};
pub use workspace::{HeadlessWorkspace, Workspace};
