//! Extension - Elixir 확장 라이프사이클
//!
//! - `lifecycle.rs` - `Extension` (activate / deactivate, 비정상 종료 처리)
//! - `startup.rs` - 시작 단계 (실행 권한, 서버 / 클라이언트 옵션)
//! - `slot.rs` - 클라이언트 핸들 보관소
//! - `report.rs` - 확장 에러 보고 (빠짐없는 분기)

mod lifecycle;
mod report;
mod slot;
mod startup;

pub use lifecycle::{Extension, Lifecycle, LifecycleState};
pub use report::report_error;
pub use slot::{ClientReader, ClientSlot};
pub use startup::{
    client_options, launch_scripts, make_executable, server_dir, server_options, stop_message,
    ELIXIR_SYNTAX, LAUNCH_SCRIPT, SERVER_DIR, SERVER_ID, SERVER_NAME,
};
