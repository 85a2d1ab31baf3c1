//! Startup - 언어 서버 시작 단계
//!
//! 1. `elixir-ls/*.sh`에 실행 권한 부여 (`/usr/bin/env chmod a+x`)
//! 2. 클라이언트 생성 및 시작 (`lifecycle.rs`)

use crate::host::{ProcessRequest, ProcessRunner};
use crate::lsp::{ClientOptions, ServerOptions};
use anyhow::{bail, Context};
use exnova_foundation::{ExtensionError, Task};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const SERVER_ID: &str = "elixirLS";
pub const SERVER_NAME: &str = "Elixir";

/// 번들된 언어 서버 디렉토리
pub const SERVER_DIR: &str = "elixir-ls";
pub const LAUNCH_SCRIPT: &str = "language_server.sh";

pub const ELIXIR_SYNTAX: &str = "elixir";

pub const RESTART_BUTTON: &str = "Restart";
pub const IGNORE_BUTTON: &str = "Ignore";

pub fn server_dir(extension_path: &Path) -> PathBuf {
    extension_path.join(SERVER_DIR)
}

/// 서버 디렉토리의 실행 스크립트 목록 (정렬됨)
pub fn launch_scripts(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/*.sh",
        glob::Pattern::escape(&dir.to_string_lossy())
    );

    let mut scripts: Vec<PathBuf> = glob::glob(&pattern)
        .context("Invalid script pattern")?
        .filter_map(|entry| entry.ok())
        .collect();
    scripts.sort();

    if scripts.is_empty() {
        bail!("no launch scripts found in {}", dir.display());
    }
    Ok(scripts)
}

/// 1단계: 실행 스크립트에 실행 권한 부여
pub fn make_executable(
    runner: Arc<dyn ProcessRunner>,
    server_dir: PathBuf,
) -> Task<ExtensionError, ()> {
    Task::try_catch(
        move || {
            let runner = Arc::clone(&runner);
            let server_dir = server_dir.clone();

            async move {
                let scripts = launch_scripts(&server_dir)?;
                let request = ProcessRequest::new("/usr/bin/env")
                    .args(["chmod", "a+x"])
                    .args(scripts.iter().map(|p| p.to_string_lossy().to_string()));

                let output = runner.run(request).await?;
                if !output.success() {
                    bail!("chmod {}", output.failure_message());
                }
                Ok(())
            }
        },
        |e| ExtensionError::make_executable(format!("Failed to make file executable: {:#}", e)),
    )
}

pub fn server_options(extension_path: &Path) -> ServerOptions {
    ServerOptions::stdio(server_dir(extension_path).join(LAUNCH_SCRIPT))
}

pub fn client_options(root_path: Option<PathBuf>) -> ClientOptions {
    ClientOptions {
        syntaxes: vec![ELIXIR_SYNTAX.to_string()],
        initialization_options: None,
        root_path,
    }
}

/// 예기치 않은 종료 안내 문구
pub fn stop_message(reason: Option<&str>) -> String {
    let detail = match reason {
        Some(reason) => format!(":\n\n{}", reason),
        None => ".".to_string(),
    };

    format!(
        "Elixir Language Server stopped unexpectedly{}\n\nPlease report this, along with any output in the Extension Console.",
        detail
    )
}
