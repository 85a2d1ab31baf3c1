//! Process - 외부 프로세스 실행
//!
//! `mix format -`, `chmod` 같은 일회성 프로세스를 실행하고
//! 종료 코드 / stdout / stderr를 모아서 돌려준다.

use async_trait::async_trait;
use exnova_foundation::{Error, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// 기본 실행 타임아웃
pub const DEFAULT_PROCESS_TIMEOUT: Duration = Duration::from_secs(60);

// ============================================================================
// 요청 / 결과
// ============================================================================

/// 프로세스 실행 요청
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRequest {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: HashMap<String, String>,
    /// stdin으로 쓸 내용 (None이면 stdin을 열지 않음)
    pub stdin: Option<String>,
}

impl ProcessRequest {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: HashMap::new(),
            stdin: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, cwd: Option<PathBuf>) -> Self {
        self.cwd = cwd;
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// 로그용 명령줄
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// 프로세스 실행 결과
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// 종료 코드 (시그널로 종료되면 None)
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// 실패 설명 (stderr가 비어 있으면 종료 코드)
    pub fn failure_message(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            format!("exited with status {:?}", self.status)
        } else {
            stderr.to_string()
        }
    }
}

// ============================================================================
// ProcessRunner
// ============================================================================

/// 프로세스 실행기
///
/// 실행 자체가 불가능할 때만 `Err`다. 0이 아닌 종료 코드는 `Ok(output)`.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, request: ProcessRequest) -> Result<ProcessOutput>;
}

/// tokio::process 기반 실행기
#[derive(Debug, Clone)]
pub struct TokioProcessRunner {
    timeout: Duration,
}

impl Default for TokioProcessRunner {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_PROCESS_TIMEOUT,
        }
    }
}

impl TokioProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn execute(&self, request: &ProcessRequest) -> Result<ProcessOutput> {
        let mut command = Command::new(&request.program);
        command
            .args(&request.args)
            .envs(&request.env)
            .stdin(if request.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(cwd) = &request.cwd {
            command.current_dir(cwd);
        }

        let mut child = command.spawn().map_err(|e| {
            Error::Process(format!("Failed to spawn {}: {}", request.program, e))
        })?;

        // stdin 쓰기와 출력 수집을 동시에 (큰 입력에서 파이프가 막히지 않도록)
        let stdin = child.stdin.take();
        let input = request.stdin.clone();
        let write_stdin = async move {
            if let (Some(mut stdin), Some(input)) = (stdin, input) {
                stdin.write_all(input.as_bytes()).await?;
                stdin.shutdown().await?;
            }
            Ok::<_, std::io::Error>(())
        };

        let (written, output) = tokio::join!(write_stdin, child.wait_with_output());
        let output = output?;

        if let Err(e) = written {
            // 프로세스가 stdin을 다 읽기 전에 종료한 경우
            warn!("Failed to write stdin of {}: {}", request.program, e);
        }

        Ok(ProcessOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, request: ProcessRequest) -> Result<ProcessOutput> {
        debug!("Executing process: {}", request.command_line());

        match tokio::time::timeout(self.timeout, self.execute(&request)).await {
            Ok(result) => {
                if let Ok(output) = &result {
                    if !output.success() {
                        debug!(
                            "Process {} failed: {}",
                            request.program,
                            output.failure_message()
                        );
                    }
                }
                result
            }
            Err(_) => Err(Error::Timeout(format!(
                "{} timed out after {}s",
                request.program,
                self.timeout.as_secs()
            ))),
        }
    }
}
