//! Language Client 계약
//!
//! 호스트가 제공하는 LSP 클라이언트와 그 생성기.
//! 기본 구현은 `client.rs`의 stdio 클라이언트다.

use crate::host::Disposable;
use async_trait::async_trait;
use exnova_foundation::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// 예기치 않은 종료 콜백 (종료 사유가 있으면 전달)
pub type StopCallback = Arc<dyn Fn(Option<String>) + Send + Sync>;

/// 서버 연결 방식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Stdio,
    Socket,
    Pipe,
}

/// 서버 실행 옵션
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerOptions {
    #[serde(rename = "type")]
    pub transport: Transport,
    pub path: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl ServerOptions {
    pub fn stdio(path: impl Into<PathBuf>) -> Self {
        Self {
            transport: Transport::Stdio,
            path: path.into(),
            args: Vec::new(),
            env: HashMap::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

/// 클라이언트 옵션
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientOptions {
    /// 이 클라이언트가 담당하는 문법
    pub syntaxes: Vec<String>,
    pub initialization_options: Option<Value>,
    pub root_path: Option<PathBuf>,
}

// ============================================================================
// LanguageClient
// ============================================================================

/// Language Server 클라이언트
///
/// `stop()`으로 종료한 경우에는 `on_did_stop` 콜백이 호출되지 않는다.
#[async_trait]
pub trait LanguageClient: Send + Sync {
    fn id(&self) -> &str;

    /// 사람이 읽는 이름
    fn name(&self) -> &str;

    async fn start(&self) -> Result<()>;

    async fn stop(&self) -> Result<()>;

    async fn send_request(&self, method: &str, params: Value) -> Result<Value>;

    /// 서버가 예기치 않게 종료되면 호출될 콜백 등록
    fn on_did_stop(&self, callback: StopCallback) -> Disposable;
}

/// 클라이언트 생성기
pub trait ClientFactory: Send + Sync {
    fn create(
        &self,
        id: &str,
        name: &str,
        server: ServerOptions,
        options: ClientOptions,
    ) -> Result<Arc<dyn LanguageClient>>;
}
