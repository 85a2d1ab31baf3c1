//! LSP Client - stdio Language Server 클라이언트
//!
//! JSON-RPC 2.0 over stdio (Content-Length 프레이밍)
//!
//! - 요청 / 응답: 요청 ID별 oneshot 채널
//! - 서버 → 클라이언트 요청: null로 응답 (`workspace/configuration`은 항목 수만큼 null)
//! - stdout EOF: Ready 상태였다면 `on_did_stop` 콜백 호출

use super::traits::{
    ClientFactory, ClientOptions, LanguageClient, ServerOptions, StopCallback, Transport,
};
use super::types::path_to_uri;
use crate::host::{Disposable, Listeners};
use async_trait::async_trait;
use exnova_foundation::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::sync::{mpsc, oneshot, Mutex, RwLock};
use tracing::{debug, error, trace, warn};

/// 요청 응답 대기 시간
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// exit 알림 후 프로세스 종료를 기다리는 시간
const EXIT_GRACE_PERIOD: Duration = Duration::from_secs(2);

// ============================================================================
// 클라이언트 상태
// ============================================================================

/// LSP 클라이언트 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LspClientState {
    /// 시작 전
    NotInitialized,
    /// initialize 진행 중
    Initializing,
    /// 준비 완료 (사용 가능)
    Ready,
    /// 종료 중
    ShuttingDown,
    /// 종료됨
    Shutdown,
    /// 예기치 않게 종료됨
    Crashed,
}

// ============================================================================
// JSON-RPC 메시지
// ============================================================================

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
}

#[derive(Debug, Serialize)]
struct JsonRpcNotification<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// 서버에서 온 메시지 (응답 / 요청 / 알림 공용)
#[derive(Debug, Deserialize)]
struct IncomingMessage {
    id: Option<Value>,
    method: Option<String>,
    params: Option<Value>,
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

#[derive(Debug)]
enum Incoming {
    Response { id: u64, result: Result<Value> },
    Request { id: Value, method: String, params: Option<Value> },
    Notification { method: String, params: Option<Value> },
    Invalid,
}

impl IncomingMessage {
    fn classify(self) -> Incoming {
        match (self.id, self.method) {
            (Some(id), Some(method)) => Incoming::Request {
                id,
                method,
                params: self.params,
            },
            (None, Some(method)) => Incoming::Notification {
                method,
                params: self.params,
            },
            (Some(id), None) => match id.as_u64() {
                Some(id) => Incoming::Response {
                    id,
                    result: match self.error {
                        Some(error) => Err(Error::Lsp(format!(
                            "Server error {}: {}",
                            error.code, error.message
                        ))),
                        None => Ok(self.result.unwrap_or(Value::Null)),
                    },
                },
                None => Incoming::Invalid,
            },
            (None, None) => Incoming::Invalid,
        }
    }
}

/// Content-Length 프레임
fn frame(body: &str) -> String {
    format!("Content-Length: {}\r\n\r\n{}", body.len(), body)
}

/// 프레임 하나 읽기 (EOF면 None)
async fn read_frame<R>(reader: &mut R) -> std::io::Result<Option<Vec<u8>>>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        // 헤더 읽기 (빈 줄까지)
        let mut content_length: usize = 0;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).await? == 0 {
                return Ok(None);
            }
            if line == "\r\n" || line == "\n" {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.trim().eq_ignore_ascii_case("content-length") {
                    let value = value.trim();
                    content_length = value.parse().map_err(|e| {
                        warn!("Invalid Content-Length header {:?}: {}", value, e);
                        std::io::Error::new(
                            std::io::ErrorKind::InvalidData,
                            format!("Invalid Content-Length: {:?}", value),
                        )
                    })?;
                }
            }
        }

        if content_length == 0 {
            continue;
        }

        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).await?;
        return Ok(Some(body));
    }
}

/// 서버 → 클라이언트 요청에 대한 응답 값
fn server_request_result(method: &str, params: Option<&Value>) -> Value {
    match method {
        // 설정은 호스트 설정 저장소에서 관리하므로 항목마다 null
        "workspace/configuration" => {
            let count = params
                .and_then(|p| p.get("items"))
                .and_then(Value::as_array)
                .map_or(0, Vec::len);
            Value::Array(vec![Value::Null; count])
        }
        _ => Value::Null,
    }
}

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<Value>>>>>;

// ============================================================================
// Reader 태스크
// ============================================================================

struct Reader {
    name: String,
    state: Arc<RwLock<LspClientState>>,
    pending: PendingMap,
    stop_listeners: Listeners<StopCallback>,
    /// 응답 전송용 (writer 종료를 막지 않도록 약한 참조)
    reply_tx: mpsc::WeakSender<String>,
}

impl Reader {
    async fn run(self, stdout: ChildStdout) {
        let mut reader = BufReader::new(stdout);

        let reason = loop {
            match read_frame(&mut reader).await {
                Ok(Some(body)) => self.dispatch(&body).await,
                Ok(None) => break None,
                Err(e) => {
                    error!("Failed to read from {}: {}", self.name, e);
                    break Some(format!("Failed to read from language server: {}", e));
                }
            }
        };

        self.terminated(reason).await;
    }

    async fn dispatch(&self, body: &[u8]) {
        let message: IncomingMessage = match serde_json::from_slice(body) {
            Ok(message) => message,
            Err(e) => {
                trace!(
                    "Failed to parse LSP message: {} - body: {}",
                    e,
                    String::from_utf8_lossy(body)
                );
                return;
            }
        };

        match message.classify() {
            Incoming::Response { id, result } => {
                trace!("LSP response {} received from {}", id, self.name);
                match self.pending.lock().await.remove(&id) {
                    Some(sender) => {
                        let _ = sender.send(result);
                    }
                    None => trace!("Dropping late response {}", id),
                }
            }
            Incoming::Request { id, method, params } => {
                trace!("LSP server request {} <- {}", method, self.name);
                let reply = json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "result": server_request_result(&method, params.as_ref()),
                });
                match self.reply_tx.upgrade() {
                    Some(tx) => {
                        if tx.send(frame(&reply.to_string())).await.is_err() {
                            debug!("Could not answer {}: writer closed", method);
                        }
                    }
                    None => debug!("Could not answer {}: client stopped", method),
                }
            }
            Incoming::Notification { method, params } => {
                let message = params
                    .as_ref()
                    .and_then(|p| p.get("message"))
                    .and_then(Value::as_str);
                match (method.as_str(), message) {
                    ("window/logMessage" | "window/showMessage", Some(message)) => {
                        debug!(target: "exnova::lsp", "{}: {}", self.name, message)
                    }
                    _ => trace!("LSP notification {} <- {}", method, self.name),
                }
            }
            Incoming::Invalid => trace!("Ignoring malformed LSP message"),
        }
    }

    async fn terminated(self, reason: Option<String>) {
        // 대기 중인 모든 요청에 에러 전송
        for (id, sender) in self.pending.lock().await.drain() {
            let _ = sender.send(Err(Error::Lsp(format!(
                "Language server terminated (request {})",
                id
            ))));
        }

        // initialize 도중 종료는 start()가 에러로 돌려준다
        let unexpected = {
            let mut state = self.state.write().await;
            match *state {
                LspClientState::Ready => {
                    *state = LspClientState::Crashed;
                    true
                }
                LspClientState::Initializing => {
                    *state = LspClientState::Crashed;
                    false
                }
                _ => false,
            }
        };

        if unexpected {
            warn!("{} stopped unexpectedly", self.name);
            for callback in self.stop_listeners.snapshot() {
                callback(reason.clone());
            }
        } else {
            debug!("{} output closed", self.name);
        }
    }
}

fn spawn_writer(mut stdin: ChildStdin, mut rx: mpsc::Receiver<String>) {
    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if let Err(e) = stdin.write_all(message.as_bytes()).await {
                error!("Failed to write to LSP stdin: {}", e);
                break;
            }
            if let Err(e) = stdin.flush().await {
                error!("Failed to flush LSP stdin: {}", e);
                break;
            }
        }
        debug!("LSP stdin writer finished");
    });
}

fn spawn_stderr_logger(stderr: ChildStderr, name: String) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!(target: "exnova::lsp", "{} stderr: {}", name, line);
        }
    });
}

// ============================================================================
// StdioLanguageClient
// ============================================================================

/// stdio로 통신하는 Language Server 클라이언트
pub struct StdioLanguageClient {
    id: String,
    name: String,
    server: ServerOptions,
    options: ClientOptions,

    /// 현재 상태 (reader 태스크와 공유)
    state: Arc<RwLock<LspClientState>>,

    /// 요청 ID 카운터
    request_id: AtomicU64,

    /// 서버 프로세스
    process: Mutex<Option<Child>>,

    /// 메시지 전송 채널
    message_tx: Mutex<Option<mpsc::Sender<String>>>,

    /// 대기 중인 응답들
    pending: PendingMap,

    /// 서버 기능 (capabilities)
    server_capabilities: RwLock<Option<Value>>,

    stop_listeners: Listeners<StopCallback>,
    request_timeout: Duration,
}

impl StdioLanguageClient {
    /// 새 클라이언트 생성 (서버는 아직 시작하지 않음)
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        server: ServerOptions,
        options: ClientOptions,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            server,
            options,
            state: Arc::new(RwLock::new(LspClientState::NotInitialized)),
            request_id: AtomicU64::new(0),
            process: Mutex::new(None),
            message_tx: Mutex::new(None),
            pending: Arc::new(Mutex::new(HashMap::new())),
            server_capabilities: RwLock::new(None),
            stop_listeners: Listeners::new(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// 현재 상태
    pub async fn state(&self) -> LspClientState {
        *self.state.read().await
    }

    /// initialize 응답의 capabilities
    pub async fn capabilities(&self) -> Option<Value> {
        self.server_capabilities.read().await.clone()
    }

    // ========================================================================
    // 내부 메서드
    // ========================================================================

    /// 서버 실행 파일이 있는지 확인
    fn is_server_available(&self) -> bool {
        let path = &self.server.path;
        if path.components().count() > 1 {
            path.is_file()
        } else {
            which::which(path).is_ok()
        }
    }

    async fn launch(&self) -> Result<()> {
        if !self.is_server_available() {
            return Err(Error::NotFound(format!(
                "Language server not found: {}",
                self.server.path.display()
            )));
        }

        let mut command = Command::new(&self.server.path);
        command
            .args(&self.server.args)
            .envs(&self.server.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(root) = &self.options.root_path {
            command.current_dir(root);
        }

        let mut child = command.spawn().map_err(|e| {
            Error::Process(format!(
                "Failed to start {}: {}",
                self.server.path.display(),
                e
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Internal("Failed to get language server stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Internal("Failed to get language server stdout".to_string()))?;
        let stderr = child.stderr.take();

        *self.process.lock().await = Some(child);

        // 메시지 전송용 채널 생성
        let (message_tx, message_rx) = mpsc::channel::<String>(32);
        spawn_writer(stdin, message_rx);

        let reader = Reader {
            name: self.name.clone(),
            state: Arc::clone(&self.state),
            pending: Arc::clone(&self.pending),
            stop_listeners: self.stop_listeners.clone(),
            reply_tx: message_tx.downgrade(),
        };
        tokio::spawn(reader.run(stdout));

        if let Some(stderr) = stderr {
            spawn_stderr_logger(stderr, self.name.clone());
        }

        *self.message_tx.lock().await = Some(message_tx);

        let result = self
            .request("initialize", Some(self.initialize_params()))
            .await?;

        // 서버 capabilities 저장
        if let Some(caps) = result.get("capabilities") {
            *self.server_capabilities.write().await = Some(caps.clone());
        }

        self.notify("initialized", Some(json!({}))).await
    }

    fn initialize_params(&self) -> Value {
        let root = self.options.root_path.as_deref();

        json!({
            "processId": std::process::id(),
            "clientInfo": { "name": "exnova", "version": env!("CARGO_PKG_VERSION") },
            "rootUri": root.map(path_to_uri),
            "rootPath": root.map(|p| p.to_string_lossy().to_string()),
            "capabilities": {
                "textDocument": {
                    "references": { "dynamicRegistration": false },
                    "formatting": { "dynamicRegistration": false },
                    "synchronization": { "didSave": true }
                },
                "workspace": { "configuration": true }
            },
            "initializationOptions": self.options.initialization_options
        })
    }

    /// 채널을 닫고 프로세스 정리 (grace 동안 종료를 기다린 뒤 kill)
    async fn teardown(&self, grace: Duration) {
        *self.message_tx.lock().await = None;

        if let Some(mut child) = self.process.lock().await.take() {
            if tokio::time::timeout(grace, child.wait()).await.is_err() {
                let _ = child.kill().await;
            }
        }
    }

    /// 다음 요청 ID
    fn next_request_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::SeqCst)
    }

    /// 요청 전송 및 응답 대기
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let id = self.next_request_id();
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        // 응답 채널 등록
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id, tx);

        if let Err(e) = self.write_message(&serde_json::to_string(&request)?).await {
            self.pending.lock().await.remove(&id);
            return Err(e);
        }
        trace!("LSP request {} -> {}", id, method);

        match tokio::time::timeout(self.request_timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(Error::Lsp(
                "Response channel closed (server may have stopped)".to_string(),
            )),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                Err(Error::Timeout(format!("LSP request {}", method)))
            }
        }
    }

    /// 알림 전송 (응답 없음)
    async fn notify(&self, method: &str, params: Option<Value>) -> Result<()> {
        let notification = JsonRpcNotification {
            jsonrpc: "2.0",
            method,
            params,
        };

        self.write_message(&serde_json::to_string(&notification)?)
            .await?;
        trace!("LSP notification -> {}", method);
        Ok(())
    }

    /// Initializing → Ready (그 사이 서버가 종료됐으면 에러)
    async fn mark_ready(&self) -> Result<()> {
        let writer_open = self
            .message_tx
            .lock()
            .await
            .as_ref()
            .is_some_and(|tx| !tx.is_closed());

        let mut state = self.state.write().await;
        if *state == LspClientState::Initializing && writer_open {
            *state = LspClientState::Ready;
            Ok(())
        } else {
            Err(Error::Lsp(format!(
                "{} exited during initialization (state: {:?})",
                self.name, *state
            )))
        }
    }

    /// LSP 메시지 쓰기 (메시지 채널을 통해)
    async fn write_message(&self, body: &str) -> Result<()> {
        let tx = self
            .message_tx
            .lock()
            .await
            .clone()
            .ok_or_else(|| Error::Lsp("LSP message channel not available".to_string()))?;

        tx.send(frame(body))
            .await
            .map_err(|e| Error::Lsp(format!("Failed to send LSP message: {}", e)))
    }
}

#[async_trait]
impl LanguageClient for StdioLanguageClient {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    /// 서버 시작 및 초기화
    async fn start(&self) -> Result<()> {
        {
            let mut state = self.state.write().await;
            match *state {
                LspClientState::NotInitialized
                | LspClientState::Shutdown
                | LspClientState::Crashed => *state = LspClientState::Initializing,
                _ => return Ok(()),
            }
        }

        // 이전 실행의 잔여 프로세스 정리
        self.teardown(Duration::ZERO).await;

        let launched = match self.launch().await {
            Ok(()) => self.mark_ready().await,
            Err(e) => Err(e),
        };

        match launched {
            Ok(()) => {
                debug!("{} initialized ({})", self.name, self.server.path.display());
                Ok(())
            }
            Err(e) => {
                self.teardown(Duration::ZERO).await;
                *self.state.write().await = LspClientState::NotInitialized;
                Err(e)
            }
        }
    }

    /// 서버 종료 (shutdown 요청 → exit 알림 → 프로세스 정리)
    async fn stop(&self) -> Result<()> {
        {
            let mut state = self.state.write().await;
            if *state != LspClientState::Ready {
                return Ok(());
            }
            *state = LspClientState::ShuttingDown;
        }

        if let Err(e) = self.request("shutdown", None).await {
            warn!("LSP shutdown request failed: {}", e);
        }
        if let Err(e) = self.notify("exit", None).await {
            warn!("LSP exit notification failed: {}", e);
        }

        self.teardown(EXIT_GRACE_PERIOD).await;

        *self.state.write().await = LspClientState::Shutdown;
        debug!("{} shutdown", self.name);
        Ok(())
    }

    async fn send_request(&self, method: &str, params: Value) -> Result<Value> {
        let state = *self.state.read().await;
        if state != LspClientState::Ready {
            return Err(Error::Lsp(format!(
                "{} is not running (state: {:?})",
                self.name, state
            )));
        }

        self.request(method, Some(params)).await
    }

    fn on_did_stop(&self, callback: StopCallback) -> Disposable {
        self.stop_listeners.add(callback)
    }
}

// ============================================================================
// StdioClientFactory
// ============================================================================

/// stdio 클라이언트 생성기 (다른 전송 방식은 지원하지 않음)
#[derive(Debug, Clone, Copy, Default)]
pub struct StdioClientFactory;

impl ClientFactory for StdioClientFactory {
    fn create(
        &self,
        id: &str,
        name: &str,
        server: ServerOptions,
        options: ClientOptions,
    ) -> Result<Arc<dyn LanguageClient>> {
        match server.transport {
            Transport::Stdio => Ok(Arc::new(StdioLanguageClient::new(id, name, server, options))),
            other => Err(Error::Lsp(format!(
                "Unsupported transport {:?} for {}",
                other, name
            ))),
        }
    }
}

// ============================================================================
// 테스트
// ============================================================================
