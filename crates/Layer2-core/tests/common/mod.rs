//! 통합 테스트용 가짜 호스트 협력자

#![allow(dead_code)]

use async_trait::async_trait;
use exnova_core::host::Listeners;
use exnova_core::{
    BufferEditor, ClientFactory, ClientOptions, Console, Disposable, Extension, Host,
    LanguageClient, Location, ProcessOutput, ProcessRequest, ProcessRunner, ServerOptions,
    StopCallback, Workspace,
};
use exnova_foundation::{Error, Result, SettingsStore};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

// ============================================================================
// Console
// ============================================================================

#[derive(Default)]
pub struct RecordingConsole {
    logs: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl RecordingConsole {
    pub fn logs(&self) -> Vec<String> {
        self.logs.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }

    pub fn has_log(&self, message: &str) -> bool {
        self.logs.lock().iter().any(|line| line == message)
    }

    pub fn has_error_starting_with(&self, prefix: &str) -> bool {
        self.errors.lock().iter().any(|line| line.starts_with(prefix))
    }
}

impl Console for RecordingConsole {
    fn log(&self, message: &str) {
        self.logs.lock().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().push(message.to_string());
    }
}

// ============================================================================
// Process runner
// ============================================================================

pub type ProcessHandler = Box<dyn Fn(&ProcessRequest) -> Result<ProcessOutput> + Send + Sync>;

pub fn exited(status: i32, stdout: &str) -> ProcessOutput {
    ProcessOutput {
        status: Some(status),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

/// chmod는 성공, mix는 줄 끝 공백을 지우는 포매터처럼 동작
pub fn default_process(request: &ProcessRequest) -> Result<ProcessOutput> {
    match request.program.as_str() {
        "/usr/bin/env" => Ok(exited(0, "")),
        _ => {
            let input = request.stdin.clone().unwrap_or_default();
            let formatted: Vec<&str> = input.lines().map(str::trim_end).collect();
            Ok(exited(0, &format!("{}\n", formatted.join("\n").trim_end())))
        }
    }
}

pub struct FakeProcessRunner {
    handler: ProcessHandler,
    requests: Mutex<Vec<ProcessRequest>>,
}

impl FakeProcessRunner {
    pub fn new(handler: ProcessHandler) -> Self {
        Self {
            handler,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ProcessRequest> {
        self.requests.lock().clone()
    }

    /// chmod를 제외한 실행 기록
    pub fn formatter_requests(&self) -> Vec<ProcessRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.program != "/usr/bin/env")
            .collect()
    }
}

#[async_trait]
impl ProcessRunner for FakeProcessRunner {
    async fn run(&self, request: ProcessRequest) -> Result<ProcessOutput> {
        self.requests.lock().push(request.clone());
        (self.handler)(&request)
    }
}

// ============================================================================
// Language client
// ============================================================================

#[derive(Default)]
pub struct FakeClient {
    fail_start: AtomicBool,
    fail_stop: AtomicBool,
    start_calls: AtomicUsize,
    stop_calls: AtomicUsize,
    responses: Mutex<HashMap<String, Result<Value>>>,
    requests: Mutex<Vec<(String, Value)>>,
    stop_listeners: Listeners<StopCallback>,
}

impl FakeClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_start(&self) {
        self.fail_start.store(true, Ordering::SeqCst);
    }

    pub fn fail_stop(&self) {
        self.fail_stop.store(true, Ordering::SeqCst);
    }

    pub fn respond(&self, method: &str, response: Result<Value>) {
        self.responses.lock().insert(method.to_string(), response);
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().clone()
    }

    pub fn stop_listener_count(&self) -> usize {
        self.stop_listeners.len()
    }

    /// 서버가 예기치 않게 종료된 것처럼 콜백 호출
    pub fn crash(&self, reason: Option<&str>) {
        for callback in self.stop_listeners.snapshot() {
            callback(reason.map(str::to_string));
        }
    }
}

#[async_trait]
impl LanguageClient for FakeClient {
    fn id(&self) -> &str {
        "elixirLS"
    }

    fn name(&self) -> &str {
        "Elixir"
    }

    async fn start(&self) -> Result<()> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(Error::NotFound("language_server.sh".to_string()));
        }
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_stop.load(Ordering::SeqCst) {
            return Err(Error::Lsp("shutdown timed out".to_string()));
        }
        Ok(())
    }

    async fn send_request(&self, method: &str, params: Value) -> Result<Value> {
        self.requests.lock().push((method.to_string(), params));
        match self.responses.lock().get(method) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(e)) => Err(Error::Lsp(e.to_string())),
            None => Ok(Value::Null),
        }
    }

    fn on_did_stop(&self, callback: StopCallback) -> Disposable {
        self.stop_listeners.add(callback)
    }
}

pub struct FakeClientFactory {
    client: Arc<FakeClient>,
    created: Mutex<Vec<(String, String, ServerOptions, ClientOptions)>>,
}

impl FakeClientFactory {
    pub fn new(client: Arc<FakeClient>) -> Self {
        Self {
            client,
            created: Mutex::new(Vec::new()),
        }
    }

    pub fn created(&self) -> Vec<(String, String, ServerOptions, ClientOptions)> {
        self.created.lock().clone()
    }
}

impl ClientFactory for FakeClientFactory {
    fn create(
        &self,
        id: &str,
        name: &str,
        server: ServerOptions,
        options: ClientOptions,
    ) -> Result<Arc<dyn LanguageClient>> {
        self.created
            .lock()
            .push((id.to_string(), name.to_string(), server, options));
        Ok(self.client.clone())
    }
}

// ============================================================================
// Workspace
// ============================================================================

pub struct FakeWorkspace {
    root: PathBuf,
    dev_mode: bool,
    panel_choice: Option<usize>,
    /// 있으면 패널은 `notify_one()` 까지 응답하지 않는다
    pub panel_gate: Option<Arc<Notify>>,
    pub answered_panels: AtomicUsize,
    pub notifications: Mutex<Vec<(String, String)>>,
    pub panels: Mutex<Vec<(String, Vec<String>)>>,
    pub references: Mutex<Vec<Location>>,
}

#[async_trait]
impl Workspace for FakeWorkspace {
    fn root_path(&self) -> Option<PathBuf> {
        Some(self.root.clone())
    }

    fn in_dev_mode(&self) -> bool {
        self.dev_mode
    }

    fn notify(&self, title: &str, body: &str) {
        self.notifications
            .lock()
            .push((title.to_string(), body.to_string()));
    }

    async fn show_action_panel(&self, message: &str, buttons: &[String]) -> Option<usize> {
        self.panels
            .lock()
            .push((message.to_string(), buttons.to_vec()));
        if let Some(gate) = &self.panel_gate {
            gate.notified().await;
        }
        self.answered_panels.fetch_add(1, Ordering::SeqCst);
        self.panel_choice
    }

    fn show_references(&self, locations: &[Location]) {
        self.references.lock().extend_from_slice(locations);
    }
}

// ============================================================================
// Fixture
// ============================================================================

pub struct Fixture {
    pub extension: Extension,
    pub host: Host,
    pub console: Arc<RecordingConsole>,
    pub process: Arc<FakeProcessRunner>,
    pub client: Arc<FakeClient>,
    pub factory: Arc<FakeClientFactory>,
    pub workspace: Arc<FakeWorkspace>,
    pub extension_dir: PathBuf,
    pub project_dir: PathBuf,
    _dir: tempfile::TempDir,
}

pub struct FixtureBuilder {
    workspace_settings: SettingsStore,
    global_settings: SettingsStore,
    dev_mode: bool,
    panel_choice: Option<usize>,
    panel_gate: Option<Arc<Notify>>,
    with_scripts: bool,
    process: ProcessHandler,
    client: Arc<FakeClient>,
}

impl Fixture {
    pub fn builder() -> FixtureBuilder {
        FixtureBuilder {
            workspace_settings: SettingsStore::in_memory(),
            global_settings: SettingsStore::in_memory(),
            dev_mode: false,
            panel_choice: None,
            panel_gate: None,
            with_scripts: true,
            process: Box::new(default_process),
            client: FakeClient::new(),
        }
    }

    /// 프로젝트 디렉토리에 파일을 만들고 에디터로 연다
    pub async fn open_editor(&self, name: &str, text: &str) -> Arc<BufferEditor> {
        let path = self.project_dir.join(name);
        std::fs::write(&path, text).expect("write fixture file");
        Arc::new(BufferEditor::open(&path).await.expect("open editor"))
    }
}

impl FixtureBuilder {
    pub fn workspace_setting(self, key: &str, value: Value) -> Self {
        self.workspace_settings.set(key, value);
        self
    }

    pub fn global_setting(self, key: &str, value: Value) -> Self {
        self.global_settings.set(key, value);
        self
    }

    pub fn dev_mode(mut self) -> Self {
        self.dev_mode = true;
        self
    }

    pub fn panel_choice(mut self, choice: Option<usize>) -> Self {
        self.panel_choice = choice;
        self
    }

    /// 패널 응답을 `gate`로 붙잡아 둔다
    pub fn panel_gate(mut self, gate: Arc<Notify>) -> Self {
        self.panel_gate = Some(gate);
        self
    }

    pub fn without_scripts(mut self) -> Self {
        self.with_scripts = false;
        self
    }

    pub fn process(
        mut self,
        handler: impl Fn(&ProcessRequest) -> Result<ProcessOutput> + Send + Sync + 'static,
    ) -> Self {
        self.process = Box::new(handler);
        self
    }

    pub fn client(mut self, client: Arc<FakeClient>) -> Self {
        self.client = client;
        self
    }

    pub fn build(self) -> Fixture {
        let dir = tempfile::tempdir().expect("tempdir");
        let extension_dir = dir.path().join("extension");
        let project_dir = dir.path().join("project");
        std::fs::create_dir_all(extension_dir.join("elixir-ls")).expect("extension dir");
        std::fs::create_dir_all(&project_dir).expect("project dir");

        if self.with_scripts {
            for script in ["language_server.sh", "debugger.sh"] {
                std::fs::write(extension_dir.join("elixir-ls").join(script), "#!/bin/sh\n")
                    .expect("write script");
            }
        }

        let console = Arc::new(RecordingConsole::default());
        let process = Arc::new(FakeProcessRunner::new(self.process));
        let factory = Arc::new(FakeClientFactory::new(Arc::clone(&self.client)));
        let workspace = Arc::new(FakeWorkspace {
            root: project_dir.clone(),
            dev_mode: self.dev_mode,
            panel_choice: self.panel_choice,
            panel_gate: self.panel_gate,
            answered_panels: AtomicUsize::new(0),
            notifications: Mutex::new(Vec::new()),
            panels: Mutex::new(Vec::new()),
            references: Mutex::new(Vec::new()),
        });

        let host = Host::builder()
            .console(console.clone())
            .process(process.clone())
            .clients(factory.clone())
            .workspace(workspace.clone())
            .workspace_config(Arc::new(self.workspace_settings))
            .global_config(Arc::new(self.global_settings))
            .extension_path(&extension_dir)
            .build();

        Fixture {
            extension: Extension::new(host.clone()),
            host,
            console,
            process,
            client: self.client,
            factory,
            workspace,
            extension_dir,
            project_dir,
            _dir: dir,
        }
    }
}

/// 조건이 참이 될 때까지 기다린다 (최대 2초)
pub async fn eventually(condition: impl Fn() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met within 2s");
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
