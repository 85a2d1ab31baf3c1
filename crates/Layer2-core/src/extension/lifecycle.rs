//! Lifecycle - 확장 활성화 / 비활성화
//!
//! ```text
//! Inactive ──activate──▶ Starting ──▶ Running ──deactivate──▶ Stopping ──▶ Inactive
//!                           │                                     ▲
//!                           └────────── 시작 실패 ─────▶ Inactive  │
//!                       Running ── 서버 비정상 종료 ──▶ Inactive (재시작 / 무시)
//! ```
//!
//! 클라이언트 핸들은 `ClientSlot`에만 있고, 쓰기는 이 모듈의 시작 / 종료 경로뿐이다.
//! 비활성화마다 세대(epoch)가 올라가며, 그 전에 시작된 재시작은 이어지지 않는다.

use super::report::report_error;
use super::slot::ClientSlot;
use super::startup::{
    self, client_options, make_executable, server_options, stop_message, ELIXIR_SYNTAX,
    IGNORE_BUTTON, RESTART_BUTTON, SERVER_ID, SERVER_NAME,
};
use crate::commands::{self, CommandContext};
use crate::host::{CompositeDisposable, Disposable, EditorHandler, Host, TextEditor};
use crate::lsp::LanguageClient;
use async_trait::async_trait;
use exnova_foundation::{
    keys, resolve, select_format_on_save, select_mix_path, sequence_seq, ExtensionError,
    ResultExt, Task, UserPreferences,
};
use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

// ============================================================================
// 상태
// ============================================================================

/// 라이프사이클 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Inactive,
    Starting,
    Running,
    Stopping,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inactive => write!(f, "inactive"),
            Self::Starting => write!(f, "starting"),
            Self::Running => write!(f, "running"),
            Self::Stopping => write!(f, "stopping"),
        }
    }
}

/// 호스트가 호출하는 진입점 (동시에 재진입하지 않는다)
///
/// 두 메서드 모두 실패를 밖으로 전파하지 않는다. 실패는 콘솔에 보고된다.
#[async_trait]
pub trait Lifecycle: Send + Sync {
    async fn activate(&self);

    async fn deactivate(&self);

    fn state(&self) -> LifecycleState;
}

// ============================================================================
// Extension
// ============================================================================

/// Elixir 확장
#[derive(Clone)]
pub struct Extension {
    inner: Arc<Inner>,
}

struct Inner {
    host: Host,
    state: RwLock<LifecycleState>,
    client: ClientSlot,
    /// 활성화 시 한 번 해석
    preferences: RwLock<UserPreferences>,
    /// 명령 / 리스너 등록 (비활성화 때 해제)
    disposables: CompositeDisposable,
    /// 현재 클라이언트의 종료 콜백 (핸들을 꺼낼 때 해제)
    client_registrations: CompositeDisposable,
    /// 에디터 URI별 저장 시 포맷 등록
    editor_registrations: Mutex<HashMap<String, Disposable>>,
    /// 비활성화 세대
    epoch: AtomicU64,
}

impl Extension {
    pub fn new(host: Host) -> Self {
        Self {
            inner: Arc::new(Inner {
                host,
                state: RwLock::new(LifecycleState::Inactive),
                client: ClientSlot::new(),
                preferences: RwLock::new(UserPreferences::default()),
                disposables: CompositeDisposable::new(),
                client_registrations: CompositeDisposable::new(),
                editor_registrations: Mutex::new(HashMap::new()),
                epoch: AtomicU64::new(0),
            }),
        }
    }

    pub fn host(&self) -> &Host {
        &self.inner.host
    }

    /// 언어 서버 핸들이 있는지
    pub fn is_server_running(&self) -> bool {
        self.inner.client.is_present()
    }

    /// 활성화 시 해석된 설정
    pub fn preferences(&self) -> UserPreferences {
        self.inner.preferences.read().clone()
    }

    /// 현재 클라이언트를 종료하고 시작 단계를 다시 실행
    pub async fn restart(&self) {
        self.inner.restart().await
    }
}

#[async_trait]
impl Lifecycle for Extension {
    async fn activate(&self) {
        let inner = &self.inner;

        let state = inner.state();
        if state != LifecycleState::Inactive {
            warn!("Ignoring activate while {}", state);
            return;
        }

        inner.host.console.log("Activating...");
        inner.show_notification("Starting extension...");

        let preferences = resolve(
            inner.host.workspace_config.as_ref(),
            inner.host.global_config.as_ref(),
        );
        debug!(?preferences, "Resolved preferences");
        *inner.preferences.write() = preferences;

        inner.register_listeners();
        inner.register_commands();

        inner.run_startup().await;
    }

    async fn deactivate(&self) {
        let inner = &self.inner;

        inner.epoch.fetch_add(1, Ordering::SeqCst);
        inner.host.console.log("Deactivating...");
        inner.set_state(LifecycleState::Stopping);
        inner.disposables.dispose();
        inner.dispose_editor_registrations();

        let outcome = inner.shutdown_task().run().await;
        inner.set_state(LifecycleState::Inactive);

        outcome.fold(
            |err| report_error(inner.host.console.as_ref(), &err),
            |_| inner.host.console.log("Deactivated. Come back soon :)"),
        )
    }

    fn state(&self) -> LifecycleState {
        self.inner.state()
    }
}

// ============================================================================
// 내부 구현
// ============================================================================

impl Inner {
    fn state(&self) -> LifecycleState {
        *self.state.read()
    }

    fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    fn set_state(&self, state: LifecycleState) {
        let previous = std::mem::replace(&mut *self.state.write(), state);
        if previous != state {
            debug!("Lifecycle {} -> {}", previous, state);
        }
    }

    /// 개발 모드에서만 알림
    fn show_notification(&self, body: &str) {
        if self.host.workspace.in_dev_mode() {
            self.host.workspace.notify(SERVER_NAME, body);
        }
    }

    fn command_context(&self) -> CommandContext {
        CommandContext {
            console: Arc::clone(&self.host.console),
            workspace: Arc::clone(&self.host.workspace),
            process: Arc::clone(&self.host.process),
            client: self.client.reader(),
            mix_path: select_mix_path(&self.preferences.read()),
        }
    }

    // ========================================================================
    // 등록
    // ========================================================================

    /// 호출 시점의 CommandContext로 핸들러를 실행하는 EditorHandler
    ///
    /// 확장이 이미 drop 되었으면 아무것도 하지 않는다.
    fn handler<F, Fut>(self: &Arc<Self>, f: F) -> EditorHandler
    where
        F: Fn(CommandContext, Arc<dyn TextEditor>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let weak: Weak<Self> = Arc::downgrade(self);
        let f = Arc::new(f);

        Arc::new(move |editor| {
            let weak = weak.clone();
            let f = Arc::clone(&f);
            async move {
                match weak.upgrade() {
                    Some(inner) => f(inner.command_context(), editor).await,
                    None => debug!("Extension dropped; ignoring handler"),
                }
            }
            .boxed()
        })
    }

    fn register_commands(self: &Arc<Self>) {
        let commands = &self.host.commands;

        self.disposables.add(commands.register(
            keys::COMMAND_FORMAT_DOCUMENT,
            self.handler(|ctx, editor| async move { commands::format_document(&ctx, editor).await }),
        ));
        self.disposables.add(commands.register(
            keys::COMMAND_FORMAT_WITH_SERVER,
            self.handler(|ctx, editor| async move {
                commands::format_with_server(&ctx, editor).await
            }),
        ));
        self.disposables.add(commands.register(
            keys::COMMAND_FIND_REFERENCES,
            self.handler(|ctx, editor| async move { commands::find_references(&ctx, editor).await }),
        ));

        let weak = Arc::downgrade(self);
        self.disposables.add(commands.register(
            keys::COMMAND_RESTART,
            Arc::new(move |_editor| {
                let weak = weak.clone();
                async move {
                    if let Some(inner) = weak.upgrade() {
                        inner.restart().await;
                    }
                }
                .boxed()
            }),
        ));
    }

    /// 에디터가 열리면 저장 시 포맷 등록
    fn register_listeners(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        let listener: EditorHandler = Arc::new(move |editor| {
            let weak = weak.clone();
            async move {
                if let Some(inner) = weak.upgrade() {
                    inner.watch_editor(editor);
                }
            }
            .boxed()
        });

        self.disposables
            .add(self.host.events.on_did_add_text_editor(listener));
    }

    fn watch_editor(self: &Arc<Self>, editor: Arc<dyn TextEditor>) {
        if editor.syntax().as_deref() != Some(ELIXIR_SYNTAX) {
            return;
        }
        if !select_format_on_save(&self.preferences.read()) {
            return;
        }

        debug!("Formatting {} on save", editor.uri());
        let on_save =
            self.handler(|ctx, editor| async move { commands::format_document(&ctx, editor).await });
        let registration = editor.on_will_save(on_save);

        // 같은 에디터가 다시 열리면 이전 등록을 교체
        let previous = self
            .editor_registrations
            .lock()
            .insert(editor.uri(), registration);
        if let Some(previous) = previous {
            previous.dispose();
        }
    }

    fn dispose_editor_registrations(&self) {
        let registrations: Vec<Disposable> = self
            .editor_registrations
            .lock()
            .drain()
            .map(|(_, registration)| registration)
            .collect();
        for registration in registrations {
            registration.dispose();
        }
    }

    // ========================================================================
    // 시작 / 종료
    // ========================================================================

    /// 시작 단계 (실행 권한 → 클라이언트 시작), 첫 실패에서 중단
    fn startup_task(self: &Arc<Self>) -> Task<ExtensionError, Vec<()>> {
        sequence_seq(vec![
            make_executable(
                Arc::clone(&self.host.process),
                startup::server_dir(&self.host.extension_path),
            ),
            self.start_client_task(),
        ])
    }

    async fn run_startup(self: &Arc<Self>) {
        let epoch = self.epoch();
        self.set_state(LifecycleState::Starting);

        let outcome = self.startup_task().run().await;

        if self.epoch() != epoch {
            // 시작 도중 비활성화됨: 새 클라이언트를 남기지 않는다
            debug!("Deactivated during startup; stopping new client");
            if let Err(err) = self.shutdown_task().run().await {
                report_error(self.host.console.as_ref(), &err);
            }
            self.set_state(LifecycleState::Inactive);
            return;
        }

        outcome.fold(
            |err| {
                self.set_state(LifecycleState::Inactive);
                report_error(self.host.console.as_ref(), &err);
            },
            |_| {
                self.set_state(LifecycleState::Running);
                self.host.console.log("Activated");
            },
        )
    }

    /// 2단계: 클라이언트 생성, 종료 콜백 등록, 시작, 핸들 저장
    fn start_client_task(self: &Arc<Self>) -> Task<ExtensionError, ()> {
        let inner = Arc::clone(self);
        Task::try_catch(
            move || {
                let inner = Arc::clone(&inner);
                async move { inner.start_client().await }
            },
            |e| ExtensionError::start(format!("Failed to start language server: {:#}", e)),
        )
    }

    async fn start_client(self: &Arc<Self>) -> anyhow::Result<()> {
        let client = self.host.clients.create(
            SERVER_ID,
            SERVER_NAME,
            server_options(&self.host.extension_path),
            client_options(self.host.workspace.root_path()),
        )?;

        // 실패한 이전 시도의 콜백 정리
        self.client_registrations.dispose();

        let weak = Arc::downgrade(self);
        self.client_registrations
            .add(client.on_did_stop(Arc::new(move |reason| {
                if let Some(inner) = weak.upgrade() {
                    inner.spawn_stop_prompt(reason);
                }
            })));

        if let Err(e) = client.start().await {
            self.client_registrations.dispose();
            return Err(e.into());
        }
        self.client.set(client);
        Ok(())
    }

    /// 핸들을 꺼내고 그 클라이언트의 콜백 등록 해제
    fn take_client(&self) -> Option<Arc<dyn LanguageClient>> {
        self.client_registrations.dispose();
        self.client.take()
    }

    /// 종료 Task (핸들이 없으면 성공)
    fn shutdown_task(self: &Arc<Self>) -> Task<ExtensionError, ()> {
        let inner = Arc::clone(self);
        Task::try_catch(
            move || {
                let client = inner.take_client();
                async move {
                    match client {
                        Some(client) => client.stop().await,
                        None => Ok(()),
                    }
                }
            },
            |e| ExtensionError::shutdown(format!("Uh oh... Failed to deactivate plugin: {:#}", e)),
        )
    }

    async fn restart(self: &Arc<Self>) {
        let epoch = self.epoch();
        self.host.console.log("Restarting language server...");

        if let Err(err) = self.shutdown_task().run().await {
            report_error(self.host.console.as_ref(), &err);
        }
        if self.epoch() != epoch {
            debug!("Deactivated during restart; not starting");
            return;
        }
        self.run_startup().await;
    }

    // ========================================================================
    // 비정상 종료
    // ========================================================================

    fn spawn_stop_prompt(self: Arc<Self>, reason: Option<String>) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { self.handle_unexpected_stop(reason).await });
            }
            Err(_) => warn!("Language server stopped outside of a runtime; not prompting"),
        }
    }

    async fn handle_unexpected_stop(self: Arc<Self>, reason: Option<String>) {
        let epoch = self.epoch();

        // 이 핸들은 더 이상 쓸 수 없다
        if let Some(client) = self.take_client() {
            debug!("Dropped handle for stopped client {}", client.id());
        }
        self.set_state(LifecycleState::Inactive);

        let buttons = [RESTART_BUTTON.to_string(), IGNORE_BUTTON.to_string()];
        let choice = self
            .host
            .workspace
            .show_action_panel(&stop_message(reason.as_deref()), &buttons)
            .await;

        match choice {
            Some(0) if self.epoch() != epoch => {
                debug!("Deactivated while prompting; not restarting")
            }
            Some(0) => {
                self.host.console.log("Restarting language server...");
                self.run_startup().await;
            }
            _ => debug!("Leaving language server stopped"),
        }
    }
}
