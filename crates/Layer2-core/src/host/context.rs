//! Host - 확장이 쓰는 호스트 협력자 묶음

use super::commands::CommandRegistry;
use super::console::{Console, TracingConsole};
use super::events::EventHub;
use super::process::{ProcessRunner, TokioProcessRunner};
use super::workspace::{HeadlessWorkspace, Workspace};
use crate::lsp::{ClientFactory, StdioClientFactory};
use exnova_foundation::{ConfigStore, SettingsStore};
use std::path::PathBuf;
use std::sync::Arc;

/// 호스트 협력자
///
/// 모두 `Arc`라서 복제 비용이 싸다.
#[derive(Clone)]
pub struct Host {
    pub console: Arc<dyn Console>,
    pub workspace: Arc<dyn Workspace>,
    pub process: Arc<dyn ProcessRunner>,
    pub clients: Arc<dyn ClientFactory>,
    pub commands: Arc<CommandRegistry>,
    pub events: Arc<EventHub>,
    pub workspace_config: Arc<dyn ConfigStore>,
    pub global_config: Arc<dyn ConfigStore>,
    /// 확장 설치 디렉토리 (`elixir-ls/` 포함)
    pub extension_path: PathBuf,
}

impl Host {
    pub fn builder() -> HostBuilder {
        HostBuilder::default()
    }
}

/// Host 빌더 (지정하지 않은 항목은 헤드리스 기본값)
#[derive(Default)]
pub struct HostBuilder {
    console: Option<Arc<dyn Console>>,
    workspace: Option<Arc<dyn Workspace>>,
    process: Option<Arc<dyn ProcessRunner>>,
    clients: Option<Arc<dyn ClientFactory>>,
    commands: Option<Arc<CommandRegistry>>,
    events: Option<Arc<EventHub>>,
    workspace_config: Option<Arc<dyn ConfigStore>>,
    global_config: Option<Arc<dyn ConfigStore>>,
    extension_path: Option<PathBuf>,
}

impl HostBuilder {
    pub fn console(mut self, console: Arc<dyn Console>) -> Self {
        self.console = Some(console);
        self
    }

    pub fn workspace(mut self, workspace: Arc<dyn Workspace>) -> Self {
        self.workspace = Some(workspace);
        self
    }

    pub fn process(mut self, process: Arc<dyn ProcessRunner>) -> Self {
        self.process = Some(process);
        self
    }

    pub fn clients(mut self, clients: Arc<dyn ClientFactory>) -> Self {
        self.clients = Some(clients);
        self
    }

    pub fn commands(mut self, commands: Arc<CommandRegistry>) -> Self {
        self.commands = Some(commands);
        self
    }

    pub fn events(mut self, events: Arc<EventHub>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn workspace_config(mut self, config: Arc<dyn ConfigStore>) -> Self {
        self.workspace_config = Some(config);
        self
    }

    pub fn global_config(mut self, config: Arc<dyn ConfigStore>) -> Self {
        self.global_config = Some(config);
        self
    }

    pub fn extension_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.extension_path = Some(path.into());
        self
    }

    pub fn build(self) -> Host {
        Host {
            console: self.console.unwrap_or_else(|| Arc::new(TracingConsole)),
            workspace: self
                .workspace
                .unwrap_or_else(|| Arc::new(HeadlessWorkspace::default())),
            process: self
                .process
                .unwrap_or_else(|| Arc::new(TokioProcessRunner::new())),
            clients: self.clients.unwrap_or_else(|| Arc::new(StdioClientFactory)),
            commands: self.commands.unwrap_or_else(CommandRegistry::new),
            events: self.events.unwrap_or_else(EventHub::new),
            workspace_config: self
                .workspace_config
                .unwrap_or_else(|| Arc::new(SettingsStore::in_memory())),
            global_config: self
                .global_config
                .unwrap_or_else(|| Arc::new(SettingsStore::in_memory())),
            extension_path: self.extension_path.unwrap_or_else(|| {
                std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
            }),
        }
    }
}
