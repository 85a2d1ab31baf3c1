//! exnova CLI - Main entry point
//!
//! 확장을 터미널에서 구동하는 헤드리스 호스트.

mod cli;
mod config;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// exnova - Elixir editor extension, headless
#[derive(Parser, Debug)]
#[command(name = "exnova")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Extension install directory (contains `elixir-ls/`)
    #[arg(long)]
    extension_path: Option<PathBuf>,

    /// Workspace root (defaults to the current directory)
    #[arg(short, long)]
    workspace: Option<PathBuf>,

    /// Path to `mix` (overrides workspace and global settings for this run)
    #[arg(long)]
    mix: Option<String>,

    /// Show development notifications
    #[arg(long)]
    dev: bool,

    /// Restart the language server without asking if it stops unexpectedly
    #[arg(long)]
    auto_restart: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Format a file with `mix format`
    Format {
        file: PathBuf,
        /// Write the result back instead of printing it
        #[arg(long)]
        write: bool,
    },
    /// Format a file with the language server
    FormatServer {
        file: PathBuf,
        /// Write the result back instead of printing it
        #[arg(long)]
        write: bool,
    },
    /// Find references to the symbol at a position (1-based)
    References {
        file: PathBuf,
        #[arg(long)]
        line: u32,
        #[arg(long)]
        column: u32,
    },
    /// Save a file, formatting it first when format-on-save is enabled
    Save { file: PathBuf },
    /// Show or edit settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show resolved settings
    Show,
    /// Set a setting (value is JSON, bare words are taken as strings)
    Set {
        key: String,
        value: String,
        /// Write to global settings instead of the workspace
        #[arg(long)]
        global: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let workspace = match args.workspace {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let options = cli::RunOptions {
        extension_path: args.extension_path.unwrap_or_else(default_extension_path),
        workspace,
        mix_path: args.mix,
        dev: args.dev,
        auto_restart: args.auto_restart,
    };

    match args.command {
        Command::Format { file, write } => {
            cli::run_editor_command(&options, cli::EditorCommand::Format { write }, &file).await
        }
        Command::FormatServer { file, write } => {
            cli::run_editor_command(&options, cli::EditorCommand::FormatServer { write }, &file)
                .await
        }
        Command::References { file, line, column } => {
            cli::run_editor_command(&options, cli::EditorCommand::References { line, column }, &file)
                .await
        }
        Command::Save { file } => {
            cli::run_editor_command(&options, cli::EditorCommand::Save, &file).await
        }
        Command::Config { action } => match action {
            ConfigAction::Show => config::show(&options.workspace),
            ConfigAction::Set { key, value, global } => {
                config::set(&options.workspace, &key, &value, global)
            }
        },
    }
}

/// 기본 확장 설치 위치 (`<data_dir>/exnova`)
fn default_extension_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("exnova")
}
