//! 명령 핸들러 통합 테스트 - format / format-with-server / find-references
//!
//! 실행: cargo test -p exnova-core --test commands_test

mod common;

use common::{exited, file_name, FakeClient, Fixture};
use exnova_core::{BufferEditor, Lifecycle, TextEditor, TextRange};
use exnova_foundation::{keys, Error};
use serde_json::json;
use std::sync::Arc;

async fn invoke(fx: &Fixture, command: &str, editor: &Arc<BufferEditor>) {
    fx.host
        .commands
        .invoke(command, editor.clone())
        .await
        .expect("command registered");
}

// ============================================================================
// Format Document (mix format)
// ============================================================================

#[tokio::test]
async fn test_format_without_mix_path_skips() {
    let fx = Fixture::builder().build();
    fx.extension.activate().await;

    let editor = fx.open_editor("app.ex", "x   \n").await;
    invoke(&fx, keys::COMMAND_FORMAT_DOCUMENT, &editor).await;

    assert!(fx.console.has_log("Skipping... No formatter set."));
    assert!(fx.process.formatter_requests().is_empty());
    assert_eq!(editor.text(), "x   \n");
    assert_eq!(editor.version(), 0);
}

#[tokio::test]
async fn test_format_replaces_document() {
    let fx = Fixture::builder()
        .workspace_setting(keys::MIX_PATH, json!("/usr/local/bin/mix"))
        .build();
    fx.extension.activate().await;

    let source = "defmodule App do   \n  def run, do: :ok   \nend\n";
    let editor = fx.open_editor("app.ex", source).await;
    invoke(&fx, keys::COMMAND_FORMAT_DOCUMENT, &editor).await;

    let requests = fx.process.formatter_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].program, "/usr/local/bin/mix");
    assert_eq!(requests[0].args, vec!["format".to_string(), "-".to_string()]);
    assert_eq!(requests[0].stdin.as_deref(), Some(source));
    assert_eq!(requests[0].cwd.as_deref(), Some(fx.project_dir.as_path()));

    assert_eq!(editor.text(), "defmodule App do\n  def run, do: :ok\nend\n");
    assert_eq!(editor.version(), 1);

    let logged = fx
        .console
        .logs()
        .into_iter()
        .find(|line| line.starts_with("Formatted "))
        .expect("formatted log");
    assert!(logged.ends_with("app.ex"), "{}", logged);
    assert_eq!(file_name(&editor.path().expect("path")), "app.ex");
}

#[tokio::test]
async fn test_format_failure_leaves_document_untouched() {
    let fx = Fixture::builder()
        .workspace_setting(keys::MIX_PATH, json!("mix"))
        .process(|request| match request.program.as_str() {
            "/usr/bin/env" => Ok(exited(0, "")),
            _ => Ok(exnova_core::ProcessOutput {
                status: Some(1),
                stdout: String::new(),
                stderr: "** (SyntaxError) invalid syntax\n".to_string(),
            }),
        })
        .build();
    fx.extension.activate().await;

    let editor = fx.open_editor("broken.ex", "defmodule (\n").await;
    invoke(&fx, keys::COMMAND_FORMAT_DOCUMENT, &editor).await;

    assert_eq!(editor.text(), "defmodule (\n");
    assert_eq!(editor.version(), 0);
    assert_eq!(
        fx.console.errors(),
        vec!["Failed to format the document: mix format ** (SyntaxError) invalid syntax".to_string()]
    );
}

#[tokio::test]
async fn test_format_spawn_error_and_panic_are_reported() {
    let fx = Fixture::builder()
        .global_setting(keys::MIX_PATH, json!("/missing/mix"))
        .process(|request| match request.program.as_str() {
            "/usr/bin/env" => Ok(exited(0, "")),
            _ => Err(Error::Process("No such file or directory".to_string())),
        })
        .build();
    fx.extension.activate().await;

    let editor = fx.open_editor("app.ex", "x\n").await;
    invoke(&fx, keys::COMMAND_FORMAT_DOCUMENT, &editor).await;
    assert!(fx.console.has_error_starting_with("Failed to format the document"));
    assert_eq!(editor.text(), "x\n");

    let panicking = Fixture::builder()
        .workspace_setting(keys::MIX_PATH, json!("mix"))
        .process(|request| match request.program.as_str() {
            "/usr/bin/env" => Ok(exited(0, "")),
            _ => panic!("formatter crashed"),
        })
        .build();
    panicking.extension.activate().await;

    let editor = panicking.open_editor("app.ex", "x\n").await;
    invoke(&panicking, keys::COMMAND_FORMAT_DOCUMENT, &editor).await;
    assert!(panicking
        .console
        .has_error_starting_with("Failed to format the document"));
    assert_eq!(editor.text(), "x\n");
}

#[tokio::test]
async fn test_workspace_mix_path_wins() {
    let fx = Fixture::builder()
        .workspace_setting(keys::MIX_PATH, json!("/workspace/mix"))
        .global_setting(keys::MIX_PATH, json!("/global/mix"))
        .build();
    fx.extension.activate().await;

    let editor = fx.open_editor("app.ex", "x\n").await;
    invoke(&fx, keys::COMMAND_FORMAT_DOCUMENT, &editor).await;

    assert_eq!(fx.process.formatter_requests()[0].program, "/workspace/mix");
}

// ============================================================================
// Format With Server
// ============================================================================

#[tokio::test]
async fn test_format_with_server_applies_edits() {
    let client = FakeClient::new();
    client.respond(
        "textDocument/formatting",
        Ok(json!([
            {
                "range": { "start": { "line": 0, "character": 3 }, "end": { "line": 0, "character": 6 } },
                "newText": ""
            },
            {
                "range": { "start": { "line": 1, "character": 0 }, "end": { "line": 1, "character": 0 } },
                "newText": "  "
            }
        ])),
    );
    let fx = Fixture::builder().client(Arc::clone(&client)).build();
    fx.extension.activate().await;

    let editor = fx.open_editor("app.ex", "foo   \nbar\n").await;
    invoke(&fx, keys::COMMAND_FORMAT_WITH_SERVER, &editor).await;

    assert_eq!(editor.text(), "foo\n  bar\n");
    assert_eq!(editor.version(), 1);

    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    let (method, params) = &requests[0];
    assert_eq!(method, "textDocument/formatting");
    assert_eq!(params["textDocument"]["uri"], json!(editor.uri()));
    assert_eq!(params["options"], json!({ "tabSize": 2, "insertSpaces": true }));
}

#[tokio::test]
async fn test_format_with_server_no_edits() {
    let client = FakeClient::new();
    client.respond("textDocument/formatting", Ok(json!([])));
    let fx = Fixture::builder().client(client).build();
    fx.extension.activate().await;

    let editor = fx.open_editor("app.ex", "ok\n").await;
    invoke(&fx, keys::COMMAND_FORMAT_WITH_SERVER, &editor).await;

    assert!(fx.console.has_log("Skipping... Document already formatted."));
    assert_eq!(editor.version(), 0);
}

#[tokio::test]
async fn test_format_with_server_error() {
    let client = FakeClient::new();
    client.respond(
        "textDocument/formatting",
        Err(Error::Lsp("request failed".to_string())),
    );
    let fx = Fixture::builder().client(client).build();
    fx.extension.activate().await;

    let editor = fx.open_editor("app.ex", "ok\n").await;
    invoke(&fx, keys::COMMAND_FORMAT_WITH_SERVER, &editor).await;

    assert!(fx.console.has_error_starting_with("Failed to format the document"));
    assert_eq!(editor.text(), "ok\n");
}

// ============================================================================
// Find References
// ============================================================================

#[tokio::test]
async fn test_find_references_shows_results() {
    let client = FakeClient::new();
    client.respond(
        "textDocument/references",
        Ok(json!([
            {
                "uri": "file:///project/lib/app.ex",
                "range": { "start": { "line": 3, "character": 4 }, "end": { "line": 3, "character": 7 } }
            },
            {
                "uri": "file:///project/test/app_test.exs",
                "range": { "start": { "line": 10, "character": 2 }, "end": { "line": 10, "character": 5 } }
            }
        ])),
    );
    let fx = Fixture::builder().client(Arc::clone(&client)).build();
    fx.extension.activate().await;

    let editor = fx
        .open_editor("app.ex", "defmodule App do\n  def run, do: :ok\nend\n")
        .await;
    // "run" 시작 (둘째 줄 6번째 문자)
    editor.set_selection(TextRange::new(23, 26));
    invoke(&fx, keys::COMMAND_FIND_REFERENCES, &editor).await;

    let (method, params) = client.requests().remove(0);
    assert_eq!(method, "textDocument/references");
    assert_eq!(params["position"], json!({ "line": 1, "character": 6 }));
    assert_eq!(params["context"]["includeDeclaration"], json!(false));
    assert_eq!(params["textDocument"]["uri"], json!(editor.uri()));

    let references = fx.workspace.references.lock().clone();
    assert_eq!(references.len(), 2);
    assert_eq!(references[1].uri, "file:///project/test/app_test.exs");
    assert_eq!(references[1].range.start.line, 10);
    assert!(fx.console.has_log("View sidebar for results."));
}

#[tokio::test]
async fn test_find_references_without_server_skips() {
    let fx = Fixture::builder().without_scripts().build();
    fx.extension.activate().await;

    let editor = fx.open_editor("app.ex", "x\n").await;
    invoke(&fx, keys::COMMAND_FIND_REFERENCES, &editor).await;
    invoke(&fx, keys::COMMAND_FORMAT_WITH_SERVER, &editor).await;

    let skipped = fx
        .console
        .logs()
        .into_iter()
        .filter(|line| line == "Skipping... Language server is not running.")
        .count();
    assert_eq!(skipped, 2);
    assert!(fx.client.requests().is_empty());
    assert!(fx.workspace.references.lock().is_empty());
}

#[tokio::test]
async fn test_find_references_failure() {
    let client = FakeClient::new();
    client.respond("textDocument/references", Ok(json!("not a location")));
    let fx = Fixture::builder().client(client).build();
    fx.extension.activate().await;

    let editor = fx.open_editor("app.ex", "x\n").await;
    invoke(&fx, keys::COMMAND_FIND_REFERENCES, &editor).await;

    assert!(fx.console.has_error_starting_with("Failed to find references"));
    assert!(fx.workspace.references.lock().is_empty());
    assert!(!fx.console.has_log("View sidebar for results."));
}

#[tokio::test]
async fn test_commands_unregistered_after_deactivate() {
    let fx = Fixture::builder().build();
    fx.extension.activate().await;
    fx.extension.deactivate().await;

    let editor = fx.open_editor("app.ex", "x\n").await;
    let err = fx
        .host
        .commands
        .invoke(keys::COMMAND_FORMAT_DOCUMENT, editor)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}
