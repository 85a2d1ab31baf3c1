//! Find References - `textDocument/references`

use super::CommandContext;
use crate::extension::report_error;
use crate::host::TextEditor;
use crate::lsp::{offset_to_position, requests, LanguageClient, Location, Position};
use exnova_foundation::{ExtensionError, OptionExt, ResultExt, Task};
use futures::FutureExt;
use std::sync::Arc;

/// 참조 요청 Task (선언 위치는 제외)
pub fn safe_find_references(
    client: Arc<dyn LanguageClient>,
    uri: String,
    position: Position,
) -> Task<ExtensionError, Vec<Location>> {
    Task::try_catch(
        move || {
            let client = Arc::clone(&client);
            let uri = uri.clone();
            async move { requests::find_references(client.as_ref(), &uri, position, false).await }
        },
        |e| ExtensionError::invoke_references(format!("Failed to find references: {:#}", e)),
    )
}

/// 선택 영역 시작 위치의 참조 찾기
pub async fn find_references(ctx: &CommandContext, editor: Arc<dyn TextEditor>) {
    ctx.client
        .current()
        .fold(
            || {
                async move { ctx.console.log("Skipping... Language server is not running.") }
                    .boxed()
            },
            |client| run_find_references(ctx, editor, client).boxed(),
        )
        .await
}

async fn run_find_references(
    ctx: &CommandContext,
    editor: Arc<dyn TextEditor>,
    client: Arc<dyn LanguageClient>,
) {
    let offset = editor.selected_range().start;
    let position = offset_to_position(&editor.text(), offset);

    safe_find_references(client, editor.uri(), position)
        .run()
        .await
        .fold(
            |err| report_error(ctx.console.as_ref(), &err),
            |locations| {
                ctx.workspace.show_references(&locations);
                ctx.console.log("View sidebar for results.");
            },
        )
}
