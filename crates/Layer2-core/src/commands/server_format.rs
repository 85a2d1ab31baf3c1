//! Format With Server - `textDocument/formatting`으로 문서 포맷
//!
//! 서버가 돌려준 편집을 복사본에 모두 적용한 뒤 문서를 한 번만 교체한다.

use super::{replace_text, CommandContext};
use crate::extension::report_error;
use crate::host::TextEditor;
use crate::lsp::{apply_text_edits, requests, FormattingOptions, LanguageClient};
use exnova_foundation::{ExtensionError, OptionExt, ResultExt, Task};
use futures::FutureExt;
use std::sync::Arc;

/// 서버 포맷 Task (포맷된 전체 텍스트를 돌려준다)
pub fn safe_format_with_server(
    client: Arc<dyn LanguageClient>,
    uri: String,
    text: String,
) -> Task<ExtensionError, String> {
    Task::try_catch(
        move || {
            let client = Arc::clone(&client);
            let uri = uri.clone();
            let text = text.clone();

            async move {
                let edits =
                    requests::format_document(client.as_ref(), &uri, FormattingOptions::default())
                        .await?;
                Ok::<_, anyhow::Error>(apply_text_edits(&text, &edits)?)
            }
        },
        |e| ExtensionError::invoke_formatter(format!("Failed to format the document: {:#}", e)),
    )
}

/// 언어 서버로 문서 포맷
pub async fn format_with_server(ctx: &CommandContext, editor: Arc<dyn TextEditor>) {
    ctx.client
        .current()
        .fold(
            || {
                async move { ctx.console.log("Skipping... Language server is not running.") }
                    .boxed()
            },
            |client| run_format_with_server(ctx, editor, client).boxed(),
        )
        .await
}

async fn run_format_with_server(
    ctx: &CommandContext,
    editor: Arc<dyn TextEditor>,
    client: Arc<dyn LanguageClient>,
) {
    let range = editor.full_range();
    let text = editor.text_in_range(range);

    safe_format_with_server(client, editor.uri(), text.clone())
        .run()
        .await
        .fold(
            |err| async move { report_error(ctx.console.as_ref(), &err) }.boxed(),
            |formatted| {
                if formatted == text {
                    async move { ctx.console.log("Skipping... Document already formatted.") }
                        .boxed()
                } else {
                    replace_text(ctx, editor, range, formatted).boxed()
                }
            },
        )
        .await
}
