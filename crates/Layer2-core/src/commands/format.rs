//! Format Document - `mix format -`로 문서 포맷

use super::{replace_text, CommandContext};
use crate::extension::report_error;
use crate::host::{ProcessRequest, ProcessRunner, TextEditor};
use exnova_foundation::{ExtensionError, OptionExt, ResultExt, Task};
use futures::FutureExt;
use std::path::PathBuf;
use std::sync::Arc;

/// `mix format -` 실행 Task
///
/// 종료 코드가 0이 아니면 `InvokeFormatter` 에러다.
pub fn safe_format(
    runner: Arc<dyn ProcessRunner>,
    mix_path: String,
    text: String,
    cwd: Option<PathBuf>,
) -> Task<ExtensionError, String> {
    Task::try_catch(
        move || {
            let runner = Arc::clone(&runner);
            let request = ProcessRequest::new(mix_path.as_str())
                .args(["format", "-"])
                .cwd(cwd.clone())
                .stdin(text.as_str());

            async move {
                let output = runner.run(request).await?;
                if output.success() {
                    Ok::<_, anyhow::Error>(output.stdout)
                } else {
                    Err(anyhow::anyhow!("mix format {}", output.failure_message()))
                }
            }
        },
        |e| ExtensionError::invoke_formatter(format!("Failed to format the document: {:#}", e)),
    )
}

/// 문서 포맷 명령
pub async fn format_document(ctx: &CommandContext, editor: Arc<dyn TextEditor>) {
    ctx.mix_path
        .clone()
        .fold(
            || {
                async move { ctx.console.log("Skipping... No formatter set.") }.boxed()
            },
            |mix_path| run_format(ctx, editor, mix_path).boxed(),
        )
        .await
}

async fn run_format(ctx: &CommandContext, editor: Arc<dyn TextEditor>, mix_path: String) {
    let range = editor.full_range();
    let text = editor.text_in_range(range);

    safe_format(
        Arc::clone(&ctx.process),
        mix_path,
        text,
        ctx.workspace.root_path(),
    )
    .run()
    .await
    .fold(
        |err| async move { report_error(ctx.console.as_ref(), &err) }.boxed(),
        |formatted| replace_text(ctx, editor, range, formatted).boxed(),
    )
    .await
}
