//! # Batch Execution Module / 批次执行模块
//!
//! Dispatches one batch of pending cases to the external executable and
//! drives its output through the state machine. Also owns the two recovery
//! rules: a case left open at end-of-stream becomes `Crash`, and a case
//! left open by a driver failure becomes `Exception` before the failure
//! propagates.
//!
//! 将一批待执行用例调度给外部可执行文件，并通过状态机驱动其输出。
//! 同时承担两条恢复规则：输出流结束时仍未关闭的用例记为 `Crash`；
//! 因驱动器故障而未关闭的用例在错误传播前记为 `Exception`。

use anyhow::{bail, Context, Result};
use colored::*;
use indexmap::IndexMap;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_stream::wrappers::LinesStream;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::core::config::RunnerConfig;
use crate::core::models::{CaseStatus, ParseEvent};
use crate::core::parser::OutputParser;
use crate::core::store::ResultStore;
use crate::infra::fs::CaseLog;
use crate::infra::t;
use crate::reporting::console::Progress;

/// Runs one batch: selects up to `batch_size` pending names from the run
/// queue, launches the executable in caselist-over-stdin mode, and resolves
/// cases as the output stream reports them.
///
/// Returns the number of cases that reached a terminal status during this
/// batch, including a force-completed crash victim.
///
/// A launch failure is fatal for the whole run: the executable is required
/// infrastructure, so it is propagated, not retried.
pub async fn run_batch(
    config: &RunnerConfig,
    store: &ResultStore,
    queue: &mut IndexMap<String, i64>,
    parser: &mut OutputParser,
    progress: &Progress,
    log: &mut CaseLog,
    stop_token: &CancellationToken,
) -> Result<usize> {
    let batch: Vec<String> = queue.keys().take(config.batch_size).cloned().collect();

    let mut cmd = tokio::process::Command::new(&config.executable);
    cmd.arg(&config.caselist_flag)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| t!("run.launch_failed", path = config.executable.display()))?;

    // Feed the batch from its own task: a full batch of names can exceed
    // the pipe buffer, and the executable may not drain stdin before it
    // starts writing output.
    let mut stdin = child.stdin.take().context("child stdin was not captured")?;
    let payload = {
        let mut names = batch.join("\n");
        names.push('\n');
        names
    };
    let writer = tokio::spawn(async move {
        let _ = stdin.write_all(payload.as_bytes()).await;
        let _ = stdin.shutdown().await;
    });

    let stdout = child.stdout.take().context("child stdout was not captured")?;
    let stderr = child.stderr.take().context("child stderr was not captured")?;
    let mut lines = LinesStream::new(BufReader::new(stdout).lines())
        .merge(LinesStream::new(BufReader::new(stderr).lines()));

    let drive = async {
        let mut resolved = 0usize;
        loop {
            let line = tokio::select! {
                biased;
                _ = stop_token.cancelled() => {
                    bail!(t!("run.interrupted"));
                }
                line = lines.next() => line,
            };
            let Some(line) = line else { break };
            let line = line.context("failed to read a line from the test executable")?;

            log.append_line(&line)?;

            match parser.feed_line(&line)? {
                Some(ParseEvent::CaseStarted { name }) => {
                    progress.case_started(parser.executed(), &name);
                }
                Some(ParseEvent::CaseFinished(event)) => {
                    let Some(&row) = queue.get(&event.name) else {
                        bail!(t!("run.unknown_case", name = event.name));
                    };
                    store.update(row, event.status, &event.output)?;
                    queue.shift_remove(&event.name);
                    progress.case_resolved(event.status);
                    resolved += 1;
                }
                None => {}
            }
        }
        Ok::<usize, anyhow::Error>(resolved)
    };
    let outcome = drive.await;

    match outcome {
        Ok(mut resolved) => {
            let _ = writer.await;

            // End of output; now the exit code is available.
            let status = child
                .wait()
                .await
                .context("failed to wait for the test executable")?;

            // A case left open at end-of-stream is the crash condition.
            if let Some((name, output)) = parser.take_open_case() {
                let exit = match status.code() {
                    Some(code) => code.to_string(),
                    None => status.to_string(),
                };
                force_complete(
                    store,
                    queue,
                    log,
                    progress,
                    &name,
                    CaseStatus::Crash,
                    output,
                    &exit,
                )?;
                resolved += 1;
            }
            Ok(resolved)
        }
        Err(err) => {
            // The writer may still be blocked against a child that stopped
            // reading; it must not keep the error path waiting.
            writer.abort();

            // The driver itself failed; the open case must still reach a
            // terminal status before the error propagates, or it would be
            // re-dispatched on resume for a failure that was never its own.
            if let Some((name, output)) = parser.take_open_case() {
                let detail = format!("{err:#}");
                if let Err(recovery_err) = force_complete(
                    store,
                    queue,
                    log,
                    progress,
                    &name,
                    CaseStatus::Exception,
                    output,
                    &detail,
                ) {
                    eprintln!("{} {recovery_err:#}", t!("run.recovery_failed").red());
                }
            }
            Err(err)
        }
    }
}

/// Resolves a case the subprocess never closed. Appends a synthetic status
/// line to both the log and the stored output so the two stay consistent
/// even though the executable never printed one.
#[allow(clippy::too_many_arguments)]
fn force_complete(
    store: &ResultStore,
    queue: &mut IndexMap<String, i64>,
    log: &mut CaseLog,
    progress: &Progress,
    name: &str,
    status: CaseStatus,
    mut output: String,
    detail: &str,
) -> Result<()> {
    let synthetic = format!("  {} ({})", status.as_str(), detail);
    log.append_line(&synthetic)?;
    output.push_str(&synthetic);
    output.push('\n');

    let Some(&row) = queue.get(name) else {
        bail!(t!("run.unknown_case", name = name));
    };
    store.update(row, status, &output)?;
    queue.shift_remove(name);
    progress.case_resolved(status);
    Ok(())
}
