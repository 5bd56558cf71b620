// src/commands/run.rs

use anyhow::{bail, Context, Result};
use colored::*;
use indexmap::IndexMap;
use std::{path::PathBuf, time::Duration};
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::{
    core::{config::RunnerConfig, execution, parser::OutputParser, store::ResultStore},
    infra,
    reporting::console::{print_summary, Progress},
    t,
};

/// Executes a whole run: seeds or resumes the result store, rebuilds the
/// run queue, dispatches batches until the queue is empty, and always ends
/// with the summary, whether the loop completed, failed, or was
/// interrupted.
pub async fn execute(caselist: Option<PathBuf>, config_path: PathBuf) -> Result<()> {
    let config = RunnerConfig::load_or_default(&config_path)?;
    if let Some(language) = &config.language {
        rust_i18n::set_locale(language);
    }

    let mut store = ResultStore::open(&config.database)?;

    if store.is_initialized()? {
        // Resumed run: the caselist argument, if any, is ignored. Pause
        // long enough for the operator to notice which database is reused.
        println!(
            "{}",
            t!("run.resuming", path = config.database.display()).yellow()
        );
        tokio::time::sleep(Duration::from_secs(2)).await;
    } else {
        let caselist = caselist.context(t!("run.caselist_required"))?;
        println!("{}", t!("run.initializing", path = caselist.display()));
        let names = infra::fs::read_caselist(&caselist)?;
        let inserted = store.initialize(names)?;
        println!("{}", t!("run.initialized", count = inserted).green());

        // A fresh database gets a fresh log.
        infra::fs::reset_log(&config.log_file)?;
    }

    let mut queue: IndexMap<String, i64> = store
        .load_pending()?
        .into_iter()
        .map(|case| (case.name, case.row))
        .collect();

    if queue.is_empty() {
        println!("{}", t!("run.nothing_pending").green());
    } else {
        println!(
            "{}",
            t!(
                "run.pending_cases",
                count = queue.len(),
                exe = config.executable.display()
            )
            .cyan()
        );
    }

    let stop_token = setup_signal_handler();
    let progress = Progress::new(queue.len());
    let mut parser = OutputParser::new();
    let mut log = infra::fs::CaseLog::open(&config.log_file)?;

    let outcome = dispatch_loop(
        &config,
        &store,
        &mut queue,
        &mut parser,
        &progress,
        &mut log,
        &stop_token,
    )
    .await;

    // The summary runs against whatever the store holds, no matter how the
    // dispatch loop ended.
    match store.summarize() {
        Ok(summary) => print_summary(&summary),
        Err(e) => eprintln!("{} {e:#}", t!("report.summary_failed").red()),
    }

    outcome
}

/// Pulls batches off the run queue until it is empty. A batch that
/// resolves nothing while cases remain pending means the executable is not
/// consuming its caselist; abort rather than re-dispatch the same batch
/// forever.
async fn dispatch_loop(
    config: &RunnerConfig,
    store: &ResultStore,
    queue: &mut IndexMap<String, i64>,
    parser: &mut OutputParser,
    progress: &Progress,
    log: &mut infra::fs::CaseLog,
    stop_token: &CancellationToken,
) -> Result<()> {
    while !queue.is_empty() {
        let resolved =
            execution::run_batch(config, store, queue, parser, progress, log, stop_token).await?;
        if resolved == 0 && !queue.is_empty() {
            bail!(t!("run.no_progress", path = config.executable.display()));
        }
    }
    Ok(())
}

fn setup_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let handler_token = token.clone();

    tokio::spawn(async move {
        signal::ctrl_c().await.expect("Failed to listen for Ctrl-C");
        println!("\n{}", t!("run.shutdown_signal").yellow());
        handler_token.cancel();
    });

    token
}
