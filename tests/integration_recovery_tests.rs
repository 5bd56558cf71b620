//! # Recovery Integration Tests / 恢复逻辑集成测试
//!
//! Drives `run_batch` through the library API against fake executables to
//! pin down the recovery rules: a silent subprocess death becomes `Crash`
//! and the run continues, a driver failure becomes `Exception` and
//! propagates, and an interrupt leaves pending cases untouched.
//!
//! 通过库 API 针对假的可执行文件驱动 `run_batch`，以固定恢复规则：
//! 子进程悄然死亡记为 `Crash` 且运行继续；驱动器故障记为 `Exception`
//! 并向上传播；中断不会触碰待执行用例。

#![cfg(unix)]

mod common;

use common::*;
use conformance_runner::core::config::RunnerConfig;
use conformance_runner::core::execution::run_batch;
use conformance_runner::core::models::CaseStatus;
use conformance_runner::core::parser::OutputParser;
use conformance_runner::core::store::ResultStore;
use conformance_runner::infra::fs::CaseLog;
use conformance_runner::reporting::console::Progress;
use indexmap::IndexMap;
use std::path::Path;
use tokio_util::sync::CancellationToken;

fn config_for(ws: &Path, executable: &Path) -> RunnerConfig {
    RunnerConfig {
        language: None,
        executable: executable.to_path_buf(),
        caselist_flag: "--deqp-stdin-caselist".to_string(),
        batch_size: 1000,
        database: ws.join("cts_database.sqlite"),
        log_file: ws.join("cts_log.txt"),
    }
}

fn seeded_store(ws: &Path, names: &[&str]) -> (ResultStore, IndexMap<String, i64>) {
    let mut store = ResultStore::open(&ws.join("cts_database.sqlite")).unwrap();
    store
        .initialize(names.iter().map(|n| n.to_string()))
        .unwrap();
    let queue = store
        .load_pending()
        .unwrap()
        .into_iter()
        .map(|case| (case.name, case.row))
        .collect();
    (store, queue)
}

#[tokio::test]
async fn silent_death_becomes_crash_and_the_run_continues() {
    let ws = setup_workspace();
    // Crashes on the first invocation, behaves on the second.
    let script = r#"marker="$(dirname "$0")/crashed-once"
if [ -f "$marker" ]; then
  while read name; do
    echo "Test case '$name'"
    echo "  Pass (ok)"
  done
else
  touch "$marker"
  read name
  echo "Test case '$name'"
  exit 9
fi"#;
    let exe = write_fake_executable(ws.path(), script);
    let config = config_for(ws.path(), &exe);
    let (store, mut queue) = seeded_store(ws.path(), &["suite.a", "suite.b"]);

    let progress = Progress::new(queue.len());
    let mut parser = OutputParser::new();
    let mut log = CaseLog::open(&config.log_file).unwrap();
    let token = CancellationToken::new();

    let resolved = run_batch(
        &config, &store, &mut queue, &mut parser, &progress, &mut log, &token,
    )
    .await
    .unwrap();
    assert_eq!(resolved, 1);
    assert_eq!(queue.len(), 1);

    let (status, output) = read_case_row(ws.path(), "suite.a");
    assert_eq!(status, CaseStatus::Crash.as_str());
    assert!(output.contains("Crash (9)"));

    // Next batch picks up the survivor.
    let resolved = run_batch(
        &config, &store, &mut queue, &mut parser, &progress, &mut log, &token,
    )
    .await
    .unwrap();
    assert_eq!(resolved, 1);
    assert!(queue.is_empty());

    let (status, _) = read_case_row(ws.path(), "suite.b");
    assert_eq!(status, CaseStatus::Pass.as_str());
}

#[tokio::test]
async fn driver_failure_forces_exception_before_propagating() {
    let ws = setup_workspace();
    let script = r#"read name
echo "Test case '$name'"
echo "  Gibberish (nonsense)"
sleep 5"#;
    let exe = write_fake_executable(ws.path(), script);
    let config = config_for(ws.path(), &exe);
    let (store, mut queue) = seeded_store(ws.path(), &["suite.x"]);

    let progress = Progress::new(queue.len());
    let mut parser = OutputParser::new();
    let mut log = CaseLog::open(&config.log_file).unwrap();
    let token = CancellationToken::new();

    let err = run_batch(
        &config, &store, &mut queue, &mut parser, &progress, &mut log, &token,
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("Gibberish"));

    // The open case reached a terminal status before the error surfaced.
    assert!(queue.is_empty());
    assert!(parser.take_open_case().is_none());

    let (status, output) = read_case_row(ws.path(), "suite.x");
    assert_eq!(status, CaseStatus::Exception.as_str());
    assert!(output.contains("Test case 'suite.x'"));
    assert!(output.contains("Exception ("));

    let log_content = std::fs::read_to_string(&config.log_file).unwrap();
    assert!(log_content.contains("  Exception ("));
}

#[tokio::test]
async fn interrupt_before_any_output_leaves_cases_pending() {
    let ws = setup_workspace();
    let exe = write_fake_executable(ws.path(), "sleep 30");
    let config = config_for(ws.path(), &exe);
    let (store, mut queue) = seeded_store(ws.path(), &["suite.a", "suite.b"]);

    let progress = Progress::new(queue.len());
    let mut parser = OutputParser::new();
    let mut log = CaseLog::open(&config.log_file).unwrap();
    let token = CancellationToken::new();
    token.cancel();

    let err = run_batch(
        &config, &store, &mut queue, &mut parser, &progress, &mut log, &token,
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("interrupted"));

    // No case was open, so nothing was force-completed; every case is
    // still pending and a resumed run will dispatch them again.
    assert_eq!(queue.len(), 2);
    let (status, _) = read_case_row(ws.path(), "suite.a");
    assert_eq!(status, CaseStatus::NotExecuted.as_str());
}
