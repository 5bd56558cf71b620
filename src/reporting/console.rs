//! # Console Reporting Module / 控制台报告模块
//!
//! Streaming per-case progress lines and the final fixed-width summary
//! table, with status coloring.
//!
//! 流式输出每个用例的进度行和最终的定宽摘要表格，并为状态着色。

use colored::*;
use std::io::{self, Write};

use crate::core::models::{CaseStatus, RunSummary};
use crate::infra::t;

/// Progress display context for one run: the pending-case total and the
/// column width derived from it, so counters line up across the whole run.
///
/// 一次运行的进度显示上下文：待执行用例总数及由其推导的列宽，
/// 使计数器在整个运行过程中对齐。
pub struct Progress {
    total: usize,
    width: usize,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            width: total.to_string().len(),
        }
    }

    /// Prints `(  n/total) <name>... ` without a newline; the terminal
    /// status is printed by `case_resolved` once the case closes.
    pub fn case_started(&self, executed: usize, name: &str) {
        print!(
            "({:>width$}/{}) {}... ",
            executed,
            self.total,
            name,
            width = self.width
        );
        let _ = io::stdout().flush();
    }

    /// Completes the progress line opened by `case_started`.
    pub fn case_resolved(&self, status: CaseStatus) {
        println!("{}", status.painted());
    }
}

/// Prints the final summary table: one row per status, largest group
/// first, percentages computed against the original total case count.
///
/// # Output Format / 输出格式
/// ```text
/// Test run totals:
///             Pass:  7/10 ( 70.0%)
///             Fail:  2/10 ( 20.0%)
///            Crash:  1/10 ( 10.0%)
/// ```
pub fn print_summary(summary: &RunSummary) {
    println!("\n{}", t!("report.totals_banner").bold());
    let width = summary.total.to_string().len();
    for group in &summary.groups {
        let percent = if summary.total == 0 {
            0.0
        } else {
            group.count as f64 / summary.total as f64 * 100.0
        };
        // Pad before coloring; escape codes would throw the column off.
        let status = format!("{:>14}", group.status.as_str());
        println!(
            "  {}: {:>width$}/{} ({:>5.1}%)",
            status.color(group.status.color()),
            group.count,
            summary.total,
            percent,
            width = width
        );
    }
}
