//! # Reporting Module / 报告模块
//!
//! Console progress lines and the final run summary.
//!
//! 控制台进度行和最终运行摘要。

pub mod console;

// Re-exports
pub use console::{print_summary, Progress};
