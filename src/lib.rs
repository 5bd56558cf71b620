//! # Conformance Runner Library / Conformance Runner 库
//!
//! This library provides the core functionality for the Conformance Runner
//! tool, a resumable driver that feeds large conformance test suites to an
//! external test executable and records every case outcome durably.
//!
//! 此库为 Conformance Runner 工具提供核心功能，
//! 这是一个可断点续跑的驱动器，它将大型一致性测试套件提交给外部测试可执行
//! 文件，并持久化记录每个用例的结果。
//!
//! ## Modules / 模块
//!
//! - `core` - Result store, run queue, output state machine and batch dispatch
//! - `infra` - Infrastructure services like caselist reading and log appending
//! - `reporting` - Progress lines and the final run summary
//! - `cli` - Command-line interface
//! - `commands` - Top-level command implementations
//!
//! - `core` - 结果存储、运行队列、输出状态机和批次调度
//! - `infra` - 基础设施服务，如读取用例列表和追加日志
//! - `reporting` - 进度行和最终运行摘要
//! - `cli` - 命令行接口
//! - `commands` - 顶层命令实现

pub mod core;
pub mod infra;
pub mod reporting;
pub mod cli;
pub mod commands;

// Re-export commonly used items
pub use crate::core::models;
pub use crate::core::parser;
pub use crate::core::store;

pub use rust_i18n::t;

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
