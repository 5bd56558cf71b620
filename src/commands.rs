//! # Commands Module / 命令模块
//!
//! Top-level command implementations invoked from the CLI.
//!
//! 从命令行调用的顶层命令实现。

pub mod run;
