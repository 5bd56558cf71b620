//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for Conformance Runner,
//! including caselist reading, the case log and i18n support.
//!
//! 此模块为 Conformance Runner 提供基础设施服务，
//! 包括读取用例列表、用例日志和国际化支持。

pub mod fs;

// Re-export i18n functions for easier access
pub use rust_i18n::t;
