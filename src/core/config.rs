//! # Runner Configuration Module / 运行器配置模块
//!
//! Optional TOML configuration for the runner. Every field has a default
//! matching the conventional deployment, so the file is only needed to
//! point at a different executable or change paths.
//!
//! 运行器的可选 TOML 配置。每个字段都有与常规部署匹配的默认值，
//! 因此只有在指向不同的可执行文件或更改路径时才需要该文件。

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::infra::t;

/// Runner configuration, loaded from a TOML file when present.
/// 运行器配置，存在时从 TOML 文件加载。
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunnerConfig {
    /// The language for the runner's output messages (e.g., "en", "zh-CN").
    /// When absent, the CLI language detection is left untouched.
    ///
    /// 运行器输出消息的语言（例如 "en", "zh-CN"）。
    /// 缺省时不覆盖命令行的语言检测。
    #[serde(default)]
    pub language: Option<String>,

    /// Path to the external test executable.
    /// 外部测试可执行文件的路径。
    #[serde(default = "default_executable")]
    pub executable: PathBuf,

    /// The option that puts the executable into caselist-over-stdin mode.
    /// 使可执行文件进入"从标准输入读取用例列表"模式的选项。
    #[serde(default = "default_caselist_flag")]
    pub caselist_flag: String,

    /// Maximum number of case names dispatched per subprocess invocation.
    /// 每次子进程调用最多调度的用例名称数量。
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Path of the SQLite result database.
    /// SQLite 结果数据库的路径。
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Path of the append-only case log.
    /// 只追加的用例日志的路径。
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_executable() -> PathBuf {
    PathBuf::from("./deqp-vk")
}

fn default_caselist_flag() -> String {
    "--deqp-stdin-caselist".to_string()
}

fn default_batch_size() -> usize {
    1000
}

fn default_database() -> PathBuf {
    PathBuf::from("cts_database.sqlite")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("cts_log.txt")
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            language: None,
            executable: default_executable(),
            caselist_flag: default_caselist_flag(),
            batch_size: default_batch_size(),
            database: default_database(),
            log_file: default_log_file(),
        }
    }
}

impl RunnerConfig {
    /// Parses the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| t!("config.read_failed", path = path.display()))?;
        let config: RunnerConfig = toml::from_str(&content)
            .with_context(|| t!("config.parse_failed", path = path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the configuration file if it exists, otherwise pure defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!(t!("config.zero_batch"));
        }
        Ok(())
    }
}
