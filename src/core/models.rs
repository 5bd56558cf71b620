//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures used throughout the runner:
//! the case status enumeration, the events the output state machine emits,
//! and the shapes the result store hands back.
//!
//! 此模块定义了整个运行器中使用的核心数据结构：
//! 用例状态枚举、输出状态机发出的事件，以及结果存储返回的数据结构。

use anyhow::bail;
use colored::{Color, ColoredString, Colorize};
use std::fmt;
use std::str::FromStr;

/// The recorded outcome of a single test case.
///
/// `NotExecuted` is the only non-terminal status: every case starts there
/// and moves to exactly one terminal status on its first completed
/// execution attempt. Terminal statuses never transition again.
///
/// 单个测试用例记录的结果。
/// `NotExecuted` 是唯一的非终止状态：每个用例从它开始，并在第一次完成的
/// 执行尝试中转移到恰好一个终止状态。终止状态不会再发生变化。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseStatus {
    /// The case has not been executed yet. Initial status for every record.
    /// 用例尚未执行。每条记录的初始状态。
    NotExecuted,
    /// The executable reported the case as passed.
    /// 可执行文件报告用例通过。
    Pass,
    /// The executable reported the case as failed.
    /// 可执行文件报告用例失败。
    Fail,
    /// Passed, but with a quality warning.
    /// 通过，但带有质量警告。
    QualityWarning,
    /// Passed, but with a compatibility warning.
    /// 通过，但带有兼容性警告。
    CompatibilityWarning,
    /// The executable deferred the case.
    /// 可执行文件推迟了该用例。
    Pending,
    /// The case exercises functionality the implementation under test does
    /// not support.
    /// 用例测试了被测实现不支持的功能。
    NotSupported,
    /// The executable ran out of a required resource.
    /// 可执行文件耗尽了所需资源。
    ResourceError,
    /// The executable hit an internal error while running the case.
    /// 可执行文件在运行用例时遇到内部错误。
    InternalError,
    /// Reported by the executable, or assigned by the driver when the
    /// subprocess died with the case still open.
    /// 由可执行文件报告，或当子进程在用例仍未结束时死亡由驱动器指定。
    Crash,
    /// The executable reported the case as timed out.
    /// 可执行文件报告用例超时。
    Timeout,
    /// Assigned by the driver when the driver itself failed while this case
    /// was in flight. Never reported by the executable.
    /// 当驱动器自身在该用例执行期间失败时由驱动器指定。
    /// 可执行文件永远不会报告此状态。
    Exception,
}

impl CaseStatus {
    /// The canonical token for this status, as stored in the database and
    /// printed by the executable.
    pub const fn as_str(self) -> &'static str {
        match self {
            CaseStatus::NotExecuted => "NotExecuted",
            CaseStatus::Pass => "Pass",
            CaseStatus::Fail => "Fail",
            CaseStatus::QualityWarning => "QualityWarning",
            CaseStatus::CompatibilityWarning => "CompatibilityWarning",
            CaseStatus::Pending => "Pending",
            CaseStatus::NotSupported => "NotSupported",
            CaseStatus::ResourceError => "ResourceError",
            CaseStatus::InternalError => "InternalError",
            CaseStatus::Crash => "Crash",
            CaseStatus::Timeout => "Timeout",
            CaseStatus::Exception => "Exception",
        }
    }

    /// Maps a status token printed by the executable to a status.
    ///
    /// This is a closed enumeration of the ten tokens the executable may
    /// report. `NotExecuted` and `Exception` are driver-internal and are
    /// deliberately not accepted here, so a stray line carrying them is
    /// surfaced as an unrecognized token instead of silently classified.
    pub fn from_report_token(token: &str) -> Option<Self> {
        match token {
            "Pass" => Some(CaseStatus::Pass),
            "Fail" => Some(CaseStatus::Fail),
            "QualityWarning" => Some(CaseStatus::QualityWarning),
            "CompatibilityWarning" => Some(CaseStatus::CompatibilityWarning),
            "Pending" => Some(CaseStatus::Pending),
            "NotSupported" => Some(CaseStatus::NotSupported),
            "ResourceError" => Some(CaseStatus::ResourceError),
            "InternalError" => Some(CaseStatus::InternalError),
            "Crash" => Some(CaseStatus::Crash),
            "Timeout" => Some(CaseStatus::Timeout),
            _ => None,
        }
    }

    /// `true` for every status except `NotExecuted`.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, CaseStatus::NotExecuted)
    }

    /// The console color class for this status.
    pub const fn color(self) -> Color {
        match self {
            CaseStatus::Pass => Color::Green,
            CaseStatus::QualityWarning
            | CaseStatus::CompatibilityWarning
            | CaseStatus::Pending => Color::Yellow,
            CaseStatus::NotExecuted | CaseStatus::NotSupported => Color::White,
            CaseStatus::Fail
            | CaseStatus::ResourceError
            | CaseStatus::InternalError
            | CaseStatus::Crash
            | CaseStatus::Timeout
            | CaseStatus::Exception => Color::Red,
        }
    }

    /// The status token, colored for console display.
    pub fn painted(self) -> ColoredString {
        self.as_str().color(self.color())
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseStatus {
    type Err = anyhow::Error;

    /// Parses any status the store may contain, including the
    /// driver-internal ones.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NotExecuted" => Ok(CaseStatus::NotExecuted),
            "Exception" => Ok(CaseStatus::Exception),
            _ => match CaseStatus::from_report_token(s) {
                Some(status) => Ok(status),
                None => bail!("unknown case status '{s}'"),
            },
        }
    }
}

/// A completed case as emitted by the output state machine: the case name,
/// its terminal status, and every output line attributed to it (including
/// the start and status marker lines, newline-terminated).
///
/// 输出状态机发出的已完成用例：用例名称、终止状态，以及归属于它的全部输出
/// 行（包括起始和状态标记行，以换行符结尾）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseEvent {
    pub name: String,
    pub status: CaseStatus,
    pub output: String,
}

/// What the output state machine learned from a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEvent {
    /// A case-start marker was seen; the named case is now in flight.
    CaseStarted { name: String },
    /// A terminal-status marker closed the in-flight case.
    CaseFinished(CaseEvent),
}

/// A store row still awaiting execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCase {
    /// The case name, unique across the store.
    pub name: String,
    /// The store row identifier, assigned in caselist order.
    pub row: i64,
}

/// One summary group: how many records share a status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCount {
    pub status: CaseStatus,
    pub count: u64,
}

/// Aggregated store contents for the final report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Total number of records, i.e. the original caselist length.
    pub total: u64,
    /// Per-status counts, ordered by count descending.
    pub groups: Vec<StatusCount>,
}
