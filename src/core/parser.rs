//! # Output State Machine Module / 输出状态机模块
//!
//! Classifies the executable's output stream line by line. Two states:
//! `Idle` (no case is attributed output) and `InCase` (a case-start marker
//! has been seen and every line accumulates until a terminal-status marker
//! closes the case). Anything that is not one of the two marker formats is
//! opaque diagnostic text, preserved verbatim for post-mortem debugging.
//!
//! 逐行分类可执行文件的输出流。两个状态：`Idle`（没有用例归属输出）和
//! `InCase`（已看到用例起始标记，每一行都被累积，直到终止状态标记关闭该
//! 用例）。不属于这两种标记格式的内容都是不透明的诊断文本，
//! 原样保留以供事后调试。

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::models::{CaseEvent, CaseStatus, ParseEvent};
use crate::infra::t;

/// Case-start marker: `Test case '<name>'`, anywhere in the suite's output.
static CASE_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Test case '(.*?)'").expect("valid regex"));

/// Terminal-status marker: two-space indent, one token, parenthesized
/// detail. The token is matched broadly here; the closed status
/// enumeration is enforced in `feed_line` so an unknown token fails loudly
/// instead of disappearing into the case output.
static STATUS_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^  ([A-Za-z]+) \(.*\)").expect("valid regex"));

enum ParserState {
    Idle,
    InCase { name: String, output: String },
}

/// The line-by-line output state machine.
pub struct OutputParser {
    state: ParserState,
    executed: usize,
}

impl OutputParser {
    pub fn new() -> Self {
        Self {
            state: ParserState::Idle,
            executed: 0,
        }
    }

    /// Number of case-start markers seen so far. Progress display only.
    pub fn executed(&self) -> usize {
        self.executed
    }

    /// The name of the in-flight case, if any.
    pub fn open_case_name(&self) -> Option<&str> {
        match &self.state {
            ParserState::InCase { name, .. } => Some(name),
            ParserState::Idle => None,
        }
    }

    /// Consumes one output line and reports what it meant.
    ///
    /// In `Idle`, only a case-start marker does anything; other lines are
    /// inter-case noise. In `InCase`, every line is appended to the case
    /// output, and a terminal-status marker closes the case and emits it.
    ///
    /// Fails on a status-shaped line whose token is not one of the known
    /// reported statuses; the in-flight case is left open so the caller's
    /// recovery path can claim it.
    pub fn feed_line(&mut self, line: &str) -> Result<Option<ParseEvent>> {
        match std::mem::replace(&mut self.state, ParserState::Idle) {
            ParserState::Idle => {
                if let Some(caps) = CASE_START.captures(line) {
                    let name = caps[1].to_string();
                    self.executed += 1;
                    let mut output = String::with_capacity(line.len() + 1);
                    output.push_str(line);
                    output.push('\n');
                    self.state = ParserState::InCase {
                        name: name.clone(),
                        output,
                    };
                    Ok(Some(ParseEvent::CaseStarted { name }))
                } else {
                    Ok(None)
                }
            }
            ParserState::InCase { name, mut output } => {
                output.push_str(line);
                output.push('\n');

                let token = STATUS_LINE.captures(line).map(|caps| caps[1].to_string());
                match token {
                    Some(token) => match CaseStatus::from_report_token(&token) {
                        Some(status) => Ok(Some(ParseEvent::CaseFinished(CaseEvent {
                            name,
                            status,
                            output,
                        }))),
                        None => {
                            let message =
                                t!("run.unrecognized_status", token = token, line = line)
                                    .to_string();
                            self.state = ParserState::InCase { name, output };
                            bail!(message);
                        }
                    },
                    None => {
                        self.state = ParserState::InCase { name, output };
                        Ok(None)
                    }
                }
            }
        }
    }

    /// Takes the in-flight case, if any, resetting the machine to `Idle`.
    ///
    /// The state machine never emits an event at end-of-stream itself:
    /// ending in `InCase` when the stream closes is exactly the crash
    /// condition, and it is the caller's recovery logic that resolves it
    /// through this accessor.
    pub fn take_open_case(&mut self) -> Option<(String, String)> {
        match std::mem::replace(&mut self.state, ParserState::Idle) {
            ParserState::InCase { name, output } => Some((name, output)),
            ParserState::Idle => None,
        }
    }
}

impl Default for OutputParser {
    fn default() -> Self {
        Self::new()
    }
}
