//! Task log formatting.
//!
//! The executor prints its own preamble to a task's stdout before handing
//! over to the container; the first line starting with [`START_MARKER`]
//! marks the hand-off. That line and everything before it are kept but
//! hidden by default.

use chrono::{DateTime, Local};

pub const START_MARKER: &str = "Starting task";

/// Stdout split into executor preamble and task output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskOutput {
    pub preamble: Vec<String>,
    pub output: Vec<String>,
}

impl TaskOutput {
    /// Split raw stdout. Without a start marker nothing counts as preamble.
    pub fn from_stdout(text: &str) -> Self {
        let lines: Vec<String> = split_lines(text);
        match lines.iter().position(|line| line.starts_with(START_MARKER)) {
            Some(start) => {
                let mut preamble = lines;
                let output = preamble.split_off(start + 1);
                Self { preamble, output }
            }
            None => Self {
                preamble: Vec::new(),
                output: lines,
            },
        }
    }

    pub fn hidden_hint(&self) -> Option<String> {
        match self.preamble.len() {
            0 => None,
            1 => Some("1 line hidden".to_string()),
            count => Some(format!("{count} lines hidden")),
        }
    }

    /// Lines to draw, with or without the preamble.
    pub fn visible_lines(&self, show_preamble: bool) -> impl Iterator<Item = &str> {
        let preamble: &[String] = if show_preamble { &self.preamble } else { &[] };
        preamble.iter().chain(self.output.iter()).map(String::as_str)
    }
}

/// Lines of a log body with a single trailing newline dropped.
pub fn split_lines(text: &str) -> Vec<String> {
    let text = text.strip_suffix('\n').unwrap_or(text);
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n').map(|line| line.trim_end_matches('\r').to_string()).collect()
}

/// Short local time label for "fetched at" hints.
pub fn format_fetched_at(at: DateTime<Local>) -> String {
    at.format("%H:%M:%S").to_string()
}
