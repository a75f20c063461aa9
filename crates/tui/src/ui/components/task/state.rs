//! State of the task view: the two log panes and the kill request.

use chrono::{DateTime, Local};
use eremetic_types::{LogStream, TaskId};
use eremetic_util::{TaskOutput, split_lines};
use tracing::debug;

use crate::app::Effect;

/// One log stream as shown on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogPane<T> {
    Loading,
    /// The stream had no content; the pane is not drawn.
    Empty,
    Ready(T),
    Failed(String),
}

impl<T> LogPane<T> {
    pub fn is_visible(&self) -> bool {
        !matches!(self, LogPane::Empty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KillStatus {
    Idle,
    Pending,
    Requested,
    Failed(String),
}

#[derive(Debug)]
pub struct TaskViewState {
    pub task_id: TaskId,
    pub stdout: LogPane<TaskOutput>,
    pub stderr: LogPane<Vec<String>>,
    pub show_preamble: bool,
    pub fetched_at: Option<DateTime<Local>>,
    pub kill: KillStatus,
}

impl TaskViewState {
    pub fn new(task_id: TaskId) -> Self {
        Self {
            task_id,
            stdout: LogPane::Loading,
            stderr: LogPane::Loading,
            show_preamble: false,
            fetched_at: None,
            kill: KillStatus::Idle,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.stdout == LogPane::Loading || self.stderr == LogPane::Loading || self.kill == KillStatus::Pending
    }

    pub fn apply_log(&mut self, stream: LogStream, result: Result<String, String>, fetched_at: DateTime<Local>) {
        debug!(task_id = %self.task_id, stream = stream.as_str(), ok = result.is_ok(), "log fetched");
        self.fetched_at = Some(fetched_at);
        match stream {
            LogStream::Stdout => {
                self.stdout = match result {
                    Ok(body) if body.trim().is_empty() => LogPane::Empty,
                    Ok(body) => LogPane::Ready(TaskOutput::from_stdout(&body)),
                    Err(message) => LogPane::Failed(message),
                }
            }
            LogStream::Stderr => {
                self.stderr = match result {
                    Ok(body) if body.trim().is_empty() => LogPane::Empty,
                    Ok(body) => LogPane::Ready(split_lines(&body)),
                    Err(message) => LogPane::Failed(message),
                }
            }
        }
    }

    pub fn refresh(&mut self) -> Vec<Effect> {
        if self.stdout == LogPane::Loading || self.stderr == LogPane::Loading {
            return Vec::new();
        }
        self.stdout = LogPane::Loading;
        self.stderr = LogPane::Loading;
        vec![Effect::FetchLogs(self.task_id.clone())]
    }

    pub fn request_kill(&mut self) -> Vec<Effect> {
        if matches!(self.kill, KillStatus::Pending | KillStatus::Requested) {
            return Vec::new();
        }
        self.kill = KillStatus::Pending;
        vec![Effect::KillTask(self.task_id.clone())]
    }

    pub fn apply_kill(&mut self, result: Result<(), String>) {
        self.kill = match result {
            Ok(()) => KillStatus::Requested,
            Err(message) => KillStatus::Failed(message),
        };
    }

    pub fn toggle_preamble(&mut self) {
        self.show_preamble = !self.show_preamble;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> TaskViewState {
        TaskViewState::new(TaskId::new("eremetic-task.1"))
    }

    #[test]
    fn empty_streams_hide_their_pane() {
        let mut view = state();
        view.apply_log(LogStream::Stderr, Ok(String::new()), Local::now());
        assert!(!view.stderr.is_visible());
        assert!(view.stdout.is_visible());
        assert!(view.is_loading());
    }

    #[test]
    fn stdout_is_split_at_start_marker() {
        let mut view = state();
        view.apply_log(LogStream::Stdout, Ok("boot\nStarting task x\nout\n".into()), Local::now());
        let LogPane::Ready(output) = &view.stdout else {
            panic!("stdout not ready");
        };
        assert_eq!(output.preamble, vec!["boot", "Starting task x"]);
        assert_eq!(output.output, vec!["out"]);
    }

    #[test]
    fn kill_is_requested_once() {
        let mut view = state();
        assert_eq!(view.request_kill(), vec![Effect::KillTask(TaskId::new("eremetic-task.1"))]);
        assert!(view.request_kill().is_empty());
        view.apply_kill(Err("task not found".into()));
        assert_eq!(view.kill, KillStatus::Failed("task not found".into()));
        assert_eq!(view.request_kill().len(), 1);
    }

    #[test]
    fn refresh_waits_for_pending_fetches() {
        let mut view = state();
        assert!(view.refresh().is_empty());
        view.apply_log(LogStream::Stdout, Err("HTTP 500".into()), Local::now());
        view.apply_log(LogStream::Stderr, Ok("warn\n".into()), Local::now());
        assert_eq!(view.refresh(), vec![Effect::FetchLogs(TaskId::new("eremetic-task.1"))]);
        assert!(view.is_loading());
    }
}
