//! Application state for the launcher TUI.
//!
//! `App` owns the state of both screens. Components mutate it in response to
//! input and report side effects as [`Effect`]s; asynchronous results come
//! back as [`Msg`]s.

use std::sync::Arc;

use chrono::{DateTime, Local};
use eremetic_api::EremeticClient;
use eremetic_engine::SubmissionTicket;
use eremetic_types::{LogStream, TaskId, TaskLaunchRequest};
use tracing::debug;

use crate::ui::components::launch::LaunchState;
use crate::ui::components::task::TaskViewState;
use crate::ui::theme::{NordTheme, Theme};

/// Top-level screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Launch,
    Task(TaskId),
}

/// Events delivered to the application.
#[derive(Debug, Clone)]
pub enum Msg {
    /// Periodic UI tick (spinner).
    Tick,
    Resize(u16, u16),
    LaunchCompleted {
        ticket: SubmissionTicket,
        outcome: Result<TaskId, String>,
    },
    LogFetched {
        task_id: TaskId,
        stream: LogStream,
        result: Result<String, String>,
        fetched_at: DateTime<Local>,
    },
    KillCompleted {
        task_id: TaskId,
        result: Result<(), String>,
    },
}

/// Side effects requested by state changes.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SwitchTo(Route),
    SubmitLaunch {
        ticket: SubmissionTicket,
        request: Box<TaskLaunchRequest>,
    },
    FetchLogs(TaskId),
    KillTask(TaskId),
    Quit,
}

pub struct App {
    pub route: Route,
    pub launch: LaunchState,
    pub task: Option<TaskViewState>,
    pub client: Arc<EremeticClient>,
    pub theme: Box<dyn Theme>,
    /// Spinner frame while a request is in flight.
    pub throbber_idx: usize,
    pub width: u16,
    pub height: u16,
}

impl App {
    pub fn new(client: Arc<EremeticClient>) -> Self {
        Self {
            route: Route::Launch,
            launch: LaunchState::new(),
            task: None,
            client,
            theme: Box::new(NordTheme::default()),
            throbber_idx: 0,
            width: 0,
            height: 0,
        }
    }

    /// Whether anything on screen is waiting for the network.
    pub fn is_busy(&self) -> bool {
        self.launch.session.is_submitting() || self.task.as_ref().is_some_and(TaskViewState::is_loading)
    }

    /// Enter `route`, tearing down the screen being left.
    ///
    /// Leaving the launch form discards its session, so a launch response
    /// arriving later no longer matches any live ticket.
    pub fn switch_to(&mut self, route: Route) -> Vec<Effect> {
        debug!(from = ?self.route, to = ?route, "switching route");
        let mut effects = Vec::new();
        match &route {
            Route::Launch => {
                self.task = None;
                if self.route != Route::Launch {
                    self.launch = LaunchState::new();
                }
            }
            Route::Task(task_id) => {
                self.launch = LaunchState::new();
                self.task = Some(TaskViewState::new(task_id.clone()));
                effects.push(Effect::FetchLogs(task_id.clone()));
            }
        }
        self.route = route;
        effects
    }

    /// Apply an asynchronous result.
    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        match msg {
            Msg::Tick => {
                if self.is_busy() {
                    self.throbber_idx = (self.throbber_idx + 1) % THROBBER_FRAMES.len();
                }
                Vec::new()
            }
            Msg::Resize(width, height) => {
                self.width = width;
                self.height = height;
                Vec::new()
            }
            Msg::LaunchCompleted { ticket, outcome } => self.launch.apply_launch_result(ticket, outcome),
            Msg::LogFetched {
                task_id,
                stream,
                result,
                fetched_at,
            } => {
                if let Some(task) = self.task.as_mut().filter(|task| task.task_id == task_id) {
                    task.apply_log(stream, result, fetched_at);
                }
                Vec::new()
            }
            Msg::KillCompleted { task_id, result } => {
                if let Some(task) = self.task.as_mut().filter(|task| task.task_id == task_id) {
                    task.apply_kill(result);
                }
                Vec::new()
            }
        }
    }

    pub fn throbber(&self) -> &'static str {
        THROBBER_FRAMES[self.throbber_idx % THROBBER_FRAMES.len()]
    }
}

pub const THROBBER_FRAMES: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];
