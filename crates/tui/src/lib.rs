//! # Eremetic Launcher TUI
//!
//! A terminal front end for an Eremetic scheduler. The launch screen is a
//! form over the launch engine's session; once the scheduler accepts a task
//! the view switches to the task screen, which shows the task's stdout and
//! stderr and can ask the scheduler to kill it.
//!
//! Components mutate [`app::App`] in response to keys and return effects;
//! the runtime spawns the network work and feeds results back as messages.

mod app;
mod cmd;
mod ui;

use std::sync::Arc;

use anyhow::Result;
use eremetic_api::EremeticClient;
use eremetic_types::TaskId;

/// Run the TUI until the user quits.
///
/// With `initial_task` the task screen for that id is opened instead of the
/// launch form.
///
/// # Errors
///
/// Fails when the terminal cannot be put into or restored from raw mode.
pub async fn run(client: EremeticClient, initial_task: Option<TaskId>) -> Result<()> {
    ui::runtime::run_app(Arc::new(client), initial_task).await
}
