//! Command execution layer.
//!
//! Translates [`Effect`]s that need the network into [`Cmd`]s and spawns
//! them. Every spawned command resolves to exactly one [`Msg`], which the
//! runtime feeds back into [`App::update`](crate::app::App::update). Route
//! changes and quitting are handled by the runtime and never reach here.

use std::sync::Arc;

use chrono::Local;
use eremetic_api::EremeticClient;
use eremetic_engine::SubmissionTicket;
use eremetic_types::{LogStream, TaskId, TaskLaunchRequest};
use eremetic_util::{redact_masked_env, redact_sensitive};
use tokio::task::{JoinHandle, spawn};
use tracing::{debug, info, warn};

use crate::app::{Effect, Msg};

/// Network work requested by the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    Launch {
        ticket: SubmissionTicket,
        request: Box<TaskLaunchRequest>,
    },
    FetchLog { task_id: TaskId, stream: LogStream },
    Kill(TaskId),
}

/// Convert effects into commands, skipping the ones the runtime owns.
pub fn from_effects(effects: Vec<Effect>) -> Vec<Cmd> {
    let mut commands = Vec::new();
    for effect in effects {
        match effect {
            Effect::SubmitLaunch { ticket, request } => commands.push(Cmd::Launch { ticket, request }),
            Effect::FetchLogs(task_id) => {
                commands.push(Cmd::FetchLog {
                    task_id: task_id.clone(),
                    stream: LogStream::Stdout,
                });
                commands.push(Cmd::FetchLog {
                    task_id,
                    stream: LogStream::Stderr,
                });
            }
            Effect::KillTask(task_id) => commands.push(Cmd::Kill(task_id)),
            Effect::SwitchTo(_) | Effect::Quit => {}
        }
    }
    commands
}

/// Spawn each command on the Tokio runtime.
pub fn spawn_cmds(client: &Arc<EremeticClient>, commands: Vec<Cmd>) -> Vec<JoinHandle<Msg>> {
    commands
        .into_iter()
        .map(|command| {
            let client = Arc::clone(client);
            spawn(async move { execute(&client, command).await })
        })
        .collect()
}

async fn execute(client: &EremeticClient, command: Cmd) -> Msg {
    match command {
        Cmd::Launch { ticket, request } => {
            if let Ok(payload) = serde_json::to_value(request.as_ref()) {
                debug!(payload = %redact_sensitive(&redact_masked_env(&payload).to_string()), "launching task");
            }
            let outcome = client.launch_task(&request).await.map_err(|error| {
                warn!(%error, "task launch failed");
                error.user_message()
            });
            if let Ok(task_id) = &outcome {
                info!(%task_id, "task launched");
            }
            Msg::LaunchCompleted { ticket, outcome }
        }
        Cmd::FetchLog { task_id, stream } => {
            let result = client.task_log(&task_id, stream).await.map_err(|error| {
                warn!(%task_id, stream = stream.as_str(), %error, "log fetch failed");
                error.user_message()
            });
            Msg::LogFetched {
                task_id,
                stream,
                result,
                fetched_at: Local::now(),
            }
        }
        Cmd::Kill(task_id) => {
            let result = client.kill_task(&task_id).await.map_err(|error| {
                warn!(%task_id, %error, "kill request failed");
                error.user_message()
            });
            Msg::KillCompleted { task_id, result }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Route;

    #[test]
    fn fetch_logs_requests_both_streams() {
        let task_id = TaskId::new("eremetic-task.9");
        let commands = from_effects(vec![
            Effect::SwitchTo(Route::Launch),
            Effect::FetchLogs(task_id.clone()),
            Effect::KillTask(task_id.clone()),
        ]);
        assert_eq!(
            commands,
            vec![
                Cmd::FetchLog {
                    task_id: task_id.clone(),
                    stream: LogStream::Stdout
                },
                Cmd::FetchLog {
                    task_id: task_id.clone(),
                    stream: LogStream::Stderr
                },
                Cmd::Kill(task_id),
            ]
        );
    }
}
