mod args;

use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::{Context, Result, bail};
use args::{Cli, Command, LaunchArgs, task_id};
use clap::Parser;
use eremetic_api::EremeticClient;
use eremetic_engine::{FieldKey, SessionError};
use eremetic_types::LogStream;
use eremetic_util::{LauncherConfig, log_file_path, redact_masked_env, redact_sensitive};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // No subcommand => TUI, which owns stdout, so logs go to a file.
    let Some(command) = cli.command else {
        init_file_tracing()?;
        let client = build_client(cli.base_url.as_deref())?;
        return eremetic_tui::run(client, cli.task.as_deref().map(task_id)).await;
    };

    init_tracing();
    let client = build_client(cli.base_url.as_deref())?;
    match command {
        Command::Launch(launch) => run_launch(&client, &launch).await,
        Command::Logs { task_id: id, stderr } => {
            let stream = if stderr { LogStream::Stderr } else { LogStream::Stdout };
            let body = client
                .task_log(&task_id(&id), stream)
                .await
                .with_context(|| format!("failed to fetch {stream} of task {id}"))?;
            print!("{body}");
            Ok(())
        }
        Command::Kill { task_id: id } => {
            client
                .kill_task(&task_id(&id))
                .await
                .with_context(|| format!("failed to kill task {id}"))?;
            println!("kill requested for {id}");
            Ok(())
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init();
}

fn init_file_tracing() -> Result<()> {
    let path = log_file_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

fn build_client(base_url: Option<&str>) -> Result<EremeticClient> {
    let config = LauncherConfig::load(base_url).context("failed to load configuration")?;
    debug!(base_url = %config.base_url, "using scheduler");
    EremeticClient::new(&config.base_url, config.url_prefix.as_deref(), config.timeout).context("invalid scheduler configuration")
}

async fn run_launch(client: &EremeticClient, launch: &LaunchArgs) -> Result<()> {
    let mut session = launch.to_session().context("failed to build the launch form")?;
    let (ticket, request) = match session.begin_submit() {
        Ok(submission) => submission,
        Err(SessionError::Invalid { fields }) => {
            for key in &fields {
                let message = key
                    .parse::<FieldKey>()
                    .ok()
                    .and_then(|key| session.validation().error(&key).map(str::to_string))
                    .unwrap_or_else(|| "invalid value".to_string());
                eprintln!("{key}: {message}");
            }
            bail!("{} field(s) need attention", fields.len());
        }
        Err(other) => return Err(other).context("failed to prepare the launch request"),
    };

    let payload = serde_json::to_value(&request).context("failed to serialize the launch request")?;
    if launch.dry_run {
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    debug!(payload = %redact_sensitive(&redact_masked_env(&payload).to_string()), "launching task");
    let outcome = client.launch_task(&request).await.map_err(|error| error.user_message());
    let phase = session.complete_submit(ticket, outcome.clone())?;
    info!(?phase, "launch finished");
    match outcome {
        Ok(task_id) => {
            println!("{task_id}");
            Ok(())
        }
        Err(message) => bail!("launch failed: {message}"),
    }
}
