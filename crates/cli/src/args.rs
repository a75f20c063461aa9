//! Command-line arguments.

use clap::{Args, Parser, Subcommand};
use eremetic_engine::{FieldKey, FormSession, SessionError};
use eremetic_types::{CollectionType, ScalarField, TaskId};

#[derive(Debug, Parser)]
#[command(name = "eremetic", version, about = "Launch and inspect tasks on an Eremetic scheduler")]
pub struct Cli {
    /// Scheduler base URL; overrides EREMETIC_URL and the config file.
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Open the terminal UI on an existing task instead of the launch form.
    #[arg(long, value_name = "TASK_ID")]
    pub task: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch a task without the terminal UI.
    Launch(LaunchArgs),
    /// Print a task's log.
    Logs {
        task_id: String,
        /// Print stderr instead of stdout.
        #[arg(long)]
        stderr: bool,
    },
    /// Ask the scheduler to kill a task.
    Kill { task_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair(pub String, pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortArg {
    pub port: String,
    pub protocol: &'static str,
}

#[derive(Debug, Args)]
pub struct LaunchArgs {
    /// Docker image to run.
    #[arg(long)]
    pub image: String,
    /// Command to run inside the container.
    #[arg(long)]
    pub command: String,
    /// CPU shares (default 1.0).
    #[arg(long)]
    pub cpu: Option<String>,
    /// Memory in MiB (default 100).
    #[arg(long)]
    pub memory: Option<String>,
    #[arg(long, value_name = "URL")]
    pub callback_url: Option<String>,
    /// Host volume to mount.
    #[arg(long = "volume", value_name = "HOST:CONTAINER", value_parser = parse_volume)]
    pub volumes: Vec<Pair>,
    /// Container whose volumes are mounted.
    #[arg(long = "volume-from", value_name = "CONTAINER_ID")]
    pub volumes_from: Vec<String>,
    /// URI fetched into the sandbox.
    #[arg(long = "uri")]
    pub uris: Vec<String>,
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub env: Vec<Pair>,
    /// Environment variable hidden from the scheduler's UI.
    #[arg(long = "masked-env", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub masked_env: Vec<Pair>,
    /// Agent attribute constraint.
    #[arg(long = "constraint", value_name = "NAME=VALUE", value_parser = parse_key_value)]
    pub constraints: Vec<Pair>,
    /// Container port to expose.
    #[arg(long = "port", value_name = "PORT[/tcp|/udp]", value_parser = parse_port)]
    pub ports: Vec<PortArg>,
    /// Pull the image even when the agent has it cached.
    #[arg(long)]
    pub force_pull: bool,
    /// Docker network mode.
    #[arg(long)]
    pub network: Option<String>,
    /// Print the request body instead of submitting it.
    #[arg(long)]
    pub dry_run: bool,
}

fn parse_key_value(raw: &str) -> Result<Pair, String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok(Pair(key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

fn parse_volume(raw: &str) -> Result<Pair, String> {
    match raw.split_once(':') {
        Some((host, container)) if !host.is_empty() && !container.is_empty() => {
            Ok(Pair(host.to_string(), container.to_string()))
        }
        _ => Err(format!("expected HOST:CONTAINER, got '{raw}'")),
    }
}

fn parse_port(raw: &str) -> Result<PortArg, String> {
    let (port, protocol) = raw.split_once('/').unwrap_or((raw, "tcp"));
    let protocol = match protocol.to_ascii_lowercase().as_str() {
        "tcp" => "TCP",
        "udp" => "UDP",
        other => return Err(format!("unknown protocol '{other}', expected tcp or udp")),
    };
    Ok(PortArg {
        port: port.to_string(),
        protocol,
    })
}

impl LaunchArgs {
    /// Fill a fresh session through the same operations the form uses.
    pub fn to_session(&self) -> Result<FormSession, SessionError> {
        let mut session = FormSession::new();
        session.set_value(&ScalarField::DockerImage.into(), self.image.as_str())?;
        session.set_value(&ScalarField::Command.into(), self.command.as_str())?;
        if let Some(cpu) = &self.cpu {
            session.set_value(&ScalarField::Cpu.into(), cpu.as_str())?;
        }
        if let Some(memory) = &self.memory {
            session.set_value(&ScalarField::Memory.into(), memory.as_str())?;
        }
        if let Some(callback_url) = &self.callback_url {
            session.set_value(&ScalarField::CallbackUrl.into(), callback_url.as_str())?;
        }
        if self.force_pull {
            session.set_value(&ScalarField::ForcePullImage.into(), "yes")?;
        }
        if let Some(network) = &self.network {
            session.set_value(&ScalarField::Network.into(), network.as_str())?;
        }

        for Pair(host, container) in &self.volumes {
            add_entry(&mut session, CollectionType::Volumes, &[("host", host.as_str()), ("container", container.as_str())])?;
        }
        for container_id in &self.volumes_from {
            add_entry(&mut session, CollectionType::VolumesFrom, &[("container_id", container_id.as_str())])?;
        }
        for uri in &self.uris {
            add_entry(&mut session, CollectionType::Uris, &[("uri", uri.as_str())])?;
        }
        for Pair(key, value) in &self.env {
            add_entry(&mut session, CollectionType::Envs, &[("key", key.as_str()), ("value", value.as_str())])?;
        }
        for Pair(key, value) in &self.masked_env {
            add_entry(&mut session, CollectionType::MaskedEnvs, &[("key", key.as_str()), ("value", value.as_str())])?;
        }
        for Pair(name, value) in &self.constraints {
            add_entry(&mut session, CollectionType::AgentConstraints, &[("name", name.as_str()), ("value", value.as_str())])?;
        }
        for PortArg { port, protocol } in &self.ports {
            add_entry(&mut session, CollectionType::Ports, &[("value", port.as_str()), ("protocol", *protocol)])?;
        }
        Ok(session)
    }
}

fn add_entry(session: &mut FormSession, collection: CollectionType, fields: &[(&str, &str)]) -> Result<(), SessionError> {
    let id = session.add_entry(collection)?;
    for (suffix, value) in fields {
        let key = FieldKey::entry(collection, id, suffix).ok_or_else(|| SessionError::UnknownField(format!("{collection}.{suffix}")))?;
        session.set_value(&key, *value)?;
    }
    Ok(())
}

pub fn task_id(raw: &str) -> TaskId {
    TaskId::new(raw.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use eremetic_types::Protocol;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn launch_args(cli: Cli) -> LaunchArgs {
        match cli.command {
            Some(Command::Launch(args)) => args,
            other => panic!("expected launch, got {other:?}"),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_runs_the_tui() {
        let cli = parse(&["eremetic", "--base-url", "http://sched:8000"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.base_url.as_deref(), Some("http://sched:8000"));
    }

    #[test]
    fn launch_flags_reach_the_payload() {
        let cli = parse(&[
            "eremetic",
            "launch",
            "--image",
            "busybox",
            "--command",
            "env",
            "--cpu",
            "0.5",
            "--env",
            "A=1",
            "--env",
            "A=2",
            "--masked-env",
            "TOKEN=s3cr=t",
            "--volume",
            "/data:/mnt",
            "--port",
            "8080/udp",
            "--port",
            "9090",
            "--constraint",
            "rack=a",
        ]);
        let mut session = launch_args(cli).to_session().unwrap();
        let (_, request) = session.begin_submit().unwrap();

        assert_eq!(request.docker_image, "busybox");
        assert_eq!(request.cpu, 0.5);
        assert_eq!(request.memory, 100.0);
        assert_eq!(request.env.get("A").map(String::as_str), Some("2"));
        assert_eq!(request.masked_env.get("TOKEN").map(String::as_str), Some("s3cr=t"));
        assert_eq!(request.volumes[0].container_path, "/mnt");
        assert_eq!(request.ports.len(), 2);
        assert_eq!(request.ports[0].protocol, Protocol::Udp);
        assert_eq!(request.ports[1].protocol, Protocol::Tcp);
        assert_eq!(request.agent_constraints[0].attribute_name, "rack");
    }

    #[test]
    fn invalid_values_are_reported_by_the_session() {
        let cli = parse(&["eremetic", "launch", "--image", "busybox", "--command", "true", "--port", "http"]);
        let mut session = launch_args(cli).to_session().unwrap();
        let error = session.begin_submit().unwrap_err();
        assert!(matches!(error, SessionError::Invalid { fields } if fields.len() == 1 && fields[0].starts_with("port.")));
    }

    #[test]
    fn malformed_pairs_are_rejected_by_clap() {
        assert!(Cli::try_parse_from(["eremetic", "launch", "--image", "x", "--command", "y", "--env", "NOVALUE"]).is_err());
        assert!(Cli::try_parse_from(["eremetic", "launch", "--image", "x", "--command", "y", "--port", "80/sctp"]).is_err());
        assert!(Cli::try_parse_from(["eremetic", "launch", "--command", "y"]).is_err());
    }

    #[test]
    fn log_and_kill_subcommands() {
        match parse(&["eremetic", "logs", "eremetic-task.1", "--stderr"]).command {
            Some(Command::Logs { task_id, stderr }) => {
                assert_eq!(task_id, "eremetic-task.1");
                assert!(stderr);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(parse(&["eremetic", "kill", "abc"]).command, Some(Command::Kill { .. })));
    }
}
