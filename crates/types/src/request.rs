//! Task-launch wire contract.
//!
//! Field names follow the launch endpoint's JSON body. Environment maps are
//! `BTreeMap`s so that serializing the same request always yields the same
//! bytes.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body of `POST /task`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskLaunchRequest {
    pub docker_image: String,
    pub command: String,
    pub cpu: f64,
    pub memory: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(default)]
    pub volumes: Vec<Volume>,
    #[serde(default)]
    pub volumes_from: Vec<String>,
    #[serde(default)]
    pub uris: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Environment whose values the scheduler masks when displaying or logging.
    #[serde(default)]
    pub masked_env: BTreeMap<String, String>,
    #[serde(default)]
    pub agent_constraints: Vec<AgentConstraint>,
    #[serde(default)]
    pub ports: Vec<PortMapping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_pull_image: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
}

/// Host directory bind-mounted into the container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    pub host_path: String,
    pub container_path: String,
}

/// Agent attribute that must match for the task to be placed on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConstraint {
    pub attribute_name: String,
    pub attribute_value: String,
}

/// Container port to expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    pub container_port: u16,
    pub protocol: Protocol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Protocol {
    #[default]
    #[serde(rename = "TCP")]
    Tcp,
    #[serde(rename = "UDP")]
    Udp,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown protocol '{0}', expected TCP or UDP")]
pub struct UnknownProtocol(pub String);

impl Protocol {
    /// Selectable options, default first.
    pub const OPTIONS: &'static [&'static str] = &["TCP", "UDP"];

    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = UnknownProtocol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TCP" => Ok(Protocol::Tcp),
            "UDP" => Ok(Protocol::Udp),
            _ => Err(UnknownProtocol(s.to_string())),
        }
    }
}
