use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tag for one category of repeated entries in the launch form.
///
/// The set is closed: every tag has a registered entry shape, so lookups
/// keyed by `CollectionType` never fail. Only string tags coming from the
/// outside (CLI input, parsed form keys) can be unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionType {
    Volumes,
    VolumesFrom,
    Uris,
    AgentConstraints,
    Ports,
    Envs,
    MaskedEnvs,
}

/// Raised when a string does not name any [`CollectionType`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown collection type '{0}'")]
pub struct UnknownCollectionType(pub String);

impl CollectionType {
    /// Every collection type, in form display order.
    pub const ALL: [CollectionType; 7] = [
        CollectionType::Volumes,
        CollectionType::VolumesFrom,
        CollectionType::Uris,
        CollectionType::AgentConstraints,
        CollectionType::Ports,
        CollectionType::Envs,
        CollectionType::MaskedEnvs,
    ];

    /// Canonical tag name (`volumes_from`, `masked_envs`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            CollectionType::Volumes => "volumes",
            CollectionType::VolumesFrom => "volumes_from",
            CollectionType::Uris => "uris",
            CollectionType::AgentConstraints => "agent_constraints",
            CollectionType::Ports => "ports",
            CollectionType::Envs => "envs",
            CollectionType::MaskedEnvs => "masked_envs",
        }
    }

    /// Prefix used for the flat form keys of entries in this collection,
    /// e.g. `volume` in `volume.3.host`.
    pub fn key_prefix(self) -> &'static str {
        match self {
            CollectionType::Volumes => "volume",
            CollectionType::VolumesFrom => "volume_from",
            CollectionType::Uris => "uri",
            CollectionType::AgentConstraints => "constraint",
            CollectionType::Ports => "port",
            CollectionType::Envs => "env",
            CollectionType::MaskedEnvs => "masked_env",
        }
    }

    /// Resolve a key prefix back to its collection type.
    pub fn from_key_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|collection| collection.key_prefix() == prefix)
    }

    /// Human-readable section heading.
    pub fn label(self) -> &'static str {
        match self {
            CollectionType::Volumes => "Volumes",
            CollectionType::VolumesFrom => "Volumes from Container",
            CollectionType::Uris => "URIs",
            CollectionType::AgentConstraints => "Agent Constraints",
            CollectionType::Ports => "Ports",
            CollectionType::Envs => "Environment",
            CollectionType::MaskedEnvs => "Masked Environment",
        }
    }

    /// Whether entry values should be hidden on screen by default.
    pub fn is_masked(self) -> bool {
        matches!(self, CollectionType::MaskedEnvs)
    }
}

impl fmt::Display for CollectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionType {
    type Err = UnknownCollectionType;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|collection| collection.as_str() == tag)
            .ok_or_else(|| UnknownCollectionType(tag.to_string()))
    }
}
