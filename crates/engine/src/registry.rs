//! Field definition registry.
//!
//! Maps every [`CollectionType`] to the shape of one of its entries and every
//! [`ScalarField`] to its field definition. Lookups by enum are total; the
//! string-tag lookup is the only path that can fail, and it logs before
//! returning the error so an unknown tag never goes unnoticed.

use eremetic_types::{CollectionType, EntrySpec, FieldKind, FieldSpec, Protocol, ScalarField};
use tracing::warn;

use crate::error::RegistryError;

const fn text(suffix: &'static str, label: &'static str, placeholder: &'static str) -> FieldSpec {
    FieldSpec {
        suffix,
        label,
        placeholder,
        kind: FieldKind::Text,
        required: true,
        default: None,
    }
}

const VOLUME_FIELDS: &[FieldSpec] = &[
    text("host", "Host", "host volume"),
    text("container", "Container", "container volume"),
];

const VOLUME_FROM_FIELDS: &[FieldSpec] = &[text("container_id", "Container ID", "container ID")];

const URI_FIELDS: &[FieldSpec] = &[text("uri", "URI", "https://example.com/artifact.tgz")];

const CONSTRAINT_FIELDS: &[FieldSpec] = &[
    text("name", "Attribute Name", "attribute name"),
    text("value", "Attribute Value", "attribute value"),
];

const PORT_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        suffix: "value",
        label: "Port",
        placeholder: "8080",
        kind: FieldKind::Integer { min: 1, max: 65535 },
        required: true,
        default: None,
    },
    FieldSpec {
        suffix: "protocol",
        label: "Protocol",
        placeholder: "",
        kind: FieldKind::Choice(Protocol::OPTIONS),
        required: true,
        default: None,
    },
];

const ENV_FIELDS: &[FieldSpec] = &[text("key", "Key", "key"), text("value", "Value", "value")];

static VOLUMES: EntrySpec = EntrySpec {
    collection: CollectionType::Volumes,
    fields: VOLUME_FIELDS,
};
static VOLUMES_FROM: EntrySpec = EntrySpec {
    collection: CollectionType::VolumesFrom,
    fields: VOLUME_FROM_FIELDS,
};
static URIS: EntrySpec = EntrySpec {
    collection: CollectionType::Uris,
    fields: URI_FIELDS,
};
static AGENT_CONSTRAINTS: EntrySpec = EntrySpec {
    collection: CollectionType::AgentConstraints,
    fields: CONSTRAINT_FIELDS,
};
static PORTS: EntrySpec = EntrySpec {
    collection: CollectionType::Ports,
    fields: PORT_FIELDS,
};
static ENVS: EntrySpec = EntrySpec {
    collection: CollectionType::Envs,
    fields: ENV_FIELDS,
};
static MASKED_ENVS: EntrySpec = EntrySpec {
    collection: CollectionType::MaskedEnvs,
    fields: ENV_FIELDS,
};

static DOCKER_IMAGE: FieldSpec = text("docker_image", "Docker Image", "alpine:3.10");
static COMMAND: FieldSpec = text("command", "Command", "echo $(date)");
static CPU: FieldSpec = FieldSpec {
    suffix: "cpu",
    label: "CPU",
    placeholder: "1.0",
    kind: FieldKind::Number,
    required: true,
    default: Some("1.0"),
};
static MEMORY: FieldSpec = FieldSpec {
    suffix: "memory",
    label: "Memory (MiB)",
    placeholder: "100",
    kind: FieldKind::Number,
    required: true,
    default: Some("100"),
};
static CALLBACK_URL: FieldSpec = FieldSpec {
    required: false,
    ..text("callback_url", "Callback URL (optional)", "http://localhost/callback")
};
static NETWORK: FieldSpec = FieldSpec {
    required: false,
    ..text("network", "Network (optional)", "bridge")
};
static FORCE_PULL_IMAGE: FieldSpec = FieldSpec {
    suffix: "force_pull_image",
    label: "Force Pull Image",
    placeholder: "",
    kind: FieldKind::Choice(&["no", "yes"]),
    required: false,
    default: None,
};

/// Entry shape for a collection type.
pub fn definition_for(collection: CollectionType) -> &'static EntrySpec {
    match collection {
        CollectionType::Volumes => &VOLUMES,
        CollectionType::VolumesFrom => &VOLUMES_FROM,
        CollectionType::Uris => &URIS,
        CollectionType::AgentConstraints => &AGENT_CONSTRAINTS,
        CollectionType::Ports => &PORTS,
        CollectionType::Envs => &ENVS,
        CollectionType::MaskedEnvs => &MASKED_ENVS,
    }
}

/// Entry shape for a collection tag given as text (`"volumes_from"`).
pub fn lookup(tag: &str) -> Result<&'static EntrySpec, RegistryError> {
    match tag.parse::<CollectionType>() {
        Ok(collection) => Ok(definition_for(collection)),
        Err(_) => {
            warn!(tag, "no entry definition registered for collection tag");
            Err(RegistryError::UnsupportedCollectionType { tag: tag.to_string() })
        }
    }
}

/// Field definition for a scalar form field.
pub fn scalar_definition(field: ScalarField) -> &'static FieldSpec {
    match field {
        ScalarField::DockerImage => &DOCKER_IMAGE,
        ScalarField::Command => &COMMAND,
        ScalarField::Cpu => &CPU,
        ScalarField::Memory => &MEMORY,
        ScalarField::CallbackUrl => &CALLBACK_URL,
        ScalarField::Network => &NETWORK,
        ScalarField::ForcePullImage => &FORCE_PULL_IMAGE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_collection_has_a_matching_definition() {
        for collection in CollectionType::ALL {
            let spec = definition_for(collection);
            assert_eq!(spec.collection, collection);
            assert!(!spec.fields.is_empty());
        }
    }

    #[test]
    fn lookup_by_tag_fails_loudly_for_unknown_tags() {
        assert_eq!(lookup("ports").map(|spec| spec.collection), Ok(CollectionType::Ports));
        assert_eq!(
            lookup("slave_constraints"),
            Err(RegistryError::UnsupportedCollectionType {
                tag: "slave_constraints".into()
            })
        );
    }

    #[test]
    fn port_protocol_defaults_to_tcp() {
        let protocol = definition_for(CollectionType::Ports).field("protocol").unwrap();
        assert_eq!(protocol.initial_value(), "TCP");
    }

    #[test]
    fn scalar_suffixes_match_their_keys() {
        for field in ScalarField::ALL {
            assert_eq!(scalar_definition(field).suffix, field.key());
        }
    }
}
