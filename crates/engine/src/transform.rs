//! Payload transformer.
//!
//! Converts the flat form values into a [`TaskLaunchRequest`]. The collection
//! store is consulted only to enumerate live entry ids; every value is read
//! from [`FormValues`]. An entry id without one of its values is reported as
//! [`TransformError::MissingField`].

use std::collections::BTreeMap;

use eremetic_types::{AgentConstraint, CollectionType, EntryId, PortMapping, Protocol, ScalarField, TaskLaunchRequest, Volume};

use crate::collection::CollectionStore;
use crate::error::TransformError;
use crate::keys::FieldKey;
use crate::values::FormValues;

struct Reader<'a> {
    values: &'a FormValues,
    collections: &'a CollectionStore,
}

impl<'a> Reader<'a> {
    fn scalar(&self, field: ScalarField) -> &'a str {
        self.values.get(&FieldKey::Scalar(field)).unwrap_or_default()
    }

    fn optional_scalar(&self, field: ScalarField) -> Option<String> {
        let value = self.scalar(field).trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    fn decimal(&self, field: ScalarField) -> Result<f64, TransformError> {
        let raw = self.scalar(field);
        match raw.trim().parse::<f64>() {
            Ok(number) if number.is_finite() => Ok(number),
            _ => Err(TransformError::MalformedNumeric {
                key: field.key().to_string(),
                value: raw.to_string(),
            }),
        }
    }

    fn entry_value(&self, collection: CollectionType, id: EntryId, suffix: &'static str) -> Result<&'a str, TransformError> {
        let key = FieldKey::Entry { collection, id, suffix };
        self.values
            .get(&key)
            .ok_or_else(|| TransformError::MissingField { key: key.to_string() })
    }

    fn entries<T>(
        &self,
        collection: CollectionType,
        build: impl Fn(&Self, EntryId) -> Result<T, TransformError>,
    ) -> Result<Vec<T>, TransformError> {
        self.collections.ids(collection).map(|id| build(self, id)).collect()
    }

    fn env_map(&self, collection: CollectionType) -> Result<BTreeMap<String, String>, TransformError> {
        let pairs = self.entries(collection, |reader, id| {
            Ok((
                reader.entry_value(collection, id, "key")?.to_string(),
                reader.entry_value(collection, id, "value")?.to_string(),
            ))
        })?;
        // Later entries win on duplicate keys.
        Ok(pairs.into_iter().collect())
    }
}

/// Build the launch request from the session's form values.
pub fn to_request(values: &FormValues, collections: &CollectionStore) -> Result<TaskLaunchRequest, TransformError> {
    let reader = Reader { values, collections };

    let volumes = reader.entries(CollectionType::Volumes, |reader, id| {
        Ok(Volume {
            host_path: reader.entry_value(CollectionType::Volumes, id, "host")?.to_string(),
            container_path: reader.entry_value(CollectionType::Volumes, id, "container")?.to_string(),
        })
    })?;
    let volumes_from = reader.entries(CollectionType::VolumesFrom, |reader, id| {
        Ok(reader.entry_value(CollectionType::VolumesFrom, id, "container_id")?.to_string())
    })?;
    let uris = reader.entries(CollectionType::Uris, |reader, id| {
        Ok(reader.entry_value(CollectionType::Uris, id, "uri")?.to_string())
    })?;
    let agent_constraints = reader.entries(CollectionType::AgentConstraints, |reader, id| {
        Ok(AgentConstraint {
            attribute_name: reader.entry_value(CollectionType::AgentConstraints, id, "name")?.to_string(),
            attribute_value: reader.entry_value(CollectionType::AgentConstraints, id, "value")?.to_string(),
        })
    })?;
    let ports = reader.entries(CollectionType::Ports, |reader, id| {
        let raw_port = reader.entry_value(CollectionType::Ports, id, "value")?;
        let container_port = raw_port
            .trim()
            .parse::<u16>()
            .map_err(|_| TransformError::MalformedNumeric {
                key: FieldKey::Entry {
                    collection: CollectionType::Ports,
                    id,
                    suffix: "value",
                }
                .to_string(),
                value: raw_port.to_string(),
            })?;
        let raw_protocol = reader.entry_value(CollectionType::Ports, id, "protocol")?;
        let protocol = raw_protocol
            .parse::<Protocol>()
            .map_err(|_| TransformError::InvalidChoice {
                key: FieldKey::Entry {
                    collection: CollectionType::Ports,
                    id,
                    suffix: "protocol",
                }
                .to_string(),
                value: raw_protocol.to_string(),
            })?;
        Ok(PortMapping {
            container_port,
            protocol,
        })
    })?;

    Ok(TaskLaunchRequest {
        docker_image: reader.scalar(ScalarField::DockerImage).to_string(),
        command: reader.scalar(ScalarField::Command).to_string(),
        cpu: reader.decimal(ScalarField::Cpu)?,
        memory: reader.decimal(ScalarField::Memory)?,
        callback_url: reader.optional_scalar(ScalarField::CallbackUrl),
        volumes,
        volumes_from,
        uris,
        env: reader.env_map(CollectionType::Envs)?,
        masked_env: reader.env_map(CollectionType::MaskedEnvs)?,
        agent_constraints,
        ports,
        force_pull_image: (reader.scalar(ScalarField::ForcePullImage) == "yes").then_some(true),
        network: reader.optional_scalar(ScalarField::Network),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_entry_value_is_an_internal_error() {
        let mut collections = CollectionStore::new();
        let id = collections.allocate(CollectionType::Uris);
        let mut values = FormValues::new();
        values.insert(ScalarField::Cpu.into(), "1".into());
        values.insert(ScalarField::Memory.into(), "1".into());

        let error = to_request(&values, &collections).unwrap_err();
        assert_eq!(
            error,
            TransformError::MissingField {
                key: format!("uri.{id}.uri")
            }
        );
    }

    #[test]
    fn malformed_cpu_is_reported_with_its_key() {
        let mut values = FormValues::new();
        values.insert(ScalarField::Cpu.into(), "lots".into());
        values.insert(ScalarField::Memory.into(), "100".into());

        let error = to_request(&values, &CollectionStore::new()).unwrap_err();
        assert_eq!(
            error,
            TransformError::MalformedNumeric {
                key: "cpu".into(),
                value: "lots".into()
            }
        );
    }
}
