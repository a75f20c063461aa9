use std::collections::HashSet;

use eremetic_engine::{FieldKey, FormSession, definition_for};
use eremetic_types::{AgentConstraint, CollectionType, EntryId, PortMapping, Protocol, ScalarField, TaskLaunchRequest, Volume};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add(usize),
    Remove(usize, usize),
    Edit(usize, usize, String),
}

fn op() -> impl Strategy<Value = Op> {
    let collection = 0..CollectionType::ALL.len();
    prop_oneof![
        3 => collection.clone().prop_map(Op::Add),
        2 => (collection.clone(), any::<usize>()).prop_map(|(c, i)| Op::Remove(c, i)),
        2 => (collection, any::<usize>(), "[a-z0-9]{0,6}").prop_map(|(c, i, v)| Op::Edit(c, i, v)),
    ]
}

fn apply(session: &mut FormSession, issued: &mut HashSet<(CollectionType, EntryId)>, op: &Op) {
    match op {
        Op::Add(index) => {
            let collection = CollectionType::ALL[*index];
            let id = session.add_entry(collection).unwrap();
            assert!(issued.insert((collection, id)), "id {id} reissued in {collection}");
        }
        Op::Remove(index, pick) => {
            let collection = CollectionType::ALL[*index];
            let ids = session.entry_ids(collection);
            if !ids.is_empty() {
                assert!(session.remove_entry(collection, ids[pick % ids.len()]).unwrap());
            }
        }
        Op::Edit(index, pick, value) => {
            let collection = CollectionType::ALL[*index];
            let ids = session.entry_ids(collection);
            if !ids.is_empty() {
                let id = ids[pick % ids.len()];
                let suffix = definition_for(collection).fields[0].suffix;
                let key = FieldKey::entry(collection, id, suffix).unwrap();
                session.set_value(&key, value.clone()).unwrap();
            }
        }
    }
}

const WORD: &str = "[a-z][a-z0-9._/-]{0,8}";

fn decimal() -> impl Strategy<Value = f64> {
    (0u32..6400).prop_map(|hundredths| f64::from(hundredths) / 100.0)
}

fn launch_request() -> impl Strategy<Value = TaskLaunchRequest> {
    let env = || prop::collection::btree_map("[A-Z][A-Z0-9_]{0,6}", "[a-z0-9]{1,6}", 0..4);
    let port = (1u16..=65535, prop_oneof![Just(Protocol::Tcp), Just(Protocol::Udp)])
        .prop_map(|(container_port, protocol)| PortMapping { container_port, protocol });
    (
        (WORD, WORD, decimal(), decimal(), proptest::option::of("http://[a-z]{1,8}/cb"), any::<bool>(), proptest::option::of("[a-z]{1,8}")),
        prop::collection::vec((WORD, WORD), 0..4),
        prop::collection::vec(WORD, 0..4),
        prop::collection::vec(WORD, 0..4),
        (env(), env()),
        prop::collection::vec((WORD, WORD), 0..4),
        prop::collection::vec(port, 0..4),
    )
        .prop_map(
            |((docker_image, command, cpu, memory, callback_url, force_pull, network), volumes, volumes_from, uris, (env, masked_env), constraints, ports)| TaskLaunchRequest {
                docker_image,
                command,
                cpu,
                memory,
                callback_url,
                volumes: volumes
                    .into_iter()
                    .map(|(host_path, container_path)| Volume { host_path, container_path })
                    .collect(),
                volumes_from,
                uris,
                env,
                masked_env,
                agent_constraints: constraints
                    .into_iter()
                    .map(|(attribute_name, attribute_value)| AgentConstraint { attribute_name, attribute_value })
                    .collect(),
                ports,
                force_pull_image: force_pull.then_some(true),
                network,
            },
        )
}

fn add(session: &mut FormSession, collection: CollectionType, fields: &[(&'static str, String)]) {
    let id = session.add_entry(collection).unwrap();
    for (suffix, value) in fields {
        session.set_value(&FieldKey::entry(collection, id, suffix).unwrap(), value.clone()).unwrap();
    }
}

/// Enter `request` the way a user would: scalars typed, one entry per item.
fn fill_form(request: &TaskLaunchRequest) -> FormSession {
    let mut session = FormSession::new();
    session.set_value(&ScalarField::DockerImage.into(), request.docker_image.clone()).unwrap();
    session.set_value(&ScalarField::Command.into(), request.command.clone()).unwrap();
    session.set_value(&ScalarField::Cpu.into(), request.cpu.to_string()).unwrap();
    session.set_value(&ScalarField::Memory.into(), request.memory.to_string()).unwrap();
    if let Some(callback_url) = &request.callback_url {
        session.set_value(&ScalarField::CallbackUrl.into(), callback_url.clone()).unwrap();
    }
    if request.force_pull_image == Some(true) {
        session.set_value(&ScalarField::ForcePullImage.into(), "yes").unwrap();
    }
    if let Some(network) = &request.network {
        session.set_value(&ScalarField::Network.into(), network.clone()).unwrap();
    }

    for volume in &request.volumes {
        add(&mut session, CollectionType::Volumes, &[("host", volume.host_path.clone()), ("container", volume.container_path.clone())]);
    }
    for container_id in &request.volumes_from {
        add(&mut session, CollectionType::VolumesFrom, &[("container_id", container_id.clone())]);
    }
    for uri in &request.uris {
        add(&mut session, CollectionType::Uris, &[("uri", uri.clone())]);
    }
    for (key, value) in &request.env {
        add(&mut session, CollectionType::Envs, &[("key", key.clone()), ("value", value.clone())]);
    }
    for (key, value) in &request.masked_env {
        add(&mut session, CollectionType::MaskedEnvs, &[("key", key.clone()), ("value", value.clone())]);
    }
    for constraint in &request.agent_constraints {
        add(
            &mut session,
            CollectionType::AgentConstraints,
            &[("name", constraint.attribute_name.clone()), ("value", constraint.attribute_value.clone())],
        );
    }
    for port in &request.ports {
        add(&mut session, CollectionType::Ports, &[("value", port.container_port.to_string()), ("protocol", port.protocol.to_string())]);
    }
    session
}

proptest! {
    #[test]
    fn form_entries_transform_back_into_the_request(request in launch_request()) {
        let mut session = fill_form(&request);
        let (_, submitted) = session.begin_submit().unwrap();
        prop_assert_eq!(submitted, request);
    }

    #[test]
    fn values_track_live_entries(ops in prop::collection::vec(op(), 0..64)) {
        let mut session = FormSession::new();
        let mut issued = HashSet::new();
        for op in &ops {
            apply(&mut session, &mut issued, op);
        }

        let mut expected = ScalarField::ALL.len();
        for collection in CollectionType::ALL {
            let ids = session.entry_ids(collection);
            let unique: HashSet<_> = ids.iter().collect();
            prop_assert_eq!(unique.len(), ids.len());
            expected += ids.len() * definition_for(collection).fields.len();
            for id in ids {
                for key in FieldKey::entry_keys(collection, id) {
                    prop_assert!(session.values().contains(&key));
                }
            }
        }
        prop_assert_eq!(session.values().len(), expected);

        for key in session.values().keys() {
            if let Some((collection, id)) = key.entry_of() {
                prop_assert!(session.collections().contains(collection, id));
            }
        }
    }

    #[test]
    fn add_then_remove_restores_the_payload(ops in prop::collection::vec(op(), 0..32), index in 0..CollectionType::ALL.len()) {
        let mut session = FormSession::new();
        session.set_value(&ScalarField::DockerImage.into(), "busybox").unwrap();
        session.set_value(&ScalarField::Command.into(), "true").unwrap();
        let mut issued = HashSet::new();
        for op in &ops {
            apply(&mut session, &mut issued, op);
        }
        let before = eremetic_engine::to_request(session.values(), session.collections());

        let collection = CollectionType::ALL[index];
        let id = session.add_entry(collection).unwrap();
        session.remove_entry(collection, id).unwrap();

        let after = eremetic_engine::to_request(session.values(), session.collections());
        prop_assert_eq!(
            before.map(|request| serde_json::to_string(&request).unwrap()),
            after.map(|request| serde_json::to_string(&request).unwrap())
        );
    }

    #[test]
    fn form_keys_round_trip_through_text(index in 0..CollectionType::ALL.len(), raw_id in any::<u64>(), field in any::<usize>()) {
        let collection = CollectionType::ALL[index];
        let fields = definition_for(collection).fields;
        let suffix = fields[field % fields.len()].suffix;
        let key = FieldKey::entry(collection, EntryId::new(raw_id), suffix).unwrap();

        let parsed: FieldKey = key.to_string().parse().unwrap();
        prop_assert_eq!(parsed, key);
    }
}
