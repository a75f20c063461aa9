use eremetic_engine::{FieldKey, FormSession, SessionError, SessionPhase};
use eremetic_types::{CollectionType, EntryId, ScalarField, TaskId, TaskLaunchRequest};
use serde_json::json;

fn entry_key(collection: CollectionType, id: EntryId, suffix: &str) -> FieldKey {
    FieldKey::entry(collection, id, suffix).expect("registered suffix")
}

fn base_session() -> FormSession {
    let mut session = FormSession::new();
    session.set_value(&ScalarField::DockerImage.into(), "busybox").unwrap();
    session.set_value(&ScalarField::Command.into(), "env").unwrap();
    session
}

fn add_env(session: &mut FormSession, collection: CollectionType, key: &str, value: &str) -> EntryId {
    let id = session.add_entry(collection).unwrap();
    session.set_value(&entry_key(collection, id, "key"), key).unwrap();
    session.set_value(&entry_key(collection, id, "value"), value).unwrap();
    id
}

#[test]
fn removed_env_entry_is_absent_from_payload() {
    let mut session = base_session();
    session.set_value(&ScalarField::Cpu.into(), "2.5").unwrap();
    session.set_value(&ScalarField::Memory.into(), "512").unwrap();
    let first = add_env(&mut session, CollectionType::Envs, "A", "1");
    add_env(&mut session, CollectionType::Envs, "B", "2");

    assert!(session.remove_entry(CollectionType::Envs, first).unwrap());
    let (_, request) = session.begin_submit().unwrap();

    let payload = serde_json::to_value(&request).unwrap();
    assert_eq!(payload["env"], json!({ "B": "2" }));
    assert_eq!(payload["cpu"], json!(2.5));
    assert_eq!(payload["memory"], json!(512.0));
    assert_eq!(payload["docker_image"], json!("busybox"));
    assert_eq!(payload["command"], json!("env"));
}

#[test]
fn every_collection_reaches_the_payload() {
    let mut session = base_session();
    session.set_value(&ScalarField::CallbackUrl.into(), "http://hooks.local/done").unwrap();
    session.set_value(&ScalarField::ForcePullImage.into(), "yes").unwrap();

    let volume = session.add_entry(CollectionType::Volumes).unwrap();
    session.set_value(&entry_key(CollectionType::Volumes, volume, "host"), "/data").unwrap();
    session.set_value(&entry_key(CollectionType::Volumes, volume, "container"), "/mnt/data").unwrap();

    let from = session.add_entry(CollectionType::VolumesFrom).unwrap();
    session.set_value(&entry_key(CollectionType::VolumesFrom, from, "container_id"), "db-1").unwrap();

    let uri = session.add_entry(CollectionType::Uris).unwrap();
    session.set_value(&entry_key(CollectionType::Uris, uri, "uri"), "http://files.local/app.tgz").unwrap();

    let constraint = session.add_entry(CollectionType::AgentConstraints).unwrap();
    session.set_value(&entry_key(CollectionType::AgentConstraints, constraint, "name"), "rack").unwrap();
    session.set_value(&entry_key(CollectionType::AgentConstraints, constraint, "value"), "r1").unwrap();

    let port = session.add_entry(CollectionType::Ports).unwrap();
    session.set_value(&entry_key(CollectionType::Ports, port, "value"), "8080").unwrap();
    session.set_value(&entry_key(CollectionType::Ports, port, "protocol"), "UDP").unwrap();

    add_env(&mut session, CollectionType::MaskedEnvs, "TOKEN", "s3cret");

    let (_, request) = session.begin_submit().unwrap();
    let payload = serde_json::to_value(&request).unwrap();

    assert_eq!(payload["volumes"], json!([{ "host_path": "/data", "container_path": "/mnt/data" }]));
    assert_eq!(payload["volumes_from"], json!(["db-1"]));
    assert_eq!(payload["uris"], json!(["http://files.local/app.tgz"]));
    assert_eq!(
        payload["agent_constraints"],
        json!([{ "attribute_name": "rack", "attribute_value": "r1" }])
    );
    assert_eq!(payload["ports"], json!([{ "container_port": 8080, "protocol": "UDP" }]));
    assert_eq!(payload["masked_env"], json!({ "TOKEN": "s3cret" }));
    assert_eq!(payload["callback_url"], json!("http://hooks.local/done"));
    assert_eq!(payload["force_pull_image"], json!(true));
    assert_eq!(payload.get("network"), None);
}

#[test]
fn empty_collections_serialize_as_empty_containers() {
    let mut session = base_session();
    let (_, request) = session.begin_submit().unwrap();
    let payload = serde_json::to_value(&request).unwrap();

    assert_eq!(payload["volumes"], json!([]));
    assert_eq!(payload["env"], json!({}));
    assert_eq!(payload["cpu"], json!(1.0));
    assert_eq!(payload["memory"], json!(100.0));
    assert_eq!(payload.get("callback_url"), None);
}

#[test]
fn malformed_port_blocks_submission() {
    let mut session = base_session();
    let port = session.add_entry(CollectionType::Ports).unwrap();
    let key = entry_key(CollectionType::Ports, port, "value");
    session.set_value(&key, "not-a-number").unwrap();

    let error = session.begin_submit().unwrap_err();
    assert_eq!(error, SessionError::Invalid { fields: vec![key.to_string()] });
    assert!(session.validation().error(&key).is_some());
    assert_eq!(session.phase(), &SessionPhase::Editing);
}

#[test]
fn empty_required_entry_field_blocks_submission() {
    let mut session = base_session();
    let volume = session.add_entry(CollectionType::Volumes).unwrap();
    session.set_value(&entry_key(CollectionType::Volumes, volume, "host"), "/data").unwrap();

    let error = session.begin_submit().unwrap_err();
    let container = entry_key(CollectionType::Volumes, volume, "container");
    assert_eq!(error, SessionError::Invalid { fields: vec![container.to_string()] });
    assert!(!session.is_submitting());
}

#[test]
fn duplicate_env_keys_keep_the_last_value() {
    let mut session = base_session();
    add_env(&mut session, CollectionType::Envs, "MODE", "debug");
    add_env(&mut session, CollectionType::Envs, "MODE", "release");

    let (_, request) = session.begin_submit().unwrap();
    assert_eq!(request.env.len(), 1);
    assert_eq!(request.env["MODE"], "release");
}

#[test]
fn identical_forms_serialize_identically() {
    let build = |order: &[(&str, &str)]| {
        let mut session = base_session();
        for (key, value) in order {
            add_env(&mut session, CollectionType::Envs, key, value);
        }
        let (_, request) = session.begin_submit().unwrap();
        serde_json::to_string(&request).unwrap()
    };

    let first = build(&[("A", "1"), ("B", "2")]);
    let second = build(&[("B", "2"), ("A", "1")]);
    assert_eq!(first, second);
    assert_eq!(first, build(&[("A", "1"), ("B", "2")]));
}

#[test]
fn submitted_body_decodes_to_the_same_request() {
    let mut session = base_session();
    add_env(&mut session, CollectionType::Envs, "A", "1");
    let (_, request) = session.begin_submit().unwrap();

    let text = serde_json::to_string(&request).unwrap();
    let parsed: TaskLaunchRequest = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, request);
}

#[test]
fn failed_submission_can_be_fixed_and_retried() {
    let mut session = base_session();
    let (ticket, _) = session.begin_submit().unwrap();
    session.complete_submit(ticket, Err("invalid image".into())).unwrap();
    assert_eq!(session.submission_error(), Some("invalid image"));

    session.set_value(&ScalarField::DockerImage.into(), "alpine:3.10").unwrap();
    assert_eq!(session.phase(), &SessionPhase::Editing);

    let (retry, request) = session.begin_submit().unwrap();
    assert_eq!(request.docker_image, "alpine:3.10");
    assert_ne!(retry, ticket);

    // The first attempt's result can no longer land.
    assert_eq!(
        session.complete_submit(ticket, Ok(TaskId::new("late"))).unwrap_err(),
        SessionError::StaleTicket
    );
    session.complete_submit(retry, Ok(TaskId::new("abc123"))).unwrap();
    assert_eq!(session.phase(), &SessionPhase::Succeeded(TaskId::new("abc123")));
}
