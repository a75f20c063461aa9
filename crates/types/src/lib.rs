//! # Eremetic Types
//!
//! Shared definitions used by the launcher engine, the API client, and the
//! terminal front-end. Nothing in this crate performs I/O; it only describes:
//!
//! - the closed set of dynamic collection types and scalar form fields
//! - the shape of one form field (`FieldSpec`) and one collection entry (`EntrySpec`)
//! - the task-launch wire contract (`TaskLaunchRequest` and its parts)
//! - small identifiers (`EntryId`, `TaskId`) and log stream names

mod collection;
mod fields;
mod ids;
mod request;

pub use collection::{CollectionType, UnknownCollectionType};
pub use fields::{EntrySpec, FieldKind, FieldSpec, ScalarField};
pub use ids::{EntryId, LogStream, TaskId};
pub use request::{AgentConstraint, PortMapping, Protocol, TaskLaunchRequest, UnknownProtocol, Volume};
