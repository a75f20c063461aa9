//! # Eremetic Engine
//!
//! State and rules behind the task launch form. The engine knows nothing about
//! terminals or HTTP: a front end drives a [`FormSession`], draws the
//! [`FieldView`]s and [`EntryRow`]s it renders, and sends the
//! [`TaskLaunchRequest`](eremetic_types::TaskLaunchRequest) returned by
//! [`FormSession::begin_submit`].
//!
//! ## Usage
//!
//! ```rust
//! use eremetic_engine::{FieldKey, FormSession};
//! use eremetic_types::{CollectionType, ScalarField, TaskId};
//!
//! let mut session = FormSession::new();
//! session.set_value(&ScalarField::DockerImage.into(), "busybox")?;
//! session.set_value(&ScalarField::Command.into(), "env")?;
//!
//! let id = session.add_entry(CollectionType::Envs)?;
//! session.set_value(&format!("env.{id}.key").parse::<FieldKey>()?, "GREETING")?;
//! session.set_value(&FieldKey::entry(CollectionType::Envs, id, "value").unwrap(), "hello")?;
//!
//! let (ticket, request) = session.begin_submit()?;
//! assert_eq!(request.env["GREETING"], "hello");
//!
//! session.complete_submit(ticket, Ok(TaskId::new("eremetic-task.1")))?;
//! assert_eq!(session.navigation_target().as_deref(), Some("/task/eremetic-task.1"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - **`registry`**: static field definitions per collection type
//! - **`keys`**: flat form keys (`port.2.value`) and their parsing
//! - **`values`** / **`collection`**: the value map and live entry ids
//! - **`validation`**: touched-aware field errors derived from the values
//! - **`render`**: view models for scalar inputs and entry rows
//! - **`transform`**: form values to launch request
//! - **`session`**: the submission state machine tying it together

pub mod collection;
pub mod error;
pub mod keys;
pub mod registry;
pub mod render;
pub mod session;
pub mod transform;
pub mod validation;
pub mod values;

pub use collection::CollectionStore;
pub use error::{KeyParseError, RegistryError, SessionError, TransformError};
pub use keys::FieldKey;
pub use registry::{definition_for, lookup, scalar_definition};
pub use render::{EntryRow, FieldView, render_entry, render_entry_for_tag, render_scalar};
pub use session::{FormSession, SessionPhase, SubmissionTicket};
pub use transform::to_request;
pub use validation::{FieldStatus, ValidationState, validate_value};
pub use values::FormValues;
