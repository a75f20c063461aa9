//! Form session state machine.
//!
//! A [`FormSession`] owns everything about one in-progress launch form: the
//! flat values, the live entry ids per collection, the touched set, and the
//! submission phase.
//!
//! ```text
//! Pristine --edit/add/remove--> Editing --begin_submit (valid)--> Submitting
//!                                  ^                                  |
//!                                  |           rejected               v
//!                                Failed <-------------------- complete_submit
//!                                                  accepted --> Succeeded
//! ```
//!
//! A submission is identified by a [`SubmissionTicket`]. Results delivered
//! with a ticket from another session or an earlier attempt are refused, so a
//! response arriving after the user left the form cannot touch the new one.

use std::sync::atomic::{AtomicU64, Ordering};

use eremetic_types::{CollectionType, EntryId, FieldKind, ScalarField, TaskId, TaskLaunchRequest};
use indexmap::IndexSet;
use tracing::{debug, error, info};

use crate::collection::CollectionStore;
use crate::error::{SessionError, TransformError};
use crate::keys::FieldKey;
use crate::registry::{definition_for, scalar_definition};
use crate::render::{EntryRow, FieldView, render_entry, render_scalar};
use crate::transform::to_request;
use crate::validation::ValidationState;
use crate::values::FormValues;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    /// Freshly created, nothing changed yet.
    Pristine,
    Editing,
    /// A launch request is in flight; edits and further submits are refused.
    Submitting,
    /// The scheduler accepted the task. The session is closed.
    Succeeded(TaskId),
    /// The last submission was rejected. Values are intact and editable.
    Failed { message: String },
}

/// Handle for one submission attempt of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionTicket {
    session_id: u64,
    attempt: u64,
}

impl SubmissionTicket {
    pub fn session_id(&self) -> u64 {
        self.session_id
    }
}

/// In-memory state of one task-launch form.
#[derive(Debug, Clone)]
pub struct FormSession {
    id: u64,
    phase: SessionPhase,
    values: FormValues,
    collections: CollectionStore,
    touched: IndexSet<FieldKey>,
    validation: ValidationState,
    attempts: u64,
    submission_error: Option<String>,
}

impl Default for FormSession {
    fn default() -> Self {
        Self::new()
    }
}

impl FormSession {
    /// Create a session holding the scalar defaults and empty collections.
    pub fn new() -> Self {
        let mut values = FormValues::new();
        for field in ScalarField::ALL {
            values.insert(FieldKey::Scalar(field), scalar_definition(field).initial_value().to_string());
        }
        let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
        debug!(session_id = id, "form session created");
        Self {
            id,
            phase: SessionPhase::Pristine,
            validation: ValidationState::derive(&values, &IndexSet::new()),
            values,
            collections: CollectionStore::new(),
            touched: IndexSet::new(),
            attempts: 0,
            submission_error: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == SessionPhase::Submitting
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn collections(&self) -> &CollectionStore {
        &self.collections
    }

    pub fn validation(&self) -> &ValidationState {
        &self.validation
    }

    pub fn value(&self, key: &FieldKey) -> Option<&str> {
        self.values.get(key)
    }

    pub fn entry_ids(&self, collection: CollectionType) -> Vec<EntryId> {
        self.collections.ids(collection).collect()
    }

    /// Message from the last rejected submission, until dismissed.
    pub fn submission_error(&self) -> Option<&str> {
        self.submission_error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.submission_error = None;
    }

    /// Route to the created task once the scheduler accepted the launch.
    pub fn navigation_target(&self) -> Option<String> {
        match &self.phase {
            SessionPhase::Succeeded(task_id) => Some(format!("/task/{task_id}")),
            _ => None,
        }
    }

    fn ensure_editable(&self) -> Result<(), SessionError> {
        match self.phase {
            SessionPhase::Submitting => Err(SessionError::AlreadySubmitting),
            SessionPhase::Succeeded(_) => Err(SessionError::Closed),
            SessionPhase::Pristine | SessionPhase::Editing | SessionPhase::Failed { .. } => Ok(()),
        }
    }

    fn mark_edited(&mut self) {
        self.phase = SessionPhase::Editing;
        self.validation = ValidationState::derive(&self.values, &self.touched);
    }

    /// Add an empty entry to a collection. Its fields start untouched.
    pub fn add_entry(&mut self, collection: CollectionType) -> Result<EntryId, SessionError> {
        self.ensure_editable()?;
        let id = self.collections.allocate(collection);
        for field in definition_for(collection).fields {
            let key = FieldKey::Entry {
                collection,
                id,
                suffix: field.suffix,
            };
            self.values.insert(key, field.initial_value().to_string());
        }
        debug!(session_id = self.id, %collection, entry_id = %id, "entry added");
        self.mark_edited();
        Ok(id)
    }

    /// Remove an entry and every value and validation status it owned.
    ///
    /// Returns `false` when the id is not live in that collection.
    pub fn remove_entry(&mut self, collection: CollectionType, id: EntryId) -> Result<bool, SessionError> {
        self.ensure_editable()?;
        if !self.collections.retire(collection, id) {
            return Ok(false);
        }
        for key in FieldKey::entry_keys(collection, id) {
            self.values.remove(&key);
            self.touched.shift_remove(&key);
        }
        debug!(session_id = self.id, %collection, entry_id = %id, "entry removed");
        self.mark_edited();
        Ok(true)
    }

    /// Set the value of a field and re-validate it.
    pub fn set_value(&mut self, key: &FieldKey, value: impl Into<String>) -> Result<(), SessionError> {
        self.ensure_editable()?;
        if !self.values.contains(key) {
            return Err(SessionError::UnknownField(key.to_string()));
        }
        self.values.insert(*key, value.into());
        self.touched.insert(*key);
        self.mark_edited();
        Ok(())
    }

    /// Step a choice field to its next (or previous) option.
    pub fn cycle_choice(&mut self, key: &FieldKey, forward: bool) -> Result<(), SessionError> {
        let Some(FieldKind::Choice(options)) = key.spec().map(|spec| spec.kind) else {
            return Err(SessionError::UnknownField(key.to_string()));
        };
        let current = self.values.get(key).unwrap_or_default();
        let position = options.iter().position(|option| *option == current).unwrap_or(0);
        let next = if forward {
            (position + 1) % options.len()
        } else {
            (position + options.len() - 1) % options.len()
        };
        self.set_value(key, options[next])
    }

    /// Scalar inputs in display order.
    pub fn scalar_views(&self) -> Vec<FieldView> {
        ScalarField::ALL
            .into_iter()
            .map(|field| render_scalar(field, &self.values, &self.validation))
            .collect()
    }

    /// Rows for every live entry of a collection.
    pub fn entry_rows(&self, collection: CollectionType) -> Vec<EntryRow> {
        self.collections
            .ids(collection)
            .map(|id| render_entry(collection, id, &self.values, &self.validation))
            .collect()
    }

    /// Validate everything and, when valid, move to `Submitting`.
    ///
    /// Invalid forms stay editable with every field marked touched, so all
    /// errors become visible. Nothing is returned that could be sent.
    pub fn begin_submit(&mut self) -> Result<(SubmissionTicket, TaskLaunchRequest), SessionError> {
        self.ensure_editable()?;
        self.touched.extend(self.values.keys().copied());
        self.mark_edited();

        if self.validation.has_errors() {
            let fields = self.validation.errored_keys().map(ToString::to_string).collect();
            return Err(SessionError::Invalid { fields });
        }

        let request = match to_request(&self.values, &self.collections) {
            Ok(request) => request,
            Err(TransformError::MalformedNumeric { key, value }) | Err(TransformError::InvalidChoice { key, value }) => {
                if let Ok(field_key) = key.parse::<FieldKey>() {
                    self.validation
                        .set_error(field_key, format!("'{value}' is not a valid value"));
                }
                return Err(SessionError::Invalid { fields: vec![key] });
            }
            Err(internal @ TransformError::MissingField { .. }) => {
                error!(session_id = self.id, error = %internal, "form values out of sync with entries");
                return Err(SessionError::Internal(internal));
            }
        };

        self.attempts += 1;
        self.submission_error = None;
        self.phase = SessionPhase::Submitting;
        info!(session_id = self.id, attempt = self.attempts, "submitting launch request");
        Ok((
            SubmissionTicket {
                session_id: self.id,
                attempt: self.attempts,
            },
            request,
        ))
    }

    /// Apply the outcome of the submission identified by `ticket`.
    ///
    /// `Err(message)` carries the text to show the user.
    pub fn complete_submit(&mut self, ticket: SubmissionTicket, outcome: Result<TaskId, String>) -> Result<&SessionPhase, SessionError> {
        if ticket.session_id != self.id || ticket.attempt != self.attempts {
            debug!(session_id = self.id, ticket_session = ticket.session_id, "ignoring stale submission result");
            return Err(SessionError::StaleTicket);
        }
        if self.phase != SessionPhase::Submitting {
            return Err(SessionError::NotSubmitting);
        }
        self.phase = match outcome {
            Ok(task_id) => {
                info!(session_id = self.id, %task_id, "task launched");
                SessionPhase::Succeeded(task_id)
            }
            Err(message) => {
                info!(session_id = self.id, %message, "launch rejected");
                self.submission_error = Some(message.clone());
                SessionPhase::Failed { message }
            }
        };
        Ok(&self.phase)
    }
}
