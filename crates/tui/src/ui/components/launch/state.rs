//! State behind the launch form: the form session plus focus and the
//! editor for the focused input.

use eremetic_engine::{FieldKey, FormSession, SessionError, SessionPhase, SubmissionTicket};
use eremetic_types::{CollectionType, EntryId, FieldKind, ScalarField, TaskId};
use tracing::{debug, warn};

use crate::app::{Effect, Route};
use crate::ui::components::common::TextInputState;

/// Anything on the form that can hold focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    Field(FieldKey),
    Add(CollectionType),
    Remove(CollectionType, EntryId),
    Submit,
    Reset,
}

/// Short status line under the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

#[derive(Debug)]
pub struct LaunchState {
    pub session: FormSession,
    focus: FocusTarget,
    editor: TextInputState,
    /// Show masked environment values in clear text.
    pub reveal_masked: bool,
    pub notice: Option<Notice>,
}

impl Default for LaunchState {
    fn default() -> Self {
        Self::new()
    }
}

impl LaunchState {
    pub fn new() -> Self {
        let session = FormSession::new();
        let first = FieldKey::Scalar(ScalarField::DockerImage);
        let editor = TextInputState::editing(session.value(&first).unwrap_or_default());
        Self {
            session,
            focus: FocusTarget::Field(first),
            editor,
            reveal_masked: false,
            notice: None,
        }
    }

    pub fn focus(&self) -> FocusTarget {
        self.focus
    }

    pub fn editor(&self) -> &TextInputState {
        &self.editor
    }

    /// Focus order: scalars, then each collection's entries followed by its
    /// add button, then the form buttons.
    pub fn targets(&self) -> Vec<FocusTarget> {
        let mut targets: Vec<FocusTarget> = ScalarField::ALL
            .into_iter()
            .map(|field| FocusTarget::Field(field.into()))
            .collect();
        for collection in CollectionType::ALL {
            for id in self.session.entry_ids(collection) {
                targets.extend(FieldKey::entry_keys(collection, id).map(FocusTarget::Field));
                targets.push(FocusTarget::Remove(collection, id));
            }
            targets.push(FocusTarget::Add(collection));
        }
        targets.push(FocusTarget::Submit);
        targets.push(FocusTarget::Reset);
        targets
    }

    pub fn set_focus(&mut self, target: FocusTarget) {
        self.focus = target;
        if let FocusTarget::Field(key) = target {
            self.editor = TextInputState::editing(self.session.value(&key).unwrap_or_default());
        }
    }

    fn focus_index(&self, targets: &[FocusTarget]) -> usize {
        targets.iter().position(|target| *target == self.focus).unwrap_or(0)
    }

    pub fn focus_next(&mut self) {
        let targets = self.targets();
        let next = (self.focus_index(&targets) + 1) % targets.len();
        self.set_focus(targets[next]);
    }

    pub fn focus_prev(&mut self) {
        let targets = self.targets();
        let index = self.focus_index(&targets);
        let previous = (index + targets.len() - 1) % targets.len();
        self.set_focus(targets[previous]);
    }

    /// Apply an edit to the focused text input and store the result.
    pub fn edit(&mut self, apply: impl FnOnce(&mut TextInputState)) {
        let FocusTarget::Field(key) = self.focus else {
            return;
        };
        if matches!(key.spec().map(|spec| spec.kind), Some(FieldKind::Choice(_))) {
            return;
        }
        let mut edited = self.editor.clone();
        apply(&mut edited);
        if edited.input() == self.editor.input() {
            self.editor = edited;
            return;
        }
        match self.session.set_value(&key, edited.input()) {
            Ok(()) => self.editor = edited,
            Err(error) => debug!(%error, %key, "edit refused"),
        }
    }

    /// Step the focused choice field. Returns `false` if it is not a choice.
    pub fn cycle_choice(&mut self, forward: bool) -> bool {
        let FocusTarget::Field(key) = self.focus else {
            return false;
        };
        if !matches!(key.spec().map(|spec| spec.kind), Some(FieldKind::Choice(_))) {
            return false;
        }
        match self.session.cycle_choice(&key, forward) {
            Ok(()) => self.set_focus(self.focus),
            Err(error) => debug!(%error, %key, "choice change refused"),
        }
        true
    }

    pub fn add_entry(&mut self, collection: CollectionType) {
        match self.session.add_entry(collection) {
            Ok(id) => {
                if let Some(first) = FieldKey::entry_keys(collection, id).next() {
                    self.set_focus(FocusTarget::Field(first));
                }
            }
            Err(error) => debug!(%error, %collection, "add refused"),
        }
    }

    pub fn remove_entry(&mut self, collection: CollectionType, id: EntryId) {
        let before = self.targets();
        let index = self.focus_index(&before);
        match self.session.remove_entry(collection, id) {
            Ok(true) => {
                let after = self.targets();
                let focused_gone = !after.contains(&self.focus);
                if focused_gone {
                    // Land on whatever now follows the removed entry.
                    let removed = before[..index]
                        .iter()
                        .filter(|target| !after.contains(target))
                        .count();
                    let landing = (index - removed).min(after.len() - 1);
                    self.set_focus(after[landing]);
                }
            }
            Ok(false) => warn!(%collection, entry_id = %id, "remove of unknown entry"),
            Err(error) => debug!(%error, %collection, "remove refused"),
        }
    }

    /// Remove the entry owning the focused input or remove button.
    pub fn remove_focused_entry(&mut self) {
        let owner = match self.focus {
            FocusTarget::Field(key) => key.entry_of(),
            FocusTarget::Remove(collection, id) => Some((collection, id)),
            _ => None,
        };
        if let Some((collection, id)) = owner {
            self.remove_entry(collection, id);
        }
    }

    /// Collection the focus belongs to, for "add another" shortcuts.
    pub fn focused_collection(&self) -> Option<CollectionType> {
        match self.focus {
            FocusTarget::Field(key) => key.entry_of().map(|(collection, _)| collection),
            FocusTarget::Add(collection) | FocusTarget::Remove(collection, _) => Some(collection),
            _ => None,
        }
    }

    /// Replace the form with a fresh one. Refused while a launch is in flight.
    pub fn reset(&mut self) {
        if self.session.is_submitting() {
            return;
        }
        let reveal_masked = self.reveal_masked;
        *self = Self::new();
        self.reveal_masked = reveal_masked;
    }

    pub fn toggle_reveal(&mut self) {
        self.reveal_masked = !self.reveal_masked;
    }

    /// Clear the status line and any submission error.
    pub fn dismiss(&mut self) {
        self.notice = None;
        self.session.dismiss_error();
    }

    /// Validate and, when the form is valid, request the launch.
    pub fn submit(&mut self) -> Vec<Effect> {
        match self.session.begin_submit() {
            Ok((ticket, request)) => {
                self.notice = Some(Notice::Info("Submitting task...".to_string()));
                vec![Effect::SubmitLaunch {
                    ticket,
                    request: Box::new(request),
                }]
            }
            Err(SessionError::Invalid { fields }) => {
                let count = fields.len();
                let noun = if count == 1 { "field needs" } else { "fields need" };
                self.notice = Some(Notice::Error(format!("{count} {noun} attention")));
                if let Some(key) = fields.first().and_then(|key| key.parse::<FieldKey>().ok()) {
                    self.set_focus(FocusTarget::Field(key));
                }
                Vec::new()
            }
            Err(SessionError::AlreadySubmitting) => Vec::new(),
            Err(error) => {
                self.notice = Some(Notice::Error(error.to_string()));
                Vec::new()
            }
        }
    }

    /// Apply the scheduler's answer to a launch.
    pub fn apply_launch_result(&mut self, ticket: SubmissionTicket, outcome: Result<TaskId, String>) -> Vec<Effect> {
        if ticket.session_id() != self.session.id() {
            debug!(ticket_session = ticket.session_id(), "dropping launch result for a discarded form");
            return Vec::new();
        }
        match self.session.complete_submit(ticket, outcome) {
            Ok(SessionPhase::Succeeded(task_id)) => vec![Effect::SwitchTo(Route::Task(task_id.clone()))],
            Ok(_) => {
                self.notice = None;
                Vec::new()
            }
            Err(error) => {
                debug!(%error, "ignoring launch result");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_required(state: &mut LaunchState) {
        state.set_focus(FocusTarget::Field(ScalarField::DockerImage.into()));
        "busybox".chars().for_each(|c| state.edit(|editor| editor.insert_char(c)));
        state.set_focus(FocusTarget::Field(ScalarField::Command.into()));
        "env".chars().for_each(|c| state.edit(|editor| editor.insert_char(c)));
    }

    #[test]
    fn typing_updates_the_session() {
        let mut state = LaunchState::new();
        fill_required(&mut state);
        assert_eq!(state.session.value(&ScalarField::DockerImage.into()), Some("busybox"));
        assert_eq!(state.session.value(&ScalarField::Command.into()), Some("env"));
    }

    #[test]
    fn focus_walks_fields_then_buttons() {
        let mut state = LaunchState::new();
        let targets = state.targets();
        assert_eq!(targets.len(), ScalarField::ALL.len() + CollectionType::ALL.len() + 2);

        state.focus_prev();
        assert_eq!(state.focus(), FocusTarget::Reset);
        state.focus_next();
        assert_eq!(state.focus(), FocusTarget::Field(ScalarField::DockerImage.into()));
    }

    #[test]
    fn adding_focuses_the_new_entry_and_removing_moves_on() {
        let mut state = LaunchState::new();
        state.add_entry(CollectionType::Envs);
        let id = state.session.entry_ids(CollectionType::Envs)[0];
        let key = FieldKey::entry(CollectionType::Envs, id, "key").unwrap();
        assert_eq!(state.focus(), FocusTarget::Field(key));

        state.remove_focused_entry();
        assert!(state.session.entry_ids(CollectionType::Envs).is_empty());
        assert_eq!(state.focus(), FocusTarget::Add(CollectionType::Envs));
    }

    #[test]
    fn choice_fields_cycle_instead_of_typing() {
        let mut state = LaunchState::new();
        state.add_entry(CollectionType::Ports);
        let id = state.session.entry_ids(CollectionType::Ports)[0];
        let protocol = FieldKey::entry(CollectionType::Ports, id, "protocol").unwrap();
        state.set_focus(FocusTarget::Field(protocol));

        state.edit(|editor| editor.insert_char('x'));
        assert_eq!(state.session.value(&protocol), Some("TCP"));
        assert!(state.cycle_choice(true));
        assert_eq!(state.session.value(&protocol), Some("UDP"));
        assert_eq!(state.editor().input(), "UDP");
    }

    #[test]
    fn invalid_submit_focuses_first_error() {
        let mut state = LaunchState::new();
        state.set_focus(FocusTarget::Submit);
        assert!(state.submit().is_empty());
        assert_eq!(state.focus(), FocusTarget::Field(ScalarField::DockerImage.into()));
        assert_eq!(state.notice, Some(Notice::Error("2 fields need attention".into())));
    }

    #[test]
    fn successful_launch_switches_to_task_view() {
        let mut state = LaunchState::new();
        fill_required(&mut state);
        let effects = state.submit();
        let Some(Effect::SubmitLaunch { ticket, request }) = effects.first().cloned() else {
            panic!("expected a launch effect, got {effects:?}");
        };
        assert_eq!(request.docker_image, "busybox");

        let effects = state.apply_launch_result(ticket, Ok(TaskId::new("abc123")));
        assert_eq!(effects, vec![Effect::SwitchTo(Route::Task(TaskId::new("abc123")))]);
    }

    #[test]
    fn results_for_a_reset_form_are_dropped() {
        let mut state = LaunchState::new();
        fill_required(&mut state);
        let Some(Effect::SubmitLaunch { ticket, .. }) = state.submit().pop() else {
            panic!("expected a launch effect");
        };
        // Reset is refused mid-flight; a brand new state stands in for navigation.
        state.reset();
        assert!(state.session.is_submitting());
        let mut replacement = LaunchState::new();
        assert!(replacement.apply_launch_result(ticket, Ok(TaskId::new("late"))).is_empty());
        assert_eq!(replacement.session.phase(), &SessionPhase::Pristine);
    }

    #[test]
    fn failed_launch_keeps_values() {
        let mut state = LaunchState::new();
        fill_required(&mut state);
        let Some(Effect::SubmitLaunch { ticket, .. }) = state.submit().pop() else {
            panic!("expected a launch effect");
        };
        state.apply_launch_result(ticket, Err("invalid image".into()));
        assert_eq!(state.session.submission_error(), Some("invalid image"));
        assert_eq!(state.session.value(&ScalarField::DockerImage.into()), Some("busybox"));

        state.dismiss();
        assert_eq!(state.session.submission_error(), None);
    }
}
