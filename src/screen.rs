// src/screen.rs
//
// Per-screen session state. One `EditSession` is created each time the edit
// screen is opened and lives until the update succeeds or the cache evicts
// it. All asynchronous outcomes funnel through `ViewState::dispatch`.

use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::form::ProductForm;

/// The three asynchronous actions the screen can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Load,
    Update,
    Upload,
}

/// Resolution of one action attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Started,
    Succeeded,
    Failed(String),
}

/// In-progress flag and last error for one action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionSlot {
    pub in_progress: bool,
    pub error: Option<String>,
}

/// Tracks the three action slots. Mutation only happens through `dispatch`;
/// starting an action clears its previous error, success clears both, and a
/// failure records the message. There is no automatic retry, re-running an
/// action is always an explicit user event.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    load: ActionSlot,
    update: ActionSlot,
    upload: ActionSlot,
}

impl ViewState {
    /// State of a freshly opened screen: the load action is already counted
    /// as in progress, update and upload idle.
    pub fn mounted() -> Self {
        let mut state = Self::default();
        state.dispatch(ActionKind::Load, Outcome::Started);
        state
    }

    pub fn dispatch(&mut self, kind: ActionKind, outcome: Outcome) {
        let slot = self.slot_mut(kind);
        match outcome {
            Outcome::Started => {
                slot.in_progress = true;
                slot.error = None;
            }
            Outcome::Succeeded => {
                slot.in_progress = false;
                slot.error = None;
            }
            Outcome::Failed(message) => {
                slot.in_progress = false;
                slot.error = Some(message);
            }
        }
    }

    pub fn slot(&self, kind: ActionKind) -> &ActionSlot {
        match kind {
            ActionKind::Load => &self.load,
            ActionKind::Update => &self.update,
            ActionKind::Upload => &self.upload,
        }
    }

    fn slot_mut(&mut self, kind: ActionKind) -> &mut ActionSlot {
        match kind {
            ActionKind::Load => &mut self.load,
            ActionKind::Update => &mut self.update,
            ActionKind::Upload => &mut self.upload,
        }
    }
}

/// One open edit screen: its view state plus the form being edited.
///
/// Requests for the same session serialize on the session lock; when two
/// actions overlap across requests, the later write wins on shared fields.
#[derive(Debug)]
pub struct EditSession {
    pub id: Uuid,
    pub product_id: String,
    pub view: ViewState,
    pub form: ProductForm,
}

impl EditSession {
    pub fn mount(product_id: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            view: ViewState::mounted(),
            form: ProductForm::default(),
        }
    }
}

pub type SharedSession = Arc<Mutex<EditSession>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mounted_screen_starts_with_load_in_progress() {
        let state = ViewState::mounted();
        assert!(state.slot(ActionKind::Load).in_progress);
        assert!(state.slot(ActionKind::Load).error.is_none());
        assert_eq!(state.slot(ActionKind::Update), &ActionSlot::default());
        assert_eq!(state.slot(ActionKind::Upload), &ActionSlot::default());
    }

    #[test]
    fn started_sets_in_progress_and_clears_previous_error() {
        let mut state = ViewState::default();
        state.dispatch(ActionKind::Update, Outcome::Failed("boom".to_string()));
        state.dispatch(ActionKind::Update, Outcome::Started);
        let slot = state.slot(ActionKind::Update);
        assert!(slot.in_progress);
        assert!(slot.error.is_none());
    }

    #[test]
    fn success_clears_both_flags() {
        let mut state = ViewState::mounted();
        state.dispatch(ActionKind::Load, Outcome::Succeeded);
        let slot = state.slot(ActionKind::Load);
        assert!(!slot.in_progress);
        assert!(slot.error.is_none());
    }

    #[test]
    fn failure_records_the_message() {
        let mut state = ViewState::mounted();
        state.dispatch(ActionKind::Load, Outcome::Failed("product missing".to_string()));
        let slot = state.slot(ActionKind::Load);
        assert!(!slot.in_progress);
        assert_eq!(slot.error.as_deref(), Some("product missing"));
    }

    #[test]
    fn slots_are_independent() {
        let mut state = ViewState::default();
        state.dispatch(ActionKind::Upload, Outcome::Started);
        state.dispatch(ActionKind::Update, Outcome::Failed("rejected".to_string()));
        assert!(state.slot(ActionKind::Upload).in_progress);
        assert!(state.slot(ActionKind::Upload).error.is_none());
        assert!(!state.slot(ActionKind::Update).in_progress);
        assert_eq!(
            state.slot(ActionKind::Update).error.as_deref(),
            Some("rejected")
        );
        assert!(!state.slot(ActionKind::Load).in_progress);
    }

    #[test]
    fn mount_creates_a_default_form_with_distinct_ids() {
        let a = EditSession::mount("66f1".to_string());
        let b = EditSession::mount("66f1".to_string());
        assert_ne!(a.id, b.id);
        assert_eq!(a.form.vehicles.len(), 1);
    }
}
