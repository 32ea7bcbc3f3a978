//! List/dialog workflows: the view-level controllers driving the stores
//!
//! A list screen shows one store's rows and opens at most one dialog at a
//! time. [`ListDialogWorkflow`] owns that dialog's state and turns user
//! intents (add, edit, delete, submit, confirm, dismiss) into store calls:
//!
//! ```text
//!            open_create            submit ok
//! Closed ─────────────────> Create ───────────> Closed
//!   │  open_edit(subject)             submit ok
//!   ├─────────────────────> Edit(s) ───────────> Closed
//!   │  open_delete(subject)           confirm (any outcome)
//!   └─────────────────────> ConfirmDelete(s) ──> Closed
//! ```
//!
//! Opening a dialog while another is open replaces it; the newest intent
//! wins. Client-side validation runs before the store is called, and a
//! failed submit keeps the dialog open with its inputs.

pub mod action;
pub mod related;

pub use action::ActionDialog;
pub use related::{RelatedPanel, RelatedSource};

use crate::core::entity::{Entity, EntityId};
use crate::core::error::{ApiError, FieldErrors, ValidationError};
use crate::core::service::EntityApi;
use crate::core::validation::FormData;
use crate::store::EntityStore;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tracing::debug;

/// Why a submit or confirmation did not go through
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkflowError {
    /// The form failed client-side validation; nothing was sent
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The service rejected the request; the store recorded the message
    #[error(transparent)]
    Api(#[from] ApiError),

    /// There was no dialog of the right kind to act on
    #[error("No dialog is open")]
    NoOpenDialog,
}

/// The dialog currently shown over the list
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DialogState<T> {
    #[default]
    Closed,
    /// Create form; never carries a subject
    Create,
    /// Edit form for the subject
    Edit(T),
    /// Delete confirmation for the subject
    ConfirmDelete(T),
}

impl<T> DialogState<T> {
    pub fn is_open(&self) -> bool {
        !matches!(self, DialogState::Closed)
    }

    /// True while a create or edit form is shown
    pub fn is_form(&self) -> bool {
        matches!(self, DialogState::Create | DialogState::Edit(_))
    }

    pub fn subject(&self) -> Option<&T> {
        match self {
            DialogState::Edit(subject) | DialogState::ConfirmDelete(subject) => Some(subject),
            DialogState::Closed | DialogState::Create => None,
        }
    }
}

struct Session<T: Entity> {
    dialog: DialogState<T>,
    form: T::Draft,
    errors: FieldErrors,
    /// Bumped on every transition; an in-flight submit only closes the
    /// dialog it was started from
    generation: u64,
}

impl<T: Entity> Default for Session<T> {
    fn default() -> Self {
        Self {
            dialog: DialogState::Closed,
            form: T::Draft::default(),
            errors: FieldErrors::new(),
            generation: 0,
        }
    }
}

impl<T: Entity> Session<T> {
    fn open(&mut self, dialog: DialogState<T>, form: T::Draft) {
        self.dialog = dialog;
        self.form = form;
        self.errors = FieldErrors::new();
        self.generation += 1;
    }
}

/// Dialog controller for one list screen
pub struct ListDialogWorkflow<T: Entity, A: ?Sized = dyn EntityApi<T>> {
    store: EntityStore<T, A>,
    session: Arc<RwLock<Session<T>>>,
}

impl<T: Entity, A: ?Sized> Clone for ListDialogWorkflow<T, A> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            session: self.session.clone(),
        }
    }
}

impl<T, A> ListDialogWorkflow<T, A>
where
    T: Entity,
    A: EntityApi<T> + ?Sized,
{
    pub fn new(store: EntityStore<T, A>) -> Self {
        Self {
            store,
            session: Arc::new(RwLock::new(Session::default())),
        }
    }

    pub fn store(&self) -> &EntityStore<T, A> {
        &self.store
    }

    // === Lifecycle ===

    /// Initial fetch when the screen appears
    pub async fn mount(&self) -> Result<Vec<T>, ApiError> {
        self.store.list().await
    }

    /// Close any dialog and drop the store's state when the screen goes away
    pub fn unmount(&self) {
        self.write(|s| s.open(DialogState::Closed, T::Draft::default()));
        self.store.reset();
    }

    /// Re-fetch the list
    pub async fn reload(&self) -> Result<Vec<T>, ApiError> {
        self.store.list().await
    }

    /// Run a side operation, then re-fetch the list if it succeeded
    ///
    /// Used after stock adjustments and credit payments, whose effects the
    /// store cannot merge locally. A failing re-fetch is recorded by the
    /// store and does not turn the operation's success into an error.
    pub async fn reload_after<R, Fut>(&self, action: Fut) -> Result<R, WorkflowError>
    where
        Fut: Future<Output = Result<R, WorkflowError>>,
    {
        let result = action.await?;
        if let Err(error) = self.store.list().await {
            debug!(entity = T::resource_name(), error = %error, "re-fetch after action failed");
        }
        Ok(result)
    }

    // === Transitions ===

    pub fn dialog(&self) -> DialogState<T> {
        self.read(|s| s.dialog.clone())
    }

    pub fn is_open(&self) -> bool {
        self.read(|s| s.dialog.is_open())
    }

    /// Show the create form, pre-filled with the type's initial values
    pub fn open_create(&self) {
        debug!(entity = T::resource_name(), "open create dialog");
        self.write(|s| s.open(DialogState::Create, T::Draft::initial()));
    }

    /// Show the edit form, pre-filled from `subject`
    pub fn open_edit(&self, subject: T) {
        debug!(entity = T::resource_name(), id = %subject.id(), "open edit dialog");
        let form = subject.to_draft();
        self.write(|s| s.open(DialogState::Edit(subject), form));
    }

    /// Ask for confirmation before deleting `subject`
    pub fn open_delete(&self, subject: T) {
        debug!(entity = T::resource_name(), id = %subject.id(), "open delete confirmation");
        self.write(|s| s.open(DialogState::ConfirmDelete(subject), T::Draft::default()));
    }

    /// Cancel or outside click
    pub fn dismiss(&self) {
        self.write(|s| s.open(DialogState::Closed, T::Draft::default()));
    }

    // === Form ===

    pub fn form(&self) -> T::Draft {
        self.read(|s| s.form.clone())
    }

    /// Edit the open form; derived fields are recomputed afterwards
    ///
    /// Returns false when no create or edit form is open.
    pub fn update_form<F>(&self, edit: F) -> bool
    where
        F: FnOnce(&mut T::Draft),
    {
        self.write(|s| {
            if !s.dialog.is_form() {
                return false;
            }
            edit(&mut s.form);
            s.form.recompute();
            true
        })
    }

    /// Per-field messages from the last rejected submit
    pub fn field_errors(&self) -> FieldErrors {
        self.read(|s| s.errors.clone())
    }

    // === Confirmation ===

    /// Validate the form and create or update
    ///
    /// On success the dialog closes, unless another one was opened in the
    /// meantime. On failure it stays open with its inputs.
    pub async fn submit(&self) -> Result<T, WorkflowError> {
        let (target, form, generation) = self.read(|s| {
            let target = match &s.dialog {
                DialogState::Create => Some(None),
                DialogState::Edit(subject) => Some(Some(subject.id())),
                DialogState::Closed | DialogState::ConfirmDelete(_) => None,
            };
            (target, s.form.clone(), s.generation)
        });
        let target: Option<EntityId> = target.ok_or(WorkflowError::NoOpenDialog)?;

        let valid = match form.validated() {
            Ok(valid) => valid,
            Err(error) => {
                debug!(entity = T::resource_name(), %error, "form rejected");
                self.write(|s| {
                    if s.generation == generation {
                        s.errors = error.fields.clone();
                    }
                });
                return Err(error.into());
            }
        };
        self.write(|s| s.errors = FieldErrors::new());

        let saved = match target {
            None => self.store.create(&valid).await?,
            Some(id) => self.store.update(id, &T::Patch::from(valid)).await?,
        };
        self.close_if(generation);
        Ok(saved)
    }

    /// Delete the subject of the confirmation
    ///
    /// The confirmation closes whatever the outcome; a failure is reported
    /// through the store's error slot and the returned error.
    pub async fn confirm_delete(&self) -> Result<(), WorkflowError> {
        let (subject, generation) = self.read(|s| match &s.dialog {
            DialogState::ConfirmDelete(subject) => Some((subject.id(), s.generation)),
            _ => None,
        })
        .ok_or(WorkflowError::NoOpenDialog)?;

        let result = self.store.delete(subject).await;
        self.close_if(generation);
        result.map_err(WorkflowError::from)
    }

    fn close_if(&self, generation: u64) {
        self.write(|s| {
            if s.generation == generation {
                s.open(DialogState::Closed, T::Draft::default());
            }
        });
    }

    fn read<R>(&self, f: impl FnOnce(&Session<T>) -> R) -> R {
        f(&self.session.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn write<R>(&self, f: impl FnOnce(&mut Session<T>) -> R) -> R {
        f(&mut self.session.write().unwrap_or_else(PoisonError::into_inner))
    }
}
