//! Single-purpose dialogs acting on one row (adjust stock, pay credit)

use super::WorkflowError;
use crate::core::error::FieldErrors;
use crate::core::validation::FormData;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

struct ActionSession<T, F> {
    subject: Option<T>,
    form: F,
    errors: FieldErrors,
    generation: u64,
}

/// A dialog holding a subject row and its own form `F`
///
/// The form starts from `F::initial()` every time the dialog opens. Submit
/// validates the form, hands the subject and the validated form to the
/// operation, and closes on success.
pub struct ActionDialog<T, F> {
    session: Arc<RwLock<ActionSession<T, F>>>,
}

impl<T, F> Clone for ActionDialog<T, F> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
        }
    }
}

impl<T, F> Default for ActionDialog<T, F>
where
    T: Clone,
    F: FormData + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, F> ActionDialog<T, F>
where
    T: Clone,
    F: FormData + Clone,
{
    pub fn new() -> Self {
        Self {
            session: Arc::new(RwLock::new(ActionSession {
                subject: None,
                form: F::initial(),
                errors: FieldErrors::new(),
                generation: 0,
            })),
        }
    }

    pub fn open(&self, subject: T) {
        self.write(|s| {
            s.subject = Some(subject);
            s.form = F::initial();
            s.errors = FieldErrors::new();
            s.generation += 1;
        });
    }

    pub fn dismiss(&self) {
        self.write(|s| {
            s.subject = None;
            s.form = F::initial();
            s.errors = FieldErrors::new();
            s.generation += 1;
        });
    }

    pub fn is_open(&self) -> bool {
        self.read(|s| s.subject.is_some())
    }

    pub fn subject(&self) -> Option<T> {
        self.read(|s| s.subject.clone())
    }

    pub fn form(&self) -> F {
        self.read(|s| s.form.clone())
    }

    pub fn update_form(&self, edit: impl FnOnce(&mut F)) -> bool {
        self.write(|s| {
            if s.subject.is_none() {
                return false;
            }
            edit(&mut s.form);
            s.form.recompute();
            true
        })
    }

    pub fn field_errors(&self) -> FieldErrors {
        self.read(|s| s.errors.clone())
    }

    /// Validate, run `operation` on the subject, close on success
    pub async fn submit<R, Op, Fut>(&self, operation: Op) -> Result<R, WorkflowError>
    where
        Op: FnOnce(T, F) -> Fut,
        Fut: Future<Output = Result<R, WorkflowError>>,
    {
        let (subject, form, generation) = self.read(|s| (s.subject.clone(), s.form.clone(), s.generation));
        let subject = subject.ok_or(WorkflowError::NoOpenDialog)?;

        let outcome = match form.validated() {
            Ok(valid) => operation(subject, valid).await,
            Err(error) => Err(error.into()),
        };

        self.write(|s| {
            if s.generation != generation {
                return;
            }
            match &outcome {
                Ok(_) => {
                    s.subject = None;
                    s.form = F::initial();
                    s.errors = FieldErrors::new();
                    s.generation += 1;
                }
                Err(WorkflowError::Validation(error)) => s.errors = error.fields.clone(),
                Err(_) => s.errors = FieldErrors::new(),
            }
        });
        outcome
    }

    fn read<R>(&self, f: impl FnOnce(&ActionSession<T, F>) -> R) -> R {
        f(&self.session.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn write<R>(&self, f: impl FnOnce(&mut ActionSession<T, F>) -> R) -> R {
        f(&mut self.session.write().unwrap_or_else(PoisonError::into_inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::EntityId;
    use crate::core::error::ApiError;
    use crate::core::events::NotificationBus;
    use crate::entities::product::{Product, ProductDraft, ProductStore, StockAdjustmentForm};
    use crate::storage::InMemoryEntityApi;

    fn bolt() -> Product {
        Product::from_draft(
            EntityId(1),
            ProductDraft {
                name: "Bolt".to_string(),
                sku: "B-1".to_string(),
                category: EntityId(1),
                supplier: EntityId(1),
                current_stock: 10.0,
                unit_of_measurement: "pcs".to_string(),
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_adjust_stock_dialog() {
        let api = InMemoryEntityApi::with_rows(vec![bolt()]);
        let store = ProductStore::new(Arc::new(api.clone()), NotificationBus::default());
        let dialog: ActionDialog<Product, StockAdjustmentForm> = ActionDialog::new();

        dialog.open(bolt());
        dialog.update_form(|f| {
            f.adjustment_type = "Increase".to_string();
            f.quantity = "5".to_string();
            f.reason = "Recount".to_string();
        });

        dialog
            .submit(|product, form| {
                let store = store.clone();
                async move {
                    let adjustment = form.into_adjustment()?;
                    store.adjust_stock(product.id, &adjustment).await?;
                    Ok::<(), WorkflowError>(())
                }
            })
            .await
            .unwrap();

        assert!(!dialog.is_open());
        assert_eq!(api.rows()[0].current_stock, 15.0);
    }

    #[tokio::test]
    async fn test_invalid_form_keeps_dialog_open() {
        let dialog: ActionDialog<Product, StockAdjustmentForm> = ActionDialog::new();
        dialog.open(bolt());

        let result: Result<(), _> = dialog.submit(|_, _| async { Ok::<(), WorkflowError>(()) }).await;

        assert!(matches!(result, Err(WorkflowError::Validation(_))));
        assert!(dialog.is_open());
        assert_eq!(
            dialog.field_errors().first("reason"),
            Some("Reason is required")
        );
    }

    #[tokio::test]
    async fn test_failed_operation_keeps_inputs() {
        let dialog: ActionDialog<Product, StockAdjustmentForm> = ActionDialog::new();
        dialog.open(bolt());
        dialog.update_form(|f| {
            f.adjustment_type = "Decrease".to_string();
            f.quantity = "1".to_string();
            f.reason = "Lost".to_string();
        });

        let result: Result<(), _> = dialog
            .submit(|_, _| async { Err(WorkflowError::from(ApiError::transport("offline"))) })
            .await;

        assert!(matches!(result, Err(WorkflowError::Api(_))));
        assert_eq!(dialog.form().reason, "Lost");
    }

    #[test]
    fn test_reopen_starts_blank() {
        let dialog: ActionDialog<Product, StockAdjustmentForm> = ActionDialog::new();
        dialog.open(bolt());
        dialog.update_form(|f| f.quantity = "3".to_string());
        dialog.open(bolt());
        assert_eq!(dialog.form(), StockAdjustmentForm::default());
    }
}
