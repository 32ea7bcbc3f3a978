//! Money a customer leaves on account ahead of a purchase

use crate::core::entity::EntityId;
use crate::core::validation::filters::trim;
use crate::core::validation::validators::{message, min_value, positive, required};
use crate::core::validation::{FormData, FormSchema};

crate::impl_entity!(
    CustomerDeposit,
    "customer_deposit",
    "Deposit",
    path: "customers_deposit",
    draft: CustomerDepositDraft,
    patch: CustomerDepositPatch,
    {
        customer: EntityId,
        amount: String,
        #[serde(default)]
        notes: String,
    },
    computed {
        customer_name: String,
        deposit_date: String,
    }
);

impl FormData for CustomerDepositDraft {
    fn schema() -> FormSchema {
        FormSchema::new()
            .filter("amount", trim())
            .filter("notes", trim())
            .validate("customer", message("Customer is required", min_value(1.0)))
            .validate("amount", message("Amount is required", required()))
            .validate("amount", message("Amount must be a positive number", positive()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::Entity;

    #[test]
    fn test_deposit_path() {
        assert_eq!(CustomerDeposit::resource_name(), "customers_deposit");
        assert_eq!(CustomerDeposit::plural_label(), "deposits");
    }

    #[test]
    fn test_deposit_schema_messages() {
        let err = CustomerDepositDraft {
            amount: "-5".to_string(),
            ..Default::default()
        }
        .validated()
        .unwrap_err();

        assert_eq!(err.fields.first("customer"), Some("Customer is required"));
        assert_eq!(err.fields.first("amount"), Some("Amount must be a positive number"));
    }

    #[test]
    fn test_computed_fields_are_read_only() {
        let deposit: CustomerDeposit = serde_json::from_str(
            r#"{"id": 3, "customer": 7, "amount": "20.00", "customer_name": "Ada", "deposit_date": "2024-03-01"}"#,
        )
        .unwrap();
        assert_eq!(deposit.customer_name, "Ada");
        assert_eq!(deposit.notes, "");

        let body = serde_json::to_value(deposit.to_draft()).unwrap();
        assert!(body.get("customer_name").is_none());
        assert_eq!(body["amount"], "20.00");
    }
}
