//! Macro-generated test suite for `EntityStore<T>` contract validation.
//!
//! The `entity_store_tests!` macro generates a test module checking one
//! entity type's store against the shared contract: every mutation changes
//! the collection only from a successful response, failures leave it as it
//! was, and loading/error state is reset on every path.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod store_harness;
//!
//! use store_harness::*;
//!
//! entity_store_tests!(category_store, Category, category_draft);
//! ```
//!
//! # Generated Tests
//!
//! ## Success paths
//! - `test_create_appears_once_and_is_current`
//! - `test_update_replaces_only_matching_row`
//! - `test_delete_removes_row_and_clears_current`
//! - `test_list_twice_is_stable`
//!
//! ## Failure paths
//! - `test_failed_mutations_leave_collection_unchanged`
//! - `test_failure_message_falls_back_per_operation`
//! - `test_server_detail_is_used_verbatim`
//! - `test_loading_flag_resets_on_failure`
//! - `test_next_operation_clears_error`
//!
//! ## Concurrency
//! - `test_concurrent_creates`

/// Generate an `EntityStore<$entity>` conformance test suite.
///
/// `$draft` must be a function `fn(i64) -> <$entity as Entity>::Draft`
/// returning a distinct, valid draft for each number.
#[macro_export]
macro_rules! entity_store_tests {
    ($module:ident, $entity:ty, $draft:expr) => {
        mod $module {
            use super::*;

            type Draft = <$entity as Entity>::Draft;
            type Patch = <$entity as Entity>::Patch;

            fn draft(n: i64) -> Draft {
                ($draft)(n)
            }

            fn seeded(count: i64) -> Harness<$entity> {
                let rows = (1..=count)
                    .map(|n| <$entity>::from_draft(EntityId(n), draft(n)))
                    .collect();
                Harness::new(rows)
            }

            fn singular() -> String {
                <$entity as Entity>::display_name().to_lowercase()
            }

            // ==================================================================
            // Success paths
            // ==================================================================

            #[tokio::test]
            async fn test_create_appears_once_and_is_current() {
                let mut h = seeded(2);
                h.store.list().await.unwrap();

                let created = h.store.create(&draft(3)).await.unwrap();

                assert_eq!(created.id(), EntityId(3));
                assert_eq!(created.to_draft(), draft(3));
                assert_eq!(h.ids(), vec![1, 2, 3]);
                assert_eq!(h.store.current(), Some(created));

                let messages: Vec<String> =
                    h.notifications().into_iter().map(|n| n.message).collect();
                assert_eq!(
                    messages,
                    vec![format!(
                        "{} created successfully!",
                        <$entity as Entity>::display_name()
                    )]
                );
            }

            #[tokio::test]
            async fn test_update_replaces_only_matching_row() {
                let h = seeded(3);
                h.store.list().await.unwrap();
                let before = h.store.items();

                let updated = h
                    .store
                    .update(EntityId(2), &Patch::from(draft(20)))
                    .await
                    .unwrap();

                assert_eq!(updated.to_draft(), draft(20));
                let after = h.store.items();
                assert_eq!(after.len(), 3);
                assert_eq!(after[0], before[0]);
                assert_eq!(after[1], updated);
                assert_eq!(after[2], before[2]);
            }

            #[tokio::test]
            async fn test_delete_removes_row_and_clears_current() {
                let h = seeded(2);
                h.store.list().await.unwrap();
                h.store.get(EntityId(1)).await.unwrap();

                h.store.delete(EntityId(1)).await.unwrap();

                assert_eq!(h.ids(), vec![2]);
                assert_eq!(h.store.current(), None);
            }

            #[tokio::test]
            async fn test_list_twice_is_stable() {
                let h = seeded(4);
                let first = h.store.list().await.unwrap();
                let second = h.store.list().await.unwrap();
                assert_eq!(first, second);
                assert_eq!(h.store.items(), second);
            }

            // ==================================================================
            // Failure paths
            // ==================================================================

            #[tokio::test]
            async fn test_failed_mutations_leave_collection_unchanged() {
                let h = seeded(2);
                h.store.list().await.unwrap();
                let before = h.store.items();

                h.api.fail_next(ApiError::transport("connection refused"));
                assert!(h.store.create(&draft(9)).await.is_err());
                assert_eq!(h.store.items(), before);

                h.api.fail_next(ApiError::transport("connection refused"));
                assert!(h.store.update(EntityId(1), &Patch::from(draft(9))).await.is_err());
                assert_eq!(h.store.items(), before);

                h.api.fail_next(ApiError::transport("connection refused"));
                assert!(h.store.delete(EntityId(1)).await.is_err());
                assert_eq!(h.store.items(), before);
            }

            #[tokio::test]
            async fn test_failure_message_falls_back_per_operation() {
                let mut h = seeded(1);

                h.api.fail_next(ApiError::transport("timeout"));
                let _ = h.store.list().await;
                assert_eq!(
                    h.store.error(),
                    Some(format!("Failed to fetch {}", <$entity as Entity>::plural_label()))
                );

                h.api.fail_next(ApiError::transport("timeout"));
                let _ = h.store.create(&draft(5)).await;
                assert_eq!(h.store.error(), Some(format!("Failed to create {}", singular())));

                h.api.fail_next(ApiError::transport("timeout"));
                let _ = h.store.update(EntityId(1), &Patch::default()).await;
                assert_eq!(h.store.error(), Some(format!("Failed to update {}", singular())));

                h.api.fail_next(ApiError::transport("timeout"));
                let _ = h.store.delete(EntityId(1)).await;
                assert_eq!(h.store.error(), Some(format!("Failed to delete {}", singular())));

                let notifications = h.notifications();
                assert_eq!(notifications.len(), 4);
                assert!(notifications.iter().all(|n| n.is_error()));
            }

            #[tokio::test]
            async fn test_server_detail_is_used_verbatim() {
                let h = seeded(1);

                let err = h.store.get(EntityId(42)).await.unwrap_err();

                assert!(err.is_not_found());
                assert_eq!(
                    h.store.error(),
                    Some(format!(
                        "No {} matches the given query (id 42).",
                        <$entity as Entity>::resource_name_singular()
                    ))
                );
                assert_eq!(h.store.current(), None);
            }

            #[tokio::test]
            async fn test_loading_flag_resets_on_failure() {
                let h = seeded(1);
                h.api.fail_next(ApiError::Status {
                    status: 500,
                    detail: None,
                });
                assert!(h.store.list().await.is_err());
                assert!(!h.store.is_loading());
            }

            #[tokio::test]
            async fn test_next_operation_clears_error() {
                let h = seeded(1);
                h.api.fail_next(ApiError::transport("timeout"));
                let _ = h.store.list().await;
                assert!(h.store.error().is_some());

                h.store.list().await.unwrap();
                assert_eq!(h.store.error(), None);
            }

            // ==================================================================
            // Concurrency
            // ==================================================================

            #[tokio::test]
            async fn test_concurrent_creates() {
                let h = seeded(0);
                let mut handles = Vec::new();
                for n in 1..=8 {
                    let store = h.store.clone();
                    handles.push(tokio::spawn(async move { store.create(&draft(n)).await }));
                }
                for handle in handles {
                    handle.await.unwrap().unwrap();
                }

                let mut ids = h.ids();
                ids.sort();
                assert_eq!(ids, (1..=8).collect::<Vec<_>>());
                assert!(!h.store.is_loading());
            }
        }
    };
}
