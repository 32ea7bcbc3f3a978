//! Macros for reducing boilerplate when defining entities
//!
//! Every record type needs the same three shapes: the record as the server
//! returns it, the create body (its writable fields) and the partial update
//! body (the writable fields, all optional). [`impl_entity!`] generates the
//! three structs from one field list, plus the `Entity` implementation that
//! ties them together.

/// Define an entity with its draft and patch types
///
/// Writable fields go in the first block; server-computed, read-only fields
/// go in the `computed` block and default when absent from a response.
/// The URL segment is the pluralized singular name unless `path:` overrides
/// it.
///
/// # Example
///
/// ```rust,ignore
/// use stockroom::prelude::*;
///
/// impl_entity!(
///     Product,
///     "product",
///     "Product",
///     draft: ProductDraft,
///     patch: ProductPatch,
///     {
///         name: String,
///         sku: String,
///         category: EntityId,
///         selling_price: f64,
///     },
///     computed {
///         category_name: String,
///     }
/// );
///
/// // GET /products/ ; PATCH /products/{id}/
/// assert_eq!(Product::resource_name(), "products");
/// ```
#[macro_export]
macro_rules! impl_entity {
    (
        $type:ident,
        $singular:expr,
        $display:expr,
        $( path: $path:expr, )?
        draft: $draft:ident,
        patch: $patch:ident,
        {
            $( $(#[$meta:meta])* $field:ident : $field_type:ty ),* $(,)?
        }
        $(,)?
        $(
            computed {
                $( $(#[$cmeta:meta])* $computed:ident : $computed_type:ty ),* $(,)?
            }
        )?
        $(,)?
    ) => {
        #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        pub struct $type {
            /// Server-assigned identifier
            pub id: $crate::core::entity::EntityId,
            $( $(#[$meta])* pub $field : $field_type, )*
            $($(
                $(#[$cmeta])*
                #[serde(default)]
                pub $computed : $computed_type,
            )*)?
        }

        #[doc = concat!("Create body and form value for [`", stringify!($type), "`]")]
        #[derive(Debug, Clone, Default, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        pub struct $draft {
            $( $(#[$meta])* pub $field : $field_type, )*
        }

        #[doc = concat!("Partial update body for [`", stringify!($type), "`]; unset fields are omitted")]
        #[derive(Debug, Clone, Default, PartialEq, ::serde::Serialize)]
        pub struct $patch {
            $(
                $(#[$meta])*
                #[serde(skip_serializing_if = "Option::is_none")]
                pub $field : Option<$field_type>,
            )*
        }

        impl From<$draft> for $patch {
            fn from(draft: $draft) -> Self {
                Self {
                    $( $field: Some(draft.$field), )*
                }
            }
        }

        impl $crate::core::entity::Entity for $type {
            type Draft = $draft;
            type Patch = $patch;

            fn resource_name() -> &'static str {
                $crate::impl_entity!(@resource $singular $(, $path)?)
            }

            fn resource_name_singular() -> &'static str {
                $singular
            }

            fn display_name() -> &'static str {
                $display
            }

            fn id(&self) -> $crate::core::entity::EntityId {
                self.id
            }

            fn to_draft(&self) -> $draft {
                $draft {
                    $( $field: self.$field.clone(), )*
                }
            }
        }

        impl $type {
            /// Build the record the server would return for `draft`
            ///
            /// Computed fields start at their defaults.
            pub fn from_draft(id: $crate::core::entity::EntityId, draft: $draft) -> Self {
                Self {
                    id,
                    $( $field: draft.$field, )*
                    $($( $computed: Default::default(), )*)?
                }
            }
        }
    };

    (@resource $singular:expr) => {{
        use std::sync::OnceLock;
        static PLURAL: OnceLock<String> = OnceLock::new();
        PLURAL
            .get_or_init(|| $crate::core::pluralize::Pluralizer::pluralize($singular))
            .as_str()
    }};

    (@resource $singular:expr, $path:expr) => {
        $path
    };
}
