//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_slug_id!` macro to create type-safe wrappers around the
//! string slugs the catalog data and CDN use as keys, preventing accidental
//! mixing of identifiers from different entity types.

/// Macro to define a type-safe slug ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`
/// - `From<&str>` and `From<String>` implementations
///
/// # Example
///
/// ```rust
/// # use mjengo_core::define_slug_id;
/// define_slug_id!(ProductId);
/// define_slug_id!(AssetId);
///
/// let product_id = ProductId::new("culvert-900mm");
/// let asset_id = AssetId::new("culvert900_t40svv");
///
/// // These are different types, so this won't compile:
/// // let _: ProductId = asset_id;
/// ```
#[macro_export]
macro_rules! define_slug_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a slug.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying slug.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

// Define standard entity IDs
define_slug_id!(ProductId);
define_slug_id!(AssetId);
