//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i64` (the backend's `Long` keys) with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `PartialOrd`, `Ord`, `Hash`
/// - Conversion methods: `new()`, `as_i64()`
/// - `From<i64>`, `Into<i64>` and `FromStr` implementations
///
/// Ordering is numeric, so maps keyed by these IDs iterate in ascending ID
/// order.
///
/// # Example
///
/// ```rust
/// # use meatshop_core::define_id;
/// define_id!(CustomerId);
/// define_id!(InvoiceId);
///
/// let customer_id = CustomerId::new(1);
/// let invoice_id = InvoiceId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: CustomerId = invoice_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(ProductId);
define_id!(OrderId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_parse_from_str_trims() {
        let id: ProductId = " 42 ".parse().unwrap();
        assert_eq!(id.as_i64(), 42);
        assert!("abc".parse::<ProductId>().is_err());
    }

    #[test]
    fn test_json_map_keys_are_strings() {
        let mut map = BTreeMap::new();
        map.insert(ProductId::new(10), 1);
        map.insert(ProductId::new(2), 2);

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"2":2,"10":1}"#);

        let back: BTreeMap<ProductId, i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_ordering_is_numeric() {
        assert!(ProductId::new(2) < ProductId::new(10));
    }
}
