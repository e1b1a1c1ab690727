//! # Bindery Core
//!
//! Field metadata, string coercion and the custom type registry shared by
//! the binder and the `#[derive(Params)]` macro.
//!
//! Most applications use the `bindery` facade crate instead of depending on
//! this crate directly.
//!
//! ## Custom types
//!
//! A type outside the built-in scalars binds once it has a parser:
//!
//! ```rust
//! use bindery_core::{custom_type, register_custom_type, CustomType, ParseError};
//!
//! #[derive(Debug, PartialEq)]
//! pub struct Slug(String);
//!
//! custom_type!(Slug);
//!
//! register_custom_type(CustomType::new(|raw: &str| {
//!     if raw.chars().all(|c| c.is_ascii_lowercase() || c == '-') {
//!         Ok(Slug(raw.to_string()))
//!     } else {
//!         Err(ParseError::custom("not a slug"))
//!     }
//! }));
//!
//! let slug: Slug = serde_json::from_str("\"hello-world\"").unwrap();
//! assert_eq!(slug, Slug("hello-world".into()));
//! ```

#![doc(html_root_url = "https://docs.rs/bindery-core/0.1.0")]

mod bindable;
mod error;
mod params;
mod schema;
mod source;
mod types;

pub use bindable::{Bindable, SliceElement};
pub use error::{DefaultError, ParseError};
pub use params::Params;
pub use schema::{FieldSchema, FieldShape, ParamTag, Schema};
pub use source::{ParamSource, UnknownSource};
pub use types::{
    global_types, parse_global, register_custom_type, CustomType, Defaulter, TypeRegistry,
};

/// Makes a type bindable through the custom type registry.
///
/// Generates three impls for each listed type:
///
/// - [`Bindable`], parsing with the parser registered for the type;
/// - `Inspect`, reporting the value as opaque to validation rules;
/// - `serde::Deserialize`, accepting a JSON string, number or boolean and
///   parsing its text with the process-wide registry.
///
/// Use `custom_type!(bind_only: T)` to skip the `Deserialize` impl when the
/// type already has one.
#[macro_export]
macro_rules! custom_type {
    (@bind $ty:ty) => {
        impl $crate::Bindable for $ty {
            fn parse_new(
                raw: &str,
                types: &$crate::TypeRegistry,
            ) -> ::std::result::Result<Self, $crate::ParseError> {
                types.parse::<Self>(raw)
            }
        }

        impl $crate::__private::validator::Inspect for $ty {
            fn inspect(&self) -> $crate::__private::validator::FieldValue<'_> {
                $crate::__private::validator::FieldValue::Opaque
            }
        }
    };
    (@deserialize $ty:ty) => {
        impl<'de> $crate::__private::serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: $crate::__private::serde::Deserializer<'de>,
            {
                let raw = $crate::__private::deserialize_scalar(deserializer)?;
                $crate::parse_global::<Self>(&raw)
                    .map_err(<D::Error as $crate::__private::serde::de::Error>::custom)
            }
        }
    };
    (bind_only: $($ty:ty),+ $(,)?) => {
        $( $crate::custom_type!(@bind $ty); )+
    };
    ($($ty:ty),+ $(,)?) => {
        $(
            $crate::custom_type!(@bind $ty);
            $crate::custom_type!(@deserialize $ty);
        )+
    };
}

#[doc(hidden)]
pub mod __private {
    //! Support code for `#[derive(Params)]` and `custom_type!`.

    pub use crate as bindery_core;
    pub use bindery_validator as validator;
    pub use serde;
    pub use serde_json;

    use crate::{Bindable, DefaultError, ParseError, Params, TypeRegistry};
    use serde::de::{self, Deserializer, Visitor};
    use std::fmt;

    pub fn bind_value<T: Bindable>(
        slot: &mut T,
        raw: &str,
        types: &TypeRegistry,
    ) -> Result<(), ParseError> {
        slot.bind_into(raw, types)
    }

    pub fn apply_default<T: Bindable>(
        slot: &mut T,
        type_name: &'static str,
        field: &'static str,
        literal: &str,
        types: &TypeRegistry,
    ) -> Result<(), DefaultError> {
        let value = types.apply_defaulter::<T>(literal);
        slot.bind_into(&value, types)
            .map_err(|source| DefaultError {
                type_name,
                field,
                value,
                source,
            })
    }

    pub fn unknown_field(type_name: &str, field: &str) -> ! {
        panic!("`{type_name}` has no bindable field `{field}`")
    }

    pub fn patch_slice<P: Params>(patches: Vec<P::Patch>) -> Vec<P> {
        patches
            .into_iter()
            .map(|patch| {
                let mut item = P::default();
                item.apply_patch(patch);
                item
            })
            .collect()
    }

    struct ScalarText;

    impl Visitor<'_> for ScalarText {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string, number or boolean")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    /// Reads a JSON scalar as its text.
    pub fn deserialize_scalar<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        deserializer.deserialize_any(ScalarText)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindery_validator::{FieldValue, Inspect};

    #[derive(Debug, PartialEq)]
    struct Hex(u32);

    custom_type!(Hex);

    fn hex() -> CustomType<Hex> {
        CustomType::new(|raw: &str| {
            u32::from_str_radix(raw.trim_start_matches("0x"), 16)
                .map(Hex)
                .map_err(|e| ParseError::custom(e.to_string()))
        })
    }

    #[test]
    fn test_custom_type_binds_through_registry() {
        let mut types = TypeRegistry::new();
        types.register(hex());
        assert_eq!(Hex::parse_new("0xff", &types), Ok(Hex(255)));
        let mut slot: Option<Hex> = None;
        slot.bind_into("10", &types).unwrap();
        assert_eq!(slot, Some(Hex(16)));
    }

    #[test]
    fn test_custom_type_is_opaque() {
        assert!(matches!(Hex(1).inspect(), FieldValue::Opaque));
    }

    #[test]
    fn test_custom_type_deserializes_scalars() {
        register_custom_type(hex());
        assert_eq!(serde_json::from_str::<Hex>("\"0x10\"").unwrap(), Hex(16));
        assert_eq!(serde_json::from_str::<Hex>("10").unwrap(), Hex(16));
        assert!(serde_json::from_str::<Hex>("\"zz\"").is_err());
        assert!(serde_json::from_str::<Hex>("[1]").is_err());
    }

    #[test]
    fn test_apply_default_reports_field() {
        let types = TypeRegistry::new();
        let mut slot = 0i64;
        __private::apply_default(&mut slot, "Page", "limit", "20", &types).unwrap();
        assert_eq!(slot, 20);
        let err = __private::apply_default(&mut slot, "Page", "limit", "x", &types).unwrap_err();
        assert_eq!(err.field, "limit");
        assert_eq!(err.value, "x");
    }

    #[test]
    #[should_panic(expected = "no bindable field `cursor`")]
    fn test_unknown_field_panics() {
        __private::unknown_field("Page", "cursor");
    }
}
