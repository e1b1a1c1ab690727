//! String to value coercion.
//!
//! Every field that can be set from a flat source (header, form, query,
//! path, or a `default` literal) has a type implementing [`Bindable`].
//! Types outside this set are rejected when the parameter struct is
//! compiled, instead of failing at request time.

use crate::{ParseError, TypeRegistry};
use chrono::{DateTime, FixedOffset, Utc};

/// A type that can be parsed from one raw string value.
pub trait Bindable: Sized + 'static {
    /// Parses a fresh value.
    fn parse_new(raw: &str, types: &TypeRegistry) -> Result<Self, ParseError>;

    /// Applies one raw value to an existing slot.
    ///
    /// Scalars replace the current value. Vectors append one element, which
    /// is how repeated query keys accumulate.
    fn bind_into(&mut self, raw: &str, types: &TypeRegistry) -> Result<(), ParseError> {
        *self = Self::parse_new(raw, types)?;
        Ok(())
    }
}

/// Element types accepted inside a bindable `Vec`.
pub trait SliceElement: Bindable {}

macro_rules! bindable_int {
    ($($ty:ty),+) => {
        $(
            impl Bindable for $ty {
                fn parse_new(raw: &str, types: &TypeRegistry) -> Result<Self, ParseError> {
                    if types.contains::<Self>() {
                        return types.parse(raw);
                    }
                    raw.parse().map_err(|source| ParseError::Int {
                        value: raw.to_string(),
                        source,
                    })
                }
            }
        )+
    };
}

macro_rules! bindable_float {
    ($($ty:ty),+) => {
        $(
            impl Bindable for $ty {
                fn parse_new(raw: &str, types: &TypeRegistry) -> Result<Self, ParseError> {
                    if types.contains::<Self>() {
                        return types.parse(raw);
                    }
                    raw.parse().map_err(|source| ParseError::Float {
                        value: raw.to_string(),
                        source,
                    })
                }
            }
        )+
    };
}

bindable_int!(i32, i64);
bindable_float!(f32, f64);

impl Bindable for bool {
    fn parse_new(raw: &str, types: &TypeRegistry) -> Result<Self, ParseError> {
        if types.contains::<Self>() {
            return types.parse(raw);
        }
        match raw {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
            _ => Err(ParseError::Bool {
                value: raw.to_string(),
            }),
        }
    }
}

impl Bindable for String {
    fn parse_new(raw: &str, types: &TypeRegistry) -> Result<Self, ParseError> {
        if types.contains::<Self>() {
            return types.parse(raw);
        }
        Ok(raw.to_string())
    }
}

impl Bindable for DateTime<Utc> {
    fn parse_new(raw: &str, types: &TypeRegistry) -> Result<Self, ParseError> {
        if types.contains::<Self>() {
            return types.parse(raw);
        }
        DateTime::parse_from_rfc3339(raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|source| ParseError::Time {
                value: raw.to_string(),
                source,
            })
    }
}

impl Bindable for DateTime<FixedOffset> {
    fn parse_new(raw: &str, types: &TypeRegistry) -> Result<Self, ParseError> {
        if types.contains::<Self>() {
            return types.parse(raw);
        }
        DateTime::parse_from_rfc3339(raw).map_err(|source| ParseError::Time {
            value: raw.to_string(),
            source,
        })
    }
}

impl SliceElement for String {}
impl SliceElement for i32 {}
impl SliceElement for i64 {}

impl<T: Bindable> Bindable for Option<T> {
    fn parse_new(raw: &str, types: &TypeRegistry) -> Result<Self, ParseError> {
        T::parse_new(raw, types).map(Some)
    }

    fn bind_into(&mut self, raw: &str, types: &TypeRegistry) -> Result<(), ParseError> {
        match self {
            Some(inner) => inner.bind_into(raw, types),
            None => {
                *self = Some(T::parse_new(raw, types)?);
                Ok(())
            }
        }
    }
}

impl<T: SliceElement> Bindable for Vec<T> {
    fn parse_new(raw: &str, types: &TypeRegistry) -> Result<Self, ParseError> {
        Ok(vec![T::parse_new(raw, types)?])
    }

    fn bind_into(&mut self, raw: &str, types: &TypeRegistry) -> Result<(), ParseError> {
        self.push(T::parse_new(raw, types)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CustomType;
    use proptest::prelude::*;

    fn parse<T: Bindable>(raw: &str) -> Result<T, ParseError> {
        T::parse_new(raw, &TypeRegistry::builtin())
    }

    #[test]
    fn test_scalars() {
        assert_eq!(parse::<i32>("1"), Ok(1));
        assert_eq!(parse::<i64>("-7"), Ok(-7));
        assert_eq!(parse::<f32>("1"), Ok(1.0));
        assert_eq!(parse::<f64>("0.1"), Ok(0.1));
        assert_eq!(parse::<String>(""), Ok(String::new()));
    }

    #[test]
    fn test_int_width_is_enforced() {
        assert!(parse::<i32>("4294967296").is_err());
        assert_eq!(parse::<i64>("4294967296"), Ok(4_294_967_296));
    }

    #[test]
    fn test_bool_literals() {
        for t in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(parse::<bool>(t), Ok(true));
        }
        for f in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(parse::<bool>(f), Ok(false));
        }
        assert!(matches!(parse::<bool>("yes"), Err(ParseError::Bool { .. })));
    }

    #[test]
    fn test_option_allocates_then_replaces() {
        let types = TypeRegistry::builtin();
        let mut slot: Option<i64> = None;
        slot.bind_into("10", &types).unwrap();
        assert_eq!(slot, Some(10));
        slot.bind_into("11", &types).unwrap();
        assert_eq!(slot, Some(11));
    }

    #[test]
    fn test_vec_accumulates() {
        let types = TypeRegistry::builtin();
        let mut tags: Vec<String> = Vec::new();
        for raw in ["c", "a", "b"] {
            tags.bind_into(raw, &types).unwrap();
        }
        assert_eq!(tags, vec!["c", "a", "b"]);

        let mut ids: Option<Vec<i32>> = None;
        ids.bind_into("1", &types).unwrap();
        ids.bind_into("2", &types).unwrap();
        assert_eq!(ids, Some(vec![1, 2]));
    }

    #[test]
    fn test_vec_element_error_leaves_slot() {
        let types = TypeRegistry::builtin();
        let mut ids = vec![1i64];
        assert!(ids.bind_into("x", &types).is_err());
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_time_parses_rfc3339() {
        let t: DateTime<Utc> = parse("2050-06-04T05:48:36Z").unwrap();
        assert_eq!(t.to_rfc3339(), "2050-06-04T05:48:36+00:00");
        assert!(parse::<DateTime<Utc>>("2012-01").is_err());
        assert!(parse::<DateTime<Utc>>("2012-01-01T00:00:00Z").is_ok());
    }

    #[test]
    fn test_registered_parser_overrides_builtin() {
        let mut types = TypeRegistry::builtin();
        types.register(CustomType::new(|raw: &str| Ok(raw.len() as i64)));
        assert_eq!(i64::parse_new("abcd", &types), Ok(4));
    }

    proptest! {
        #[test]
        fn prop_i64_round_trips(n in any::<i64>()) {
            prop_assert_eq!(parse::<i64>(&n.to_string()), Ok(n));
        }

        #[test]
        fn prop_f64_round_trips(n in -1.0e12f64..1.0e12) {
            prop_assert_eq!(parse::<f64>(&n.to_string()), Ok(n));
        }

        #[test]
        fn prop_strings_are_verbatim(s in ".*") {
            prop_assert_eq!(parse::<String>(&s), Ok(s.clone()));
        }
    }
}
