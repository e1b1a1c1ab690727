//! Custom type registry.
//!
//! Types that are not one of the built-in scalars become bindable by
//! registering a parser (and optionally a defaulter) for them. Lookup is by
//! exact type: registering `UnixTime` covers `UnixTime` fields and the
//! element inside `Option<UnixTime>`, but the defaulter only applies to
//! fields whose declared type is exactly `UnixTime`.

use crate::ParseError;
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::RwLock;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

type TypedParser<T> = Arc<dyn Fn(&str) -> Result<T, ParseError> + Send + Sync>;

/// Transforms a `default` literal before it is parsed.
pub type Defaulter = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// How to bind a custom type `T`.
///
/// # Example
///
/// ```rust
/// use bindery_core::{CustomType, ParseError, TypeRegistry};
///
/// #[derive(Debug, PartialEq)]
/// struct Cents(i64);
///
/// let mut types = TypeRegistry::new();
/// types.register(
///     CustomType::new(|raw: &str| {
///         raw.parse::<f64>()
///             .map(|dollars| Cents((dollars * 100.0).round() as i64))
///             .map_err(|e| ParseError::custom(e.to_string()))
///     })
///     .with_defaulter(|raw: &str| if raw == "free" { "0".into() } else { raw.into() }),
/// );
///
/// assert_eq!(types.parse::<Cents>("1.25"), Ok(Cents(125)));
/// ```
pub struct CustomType<T> {
    parser: TypedParser<T>,
    defaulter: Option<Defaulter>,
}

impl<T: 'static> CustomType<T> {
    /// Creates a definition from a parser.
    pub fn new<F>(parser: F) -> Self
    where
        F: Fn(&str) -> Result<T, ParseError> + Send + Sync + 'static,
    {
        Self {
            parser: Arc::new(parser),
            defaulter: None,
        }
    }

    /// Adds a defaulter, applied to `default` literals of fields of type `T`.
    pub fn with_defaulter<F>(mut self, defaulter: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.defaulter = Some(Arc::new(defaulter));
        self
    }
}

impl<T> fmt::Debug for CustomType<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomType")
            .field("type", &type_name::<T>())
            .field("defaulter", &self.defaulter.is_some())
            .finish()
    }
}

#[derive(Clone)]
struct Entry {
    type_name: &'static str,
    // Holds a `TypedParser<T>` for the keyed type.
    parser: Arc<dyn Any + Send + Sync>,
    defaulter: Option<Defaulter>,
}

/// A set of custom type definitions, keyed by exact type.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    entries: HashMap<TypeId, Entry>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in time types.
    ///
    /// `DateTime<Utc>` and `DateTime<FixedOffset>` parse RFC 3339. Their
    /// defaulter replaces the literal `now` with the current time.
    pub fn builtin() -> Self {
        let mut types = Self::new();
        types.register(
            CustomType::new(|raw: &str| {
                DateTime::parse_from_rfc3339(raw)
                    .map(|t| t.with_timezone(&Utc))
                    .map_err(|source| ParseError::Time {
                        value: raw.to_string(),
                        source,
                    })
            })
            .with_defaulter(default_now),
        );
        types.register(
            CustomType::new(|raw: &str| {
                DateTime::parse_from_rfc3339(raw).map_err(|source| ParseError::Time {
                    value: raw.to_string(),
                    source,
                })
            })
            .with_defaulter(default_now),
        );
        types
    }

    /// Registers a definition, replacing any previous one for `T`.
    pub fn register<T: 'static>(&mut self, def: CustomType<T>) {
        debug!(custom_type = type_name::<T>(), "registering custom type");
        self.entries.insert(
            TypeId::of::<T>(),
            Entry {
                type_name: type_name::<T>(),
                parser: Arc::new(def.parser),
                defaulter: def.defaulter,
            },
        );
    }

    /// Copies every definition of `other` into this registry.
    pub fn extend(&mut self, other: &TypeRegistry) {
        self.entries
            .extend(other.entries.iter().map(|(id, entry)| (*id, entry.clone())));
    }

    /// Returns true if `T` has a registered parser.
    pub fn contains<T: 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Parses `raw` with the parser registered for `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` has no registered parser. Binding a field whose type
    /// was never registered is a bug in the parameter struct.
    pub fn parse<T: 'static>(&self, raw: &str) -> Result<T, ParseError> {
        let parser = self
            .entries
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.parser.downcast_ref::<TypedParser<T>>());
        match parser {
            Some(parser) => parser(raw),
            None => panic!(
                "parameter struct has a field of type `{}` with no registered parser; \
                 register it as a custom type or change the field type",
                type_name::<T>()
            ),
        }
    }

    /// Applies the defaulter registered for exactly `T`, if any.
    pub fn apply_defaulter<T: 'static>(&self, raw: &str) -> String {
        match self
            .entries
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.defaulter.as_ref())
        {
            Some(defaulter) => defaulter(raw),
            None => raw.to_string(),
        }
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.entries.values().map(|e| e.type_name).collect();
        names.sort_unstable();
        f.debug_struct("TypeRegistry").field("types", &names).finish()
    }
}

fn default_now(raw: &str) -> String {
    if raw == "now" {
        Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true)
    } else {
        raw.to_string()
    }
}

fn global() -> &'static RwLock<TypeRegistry> {
    static GLOBAL: OnceLock<RwLock<TypeRegistry>> = OnceLock::new();
    GLOBAL.get_or_init(|| RwLock::new(TypeRegistry::builtin()))
}

/// Registers a custom type for every handler created afterwards.
///
/// Intended for program start-up. Handlers copy the global set when they
/// are created, so registrations do not affect binds already in flight.
pub fn register_custom_type<T: 'static>(def: CustomType<T>) {
    global().write().register(def);
}

/// Returns a copy of the process-wide custom type set.
pub fn global_types() -> TypeRegistry {
    global().read().clone()
}

/// Parses `raw` as `T` using the process-wide registry.
pub fn parse_global<T: 'static>(raw: &str) -> Result<T, ParseError> {
    let types = global().read();
    if !types.contains::<T>() {
        return Err(ParseError::custom(format!(
            "custom type `{}` is not registered",
            type_name::<T>()
        )));
    }
    types.parse(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[derive(Debug, PartialEq)]
    struct Upper(String);

    fn upper() -> CustomType<Upper> {
        CustomType::new(|raw: &str| Ok(Upper(raw.to_uppercase())))
    }

    #[test]
    fn test_register_and_parse() {
        let mut types = TypeRegistry::new();
        types.register(upper());
        assert!(types.contains::<Upper>());
        assert_eq!(types.parse::<Upper>("abc"), Ok(Upper("ABC".into())));
    }

    #[test]
    #[should_panic(expected = "no registered parser")]
    fn test_unregistered_parse_panics() {
        let _ = TypeRegistry::new().parse::<Upper>("abc");
    }

    #[test]
    fn test_defaulter_is_exact_type() {
        let mut types = TypeRegistry::new();
        types.register(upper().with_defaulter(|raw: &str| format!("{raw}{raw}")));
        assert_eq!(types.apply_defaulter::<Upper>("ab"), "abab");
        assert_eq!(types.apply_defaulter::<Option<Upper>>("ab"), "ab");
    }

    #[test]
    fn test_builtin_times() {
        let types = TypeRegistry::builtin();
        let t: DateTime<Utc> = types.parse("2000-02-02T02:02:02.00001-08:00").unwrap();
        assert_eq!(t.to_rfc3339(), "2000-02-02T10:02:02.000010+00:00");
        let fixed: DateTime<FixedOffset> = types.parse("2000-02-02T02:02:02-08:00").unwrap();
        assert_eq!(fixed.offset().utc_minus_local(), 8 * 3600);
        assert!(types.parse::<DateTime<Utc>>("2012-01").is_err());
    }

    #[test]
    fn test_now_defaulter() {
        let types = TypeRegistry::builtin();
        let raw = types.apply_defaulter::<DateTime<Utc>>("now");
        let parsed: DateTime<Utc> = types.parse(&raw).unwrap();
        assert!((Utc::now() - parsed).num_seconds() < 5);
        assert_eq!(types.apply_defaulter::<DateTime<Utc>>("2001-01-01T00:00:00Z"), "2001-01-01T00:00:00Z");
    }

    #[test]
    fn test_extend_copies_entries() {
        let mut a = TypeRegistry::new();
        a.register(upper());
        let mut b = TypeRegistry::builtin();
        b.extend(&a);
        assert!(b.contains::<Upper>());
        assert!(b.contains::<DateTime<Utc>>());
    }
}
