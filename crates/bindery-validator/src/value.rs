//! Runtime view of field values.
//!
//! Rules never see concrete Rust types. Each field is projected into a
//! [`FieldValue`] through the [`Inspect`] trait, and rules dispatch on the
//! variant, the same way a reflection-based validator dispatches on kind.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// A borrowed, kind-tagged view of a single field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    /// An absent optional value (`None`).
    Nil,
    /// A string value.
    Str(&'a str),
    /// A signed integer, widened to 64 bits.
    Int(i64),
    /// An unsigned integer, widened to 64 bits.
    Uint(u64),
    /// A floating point number, widened to 64 bits.
    Float(f64),
    /// A boolean.
    Bool(bool),
    /// A point in time, normalised to UTC.
    Time(DateTime<Utc>),
    /// A sequence of values.
    List(Vec<FieldValue<'a>>),
    /// A map, represented by its length only.
    Map(usize),
    /// A nested struct. Its own fields are walked separately.
    Struct,
    /// A value the built-in rules do not understand (custom types).
    Opaque,
}

impl FieldValue<'_> {
    /// Returns the length used by `len`, `min` and `max` for sized kinds.
    ///
    /// Strings are measured in characters, not bytes.
    pub fn length(&self) -> Option<usize> {
        match self {
            Self::Str(s) => Some(s.chars().count()),
            Self::List(items) => Some(items.len()),
            Self::Map(len) => Some(*len),
            _ => None,
        }
    }

    /// Returns true if this is the zero value of its kind.
    ///
    /// Structs, times and opaque values are never considered zero.
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Nil => true,
            Self::Str(s) => s.is_empty(),
            Self::Int(i) => *i == 0,
            Self::Uint(u) => *u == 0,
            Self::Float(f) => *f == 0.0,
            Self::Bool(b) => !*b,
            Self::List(items) => items.is_empty(),
            Self::Map(len) => *len == 0,
            Self::Time(_) | Self::Struct | Self::Opaque => false,
        }
    }

    /// Returns a short name for the kind, used in trace output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Str(_) => "string",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Time(_) => "time",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Struct => "struct",
            Self::Opaque => "opaque",
        }
    }
}

/// Projects a value into a [`FieldValue`] for rule evaluation.
pub trait Inspect {
    /// Returns the field value view.
    fn inspect(&self) -> FieldValue<'_>;
}

impl Inspect for String {
    fn inspect(&self) -> FieldValue<'_> {
        FieldValue::Str(self)
    }
}

impl Inspect for str {
    fn inspect(&self) -> FieldValue<'_> {
        FieldValue::Str(self)
    }
}

impl Inspect for &str {
    fn inspect(&self) -> FieldValue<'_> {
        FieldValue::Str(self)
    }
}

macro_rules! inspect_as {
    ($variant:ident, $wide:ty: $($ty:ty),+) => {
        $(
            impl Inspect for $ty {
                fn inspect(&self) -> FieldValue<'_> {
                    FieldValue::$variant(<$wide>::from(*self))
                }
            }
        )+
    };
}

inspect_as!(Int, i64: i8, i16, i32, i64);
inspect_as!(Uint, u64: u8, u16, u32, u64);
inspect_as!(Float, f64: f32, f64);
inspect_as!(Bool, bool: bool);

impl Inspect for isize {
    fn inspect(&self) -> FieldValue<'_> {
        FieldValue::Int(*self as i64)
    }
}

impl Inspect for usize {
    fn inspect(&self) -> FieldValue<'_> {
        FieldValue::Uint(*self as u64)
    }
}

impl<T: Inspect> Inspect for Option<T> {
    fn inspect(&self) -> FieldValue<'_> {
        match self {
            Some(inner) => inner.inspect(),
            None => FieldValue::Nil,
        }
    }
}

impl<T: Inspect> Inspect for Box<T> {
    fn inspect(&self) -> FieldValue<'_> {
        (**self).inspect()
    }
}

impl<T: Inspect> Inspect for Vec<T> {
    fn inspect(&self) -> FieldValue<'_> {
        FieldValue::List(self.iter().map(Inspect::inspect).collect())
    }
}

impl<T: Inspect> Inspect for [T] {
    fn inspect(&self) -> FieldValue<'_> {
        FieldValue::List(self.iter().map(Inspect::inspect).collect())
    }
}

impl<K, V, S: BuildHasher> Inspect for HashMap<K, V, S> {
    fn inspect(&self) -> FieldValue<'_> {
        FieldValue::Map(self.len())
    }
}

impl<K, V> Inspect for BTreeMap<K, V> {
    fn inspect(&self) -> FieldValue<'_> {
        FieldValue::Map(self.len())
    }
}

impl<Tz: TimeZone> Inspect for DateTime<Tz> {
    fn inspect(&self) -> FieldValue<'_> {
        FieldValue::Time(self.with_timezone(&Utc))
    }
}

impl Inspect for NaiveDateTime {
    fn inspect(&self) -> FieldValue<'_> {
        FieldValue::Time(self.and_utc())
    }
}
