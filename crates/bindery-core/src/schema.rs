//! Static field metadata for parameter structs.
//!
//! A [`Schema`] is generated once per parameter struct (by
//! `#[derive(Params)]`) and lives in a `static`. It records, for each
//! field, the wire name and source it binds from, its `default` literal,
//! its `validate` tag, and how it nests.

use crate::ParamSource;

/// The parameter declaration of one field: wire name plus source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamTag {
    /// The external name (query key, header name, JSON key, ...).
    pub name: &'static str,
    /// The channel the field binds from.
    pub source: ParamSource,
}

/// How a field relates to the struct that holds it.
#[derive(Debug, Clone, Copy)]
pub enum FieldShape {
    /// A value parsed from a single string.
    Scalar,
    /// A nested parameter struct, addressed as `field.inner`.
    Nested(fn() -> &'static Schema),
    /// A vector of parameter structs, addressed as `field[i].inner`.
    NestedSlice(fn() -> &'static Schema),
    /// A struct whose fields are promoted into the parent.
    Flatten(fn() -> &'static Schema),
}

impl FieldShape {
    /// Returns the schema of the inner struct, if any.
    pub fn inner(&self) -> Option<&'static Schema> {
        match self {
            Self::Scalar => None,
            Self::Nested(schema) | Self::NestedSlice(schema) | Self::Flatten(schema) => {
                Some(schema())
            }
        }
    }

    /// Returns true for promoted (flattened) structs.
    pub fn is_flatten(&self) -> bool {
        matches!(self, Self::Flatten(_))
    }
}

/// Metadata for one field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSchema {
    /// The Rust field name.
    pub name: &'static str,
    /// The wire declaration, if the field has one.
    pub param: Option<ParamTag>,
    /// The `default` literal.
    pub default: Option<&'static str>,
    /// The `validate` tag.
    pub rules: Option<&'static str>,
    /// Nesting.
    pub shape: FieldShape,
}

impl FieldSchema {
    /// Returns the wire name, if the field declares one.
    pub fn wire_name(&self) -> Option<&'static str> {
        self.param.map(|tag| tag.name)
    }
}

/// Metadata for a parameter struct.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    /// The struct name, for diagnostics.
    pub type_name: &'static str,
    /// Fields, in declaration order.
    pub fields: &'static [FieldSchema],
}

impl Schema {
    /// Finds a field by Rust name, looking through flattened structs.
    pub fn field(&self, name: &str) -> Option<&'static FieldSchema> {
        self.fields.iter().find_map(|field| {
            if field.name == name && !field.shape.is_flatten() {
                Some(field)
            } else if let FieldShape::Flatten(inner) = field.shape {
                inner().field(name)
            } else {
                None
            }
        })
    }
}
