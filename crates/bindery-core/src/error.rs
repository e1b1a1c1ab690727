//! Coercion error types.

use std::num::{ParseFloatError, ParseIntError};

/// A raw string could not be coerced into the field's type.
///
/// This is an expected, client-caused condition; binders report it as a
/// bad request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Not a valid integer for the target width.
    #[error("invalid integer {value:?}: {source}")]
    Int {
        /// The rejected input.
        value: String,
        /// The underlying parse failure.
        #[source]
        source: ParseIntError,
    },

    /// Not a valid floating point number.
    #[error("invalid number {value:?}: {source}")]
    Float {
        /// The rejected input.
        value: String,
        /// The underlying parse failure.
        #[source]
        source: ParseFloatError,
    },

    /// Not one of the accepted boolean literals.
    #[error("invalid boolean {value:?}")]
    Bool {
        /// The rejected input.
        value: String,
    },

    /// Not an RFC 3339 timestamp.
    #[error("invalid time {value:?}: {source}")]
    Time {
        /// The rejected input.
        value: String,
        /// The underlying parse failure.
        #[source]
        source: chrono::ParseError,
    },

    /// Rejected by a custom type parser.
    #[error("{0}")]
    Custom(String),
}

impl ParseError {
    /// Creates a custom parse error.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }
}

/// A `default` literal could not be applied.
///
/// Defaults are part of the struct definition, so this indicates a bug in
/// the parameter struct rather than bad input. Binders panic with it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid default {value:?} for field `{type_name}.{field}`: {source}")]
pub struct DefaultError {
    /// The struct declaring the default.
    pub type_name: &'static str,
    /// The field declaring the default.
    pub field: &'static str,
    /// The literal, after any defaulter ran.
    pub value: String,
    /// Why it failed to parse.
    #[source]
    pub source: ParseError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_error_names_input() {
        let err = "abc".parse::<i64>().unwrap_err();
        let err = ParseError::Int {
            value: "abc".into(),
            source: err,
        };
        assert!(err.to_string().starts_with("invalid integer \"abc\""));
    }

    #[test]
    fn test_default_error_names_field() {
        let err = DefaultError {
            type_name: "Params",
            field: "limit",
            value: "ten".into(),
            source: ParseError::custom("nope"),
        };
        assert_eq!(
            err.to_string(),
            "invalid default \"ten\" for field `Params.limit`: nope"
        );
    }
}
