//! Validation error types.

use indexmap::IndexMap;
use std::fmt;

/// A single rule violation.
///
/// The `Display` output of each variant is the message reported to
/// clients, so the wording is part of the public contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// `nonzero` failed.
    #[error("zero value")]
    ZeroValue,
    /// `len` failed.
    #[error("invalid length")]
    Len,
    /// `min` failed.
    #[error("less than min")]
    Min,
    /// `max` failed.
    #[error("greater than max")]
    Max,
    /// `regexp` failed.
    #[error("regular expression mismatch")]
    Regexp,
    /// The rule parameter is malformed, or the rule does not support it.
    #[error("bad parameter")]
    BadParameter,
    /// The rule cannot be applied to this kind of value.
    #[error("unsupported type")]
    Unsupported,
    /// No rule is registered under the tag name.
    #[error("unknown tag")]
    UnknownTag,
    /// A rule-specific message.
    #[error("{0}")]
    Message(String),
}

impl RuleError {
    /// Creates a rule error carrying a custom message.
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

/// The ordered list of violations for one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorArray(pub Vec<RuleError>);

impl ErrorArray {
    /// Returns the violations in declaration order.
    pub fn errors(&self) -> &[RuleError] {
        &self.0
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the violations.
    pub fn iter(&self) -> std::slice::Iter<'_, RuleError> {
        self.0.iter()
    }
}

impl fmt::Display for ErrorArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorArray {}

impl<'a> IntoIterator for &'a ErrorArray {
    type Item = &'a RuleError;
    type IntoIter = std::slice::Iter<'a, RuleError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Every violation found while validating a struct, keyed by field path.
///
/// Paths use the Rust field names (`note.content`, `items[1].id`); callers
/// that expose them translate to wire names themselves. Insertion order is
/// the order fields were visited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorMap {
    fields: IndexMap<String, ErrorArray>,
}

impl ErrorMap {
    /// Creates an empty error map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation for a field.
    pub fn add(&mut self, field: impl Into<String>, error: RuleError) {
        self.fields.entry(field.into()).or_default().0.push(error);
    }

    /// Returns the violations for a field path.
    pub fn get(&self, field: &str) -> Option<&ErrorArray> {
        self.fields.get(field)
    }

    /// Returns true if no field failed.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the number of failed fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterates over `(field path, violations)` in visit order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, ErrorArray> {
        self.fields.iter()
    }
}

impl fmt::Display for ErrorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, errors)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{field}: {errors}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorMap {}

impl<'a> IntoIterator for &'a ErrorMap {
    type Item = (&'a String, &'a ErrorArray);
    type IntoIter = indexmap::map::Iter<'a, String, ErrorArray>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl FromIterator<(String, ErrorArray)> for ErrorMap {
    fn from_iter<I: IntoIterator<Item = (String, ErrorArray)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_array_display() {
        let errs = ErrorArray(vec![RuleError::message("err1"), RuleError::message("err2")]);
        assert_eq!(errs.to_string(), "err1, err2");
    }

    #[test]
    fn test_error_map_display() {
        let map: ErrorMap = [
            (
                "Abc".to_string(),
                ErrorArray(vec![RuleError::message("err1"), RuleError::message("err2")]),
            ),
            ("Xyz".to_string(), ErrorArray(vec![RuleError::message("err3")])),
        ]
        .into_iter()
        .collect();

        assert_eq!(map.to_string(), "Abc: err1, err2 | Xyz: err3");
    }

    #[test]
    fn test_error_map_add_groups_by_field() {
        let mut map = ErrorMap::new();
        map.add("s", RuleError::Len);
        map.add("i", RuleError::Min);
        map.add("s", RuleError::Regexp);

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("s").map(ErrorArray::len), Some(2));
        assert_eq!(map.get("s").unwrap().to_string(), "invalid length, regular expression mismatch");
    }

    #[test]
    fn test_builtin_messages() {
        assert_eq!(RuleError::ZeroValue.to_string(), "zero value");
        assert_eq!(RuleError::BadParameter.to_string(), "bad parameter");
        assert_eq!(RuleError::UnknownTag.to_string(), "unknown tag");
        assert_eq!(RuleError::Unsupported.to_string(), "unsupported type");
    }
}
