//! Built-in validation rules.

mod builtin;
mod strings;
mod time;

use crate::RuleError;

pub(crate) use builtin::{len, max, min, nonzero, RegexCache};
pub(crate) use strings::{case_insensitive_enum, case_sensitive_enum, intid, url, uuid4};
pub(crate) use time::compare_now;
pub use time::{zero_time, NowSource};

pub(crate) type RuleResult = Result<(), RuleError>;

/// The trailing parameter that marks a rule as optional.
pub(crate) const OPTIONAL: &str = "opt";

/// Splits a `|` separated parameter, removing a trailing `opt`.
///
/// `"a|b"` gives `(["a", "b"], false)` and `"a|opt"` gives `(["a"], true)`.
/// Nothing left after removing `opt` is a bad parameter.
pub(crate) fn split_optional(param: &str) -> Result<(Vec<&str>, bool), RuleError> {
    let mut params: Vec<&str> = param.split('|').collect();
    let optional = params.last() == Some(&OPTIONAL);
    if optional {
        params.pop();
    }
    if params.is_empty() {
        return Err(RuleError::BadParameter);
    }
    Ok((params, optional))
}
