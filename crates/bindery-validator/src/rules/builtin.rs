//! The general purpose rules: `len`, `min`, `max`, `nonzero` and `regexp`.

use super::RuleResult;
use crate::{FieldValue, RuleError};
use parking_lot::RwLock;
use regex::Regex;
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Debug, Clone, Copy)]
enum Bound {
    Exact,
    Min,
    Max,
}

impl Bound {
    fn holds<T: PartialOrd>(self, value: T, param: T) -> bool {
        match self {
            Self::Exact => value == param,
            Self::Min => value >= param,
            Self::Max => value <= param,
        }
    }

    fn error(self) -> RuleError {
        match self {
            Self::Exact => RuleError::Len,
            Self::Min => RuleError::Min,
            Self::Max => RuleError::Max,
        }
    }
}

fn parse_param<T: FromStr>(param: &str) -> Result<T, RuleError> {
    param.parse().map_err(|_| RuleError::BadParameter)
}

fn check_bound(value: &FieldValue<'_>, param: &str, bound: Bound) -> RuleResult {
    let holds = match value {
        FieldValue::Nil => return Ok(()),
        FieldValue::Str(_) | FieldValue::List(_) | FieldValue::Map(_) => {
            let len = value.length().unwrap_or_default() as i64;
            bound.holds(len, parse_param::<i64>(param)?)
        }
        FieldValue::Int(i) => bound.holds(*i, parse_param::<i64>(param)?),
        FieldValue::Uint(u) => bound.holds(*u, parse_param::<u64>(param)?),
        FieldValue::Float(f) => bound.holds(*f, parse_param::<f64>(param)?),
        _ => return Err(RuleError::Unsupported),
    };
    if holds {
        Ok(())
    } else {
        Err(bound.error())
    }
}

/// `len=N`: exact length, count, or value.
pub(crate) fn len(value: &FieldValue<'_>, param: &str) -> RuleResult {
    check_bound(value, param, Bound::Exact)
}

/// `min=N`: inclusive lower bound.
pub(crate) fn min(value: &FieldValue<'_>, param: &str) -> RuleResult {
    check_bound(value, param, Bound::Min)
}

/// `max=N`: inclusive upper bound.
pub(crate) fn max(value: &FieldValue<'_>, param: &str) -> RuleResult {
    check_bound(value, param, Bound::Max)
}

/// `nonzero`: the value must not be its kind's zero value.
pub(crate) fn nonzero(value: &FieldValue<'_>, _param: &str) -> RuleResult {
    if value.is_zero() {
        Err(RuleError::ZeroValue)
    } else {
        Ok(())
    }
}

/// Compiled `regexp` patterns, shared by every evaluation of the rule.
#[derive(Debug, Default)]
pub(crate) struct RegexCache {
    compiled: RwLock<HashMap<String, Regex>>,
}

impl RegexCache {
    // Neither compiling nor matching happens under the lock.
    fn regex(&self, pattern: &str) -> Result<Regex, RuleError> {
        if let Some(re) = self.compiled.read().get(pattern) {
            return Ok(re.clone());
        }
        let re = Regex::new(pattern).map_err(|_| RuleError::BadParameter)?;
        self.compiled
            .write()
            .entry(pattern.to_string())
            .or_insert_with(|| re.clone());
        Ok(re)
    }

    fn is_match(&self, pattern: &str, haystack: &str) -> Result<bool, RuleError> {
        Ok(self.regex(pattern)?.is_match(haystack))
    }

    /// `regexp=PATTERN`: the string must match somewhere.
    pub(crate) fn check(&self, value: &FieldValue<'_>, param: &str) -> RuleResult {
        match value {
            FieldValue::Nil => Ok(()),
            FieldValue::Str(s) => {
                if self.is_match(param, s)? {
                    Ok(())
                } else {
                    Err(RuleError::Regexp)
                }
            }
            _ => Err(RuleError::Unsupported),
        }
    }
}
