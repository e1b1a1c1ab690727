//! `comparenow`: compares a time field against an injected clock.

use super::{split_optional, RuleResult};
use crate::{FieldValue, RuleError};
use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use std::sync::Arc;

/// A source of the current time.
pub type NowSource = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// The time treated as unset, matching `DateTime::<Utc>::default()`.
///
/// This is the Unix epoch, so a field holding exactly
/// `1970-01-01T00:00:00Z` counts as unset and `comparenow=...|opt` skips
/// it. Use `Option<DateTime<Utc>>` when the epoch is a meaningful value:
/// `None` is the only unset state there and passes every `comparenow`.
pub fn zero_time() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

fn unit(name: &str) -> Option<TimeDelta> {
    match name {
        "second" => Some(TimeDelta::seconds(1)),
        "minute" => Some(TimeDelta::minutes(1)),
        "hour" => Some(TimeDelta::hours(1)),
        "day" => Some(TimeDelta::days(1)),
        _ => None,
    }
}

/// `comparenow=REL[|UNIT][|opt]` where REL is one of `gt`, `gte`, `lt`, `lte`.
///
/// With a UNIT, both sides are truncated to it before comparing. The unit
/// may also come first (`day|lte`).
pub(crate) fn compare_now(now: &NowSource, value: &FieldValue<'_>, param: &str) -> RuleResult {
    let validating = match value {
        FieldValue::Time(t) => *t,
        FieldValue::Nil => return Ok(()),
        _ => return Err(RuleError::Unsupported),
    };
    let (params, optional) = split_optional(param)?;

    let mut current = now();
    let mut compared = validating;
    let relation = match params.as_slice() {
        [relation] => *relation,
        [first, second] => {
            let (step, relation) = match (unit(first), unit(second)) {
                (Some(step), None) => (step, *second),
                (None, Some(step)) => (step, *first),
                _ => return Err(RuleError::BadParameter),
            };
            compared = compared
                .duration_trunc(step)
                .map_err(|_| RuleError::BadParameter)?;
            current = current
                .duration_trunc(step)
                .map_err(|_| RuleError::BadParameter)?;
            relation
        }
        _ => return Err(RuleError::BadParameter),
    };

    let ordering = compared.cmp(&current);
    let failure = match relation {
        "gte" if ordering.is_lt() => Some("before now"),
        "gt" if ordering.is_le() => Some("before or at now"),
        "lte" if ordering.is_gt() => Some("after now"),
        "lt" if ordering.is_ge() => Some("after or at now"),
        "gte" | "gt" | "lte" | "lt" => None,
        _ => return Err(RuleError::BadParameter),
    };
    match failure {
        None => Ok(()),
        Some(_) if optional && validating == zero_time() => Ok(()),
        Some(message) => Err(RuleError::message(message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> NowSource {
        Arc::new(|| Utc.with_ymd_and_hms(2012, 11, 22, 6, 38, 12).unwrap())
    }

    fn at(h: u32, m: u32) -> FieldValue<'static> {
        FieldValue::Time(Utc.with_ymd_and_hms(2012, 11, 22, h, m, 0).unwrap())
    }

    #[test]
    fn test_unit_truncates_both_sides() {
        let now = fixed_now();
        assert_eq!(compare_now(&now, &at(6, 0), "hour|gte"), Ok(()));
        assert_eq!(
            compare_now(&now, &at(6, 0), "gte"),
            Err(RuleError::message("before now"))
        );
        assert_eq!(
            compare_now(&now, &at(6, 0), "day|gt"),
            Err(RuleError::message("before or at now"))
        );
    }

    #[test]
    fn test_unit_after_relation() {
        let now = fixed_now();
        assert_eq!(compare_now(&now, &at(6, 0), "gte|hour"), Ok(()));
        assert_eq!(compare_now(&now, &at(23, 0), "lte|day"), Ok(()));
        assert_eq!(
            compare_now(&now, &at(6, 0), "gt|day|opt"),
            Err(RuleError::message("before or at now"))
        );
        assert_eq!(compare_now(&now, &at(6, 0), "day|hour"), Err(RuleError::BadParameter));
        assert_eq!(compare_now(&now, &at(6, 0), "gt|lt"), Err(RuleError::BadParameter));
    }

    #[test]
    fn test_epoch_is_unset_under_opt() {
        let now = fixed_now();
        let epoch = FieldValue::Time(zero_time());
        assert_eq!(compare_now(&now, &epoch, "gt|opt"), Ok(()));
        assert_eq!(
            compare_now(&now, &epoch, "gt"),
            Err(RuleError::message("before or at now"))
        );
        assert_eq!(compare_now(&now, &FieldValue::Nil, "gt"), Ok(()));
    }

    #[test]
    fn test_bad_parameters() {
        let now = fixed_now();
        assert_eq!(compare_now(&now, &at(6, 0), "eq"), Err(RuleError::BadParameter));
        assert_eq!(compare_now(&now, &at(6, 0), "week|gt"), Err(RuleError::BadParameter));
        assert_eq!(compare_now(&now, &at(6, 0), "opt"), Err(RuleError::BadParameter));
    }

    #[test]
    fn test_non_time_is_unsupported() {
        let now = fixed_now();
        assert_eq!(
            compare_now(&now, &FieldValue::Str("x"), "gt"),
            Err(RuleError::Unsupported)
        );
    }
}
