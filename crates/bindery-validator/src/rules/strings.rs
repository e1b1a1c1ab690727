//! String format and membership rules: `intid`, `uuid4`, `url`, `enum`, `cenum`.

use super::{split_optional, RuleResult, OPTIONAL};
use crate::{FieldValue, RuleError};

const INVALID_INT_ID: &str = "not an integer string";
const INVALID_UUID4: &str = "not a uuid4 string";
const INVALID_URL: &str = "not a valid url";

fn check_string(
    value: &FieldValue<'_>,
    param: &str,
    malformed: &'static str,
    valid: fn(&str) -> bool,
) -> RuleResult {
    let s = match value {
        FieldValue::Str(s) => *s,
        FieldValue::Nil => return Ok(()),
        _ => return Err(RuleError::Unsupported),
    };
    if s.is_empty() {
        if param == OPTIONAL {
            return Ok(());
        }
        return Err(RuleError::message(malformed));
    }
    if valid(s) {
        Ok(())
    } else {
        Err(RuleError::message(malformed))
    }
}

/// `"0"`, or digits with no leading zero, sign or decimal point.
fn is_int_id(s: &str) -> bool {
    if s == "0" {
        return true;
    }
    let mut bytes = s.bytes();
    matches!(bytes.next(), Some(b'1'..=b'9')) && bytes.all(|b| b.is_ascii_digit())
}

/// Only the first 32 characters are checked, and dashes count toward them.
fn is_loose_uuid4(s: &str) -> bool {
    s.len() >= 32
        && s.bytes()
            .take(32)
            .all(|b| b.is_ascii_hexdigit() || b == b'-')
}

/// An absolute URL, or an absolute path as sent in a request line.
///
/// Paths accept any byte except ASCII control characters, and every `%`
/// must start a two digit hex escape. A leading `//` is still a path.
fn is_request_uri(s: &str) -> bool {
    if s.bytes().any(|b| b.is_ascii_control()) {
        return false;
    }
    if s.starts_with('/') {
        return has_valid_escapes(s);
    }
    url::Url::parse(s).is_ok()
}

fn has_valid_escapes(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let escape = bytes.get(i + 1..i + 3);
            if !escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}

pub(crate) fn intid(value: &FieldValue<'_>, param: &str) -> RuleResult {
    check_string(value, param, INVALID_INT_ID, is_int_id)
}

pub(crate) fn uuid4(value: &FieldValue<'_>, param: &str) -> RuleResult {
    check_string(value, param, INVALID_UUID4, is_loose_uuid4)
}

pub(crate) fn url(value: &FieldValue<'_>, param: &str) -> RuleResult {
    check_string(value, param, INVALID_URL, is_request_uri)
}

/// `enum=a|b[|opt]`, compared case-insensitively.
pub(crate) fn case_insensitive_enum(value: &FieldValue<'_>, param: &str) -> RuleResult {
    check_enum(value, param, true)
}

/// `cenum=a|b[|opt]`, compared exactly.
pub(crate) fn case_sensitive_enum(value: &FieldValue<'_>, param: &str) -> RuleResult {
    check_enum(value, param, false)
}

fn check_enum(value: &FieldValue<'_>, param: &str, fold_case: bool) -> RuleResult {
    let (choices, optional) = split_optional(param)?;
    let fold = |s: &str| {
        if fold_case {
            s.to_lowercase()
        } else {
            s.to_string()
        }
    };
    let choices: Vec<String> = choices.into_iter().map(fold).collect();

    match value {
        FieldValue::Nil => Ok(()),
        FieldValue::Str(s) => {
            if s.is_empty() {
                if optional {
                    return Ok(());
                }
                return Err(RuleError::message("empty string"));
            }
            let s = fold(s);
            if choices.contains(&s) {
                Ok(())
            } else {
                Err(RuleError::message(format!(
                    "is not one of {}",
                    choices.join("|")
                )))
            }
        }
        FieldValue::List(items) => {
            if optional {
                return Err(RuleError::BadParameter);
            }
            for item in items {
                let FieldValue::Str(s) = item else {
                    return Err(RuleError::Unsupported);
                };
                if !choices.contains(&fold(s)) {
                    return Err(RuleError::message(format!(
                        "element not one of {}",
                        choices.join("|")
                    )));
                }
            }
            Ok(())
        }
        _ => Err(RuleError::Unsupported),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(s: &str) -> RuleResult {
        Err(RuleError::message(s))
    }

    #[test]
    fn test_intid() {
        assert_eq!(intid(&FieldValue::Str("0"), ""), Ok(()));
        assert_eq!(intid(&FieldValue::Str("10"), ""), Ok(()));
        assert_eq!(intid(&FieldValue::Str("01"), ""), msg(INVALID_INT_ID));
        assert_eq!(intid(&FieldValue::Str("-1"), ""), msg(INVALID_INT_ID));
        assert_eq!(intid(&FieldValue::Str("1.1"), ""), msg(INVALID_INT_ID));
        assert_eq!(intid(&FieldValue::Str(""), ""), msg(INVALID_INT_ID));
        assert_eq!(intid(&FieldValue::Str(""), "opt"), Ok(()));
        assert_eq!(intid(&FieldValue::Int(1), ""), Err(RuleError::Unsupported));
    }

    #[test]
    fn test_uuid4_is_prefix_match() {
        assert_eq!(uuid4(&FieldValue::Str("feff425db10e4b5093c34a0124481da4"), ""), Ok(()));
        assert_eq!(
            uuid4(&FieldValue::Str("feff425db10e4b5093c34a0124481da4-trailing junk"), ""),
            Ok(())
        );
        assert_eq!(uuid4(&FieldValue::Str("feff"), ""), msg(INVALID_UUID4));
    }

    #[test]
    fn test_url() {
        assert_eq!(url(&FieldValue::Str("http://foo.com"), ""), Ok(()));
        assert_eq!(url(&FieldValue::Str("/go/lang"), ""), Ok(()));
        assert_eq!(url(&FieldValue::Str("/a b"), ""), Ok(()));
        assert_eq!(url(&FieldValue::Str("//a b/c?q=1"), ""), Ok(()));
        assert_eq!(url(&FieldValue::Str("/a%20b"), ""), Ok(()));
        assert_eq!(url(&FieldValue::Str("/a%2"), ""), msg(INVALID_URL));
        assert_eq!(url(&FieldValue::Str("/a%zzb"), ""), msg(INVALID_URL));
        assert_eq!(url(&FieldValue::Str("/a\nb"), ""), msg(INVALID_URL));
        assert_eq!(url(&FieldValue::Str("http://foo.com/\x7f"), ""), msg(INVALID_URL));
        assert_eq!(url(&FieldValue::Str("foo.com"), ""), msg(INVALID_URL));
        assert_eq!(url(&FieldValue::Str(""), "opt"), Ok(()));
    }

    #[test]
    fn test_enum_optional_must_be_last() {
        assert_eq!(case_insensitive_enum(&FieldValue::Str("opt"), "a|opt|c"), Ok(()));
        assert_eq!(case_insensitive_enum(&FieldValue::Str(""), "a|opt|c"), msg("empty string"));
        assert_eq!(
            case_insensitive_enum(&FieldValue::Str("opt"), "a|b|opt"),
            msg("is not one of a|b")
        );
    }

    #[test]
    fn test_enum_only_opt_is_bad_parameter() {
        assert_eq!(
            case_insensitive_enum(&FieldValue::Str("a"), "opt"),
            Err(RuleError::BadParameter)
        );
    }

    #[test]
    fn test_enum_message_uses_folded_choices() {
        assert_eq!(case_insensitive_enum(&FieldValue::Str("x"), "A|B"), msg("is not one of a|b"));
        assert_eq!(case_sensitive_enum(&FieldValue::Str("x"), "A|B"), msg("is not one of A|B"));
    }
}
