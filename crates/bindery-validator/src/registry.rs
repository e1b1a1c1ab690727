//! The rule registry and the struct walk.

use crate::rules::{self, NowSource, RegexCache};
use crate::tag::parse_tag;
use crate::{ErrorMap, FieldValue, RuleError};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::trace;

/// A validation rule: receives the field value and the tag parameter.
pub type ValidationFn = Arc<dyn Fn(&FieldValue<'_>, &str) -> Result<(), RuleError> + Send + Sync>;

/// A struct whose fields can be validated.
///
/// Usually derived. Implementations report each field to the visitor, in
/// declaration order, together with its `validate` tag.
pub trait Validate {
    /// Reports every field to `visitor`.
    fn validate_fields(&self, visitor: &mut dyn FieldVisitor);
}

/// Receives fields from [`Validate::validate_fields`].
pub trait FieldVisitor {
    /// A field with a `validate` tag.
    fn visit_field(&mut self, name: &str, rules: &str, value: FieldValue<'_>);

    /// A nested struct, or one element of a slice of structs when `index`
    /// is set. Its fields are reported under `name` or `name[index]`.
    fn visit_nested(&mut self, name: &str, index: Option<usize>, value: &dyn Validate);
}

/// A set of named validation rules.
///
/// Most callers use the process-wide instance through [`validate`].
/// Separate registries are mostly useful in tests, to pin the clock used
/// by `comparenow`.
///
/// # Example
///
/// ```rust
/// use bindery_validator::{FieldValue, FieldVisitor, Registry, Validate};
///
/// struct Login {
///     user: String,
/// }
///
/// impl Validate for Login {
///     fn validate_fields(&self, visitor: &mut dyn FieldVisitor) {
///         visitor.visit_field("user", "min=3", FieldValue::Str(&self.user));
///     }
/// }
///
/// let registry = Registry::default();
/// let errors = registry.validate(&Login { user: "al".into() }).unwrap_err();
/// assert_eq!(errors.to_string(), "user: less than min");
/// ```
#[derive(Clone)]
pub struct Registry {
    rules: HashMap<String, ValidationFn>,
}

impl Registry {
    /// Creates a registry with every built-in rule, reading "now" from `now`.
    pub fn new<F>(now: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        let mut registry = Self {
            rules: HashMap::new(),
        };
        registry.set_validation_func("len", rules::len);
        registry.set_validation_func("min", rules::min);
        registry.set_validation_func("max", rules::max);
        registry.set_validation_func("nonzero", rules::nonzero);

        let regexes = Arc::new(RegexCache::default());
        registry.set_validation_func("regexp", move |value, param| regexes.check(value, param));

        registry.set_validation_func("intid", rules::intid);
        registry.set_validation_func("uuid4", rules::uuid4);
        registry.set_validation_func("url", rules::url);
        registry.set_validation_func("enum", rules::case_insensitive_enum);
        registry.set_validation_func("cenum", rules::case_sensitive_enum);

        let now: NowSource = Arc::new(now);
        registry.set_validation_func("comparenow", move |value, param| {
            rules::compare_now(&now, value, param)
        });
        registry
    }

    /// Registers a rule, replacing any rule with the same name.
    pub fn set_validation_func<F>(&mut self, name: impl Into<String>, rule: F)
    where
        F: Fn(&FieldValue<'_>, &str) -> Result<(), RuleError> + Send + Sync + 'static,
    {
        self.rules.insert(name.into(), Arc::new(rule));
    }

    /// Returns true if a rule is registered under `name`.
    pub fn has_rule(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Validates every field of `value`, collecting all violations.
    pub fn validate(&self, value: &dyn Validate) -> Result<(), ErrorMap> {
        let mut collector = Collector {
            registry: self,
            prefix: String::new(),
            errors: ErrorMap::new(),
        };
        value.validate_fields(&mut collector);
        if collector.errors.is_empty() {
            Ok(())
        } else {
            Err(collector.errors)
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Utc::now)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.rules.keys().collect();
        names.sort();
        f.debug_struct("Registry").field("rules", &names).finish()
    }
}

struct Collector<'r> {
    registry: &'r Registry,
    prefix: String,
    errors: ErrorMap,
}

impl FieldVisitor for Collector<'_> {
    fn visit_field(&mut self, name: &str, rules: &str, value: FieldValue<'_>) {
        if rules.trim() == "-" {
            return;
        }
        let path = format!("{}{name}", self.prefix);
        let Some(parsed) = parse_tag(rules) else {
            self.errors.add(path, RuleError::UnknownTag);
            return;
        };
        let registry = self.registry;
        let mut resolved = Vec::with_capacity(parsed.len());
        for rule in &parsed {
            match registry.rules.get(&rule.name) {
                Some(func) => resolved.push((func, rule.param.as_str())),
                None => {
                    self.errors.add(path, RuleError::UnknownTag);
                    return;
                }
            }
        }
        for (func, param) in resolved {
            if let Err(err) = func(&value, param) {
                trace!(field = %path, kind = value.kind(), error = %err, "rule failed");
                self.errors.add(path.clone(), err);
            }
        }
    }

    fn visit_nested(&mut self, name: &str, index: Option<usize>, value: &dyn Validate) {
        let saved = self.prefix.len();
        self.prefix.push_str(name);
        if let Some(index) = index {
            self.prefix.push_str(&format!("[{index}]"));
        }
        self.prefix.push('.');
        value.validate_fields(self);
        self.prefix.truncate(saved);
    }
}

fn global() -> &'static Registry {
    static GLOBAL: OnceLock<Registry> = OnceLock::new();
    GLOBAL.get_or_init(Registry::default)
}

/// Validates `value` with the process-wide registry (wall clock).
pub fn validate(value: &dyn Validate) -> Result<(), ErrorMap> {
    global().validate(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Inner {
        s: String,
    }

    impl Validate for Inner {
        fn validate_fields(&self, visitor: &mut dyn FieldVisitor) {
            visitor.visit_field("s", "len=2", FieldValue::Str(&self.s));
        }
    }

    struct Outer {
        n: i64,
        nested: Inner,
        items: Vec<Inner>,
    }

    impl Validate for Outer {
        fn validate_fields(&self, visitor: &mut dyn FieldVisitor) {
            visitor.visit_field("n", "min=1,max=3", FieldValue::Int(self.n));
            visitor.visit_nested("nested", None, &self.nested);
            for (i, item) in self.items.iter().enumerate() {
                visitor.visit_nested("items", Some(i), item);
            }
        }
    }

    fn outer(n: i64, nested: &str, items: &[&str]) -> Outer {
        Outer {
            n,
            nested: Inner { s: nested.into() },
            items: items.iter().map(|s| Inner { s: (*s).into() }).collect(),
        }
    }

    #[test]
    fn test_valid_struct() {
        let registry = Registry::default();
        assert!(registry.validate(&outer(2, "ab", &["cd", "ef"])).is_ok());
    }

    #[test]
    fn test_nested_paths() {
        let registry = Registry::default();
        let errors = registry.validate(&outer(0, "a", &["cd", "e"])).unwrap_err();

        let paths: Vec<_> = errors.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(paths, vec!["n", "nested.s", "items[1].s"]);
        assert_eq!(errors.get("items[1].s").unwrap().to_string(), "invalid length");
    }

    #[test]
    fn test_unknown_tag_replaces_all_rules() {
        struct T;
        impl Validate for T {
            fn validate_fields(&self, visitor: &mut dyn FieldVisitor) {
                visitor.visit_field("x", "min=5,bogus", FieldValue::Int(1));
            }
        }
        let errors = Registry::default().validate(&T).unwrap_err();
        assert_eq!(errors.get("x").unwrap().errors(), &[RuleError::UnknownTag]);
    }

    #[test]
    fn test_dash_skips_field() {
        struct T;
        impl Validate for T {
            fn validate_fields(&self, visitor: &mut dyn FieldVisitor) {
                visitor.visit_field("x", "-", FieldValue::Int(1));
            }
        }
        assert!(Registry::default().validate(&T).is_ok());
    }

    #[test]
    fn test_every_rule_reports() {
        struct T;
        impl Validate for T {
            fn validate_fields(&self, visitor: &mut dyn FieldVisitor) {
                visitor.visit_field("x", "len=3,regexp=^z", FieldValue::Str("ab"));
            }
        }
        let errors = Registry::default().validate(&T).unwrap_err();
        assert_eq!(
            errors.get("x").unwrap().errors(),
            &[RuleError::Len, RuleError::Regexp]
        );
    }

    #[test]
    fn test_custom_rule() {
        struct T;
        impl Validate for T {
            fn validate_fields(&self, visitor: &mut dyn FieldVisitor) {
                visitor.visit_field("x", "even", FieldValue::Int(3));
            }
        }
        let mut registry = Registry::default();
        registry.set_validation_func("even", |value, _| match value {
            FieldValue::Int(i) if i % 2 == 0 => Ok(()),
            _ => Err(RuleError::message("not even")),
        });
        assert!(registry.has_rule("even"));
        assert_eq!(registry.validate(&T).unwrap_err().to_string(), "x: not even");
    }
}
