//! # Bindery Validator
//!
//! A tag-driven validation rule engine.
//!
//! Structs describe their fields through [`Validate`], handing each field's
//! value (as a [`FieldValue`]) and its `validate` tag to a [`FieldVisitor`].
//! A [`Registry`] maps tag names to rule functions, runs every rule of every
//! field, walks nested structs and slices of structs, and returns an
//! [`ErrorMap`] keyed by field path.
//!
//! ## Rules
//!
//! | Tag | Message | Meaning |
//! |-----|---------|---------|
//! | `len=N` | `invalid length` | exact char count, element count, or value |
//! | `min=N` | `less than min` | inclusive lower bound |
//! | `max=N` | `greater than max` | inclusive upper bound |
//! | `nonzero` | `zero value` | not empty, zero, false, or `None` |
//! | `regexp=P` | `regular expression mismatch` | the string matches `P` |
//! | `intid[=opt]` | `not an integer string` | `"0"` or digits without a leading zero |
//! | `uuid4[=opt]` | `not a uuid4 string` | 32 leading hex digits or dashes |
//! | `url[=opt]` | `not a valid url` | absolute URL or absolute path |
//! | `enum=a\|b[\|opt]` | `is not one of a\|b` | case-insensitive membership |
//! | `cenum=a\|b[\|opt]` | `is not one of a\|b` | case-sensitive membership |
//! | `comparenow=rel[\|unit][\|opt]` | `before now`, ... | compares against the registry clock |
//!
//! `None` values pass every rule except `nonzero`.
//!
//! ## Example
//!
//! ```rust
//! use bindery_validator::{FieldValue, FieldVisitor, Inspect, Validate};
//!
//! struct Page {
//!     size: u32,
//!     order: Option<String>,
//! }
//!
//! impl Validate for Page {
//!     fn validate_fields(&self, visitor: &mut dyn FieldVisitor) {
//!         visitor.visit_field("size", "min=1,max=100", self.size.inspect());
//!         visitor.visit_field("order", "enum=asc|desc", Inspect::inspect(&self.order));
//!     }
//! }
//!
//! assert!(bindery_validator::validate(&Page { size: 10, order: None }).is_ok());
//!
//! let errors = bindery_validator::validate(&Page { size: 0, order: Some("up".into()) })
//!     .unwrap_err();
//! assert_eq!(errors.to_string(), "size: less than min | order: is not one of asc|desc");
//! ```

#![doc(html_root_url = "https://docs.rs/bindery-validator/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod registry;
mod rules;
mod tag;
mod value;

pub use error::{ErrorArray, ErrorMap, RuleError};
pub use registry::{validate, FieldVisitor, Registry, Validate, ValidationFn};
pub use rules::{zero_time, NowSource};
pub use tag::{parse_tag, TagRule};
pub use value::{FieldValue, Inspect};

#[doc(hidden)]
pub mod __private {
    pub use crate as validator;
}
