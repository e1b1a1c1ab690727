//! # Bindery
//!
//! **Declarative request parameter binding and validation.**
//!
//! Describe a handler's parameters as a struct, and Bindery fills it from
//! the request and checks it against declared rules:
//!
//! ```rust
//! use bindery::{bind_and_validate, Params, StaticAdapter};
//! use bytes::Bytes;
//!
//! #[derive(Debug, Default, Params)]
//! struct NoteParams {
//!     #[param(json = "id", validate = "min=1")]
//!     id: i64,
//!     #[param(json = "pretty")]
//!     pretty: bool,
//!     #[param(json = "note", nested)]
//!     note: Note,
//! }
//!
//! #[derive(Debug, Default, Params)]
//! struct Note {
//!     #[param(json = "content", default = "hello", validate = "max=256")]
//!     content: String,
//! }
//!
//! let req = http::Request::builder()
//!     .method("POST")
//!     .uri("/notes/123?pretty=true")
//!     .header("content-type", "application/json")
//!     .body(Bytes::from_static(b"{}"))
//!     .unwrap();
//! let adapter = StaticAdapter::new().param("id", "123");
//!
//! let mut params = NoteParams::default();
//! bind_and_validate(&adapter, &mut params, &req).unwrap();
//! assert_eq!(params.id, 123);
//! assert!(params.pretty);
//! assert_eq!(params.note.content, "hello");
//! ```
//!
//! ## Sources and precedence
//!
//! Each field binds from at most one source: `json`, `form`, `path`,
//! `query` or `header`. Values are applied in this order, later ones
//! overriding earlier ones:
//!
//! ```text
//! default → headers → JSON body → form body → query string → route
//! ```
//!
//! A `json` field accepts a value from every stage. Any other source only
//! accepts its own stage, so a `path` field can never be set from the query
//! string.
//!
//! ## Errors
//!
//! | Status | Cause |
//! |--------|-------|
//! | 400 | malformed JSON, or a value that does not parse into its field |
//! | 413 | body over the configured limit |
//! | 415 | a body whose content type is neither JSON nor a form |
//! | 422 | validation rules failed; one message per rule, e.g. `nested.s: invalid length` |
//!
//! Mistakes in the parameter struct itself (an unparseable `default`, a
//! custom type without a parser) panic instead.
//!
//! ## Crates
//!
//! - [`core`]: field metadata, coercion and custom types
//! - [`validator`]: the validation rule engine
//! - [`extract`]: the binder and reflector

#![doc(html_root_url = "https://docs.rs/bindery/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod adapter;
mod handler;

pub use adapter::{Adapter, ExtensionAdapter, StaticAdapter};
pub use handler::{bind_and_validate, Handler};

// Re-export the member crates
pub use bindery_core as core;
pub use bindery_extract as extract;
pub use bindery_validator as validator;

// Re-export the derive macros alongside their traits
pub use bindery_core::Params;
pub use bindery_macros::{Params, Validate};
pub use bindery_validator::Validate;

pub use bindery_core::{
    custom_type, global_types, register_custom_type, Bindable, CustomType, ParseError,
    TypeRegistry,
};
pub use bindery_extract::{BindConfig, ErrorKind, HttpError, MultipartConfig, RouteParams};
pub use bindery_validator::{ErrorArray, ErrorMap, Registry, RuleError};

#[doc(hidden)]
pub use bindery_core::__private;

/// Prelude module for convenient imports.
///
/// ```rust
/// use bindery::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        bind_and_validate, custom_type, Adapter, BindConfig, CustomType, Handler, HttpError,
        Params, Registry, StaticAdapter, Validate,
    };
}
