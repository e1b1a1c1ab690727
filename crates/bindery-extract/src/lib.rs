//! # Bindery Extract
//!
//! Fills parameter structs from HTTP requests.
//!
//! - [`Reflector`]: wire name indexes for a parameter struct type, cached
//!   per type.
//! - [`Binder`]: applies defaults, headers, JSON body, form body, query
//!   string and route parameters, in that order.
//! - [`HttpError`]: the failure returned to the HTTP layer, with its status.
//! - [`BindConfig`]: body size limits.
//!
//! ## Precedence
//!
//! A field declared with `json` accepts values from every channel, so a
//! route parameter overrides a query parameter of the same name, which
//! overrides the body. A field declared with any other source only accepts
//! its own channel.

#![doc(html_root_url = "https://docs.rs/bindery-extract/0.1.0")]

mod binder;
mod config;
mod error;
mod form;
mod json;
mod params;
mod reflector;
mod request;

pub use binder::Binder;
pub use config::{
    BindConfig, ConfigError, MultipartConfig, DEFAULT_MAX_BODY_SIZE, DEFAULT_MAX_FIELDS,
    DEFAULT_MAX_FIELD_SIZE,
};
pub use error::{ErrorKind, HttpError};
pub use params::RouteParams;
pub use reflector::{ParamField, Reflector};
pub use request::RequestView;
