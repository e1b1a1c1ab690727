//! # Bindery Test
//!
//! Test utilities for code that binds parameters with Bindery, without a
//! web framework or a running server.
//!
//! - [`TestRequest`]: builds a buffered `http::Request` plus the route
//!   parameters a router would have matched.
//! - [`TestAdapter`]: hands a [`TestRequest`] to `bind_and_validate`.
//! - [`init_test_logging`]: shows the binder's `tracing` output in test
//!   runs.
//!
//! ## Example
//!
//! ```rust
//! use bindery::{bind_and_validate, Params};
//! use bindery_test::{TestAdapter, TestRequest};
//!
//! #[derive(Debug, Default, Params)]
//! struct GetUser {
//!     #[param(path = "id", validate = "min=1")]
//!     id: i64,
//!     #[param(query = "fields")]
//!     fields: Vec<String>,
//! }
//!
//! let request = TestRequest::get("/users/42?fields=name&fields=email")
//!     .param("id", "42")
//!     .build()
//!     .unwrap();
//!
//! let mut params = GetUser::default();
//! bind_and_validate(&TestAdapter, &mut params, &request).unwrap();
//! assert_eq!(params.id, 42);
//! assert_eq!(params.fields, ["name", "email"]);
//! ```

#![doc(html_root_url = "https://docs.rs/bindery-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod adapter;
mod error;
mod logging;
mod request;

pub use adapter::TestAdapter;
pub use error::TestError;
pub use logging::init_test_logging;
pub use request::{TestRequest, TestRequestBuilder};
