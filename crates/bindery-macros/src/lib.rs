//! Derive macros for Bindery.
//!
//! `#[derive(Params)]` turns a struct into a bindable parameter struct.
//! `#[derive(Validate)]` implements field validation alone, for structs that
//! are validated but never bound from a request.
//!
//! Both are re-exported from the `bindery` crate; use them from there.

mod expand;
mod parse;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `Params` and `Validate`.
///
/// The struct needs named fields, no generics, and a [`Default`] impl.
///
/// # Field options
///
/// Written as `#[param(...)]`:
///
/// - `json`, `form`, `path`, `query`, `header`: the source, optionally with
///   a wire name (`query = "limit"`). Without a name the field name is used.
///   Header names are matched lowercased. A field binds from at most one
///   source: when several are given, the first of `json`, `form`, `path`,
///   `query`, `header` not set to `"-"` is used. `json = "-"` keeps a field
///   out of the JSON body.
/// - `default = "..."`: a literal applied before any request data.
/// - `validate = "..."`: validation rules, for example `"min=1,max=100"`.
/// - `nested`: the field is a parameter struct (or a `Vec` of them) decoded
///   from a JSON object.
/// - `flatten`: the field's own fields are promoted into this struct.
///
/// Use `#[params(crate = "...")]` on the struct when the `bindery` crate is
/// reachable under another path.
///
/// # Example
///
/// ```rust,ignore
/// use bindery::Params;
///
/// #[derive(Debug, Default, Params)]
/// struct ListOrders {
///     #[param(path = "customer_id", validate = "intid")]
///     customer_id: String,
///     #[param(query = "limit", default = "20", validate = "min=1,max=100")]
///     limit: i64,
///     #[param(header = "X-Request-ID")]
///     request_id: Option<String>,
/// }
/// ```
#[proc_macro_derive(Params, attributes(param, params))]
pub fn derive_params(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand::expand_params(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derives `Validate`.
///
/// Each field takes `#[validate("rules")]`, or `#[validate(nested)]` /
/// `#[validate(flatten)]` for structs that derive `Validate` themselves.
/// Combine with rules as `#[validate(nested, rules = "nonzero")]`.
/// `#[validate("-")]` skips a field.
#[proc_macro_derive(Validate, attributes(validate))]
pub fn derive_validate(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand::expand_validate(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
