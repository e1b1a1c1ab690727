//! The parameter struct contract.

use crate::{DefaultError, ParseError, Schema, TypeRegistry};
use bindery_validator::Validate;
use serde::de::DeserializeOwned;

/// A struct whose fields can be bound from a request.
///
/// Implemented by `#[derive(Params)]`. The derive also needs the struct to
/// implement [`Default`] (the binder starts from it) and
/// [`Validate`](bindery_validator::Validate).
pub trait Params: Validate + Default + 'static {
    /// Partial view of the struct used for JSON decoding.
    ///
    /// Every field is optional, so keys absent from the body leave the
    /// current value (for example a default) untouched.
    type Patch: DeserializeOwned;

    /// Returns the static field metadata.
    fn schema() -> &'static Schema;

    /// Binds one raw value to the field named `field`.
    ///
    /// `field` is a Rust field name of this struct or of a flattened
    /// struct inside it. Names always come from [`Schema`], so an unknown
    /// name is a bug and panics.
    fn set_field(&mut self, field: &str, raw: &str, types: &TypeRegistry)
        -> Result<(), ParseError>;

    /// Applies every `default` literal, nested structs first.
    fn apply_defaults(&mut self, types: &TypeRegistry) -> Result<(), DefaultError>;

    /// Merges a decoded JSON body into the struct.
    fn apply_patch(&mut self, patch: Self::Patch);
}
