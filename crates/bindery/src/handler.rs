//! Binding and validation for one request.

use crate::Adapter;
use bindery_core::{global_types, CustomType, Params, TypeRegistry};
use bindery_extract::{BindConfig, Binder, HttpError, Reflector, RequestView, RouteParams};
use bindery_validator::{ErrorMap, Registry};
use std::any::type_name;
use tracing::{debug, debug_span};

/// Binds and validates parameter structs from one request.
///
/// Most callers want [`bind_and_validate`]. A handler is useful when only
/// one of the two steps is needed, when several structs are filled from
/// the same request, or when custom types, limits or rules differ from
/// the process-wide ones.
///
/// # Example
///
/// ```rust
/// use bindery::{Handler, Params, StaticAdapter};
/// use bytes::Bytes;
///
/// #[derive(Debug, Default, Params)]
/// struct Page {
///     #[param(query, default = "1", validate = "min=1")]
///     page: i64,
/// }
///
/// let req = http::Request::builder()
///     .uri("/items?page=0")
///     .body(Bytes::new())
///     .unwrap();
/// let adapter = StaticAdapter::new();
/// let handler = Handler::new(&adapter, &req);
///
/// let mut page = Page::default();
/// handler.bind_from_all(&mut page).unwrap();
/// assert_eq!(page.page, 0);
///
/// let err = handler.validate(&page).unwrap_err();
/// assert_eq!(err.status(), 422);
/// assert_eq!(err.to_string(), "page: less than min");
/// ```
#[derive(Debug)]
pub struct Handler<'a> {
    request: RequestView<'a>,
    types: TypeRegistry,
    config: BindConfig,
    validator: Option<&'a Registry>,
}

impl<'a> Handler<'a> {
    /// Creates a handler using the process-wide custom types.
    ///
    /// # Panics
    ///
    /// Panics if the adapter reports route parameter names and values of
    /// different lengths.
    pub fn new<A, Args>(adapter: &A, args: &'a Args) -> Self
    where
        A: Adapter<Args> + ?Sized,
        Args: ?Sized,
    {
        Self::with_types(adapter, args, global_types())
    }

    /// Creates a handler with an explicit custom type set.
    ///
    /// The process-wide registrations are not consulted for binding.
    pub fn with_types<A, Args>(adapter: &A, args: &'a Args, types: TypeRegistry) -> Self
    where
        A: Adapter<Args> + ?Sized,
        Args: ?Sized,
    {
        let route_params = RouteParams::from_lists(
            adapter.route_param_names(args),
            adapter.route_param_values(args),
        );
        Self {
            request: RequestView::new(adapter.request(args), route_params),
            types,
            config: BindConfig::default(),
            validator: None,
        }
    }

    /// Adds a custom type for this handler only.
    pub fn register_custom_type<T: 'static>(mut self, def: CustomType<T>) -> Self {
        self.types.register(def);
        self
    }

    /// Replaces the body limits.
    pub fn with_config(mut self, config: BindConfig) -> Self {
        self.config = config;
        self
    }

    /// Validates with `registry` instead of the process-wide rules.
    pub fn with_validator(mut self, registry: &'a Registry) -> Self {
        self.validator = Some(registry);
        self
    }

    /// Fills `params` from defaults, headers, body, query and route.
    ///
    /// # Panics
    ///
    /// Panics if a `default` literal of `P` is invalid, or if `P` has a
    /// field of a custom type that is not registered.
    pub fn bind_from_all<P: Params>(&self, params: &mut P) -> Result<(), HttpError> {
        Binder::new(self.request.clone(), &self.types, &self.config).bind_from_all(params)
    }

    /// Runs the validation rules of `params`.
    ///
    /// Failures are reported as 422 with one message per violated rule,
    /// prefixed by the field's wire path.
    pub fn validate<P: Params>(&self, params: &P) -> Result<(), HttpError> {
        let result = match self.validator {
            Some(registry) => registry.validate(params),
            None => bindery_validator::validate(params),
        };
        result.map_err(|errors| {
            let reflector = Reflector::for_type::<P>();
            debug!(fields = errors.len(), "parameter validation failed");
            HttpError::validation_failed(format_errors(&reflector, &errors))
        })
    }
}

fn format_errors(reflector: &Reflector, errors: &ErrorMap) -> Vec<String> {
    errors
        .iter()
        .flat_map(|(path, rule_errors)| {
            let wire = reflector.map_field_path(path);
            rule_errors.iter().map(move |err| format!("{wire}: {err}"))
        })
        .collect()
}

/// Binds `params` from the request `adapter` finds in `args`, then
/// validates it.
///
/// On success `params` is fully populated. On failure the error carries
/// the HTTP status to answer with: 400 for malformed input, 413 for an
/// oversized body, 415 for an unreadable content type and 422 for rule
/// violations.
///
/// # Panics
///
/// Panics on bugs in the parameter struct: an invalid `default` literal,
/// or a custom type field with no registered parser.
pub fn bind_and_validate<A, Args, P>(adapter: &A, params: &mut P, args: &Args) -> Result<(), HttpError>
where
    A: Adapter<Args> + ?Sized,
    Args: ?Sized,
    P: Params,
{
    let span = debug_span!("bind_and_validate", params = type_name::<P>());
    let _enter = span.enter();
    let handler = Handler::new(adapter, args);
    handler.bind_from_all(params)?;
    handler.validate(params)
}
