//! Bridges between a web framework's handler arguments and the binder.

use bindery_extract::RouteParams;
use bytes::Bytes;
use http::Request;

/// How a web framework exposes the request and its route parameters.
///
/// `Args` is whatever the framework hands to a request handler. The
/// binder only needs the buffered request and the matched route
/// parameters, in route order.
///
/// # Example
///
/// ```rust
/// use bindery::Adapter;
/// use bytes::Bytes;
/// use http::Request;
///
/// /// A framework that passes the request and the matched route together.
/// struct Context {
///     request: Request<Bytes>,
///     params: Vec<(String, String)>,
/// }
///
/// struct ContextAdapter;
///
/// impl Adapter<Context> for ContextAdapter {
///     fn request<'a>(&self, args: &'a Context) -> &'a Request<Bytes> {
///         &args.request
///     }
///
///     fn route_param_names(&self, args: &Context) -> Vec<String> {
///         args.params.iter().map(|(name, _)| name.clone()).collect()
///     }
///
///     fn route_param_values(&self, args: &Context) -> Vec<String> {
///         args.params.iter().map(|(_, value)| value.clone()).collect()
///     }
/// }
/// ```
pub trait Adapter<Args: ?Sized> {
    /// Returns the request being handled.
    fn request<'a>(&self, args: &'a Args) -> &'a Request<Bytes>;

    /// Returns the route parameter names, in route order.
    fn route_param_names(&self, args: &Args) -> Vec<String>;

    /// Returns the route parameter values, index-aligned with the names.
    fn route_param_values(&self, args: &Args) -> Vec<String>;
}

impl<A, Args> Adapter<Args> for &A
where
    A: Adapter<Args> + ?Sized,
    Args: ?Sized,
{
    fn request<'a>(&self, args: &'a Args) -> &'a Request<Bytes> {
        (**self).request(args)
    }

    fn route_param_names(&self, args: &Args) -> Vec<String> {
        (**self).route_param_names(args)
    }

    fn route_param_values(&self, args: &Args) -> Vec<String> {
        (**self).route_param_values(args)
    }
}

/// An adapter for plain `http` handlers whose router hands over the route
/// parameters separately from the request.
#[derive(Debug, Clone, Default)]
pub struct StaticAdapter {
    params: RouteParams,
}

impl StaticAdapter {
    /// Creates an adapter without route parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an adapter from index-aligned names and values.
    ///
    /// # Panics
    ///
    /// Panics if the lists differ in length.
    pub fn from_lists(names: Vec<String>, values: Vec<String>) -> Self {
        Self {
            params: RouteParams::from_lists(names, values),
        }
    }

    /// Adds a route parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push(name, value);
        self
    }
}

impl Adapter<Request<Bytes>> for StaticAdapter {
    fn request<'a>(&self, args: &'a Request<Bytes>) -> &'a Request<Bytes> {
        args
    }

    fn route_param_names(&self, _args: &Request<Bytes>) -> Vec<String> {
        self.params.names()
    }

    fn route_param_values(&self, _args: &Request<Bytes>) -> Vec<String> {
        self.params.values()
    }
}

/// An adapter for routers that store matched parameters as a
/// [`RouteParams`] request extension.
///
/// A request without the extension has no route parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionAdapter;

impl Adapter<Request<Bytes>> for ExtensionAdapter {
    fn request<'a>(&self, args: &'a Request<Bytes>) -> &'a Request<Bytes> {
        args
    }

    fn route_param_names(&self, args: &Request<Bytes>) -> Vec<String> {
        args.extensions()
            .get::<RouteParams>()
            .map(RouteParams::names)
            .unwrap_or_default()
    }

    fn route_param_values(&self, args: &Request<Bytes>) -> Vec<String> {
        args.extensions()
            .get::<RouteParams>()
            .map(RouteParams::values)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> Request<Bytes> {
        Request::builder().uri("/notes/7").body(Bytes::new()).unwrap()
    }

    #[test]
    fn test_static_adapter() {
        let adapter = StaticAdapter::new().param("id", "7").param("slug", "x");
        let req = request();
        assert_eq!(adapter.route_param_names(&req), ["id", "slug"]);
        assert_eq!(adapter.route_param_values(&req), ["7", "x"]);
        assert!(std::ptr::eq(adapter.request(&req), &req));
    }

    #[test]
    fn test_extension_adapter() {
        let mut req = request();
        assert!(ExtensionAdapter.route_param_names(&req).is_empty());

        req.extensions_mut()
            .insert([("id", "7")].into_iter().collect::<RouteParams>());
        assert_eq!(ExtensionAdapter.route_param_names(&req), ["id"]);
        assert_eq!(ExtensionAdapter.route_param_values(&req), ["7"]);
    }

    #[test]
    fn test_adapter_by_reference() {
        fn names<A: Adapter<Request<Bytes>>>(adapter: A, req: &Request<Bytes>) -> Vec<String> {
            adapter.route_param_names(req)
        }
        let adapter = StaticAdapter::new().param("id", "1");
        assert_eq!(names(&adapter, &request()), ["id"]);
    }
}
