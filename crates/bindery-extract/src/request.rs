//! Read access to the parts of a request the binder consumes.

use crate::RouteParams;
use bytes::Bytes;
use http::{header, HeaderMap, Request, Uri};

/// A borrowed request plus its route parameters.
///
/// # Example
///
/// ```rust
/// use bindery_extract::{RequestView, RouteParams};
/// use bytes::Bytes;
/// use http::Request;
///
/// let request = Request::builder()
///     .uri("/users/123?verbose=1")
///     .header("content-type", "application/json")
///     .body(Bytes::from_static(b"{}"))
///     .unwrap();
/// let mut route = RouteParams::new();
/// route.push("id", "123");
///
/// let view = RequestView::new(&request, route);
/// assert_eq!(view.query_string(), Some("verbose=1"));
/// assert_eq!(view.content_type(), Some("application/json"));
/// assert_eq!(view.route_params().get("id"), Some("123"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestView<'a> {
    request: &'a Request<Bytes>,
    route_params: RouteParams,
}

impl<'a> RequestView<'a> {
    /// Creates a view.
    pub fn new(request: &'a Request<Bytes>, route_params: RouteParams) -> Self {
        Self {
            request,
            route_params,
        }
    }

    /// Returns the request URI.
    pub fn uri(&self) -> &'a Uri {
        self.request.uri()
    }

    /// Returns the query string if present.
    pub fn query_string(&self) -> Option<&'a str> {
        self.request.uri().query()
    }

    /// Returns the request headers.
    pub fn headers(&self) -> &'a HeaderMap {
        self.request.headers()
    }

    /// Returns a header value, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&'a str> {
        self.request
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
    }

    /// Returns the Content-Type header value.
    pub fn content_type(&self) -> Option<&'a str> {
        self.header(header::CONTENT_TYPE.as_str())
    }

    /// Returns the body.
    pub fn body(&self) -> &'a Bytes {
        self.request.body()
    }

    /// Returns true if the request carries a body.
    pub fn has_body(&self) -> bool {
        !self.request.body().is_empty()
    }

    /// Returns the route parameters.
    pub fn route_params(&self) -> &RouteParams {
        &self.route_params
    }
}
