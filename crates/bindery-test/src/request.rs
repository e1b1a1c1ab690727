//! Test request building.

use crate::error::TestError;
use bindery::RouteParams;
use bytes::Bytes;
use http::{header, HeaderMap, HeaderName, HeaderValue, Method, Request};
use serde::Serialize;

/// A buffered request together with the route parameters a router would
/// have matched for it.
#[derive(Debug)]
pub struct TestRequest {
    request: Request<Bytes>,
    route_params: RouteParams,
}

impl TestRequest {
    /// Creates a new GET request.
    pub fn get(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::GET, uri)
    }

    /// Creates a new POST request.
    pub fn post(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::POST, uri)
    }

    /// Creates a new PUT request.
    pub fn put(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::PUT, uri)
    }

    /// Creates a new PATCH request.
    pub fn patch(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::PATCH, uri)
    }

    /// Creates a new DELETE request.
    pub fn delete(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::DELETE, uri)
    }

    /// Returns the HTTP request.
    pub fn request(&self) -> &Request<Bytes> {
        &self.request
    }

    /// Returns the route parameters.
    pub fn route_params(&self) -> &RouteParams {
        &self.route_params
    }

    /// Converts this into an HTTP request carrying the route parameters as
    /// a request extension, the form `ExtensionAdapter` reads.
    pub fn into_http_request(self) -> Request<Bytes> {
        let mut request = self.request;
        request.extensions_mut().insert(self.route_params);
        request
    }
}

/// Builder for constructing test requests.
#[must_use]
#[derive(Debug)]
pub struct TestRequestBuilder {
    method: Method,
    uri: String,
    headers: HeaderMap,
    body: Bytes,
    route_params: RouteParams,
    error: Option<TestError>,
}

impl TestRequestBuilder {
    /// Creates a new request builder.
    pub fn new(method: Method, uri: impl AsRef<str>) -> Self {
        Self {
            method,
            uri: uri.as_ref().to_string(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            route_params: RouteParams::new(),
            error: None,
        }
    }

    /// Appends a header. Invalid names or values are reported by
    /// [`build`](Self::build).
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let name = HeaderName::try_from(name.as_ref());
        let value = HeaderValue::try_from(value.as_ref());
        match (name, value) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            (Err(e), _) => self.fail(TestError::InvalidHeader(e.to_string())),
            (_, Err(e)) => self.fail(TestError::InvalidHeader(e.to_string())),
        }
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(mut self, content_type: impl AsRef<str>) -> Self {
        self.headers.remove(header::CONTENT_TYPE);
        self.header(header::CONTENT_TYPE.as_str(), content_type)
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the request body as JSON.
    ///
    /// This also sets the `Content-Type` header to `application/json`.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.body = Bytes::from(bytes),
            Err(e) => self.fail(e.into()),
        }
        self.content_type("application/json")
    }

    /// Sets the request body as form-urlencoded.
    ///
    /// This also sets the `Content-Type` header to
    /// `application/x-www-form-urlencoded`.
    pub fn form<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_urlencoded::to_string(value) {
            Ok(encoded) => self.body = Bytes::from(encoded),
            Err(e) => self.fail(e.into()),
        }
        self.content_type("application/x-www-form-urlencoded")
    }

    /// Adds a matched route parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.route_params.push(name, value);
        self
    }

    /// Builds the test request.
    pub fn build(self) -> Result<TestRequest, TestError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let mut builder = Request::builder().method(self.method).uri(self.uri.as_str());
        if let Some(headers) = builder.headers_mut() {
            headers.extend(self.headers);
        }
        let request = builder
            .body(self.body)
            .map_err(|e| TestError::RequestBuild(e.to_string()))?;
        Ok(TestRequest {
            request,
            route_params: self.route_params,
        })
    }

    fn fail(&mut self, err: TestError) {
        self.error.get_or_insert(err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_request() {
        let request = TestRequest::get("/users?page=2").build().unwrap();
        assert_eq!(request.request().method(), Method::GET);
        assert_eq!(request.request().uri().query(), Some("page=2"));
        assert!(request.request().body().is_empty());
    }

    #[test]
    fn test_repeated_headers() {
        let request = TestRequest::get("/")
            .header("X-Tag", "a")
            .header("X-Tag", "b")
            .build()
            .unwrap();
        let values: Vec<_> = request.request().headers().get_all("x-tag").iter().collect();
        assert_eq!(values, ["a", "b"]);
    }

    #[test]
    fn test_invalid_header() {
        let err = TestRequest::get("/").header("bad header", "x").build().unwrap_err();
        assert!(matches!(err, TestError::InvalidHeader(_)));
    }

    #[test]
    fn test_invalid_uri() {
        let err = TestRequest::get("not a uri").build().unwrap_err();
        assert!(matches!(err, TestError::RequestBuild(_)));
    }

    #[test]
    fn test_json_body() {
        let request = TestRequest::post("/users")
            .json(&json!({"name": "Alice"}))
            .build()
            .unwrap();
        assert_eq!(
            request.request().headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert_eq!(request.request().body().as_ref(), br#"{"name":"Alice"}"#);
    }

    #[test]
    fn test_form_body() {
        let request = TestRequest::post("/users")
            .form(&vec![("name", "Alice B"), ("age", "30")])
            .build()
            .unwrap();
        assert_eq!(
            request.request().headers()[header::CONTENT_TYPE],
            "application/x-www-form-urlencoded"
        );
        assert_eq!(request.request().body().as_ref(), b"name=Alice+B&age=30");
    }

    #[test]
    fn test_content_type_replaces() {
        let request = TestRequest::post("/")
            .content_type("text/plain")
            .content_type("application/xml")
            .build()
            .unwrap();
        let values: Vec<_> = request
            .request()
            .headers()
            .get_all(header::CONTENT_TYPE)
            .iter()
            .collect();
        assert_eq!(values, ["application/xml"]);
    }

    #[test]
    fn test_route_params_become_extension() {
        let request = TestRequest::get("/users/7").param("id", "7").build().unwrap();
        assert_eq!(request.route_params().get("id"), Some("7"));
        let http = request.into_http_request();
        assert_eq!(
            http.extensions().get::<RouteParams>().and_then(|p| p.get("id")),
            Some("7")
        );
    }
}
