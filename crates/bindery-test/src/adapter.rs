//! An adapter over [`TestRequest`].

use crate::TestRequest;
use bindery::Adapter;
use bytes::Bytes;
use http::Request;

/// Reads the request and route parameters held by a [`TestRequest`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TestAdapter;

impl Adapter<TestRequest> for TestAdapter {
    fn request<'a>(&self, args: &'a TestRequest) -> &'a Request<Bytes> {
        args.request()
    }

    fn route_param_names(&self, args: &TestRequest) -> Vec<String> {
        args.route_params().names()
    }

    fn route_param_values(&self, args: &TestRequest) -> Vec<String> {
        args.route_params().values()
    }
}
