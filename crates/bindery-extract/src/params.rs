//! Route parameter storage.
//!
//! Route parameters arrive from the routing layer as parallel name and
//! value lists. [`RouteParams`] keeps them paired and in route order,
//! using a small-vector optimization since most routes have few segments.

use smallvec::SmallVec;

/// Maximum number of parameters stored inline (stack allocated).
const INLINE_PARAMS: usize = 4;

/// Named route segments, in route order.
///
/// Can also be stored in request extensions, where
/// `ExtensionAdapter` in the `bindery` crate finds it.
///
/// # Example
///
/// ```rust
/// use bindery_extract::RouteParams;
///
/// let mut params = RouteParams::new();
/// params.push("userId", "123");
/// params.push("action", "view");
///
/// assert_eq!(params.get("userId"), Some("123"));
/// assert_eq!(params.get("unknown"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RouteParams {
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl RouteParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs names with values.
    ///
    /// # Panics
    ///
    /// Panics if the lists differ in length. An adapter that reports
    /// mismatched lists is broken.
    pub fn from_lists(names: Vec<String>, values: Vec<String>) -> Self {
        assert_eq!(
            names.len(),
            values.len(),
            "route parameter names and values differ in length"
        );
        Self {
            inner: names.into_iter().zip(values).collect(),
        }
    }

    /// Adds a parameter.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns the first value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns the parameters in route order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Returns the names in route order.
    pub fn names(&self) -> Vec<String> {
        self.inner.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Returns the values in route order.
    pub fn values(&self) -> Vec<String> {
        self.inner.iter().map(|(_, v)| v.clone()).collect()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for RouteParams {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            inner: iter
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }
}
