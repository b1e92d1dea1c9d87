//! Logical request values and default parameter handling

use std::collections::BTreeMap;
use std::fmt;

/// Query parameters sent with every request unless overridden
pub const DEFAULT_PARAMS: [(&str, &str); 3] = [
    ("wt", "json"),
    ("omitHeader", "true"),
    ("json.nl", "map"),
];

/// Header sent with every request unless overridden
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// HTTP method of a logical request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Upper-case method name as sent on the wire
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query parameters keyed by name
///
/// A key may carry several values (Solr reads repeated `fq`, `facet.field`,
/// etc.). Overlaying replaces all values of a colliding key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    inner: BTreeMap<String, Vec<String>>,
}

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters every request starts from
    #[must_use]
    pub fn defaults() -> Self {
        DEFAULT_PARAMS.iter().copied().collect()
    }

    /// Set a parameter, replacing any existing values
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(key.into(), vec![value.into()]);
    }

    /// Add a value to a parameter, keeping existing values
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.entry(key.into()).or_default().push(value.into());
    }

    /// Builder-style [`insert`](Self::insert)
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Values of a parameter
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.inner.get(key).map(Vec::as_slice)
    }

    /// First value of a parameter
    #[must_use]
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|values| values.first()).map(String::as_str)
    }

    /// Overlay `other` on top of `self`; keys present in `other` win
    pub fn overlay(&mut self, other: &QueryParams) {
        for (key, values) in &other.inner {
            self.inner.insert(key.clone(), values.clone());
        }
    }

    /// Flattened `(key, value)` pairs in key order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().flat_map(|(key, values)| {
            values.iter().map(move |value| (key.as_str(), value.as_str()))
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.append(key, value);
        }
        params
    }
}

/// Request headers, names stored lower-case
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    inner: BTreeMap<String, String>,
}

impl Headers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Headers every request starts from
    #[must_use]
    pub fn defaults() -> Self {
        Self::new().with("content-type", DEFAULT_CONTENT_TYPE)
    }

    /// Set a header; names are case-insensitive
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.inner
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Builder-style [`insert`](Self::insert)
    #[must_use]
    pub fn with(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Overlay `other` on top of `self`; names present in `other` win
    pub fn overlay(&mut self, other: &Headers) {
        for (name, value) in &other.inner {
            self.inner.insert(name.clone(), value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

/// One logical request, possibly attempted against several hosts
#[derive(Debug, Clone)]
pub struct Request {
    pub path: String,
    pub method: Method,
    pub params: Option<QueryParams>,
    pub headers: Option<Headers>,
    pub body: Option<Vec<u8>>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            params: None,
            headers: None,
            body: None,
        }
    }

    #[must_use]
    pub fn params(mut self, params: QueryParams) -> Self {
        self.params = Some(params);
        self
    }

    #[must_use]
    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Defaults overlaid with the caller's parameters
    #[must_use]
    pub fn effective_params(&self) -> QueryParams {
        let mut params = QueryParams::defaults();
        if let Some(caller) = &self.params {
            params.overlay(caller);
        }
        params
    }

    /// Defaults overlaid with the caller's headers
    #[must_use]
    pub fn effective_headers(&self) -> Headers {
        let mut headers = Headers::defaults();
        if let Some(caller) = &self.headers {
            headers.overlay(caller);
        }
        headers
    }
}
