//! The request abstraction the binder consumes.
//!
//! [`RequestParts`] is the boundary between this core and the surrounding
//! transport: header lookup is case-insensitive, query lookup is
//! case-sensitive and multi-valued, path slots are positional values filled
//! by the external router, and the body is raw bytes already read by the
//! transport.

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};
use smallvec::SmallVec;

/// Path-slot values captured by the external router, in template order.
///
/// Slots are matched against declared path parameters by the slot name fixed
/// in the URL template at registration time, so no case folding applies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathSlots {
    slots: SmallVec<[(String, String); 4]>,
}

impl PathSlots {
    /// Creates an empty slot list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a captured slot.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.slots.push((name.into(), value.into()));
    }

    /// Returns the value captured for a template slot.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.slots
            .iter()
            .find(|(slot, _)| slot == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterates over `(name, value)` pairs in template order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.slots.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of captured slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` when no slot was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// All parts of an incoming request the binder can draw from.
#[derive(Debug, Clone)]
pub struct RequestParts {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    path_slots: PathSlots,
}

impl RequestParts {
    /// Creates request parts from their components.
    #[must_use]
    pub fn new(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
        path_slots: PathSlots,
    ) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
            path_slots,
        }
    }

    /// Starts a builder, mainly for tests and transport adapters.
    #[must_use]
    pub fn builder() -> RequestPartsBuilder {
        RequestPartsBuilder::new()
    }

    /// The HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// The path portion of the URI.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// The raw query string, if present.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    /// All request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header, case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Every value of a header, case-insensitively, in arrival order.
    #[must_use]
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// Every value of a query key, matched case-sensitively, in arrival
    /// order. Keys differing only in letter case do not match.
    #[must_use]
    pub fn query_values(&self, key: &str) -> Vec<String> {
        let Some(query) = self.uri.query() else {
            return Vec::new();
        };
        form_urlencoded::parse(query.as_bytes())
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
            .collect()
    }

    /// The raw body bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The `Content-Type` header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header(http::header::CONTENT_TYPE.as_str())
    }

    /// The `Accept` header value.
    #[must_use]
    pub fn accept(&self) -> Option<&str> {
        self.header(http::header::ACCEPT.as_str())
    }

    /// The captured path slots.
    #[must_use]
    pub fn path_slots(&self) -> &PathSlots {
        &self.path_slots
    }
}

/// Builder for [`RequestParts`].
#[derive(Debug, Default)]
pub struct RequestPartsBuilder {
    method: Option<Method>,
    uri: Option<Uri>,
    headers: HeaderMap,
    body: Bytes,
    path_slots: PathSlots,
}

impl RequestPartsBuilder {
    /// Creates a builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the URI.
    #[must_use]
    pub fn uri(mut self, uri: Uri) -> Self {
        self.uri = Some(uri);
        self
    }

    /// Adds a header; invalid names or values are ignored.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            name.parse::<http::header::HeaderName>(),
            value.parse::<http::header::HeaderValue>(),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Sets the body bytes.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Adds a captured path slot.
    #[must_use]
    pub fn path_slot(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_slots.push(name, value);
        self
    }

    /// Builds the request parts. Method defaults to `GET`, URI to `/`.
    #[must_use]
    pub fn build(self) -> RequestParts {
        RequestParts {
            method: self.method.unwrap_or(Method::GET),
            uri: self.uri.unwrap_or_else(|| Uri::from_static("/")),
            headers: self.headers,
            body: self.body,
            path_slots: self.path_slots,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let parts = RequestParts::builder()
            .header("X-Trace-Id", "abc")
            .build();

        assert_eq!(parts.header("x-trace-id"), Some("abc"));
        assert_eq!(parts.header("X-TRACE-ID"), Some("abc"));
    }

    #[test]
    fn test_header_values_in_arrival_order() {
        let parts = RequestParts::builder()
            .header("X-Tag", "one")
            .header("x-tag", "two")
            .build();

        assert_eq!(parts.header_values("X-Tag"), vec!["one", "two"]);
        assert_eq!(parts.header("x-tag"), Some("one"));
    }

    #[test]
    fn test_query_lookup_is_case_sensitive() {
        let parts = RequestParts::builder()
            .uri(Uri::from_static("/items?Limit=5"))
            .build();

        assert_eq!(parts.query_values("Limit"), vec!["5"]);
        assert!(parts.query_values("limit").is_empty());
    }

    #[test]
    fn test_query_repeated_keys() {
        let parts = RequestParts::builder()
            .uri(Uri::from_static("/items?id=1&id=2&other=x"))
            .build();

        assert_eq!(parts.query_values("id"), vec!["1", "2"]);
    }

    #[test]
    fn test_query_percent_decoding() {
        let parts = RequestParts::builder()
            .uri(Uri::from_static("/search?q=rust%20lang"))
            .build();

        assert_eq!(parts.query_values("q"), vec!["rust lang"]);
    }

    #[test]
    fn test_path_slots_positional_order() {
        let mut slots = PathSlots::new();
        slots.push("owner", "ada");
        slots.push("repo", "engine");

        let collected: Vec<(&str, &str)> = slots.iter().collect();
        assert_eq!(collected, [("owner", "ada"), ("repo", "engine")]);
        assert_eq!(slots.get("repo"), Some("engine"));
        assert_eq!(slots.get("missing"), None);
    }

    #[test]
    fn test_builder_defaults() {
        let parts = RequestParts::builder().build();
        assert_eq!(parts.method(), &Method::GET);
        assert_eq!(parts.path(), "/");
        assert!(parts.body().is_empty());
        assert!(parts.path_slots().is_empty());
        assert_eq!(parts.query_string(), None);
    }

    #[test]
    fn test_content_type_and_accept() {
        let parts = RequestParts::builder()
            .header("content-type", "application/json")
            .header("accept", "*/*")
            .build();

        assert_eq!(parts.content_type(), Some("application/json"));
        assert_eq!(parts.accept(), Some("*/*"));
    }
}
