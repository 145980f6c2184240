use std::fmt;

use serde_json::{Map, Value};

use crate::error::{Error, ErrorKind, Result};
use crate::query::Query;

/// The HTTP methods used against the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Retrieves a resource.
    Get,
    /// Creates a resource or triggers a flow.
    Post,
    /// Mutates a resource.
    Put,
    /// Removes a resource.
    Delete,
}

impl Method {
    /// Returns the wire form of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

/// A canonical request descriptor, immutable once built.
///
/// Composed from a method, a resource path relative to the base URL, an
/// optional JSON body, and an optional already-encoded query string.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    method: Method,
    path: String,
    body: Option<Value>,
    query: Option<String>,
}

impl Request {
    const fn new(method: Method, path: String) -> Self {
        Self {
            method,
            path,
            body: None,
            query: None,
        }
    }

    /// Builds a `GET` request for the given path.
    #[must_use]
    #[inline]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path.into())
    }

    /// Builds a `POST` request for the given path.
    #[must_use]
    #[inline]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path.into())
    }

    /// Builds a `PUT` request for the given path.
    #[must_use]
    #[inline]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path.into())
    }

    /// Builds a `DELETE` request for the given path.
    #[must_use]
    #[inline]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path.into())
    }

    /// Builds the `PUT` request of an update operation.
    ///
    /// The body is always `{ "query": <filter>, "$set": <changes> }`: the
    /// filter selects the matched records and `$set` holds the fields to
    /// mutate. An absent filter is serialized as `null`.
    #[must_use]
    pub fn update(path: impl Into<String>, filter: Option<&Query>, changes: Map<String, Value>) -> Self {
        let mut body = Map::new();
        body.insert("query".to_owned(), filter.map_or(Value::Null, Value::from));
        body.insert("$set".to_owned(), Value::Object(changes));
        Self::put(path).with_body(Value::Object(body))
    }

    /// Builds the `DELETE` request of a filter-driven delete operation.
    ///
    /// # Errors
    ///
    /// A filter is mandatory: an absent one fails fast with a precondition
    /// error before any request is issued.
    pub fn delete_matching(path: impl Into<String>, filter: Option<&Query>) -> Result<Self> {
        match filter {
            Some(query) => Ok(Self::delete(path).with_filter(Some(query))),
            None => Err(Error::new(
                ErrorKind::Precondition,
                "Must supply a query to delete",
            )),
        }
    }

    /// Attaches a JSON body.
    #[must_use]
    #[inline]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attaches a record filter as the `query` URL parameter.
    ///
    /// An absent filter attaches no parameter at all, which the platform
    /// distinguishes from an empty-but-present one.
    #[must_use]
    pub fn with_filter(mut self, filter: Option<&Query>) -> Self {
        if let Some(query) = filter {
            self.push_pair(format!("query={}", query.encode()));
        }
        self
    }

    /// Appends one percent-encoded key/value URL parameter.
    #[must_use]
    pub fn with_param(mut self, key: &str, value: &str) -> Self {
        self.push_pair(format!("{key}={}", urlencoding::encode(value)));
        self
    }

    fn push_pair(&mut self, pair: String) {
        self.query = Some(match self.query.take() {
            Some(mut query) => {
                query.push('&');
                query.push_str(&pair);
                query
            }
            None => pair,
        });
    }

    /// Returns the HTTP method.
    #[must_use]
    #[inline]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Returns the resource path, relative to the base URL.
    #[must_use]
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the JSON body, if any.
    #[must_use]
    #[inline]
    pub const fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Returns the encoded query string, if any.
    #[must_use]
    #[inline]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::error::{Error, ErrorKind};
    use crate::query::Query;
    use crate::tests::{changes, condition};

    use super::{Method, Request};

    #[test]
    fn absent_filter_attaches_no_parameter() {
        let request = Request::get("/api/v/1/data/abc").with_filter(None);

        assert_eq!(request.query(), None);
    }

    #[test]
    fn empty_filter_is_a_distinct_wire_value() {
        let request = Request::get("/api/v/1/data/abc").with_filter(Some(&Query::new()));

        assert_eq!(request.query(), Some("query=%5B%5D"));
    }

    #[test]
    fn delete_without_filter_fails_fast() {
        assert_eq!(
            Request::delete_matching("/api/v/1/data/abc", None),
            Err(Error::new(
                ErrorKind::Precondition,
                "Must supply a query to delete"
            ))
        );
    }

    #[test]
    fn update_body_carries_query_and_set() {
        let filter = Query::new().group(vec![condition(json!({"age": {"$gt": 5}}))]);

        let request = Request::update(
            "/api/v/1/data/abc",
            Some(&filter),
            changes(json!({"status": "inactive"})),
        );

        assert_eq!(request.method(), Method::Put);
        assert_eq!(
            request.body(),
            Some(&json!({"query": [[{"age": {"$gt": 5}}]], "$set": {"status": "inactive"}}))
        );
        // The exact serialized form is part of the wire contract.
        assert_eq!(
            serde_json::to_string(request.body().unwrap()).unwrap(),
            r#"{"query":[[{"age":{"$gt":5}}]],"$set":{"status":"inactive"}}"#
        );
    }

    #[test]
    fn update_without_filter_serializes_null_query() {
        let request = Request::update("/api/v/1/data/abc", None, changes(json!({"on": true})));

        assert_eq!(
            request.body(),
            Some(&json!({"query": null, "$set": {"on": true}}))
        );
    }

    #[test]
    fn params_are_percent_encoded_and_appended() {
        let request = Request::delete("/admin/devices/sys/columns")
            .with_param("column_name", "temp reading")
            .with_param("type", "string");

        assert_eq!(
            request.query(),
            Some("column_name=temp%20reading&type=string")
        );
    }
}
