use std::fmt;

use serde_json::{Map, Value};

use crate::error::{Error, ErrorKind, Result};

/// The closed set of body shapes a platform response normalizes into.
///
/// Call sites consume a [`Body`] by exhaustive matching, or through
/// [`Body::into_object`] and [`Body::into_array`] when the protocol fixes
/// the expected shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// The response carried no bytes at all.
    Absent,
    /// The response decoded to a top-level JSON object.
    Object(Map<String, Value>),
    /// The response decoded to a top-level JSON array.
    Array(Vec<Value>),
    /// The response bytes as text: not JSON, or a bare scalar.
    Text(String),
}

impl Body {
    /// Classifies raw response bytes into a [`Body`].
    ///
    /// Empty bytes normalize to [`Body::Absent`] regardless of status.
    /// Bytes decoding to a top-level JSON object or array keep their
    /// structure; everything else, decode failures included, is carried
    /// verbatim as text.
    #[must_use]
    pub fn normalize(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Self::Absent;
        }

        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(object)) => Self::Object(object),
            Ok(Value::Array(items)) => Self::Array(items),
            // Decode failure or a bare scalar at the top level.
            _ => Self::Text(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    /// Extracts the JSON object the protocol expects here.
    ///
    /// # Errors
    ///
    /// Any other body shape is a protocol error carrying the textual form
    /// of the body.
    pub fn into_object(self) -> Result<Map<String, Value>> {
        match self {
            Self::Object(object) => Ok(object),
            other => Err(Error::new(
                ErrorKind::Protocol,
                format!("Expected a JSON object in the response body, got: {other}"),
            )),
        }
    }

    /// Extracts the JSON array the protocol expects here.
    ///
    /// # Errors
    ///
    /// Any other body shape is a protocol error carrying the textual form
    /// of the body.
    pub fn into_array(self) -> Result<Vec<Value>> {
        match self {
            Self::Array(items) => Ok(items),
            other => Err(Error::new(
                ErrorKind::Protocol,
                format!("Expected a JSON array in the response body, got: {other}"),
            )),
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => Ok(()),
            Self::Object(object) => Value::Object(object.clone()).fmt(f),
            Self::Array(items) => Value::Array(items.clone()).fmt(f),
            Self::Text(text) => text.fmt(f),
        }
    }
}

/// A normalized platform response: a status code and a [`Body`].
///
/// Transport-level success (the bytes were read) and domain-level success
/// (status 200) are orthogonal; an [`Envelope`] captures the former and
/// [`Envelope::success`] enforces the latter.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    status: u16,
    body: Body,
}

impl Envelope {
    /// Creates an [`Envelope`] from a status code and an already
    /// normalized [`Body`].
    #[must_use]
    #[inline]
    pub const fn new(status: u16, body: Body) -> Self {
        Self { status, body }
    }

    /// Creates an [`Envelope`] by normalizing raw response bytes.
    #[must_use]
    #[inline]
    pub fn normalize(status: u16, bytes: &[u8]) -> Self {
        Self::new(status, Body::normalize(bytes))
    }

    /// Returns the HTTP status code.
    #[must_use]
    #[inline]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Returns the normalized body.
    #[must_use]
    #[inline]
    pub const fn body(&self) -> &Body {
        &self.body
    }

    /// Enforces the domain success contract: exactly status 200.
    ///
    /// # Errors
    ///
    /// Every other status, 201 and 204 included, is a domain failure whose
    /// message embeds the textual form of the body for diagnostics.
    pub fn success(self) -> Result<Body> {
        if self.status == 200 {
            Ok(self.body)
        } else {
            Err(Error::new(
                ErrorKind::Api,
                format!("Request failed with status {}: {}", self.status, self.body),
            ))
        }
    }
}
