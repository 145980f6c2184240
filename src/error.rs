use std::borrow::Cow;
use std::fmt;

/// All the error kinds which may occur while interacting with the platform.
///
/// Transport-side failures (`Encoding`, `Transport`, `Read`) and domain
/// failures (`Api`, `Protocol`) are independent axes: the former mean the
/// request never completed, the latter that the platform answered but the
/// answer denotes a failure. `Auth` and `Precondition` are raised before
/// any network call is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No usable identity was found for the requested operation.
    Auth,
    /// A caller-supplied argument violates an operation precondition.
    Precondition,
    /// A request body or filter could not be serialized to JSON.
    Encoding,
    /// The network call failed before a response was received.
    Transport,
    /// The response body could not be fully read.
    Read,
    /// The platform answered with a status other than 200.
    Api,
    /// The platform answered 200 but the payload violates the protocol.
    Protocol,
}

impl ErrorKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "authentication",
            Self::Precondition => "precondition",
            Self::Encoding => "encoding",
            Self::Transport => "transport",
            Self::Read => "read",
            Self::Api => "api",
            Self::Protocol => "protocol",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

/// A platform client error.
///
/// Underlying causes are folded into the description so that errors remain
/// comparable by value in tests and loggable as plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    description: Cow<'static, str>,
}

impl Error {
    /// Creates an [`Error`] from an [`ErrorKind`] and a description.
    #[must_use]
    #[inline]
    pub fn new(kind: ErrorKind, description: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }

    /// Returns the [`ErrorKind`].
    #[must_use]
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error description.
    #[must_use]
    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind, self.description)
    }
}

impl std::error::Error for Error {}

/// A specialized [`Result`](std::result::Result) for platform operations.
pub type Result<T> = std::result::Result<T, Error>;
