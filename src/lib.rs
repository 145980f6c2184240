//! The `clearblade` library crate provides a blocking client for the
//! `ClearBlade` platform HTTP API on behalf of three identity roles:
//! end-users, developers, and constrained devices.
//!
//! Every domain call goes through one request-dispatch pipeline:
//!
//! - Resolving the credentials of a role from its current identity state
//! - Constructing a canonical request descriptor, optionally carrying a
//!   structured record filter encoded as a `query` URL parameter
//! - Executing the blocking HTTP call against the platform
//! - Normalizing the response body into a small closed set of result shapes
//!
//! On top of the pipeline, the crate exposes collection data CRUD, device
//! CRUD, and the developer-side device key-set and column lifecycle.
//!
//! All operations are synchronous; the only suspension points are the
//! network stages inside the transport. Retries, timeouts, caching, and
//! connection pooling beyond what the underlying HTTP client provides are
//! left to the caller.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Role-aware clients for interacting with the platform.
pub mod client;
/// Credential resolution from role and identity state.
pub mod credentials;
/// Error management.
pub mod error;
/// Record filters and their wire encoding.
pub mod query;
/// Request descriptors and the associated builders.
pub mod request;
/// Normalized platform responses.
pub mod response;
/// The blocking HTTP transport.
pub mod transport;

// Thin domain wrappers over the dispatch pipeline.
mod data;
mod devices;

#[cfg(test)]
mod tests;
