use reqwest::blocking::Client as ReqwestClient;
use reqwest::header::CONTENT_TYPE;

use tracing::debug;

use crate::credentials::Credential;
use crate::error::{Error, ErrorKind, Result};
use crate::request::{Method, Request};
use crate::response::Envelope;

/// The seam through which every request reaches the network.
///
/// A transport executes exactly one request per call: no retries, no
/// timeout of its own, no caching. Tests substitute a recording
/// implementation to observe the dispatch pipeline without any network.
pub trait Transport {
    /// Executes the request against the base URL with the given ordered
    /// credentials and returns the normalized response.
    ///
    /// # Errors
    ///
    /// Serialization, connection, and body-read failures are surfaced
    /// immediately, wrapping the underlying cause; they are never retried.
    fn execute(
        &self,
        base_url: &str,
        request: &Request,
        credentials: &[Credential],
    ) -> Result<Envelope>;
}

/// The blocking HTTP transport backed by [`reqwest`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: ReqwestClient,
}

impl HttpTransport {
    /// Creates an [`HttpTransport`] with a default HTTP client.
    ///
    /// The default client applies no request timeout; bounding call
    /// duration is a caller concern, handled through
    /// [`HttpTransport::with_client`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: ReqwestClient::new(),
        }
    }

    /// Creates an [`HttpTransport`] from a caller-configured HTTP client,
    /// the place to set timeouts, proxies, or TLS options.
    #[must_use]
    pub const fn with_client(client: ReqwestClient) -> Self {
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn execute(
        &self,
        base_url: &str,
        request: &Request,
        credentials: &[Credential],
    ) -> Result<Envelope> {
        let mut url = format!("{base_url}{}", request.path());
        if let Some(query) = request.query() {
            url.push('?');
            url.push_str(query);
        }

        let method = match request.method() {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &url);

        // Appended in resolver order; duplicate header names are legal.
        for credential in credentials {
            builder = builder.header(credential.name(), credential.value());
        }

        if let Some(body) = request.body() {
            let bytes = serde_json::to_vec(body)
                .map_err(|e| Error::new(ErrorKind::Encoding, format!("JSON encoding error: {e}")))?;
            builder = builder.header(CONTENT_TYPE, "application/json").body(bytes);
        }

        debug!(method = %request.method(), url = %url, "Dispatching platform request");

        let response = builder
            .send()
            .map_err(|e| Error::new(ErrorKind::Transport, format!("Error making request: {e}")))?;

        let status = response.status().as_u16();

        // Consumes the response, releasing the connection on every path.
        let bytes = response.bytes().map_err(|e| {
            Error::new(ErrorKind::Read, format!("Error reading response body: {e}"))
        })?;

        Ok(Envelope::normalize(status, &bytes))
    }
}
