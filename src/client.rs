use serde_json::json;

use tracing::debug;

use crate::credentials::{Identity, Role, resolve};
use crate::error::{Error, ErrorKind, Result};
use crate::request::Request;
use crate::response::Body;
use crate::transport::{HttpTransport, Transport};

/// The default platform origin all paths are relative to.
pub const DEFAULT_PLATFORM_URL: &str = "https://platform.clearblade.com";

/// A role-aware client for the platform.
///
/// One generic client serves all three roles: the [`Role`] value injected
/// at construction fixes the path preambles, the credential rule, and the
/// token field, so no operation is duplicated per role.
///
/// A client owns its [`Identity`] state. Mutating operations take
/// `&mut self`, so concurrent authenticate/logout calls on one instance
/// are rejected at compile time; drive separate instances for concurrent
/// sessions.
#[derive(Debug)]
pub struct Client<T = HttpTransport> {
    base_url: String,
    role: Role,
    identity: Identity,
    transport: T,
}

impl Client<HttpTransport> {
    /// Creates an end-user [`Client`] for the system identified by the
    /// given key/secret pair.
    #[must_use]
    pub fn end_user(system_key: impl Into<String>, system_secret: impl Into<String>) -> Self {
        Self::with_transport(
            Role::EndUser,
            Identity::new().with_system(system_key, system_secret),
            HttpTransport::new(),
        )
    }

    /// Creates a developer [`Client`] for the system identified by the
    /// given key/secret pair.
    #[must_use]
    pub fn developer(system_key: impl Into<String>, system_secret: impl Into<String>) -> Self {
        Self::with_transport(
            Role::Developer,
            Identity::new().with_system(system_key, system_secret),
            HttpTransport::new(),
        )
    }

    /// Creates a device [`Client`] carrying the device name and active key
    /// used by the key-based authentication flow.
    #[must_use]
    pub fn device(
        system_key: impl Into<String>,
        system_secret: impl Into<String>,
        device_name: impl Into<String>,
        active_key: impl Into<String>,
    ) -> Self {
        Self::with_transport(
            Role::Device,
            Identity::new()
                .with_system(system_key, system_secret)
                .with_device(device_name, active_key),
            HttpTransport::new(),
        )
    }
}

impl<T: Transport> Client<T> {
    /// Creates a [`Client`] from a [`Role`], an [`Identity`], and a custom
    /// [`Transport`].
    #[must_use]
    pub fn with_transport(role: Role, identity: Identity, transport: T) -> Self {
        Self {
            base_url: DEFAULT_PLATFORM_URL.to_owned(),
            role,
            identity,
            transport,
        }
    }

    /// Overrides the platform origin while constructing a [`Client`].
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Returns the [`Role`] of the client.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the current [`Identity`] state.
    #[must_use]
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Returns the platform origin.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn identity_mut(&mut self) -> &mut Identity {
        &mut self.identity
    }

    #[cfg(test)]
    pub(crate) const fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolves credentials and executes one request through the
    /// transport; the shared lower half of every operation.
    pub(crate) fn dispatch(&self, request: Request) -> Result<Body> {
        let credentials = resolve(self.role, &self.identity)?;
        self.transport
            .execute(&self.base_url, &request, &credentials)?
            .success()
    }

    /// Authenticates against the platform and stores the granted session
    /// token into the identity state.
    ///
    /// End-users and developers post their username and password to the
    /// role's `auth` endpoint; the device role runs the key-based flow
    /// instead, treating the arguments as device name and active key.
    ///
    /// A failed authentication leaves the identity state untouched.
    ///
    /// # Errors
    ///
    /// Besides transport and domain failures, a response without a
    /// non-empty token field is a protocol error.
    pub fn authenticate(&mut self, username: &str, password: &str) -> Result<()> {
        if self.role == Role::Device {
            return self.authenticate_with_key(username, password).map(|_| ());
        }

        let request = Request::post(format!("{}/auth", self.role.auth_root())).with_body(json!({
            "username": username,
            "password": password,
        }));

        let body = self.dispatch(request)?;
        let token = extract_token(&body, self.role.token_field())?;
        self.identity.set_token(token);

        debug!(role = ?self.role, "Authenticated against the platform");
        Ok(())
    }

    /// Registers a new account with the given username and password.
    ///
    /// Success only reports that the account exists; no identity state
    /// changes and a subsequent [`Client::authenticate`] is still needed.
    ///
    /// # Errors
    ///
    /// The device role cannot register accounts; the platform has no such
    /// endpoint, so the call fails with a precondition error.
    pub fn register(&mut self, username: &str, password: &str) -> Result<()> {
        if self.role == Role::Device {
            return Err(Error::new(
                ErrorKind::Precondition,
                "The device role cannot register accounts",
            ));
        }

        let request = Request::post(format!("{}/reg", self.role.auth_root())).with_body(json!({
            "username": username,
            "password": password,
        }));

        self.dispatch(request)?;
        Ok(())
    }

    /// Ends the current session and clears the stored token.
    ///
    /// For the device role this is a local no-op that always succeeds
    /// without contacting the server; a device session, if any, is not
    /// invalidated on the platform side.
    ///
    /// # Errors
    ///
    /// Network failures or a non-200 status surface as errors, in which
    /// case the stored token is kept.
    pub fn logout(&mut self) -> Result<()> {
        if self.role == Role::Device {
            debug!("Device logout is local; no server contact");
            return Ok(());
        }

        let request = Request::post(format!("{}/logout", self.role.auth_root()));

        self.dispatch(request)?;
        self.identity.clear_token();
        Ok(())
    }
}

/// Extracts the non-empty session token granted by an authentication
/// response.
pub(crate) fn extract_token(body: &Body, field: &str) -> Result<String> {
    if let Body::Object(object) = body {
        if let Some(serde_json::Value::String(token)) = object.get(field) {
            if !token.is_empty() {
                return Ok(token.clone());
            }
        }
    }

    Err(Error::new(
        ErrorKind::Protocol,
        format!("Token not present in the platform response: {body}"),
    ))
}
