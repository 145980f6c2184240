use tracing::warn;

use crate::error::{Error, ErrorKind, Result};

/// Header carrying the system key of the target platform system.
pub const SYSTEM_KEY_HEADER: &str = "ClearBlade-SystemKey";
/// Header carrying the system secret of the target platform system.
pub const SYSTEM_SECRET_HEADER: &str = "ClearBlade-SystemSecret";
/// Header carrying an authenticated end-user session token.
pub const USER_TOKEN_HEADER: &str = "ClearBlade-UserToken";
/// Header carrying an authenticated developer session token.
pub const DEV_TOKEN_HEADER: &str = "ClearBlade-DevToken";
/// Header carrying an authenticated device session token.
pub const DEVICE_TOKEN_HEADER: &str = "ClearBlade-DeviceToken";

/// One header name/value pair contributed toward request authentication.
///
/// Credentials are ordered, and multiple credentials may legally carry the
/// same header name; the transport appends them without merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    name: &'static str,
    value: String,
}

impl Credential {
    /// Creates a [`Credential`] from one of the fixed header names and its
    /// value.
    #[must_use]
    #[inline]
    pub fn new(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }

    /// Returns the header name.
    #[must_use]
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the header value.
    #[must_use]
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// The identity roles supported by the platform.
///
/// A role is a descriptor value: it fixes the path preambles, the token
/// header, and the token field name used by the dispatch pipeline, so that
/// every operation is written once and parameterized by role data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// An unprivileged end-user of a platform system.
    EndUser,
    /// A developer administering platform systems.
    Developer,
    /// A constrained device belonging to a platform system.
    Device,
}

impl Role {
    /// Returns the path preamble for the authentication endpoints of the
    /// role.
    ///
    /// End-users authenticate against the versioned user root, developers
    /// against the admin root. Devices use a key-based flow under their
    /// resource root instead.
    #[must_use]
    pub const fn auth_root(self) -> &'static str {
        match self {
            Self::EndUser => "/api/v/1/user",
            Self::Developer => "/admin",
            Self::Device => "/api/v/2/devices",
        }
    }

    /// Returns the device resource root visible to the role.
    ///
    /// Developer-only endpoints live under the admin root, user-reachable
    /// endpoints under the versioned user root.
    #[must_use]
    pub const fn device_root(self) -> &'static str {
        match self {
            Self::Developer => "/admin/devices",
            Self::EndUser | Self::Device => "/api/v/2/devices",
        }
    }

    /// Returns the header name carrying the session token of the role.
    #[must_use]
    pub const fn token_header(self) -> &'static str {
        match self {
            Self::EndUser => USER_TOKEN_HEADER,
            Self::Developer => DEV_TOKEN_HEADER,
            Self::Device => DEVICE_TOKEN_HEADER,
        }
    }

    /// Returns the response field holding the session token granted to the
    /// role on authentication.
    #[must_use]
    pub const fn token_field(self) -> &'static str {
        match self {
            Self::EndUser => "user_token",
            Self::Developer => "dev_token",
            Self::Device => "deviceToken",
        }
    }
}

/// The mutable identity state of a client instance.
///
/// At least one authenticating combination, either a system key/secret pair
/// or a session token, must be present for any authenticated call; its
/// absence is a precondition error raised before any network contact.
///
/// The state is mutated only by the authenticate, logout, and device-key
/// operations of the owning client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    system_key: Option<String>,
    system_secret: Option<String>,
    token: Option<String>,
    device_name: Option<String>,
    active_key: Option<String>,
}

impl Identity {
    /// Creates an empty [`Identity`].
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the system key/secret pair while constructing an [`Identity`].
    #[must_use]
    #[inline]
    pub fn with_system(mut self, key: impl Into<String>, secret: impl Into<String>) -> Self {
        self.system_key = Some(key.into());
        self.system_secret = Some(secret.into());
        self
    }

    /// Sets the device name and active key while constructing an
    /// [`Identity`] for the device role.
    #[must_use]
    #[inline]
    pub fn with_device(mut self, name: impl Into<String>, active_key: impl Into<String>) -> Self {
        self.device_name = Some(name.into());
        self.active_key = Some(active_key.into());
        self
    }

    /// Returns the session token, if one has been granted.
    #[must_use]
    #[inline]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Returns the system key, if present.
    #[must_use]
    #[inline]
    pub fn system_key(&self) -> Option<&str> {
        self.system_key.as_deref()
    }

    pub(crate) fn system_secret(&self) -> Option<&str> {
        self.system_secret.as_deref()
    }

    pub(crate) fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub(crate) fn clear_token(&mut self) {
        self.token = None;
    }

    pub(crate) fn set_device(&mut self, name: impl Into<String>, active_key: impl Into<String>) {
        self.device_name = Some(name.into());
        self.active_key = Some(active_key.into());
    }
}

/// Resolves the ordered credentials a role attaches to a request.
///
/// A pure function of the role and the current [`Identity`] snapshot:
///
/// - Device role: a device token is emitted first when present; a complete
///   system key/secret pair additionally contributes the secret header
///   followed by the key header.
/// - End-user and developer roles: the role's token header is emitted when
///   authenticated, otherwise the system key/secret pair.
///
/// # Errors
///
/// Returns an [`ErrorKind::Auth`] error when the identity contains no
/// usable combination, before any network call is attempted.
pub fn resolve(role: Role, identity: &Identity) -> Result<Vec<Credential>> {
    let mut credentials = Vec::new();

    match role {
        Role::Device => {
            if let Some(token) = identity.token() {
                credentials.push(Credential::new(DEVICE_TOKEN_HEADER, token));
            }
            if let (Some(key), Some(secret)) = (identity.system_key(), identity.system_secret()) {
                credentials.push(Credential::new(SYSTEM_SECRET_HEADER, secret));
                credentials.push(Credential::new(SYSTEM_KEY_HEADER, key));
            }
        }
        Role::EndUser | Role::Developer => {
            if let Some(token) = identity.token() {
                credentials.push(Credential::new(role.token_header(), token));
            } else if let (Some(key), Some(secret)) =
                (identity.system_key(), identity.system_secret())
            {
                credentials.push(Credential::new(SYSTEM_KEY_HEADER, key));
                credentials.push(Credential::new(SYSTEM_SECRET_HEADER, secret));
            }
        }
    }

    if credentials.is_empty() {
        warn!(?role, "No usable identity found while resolving credentials");
        return Err(Error::new(
            ErrorKind::Auth,
            "No SystemKey/SystemSecret pair or token found",
        ));
    }

    Ok(credentials)
}

#[cfg(test)]
mod tests {
    use crate::error::{Error, ErrorKind};

    use super::{
        Credential, DEV_TOKEN_HEADER, DEVICE_TOKEN_HEADER, Identity, Role, SYSTEM_KEY_HEADER,
        SYSTEM_SECRET_HEADER, USER_TOKEN_HEADER, resolve,
    };

    fn empty_identity_error() -> Error {
        Error::new(
            ErrorKind::Auth,
            "No SystemKey/SystemSecret pair or token found",
        )
    }

    #[test]
    fn device_with_empty_identity_produces_zero_credentials() {
        assert_eq!(
            resolve(Role::Device, &Identity::new()),
            Err(empty_identity_error())
        );
    }

    #[test]
    fn user_with_partial_system_pair_is_unusable() {
        let mut identity = Identity::new();
        identity.system_key = Some("syskey".into());

        assert_eq!(
            resolve(Role::EndUser, &identity),
            Err(empty_identity_error())
        );
    }

    #[test]
    fn device_emits_token_then_secret_then_key() {
        let mut identity = Identity::new().with_system("syskey", "syssecret");
        identity.set_token("devicetok");

        assert_eq!(
            resolve(Role::Device, &identity),
            Ok(vec![
                Credential::new(DEVICE_TOKEN_HEADER, "devicetok"),
                Credential::new(SYSTEM_SECRET_HEADER, "syssecret"),
                Credential::new(SYSTEM_KEY_HEADER, "syskey"),
            ])
        );
    }

    #[test]
    fn device_without_token_emits_secret_then_key() {
        let identity = Identity::new().with_system("syskey", "syssecret");

        assert_eq!(
            resolve(Role::Device, &identity),
            Ok(vec![
                Credential::new(SYSTEM_SECRET_HEADER, "syssecret"),
                Credential::new(SYSTEM_KEY_HEADER, "syskey"),
            ])
        );
    }

    #[test]
    fn user_pair_emits_key_then_secret() {
        let identity = Identity::new().with_system("syskey", "syssecret");

        assert_eq!(
            resolve(Role::EndUser, &identity),
            Ok(vec![
                Credential::new(SYSTEM_KEY_HEADER, "syskey"),
                Credential::new(SYSTEM_SECRET_HEADER, "syssecret"),
            ])
        );
    }

    #[test]
    fn token_replaces_system_pair_for_user_and_developer() {
        let mut identity = Identity::new().with_system("syskey", "syssecret");
        identity.set_token("tok");

        assert_eq!(
            resolve(Role::EndUser, &identity),
            Ok(vec![Credential::new(USER_TOKEN_HEADER, "tok")])
        );
        assert_eq!(
            resolve(Role::Developer, &identity),
            Ok(vec![Credential::new(DEV_TOKEN_HEADER, "tok")])
        );
    }

    #[test]
    fn role_descriptors() {
        assert_eq!(Role::EndUser.auth_root(), "/api/v/1/user");
        assert_eq!(Role::Developer.auth_root(), "/admin");
        assert_eq!(Role::Developer.device_root(), "/admin/devices");
        assert_eq!(Role::Device.device_root(), "/api/v/2/devices");
        assert_eq!(Role::EndUser.token_field(), "user_token");
        assert_eq!(Role::Developer.token_field(), "dev_token");
        assert_eq!(Role::Device.token_field(), "deviceToken");
    }
}
