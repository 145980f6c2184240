use serde_json::{Map, Value, json};

use tracing::debug;

use crate::client::{Client, extract_token};
use crate::credentials::Role;
use crate::error::{Error, ErrorKind, Result};
use crate::query::Query;
use crate::request::Request;
use crate::transport::Transport;

fn keyset_path(system_key: &str, name: &str) -> String {
    format!("/admin/devices/keys/{system_key}/{name}")
}

fn columns_path(system_key: &str) -> String {
    format!("/admin/devices/{system_key}/columns")
}

/// Device CRUD, visible to every role through its own resource root, plus
/// the developer-only key-set and column lifecycle.
impl<T: Transport> Client<T> {
    fn device_path(&self, system_key: &str) -> String {
        format!("{}/{system_key}", self.role().device_root())
    }

    fn require_developer(&self, operation: &str) -> Result<()> {
        if self.role() == Role::Developer {
            Ok(())
        } else {
            Err(Error::new(
                ErrorKind::Precondition,
                format!("Only the developer role can {operation}"),
            ))
        }
    }

    /// Retrieves the devices of a system matched by the filter, or all of
    /// them when no filter is supplied.
    ///
    /// # Errors
    ///
    /// Transport failures and non-200 statuses surface as errors, as does
    /// a response that is not a JSON array.
    pub fn get_devices(&self, system_key: &str, filter: Option<&Query>) -> Result<Vec<Value>> {
        let request = Request::get(self.device_path(system_key)).with_filter(filter);
        self.dispatch(request)?.into_array()
    }

    /// Retrieves one device by name.
    ///
    /// # Errors
    ///
    /// Transport failures and non-200 statuses surface as errors, as does
    /// a response that is not a JSON object.
    pub fn get_device(&self, system_key: &str, name: &str) -> Result<Map<String, Value>> {
        let request = Request::get(format!("{}/{name}", self.device_path(system_key)));
        self.dispatch(request)?.into_object()
    }

    /// Creates a device with the given name and initial attributes,
    /// returning its stored representation.
    ///
    /// # Errors
    ///
    /// Transport failures and non-200 statuses surface as errors.
    pub fn create_device(
        &self,
        system_key: &str,
        name: &str,
        data: Map<String, Value>,
    ) -> Result<Map<String, Value>> {
        let request = Request::post(format!("{}/{name}", self.device_path(system_key)))
            .with_body(Value::Object(data));
        self.dispatch(request)?.into_object()
    }

    /// Updates the attributes of a device, returning its stored
    /// representation.
    ///
    /// # Errors
    ///
    /// Transport failures and non-200 statuses surface as errors.
    pub fn update_device(
        &self,
        system_key: &str,
        name: &str,
        data: Map<String, Value>,
    ) -> Result<Map<String, Value>> {
        let request = Request::put(format!("{}/{name}", self.device_path(system_key)))
            .with_body(Value::Object(data));
        self.dispatch(request)?.into_object()
    }

    /// Deletes a device by name.
    ///
    /// # Errors
    ///
    /// Transport failures and non-200 statuses surface as errors.
    pub fn delete_device(&self, system_key: &str, name: &str) -> Result<()> {
        let request = Request::delete(format!("{}/{name}", self.device_path(system_key)));
        self.dispatch(request)?;
        Ok(())
    }

    /// Runs the key-based device authentication flow and stores the
    /// granted device token, returning the full response object.
    ///
    /// The flow posts the device name and active key to the `auth`
    /// sub-resource of the system's device root, under the system
    /// key/secret pair.
    ///
    /// # Errors
    ///
    /// Only the device role can run this flow, and its identity must
    /// carry a system key; both are precondition errors. A response
    /// without a non-empty `deviceToken` field is a protocol error.
    pub fn authenticate_with_key(
        &mut self,
        device_name: &str,
        active_key: &str,
    ) -> Result<Map<String, Value>> {
        if self.role() != Role::Device {
            return Err(Error::new(
                ErrorKind::Precondition,
                "Only the device role can authenticate with a device key",
            ));
        }

        let Some(system_key) = self.identity().system_key() else {
            return Err(Error::new(
                ErrorKind::Precondition,
                "A system key is required to authenticate a device",
            ));
        };

        let request = Request::post(format!("{}/{system_key}/auth", Role::Device.device_root()))
            .with_body(json!({
                "deviceName": device_name,
                "activeKey": active_key,
            }));

        let body = self.dispatch(request)?;
        let token = extract_token(&body, Role::Device.token_field())?;

        self.identity_mut().set_token(token);
        self.identity_mut().set_device(device_name, active_key);

        debug!(device_name, "Device authenticated with its active key");
        body.into_object()
    }

    /// Retrieves the key set of a device. Developer role only.
    ///
    /// # Errors
    ///
    /// Transport failures, non-200 statuses, and a non-developer role
    /// surface as errors.
    pub fn get_keyset(&self, system_key: &str, name: &str) -> Result<Map<String, Value>> {
        self.require_developer("read device key sets")?;
        let request = Request::get(keyset_path(system_key, name));
        self.dispatch(request)?.into_object()
    }

    /// Generates `count` new keys for a device. Developer role only.
    ///
    /// # Errors
    ///
    /// Transport failures, non-200 statuses, and a non-developer role
    /// surface as errors.
    pub fn generate_keyset(
        &self,
        system_key: &str,
        name: &str,
        count: u64,
    ) -> Result<Map<String, Value>> {
        self.require_developer("generate device key sets")?;
        let request =
            Request::post(keyset_path(system_key, name)).with_body(json!({"count": count}));
        self.dispatch(request)?.into_object()
    }

    /// Rotates the key set of a device. Developer role only.
    ///
    /// # Errors
    ///
    /// Transport failures, non-200 statuses, and a non-developer role
    /// surface as errors.
    pub fn rotate_keyset(&self, system_key: &str, name: &str) -> Result<Map<String, Value>> {
        self.require_developer("rotate device key sets")?;
        let request = Request::put(keyset_path(system_key, name)).with_body(json!({}));
        self.dispatch(request)?.into_object()
    }

    /// Deletes the key set of a device. Developer role only.
    ///
    /// # Errors
    ///
    /// Transport failures, non-200 statuses, and a non-developer role
    /// surface as errors.
    pub fn delete_keyset(&self, system_key: &str, name: &str) -> Result<()> {
        self.require_developer("delete device key sets")?;
        let request = Request::delete(keyset_path(system_key, name));
        self.dispatch(request)?;
        Ok(())
    }

    /// Retrieves the device table columns of a system. Developer role
    /// only.
    ///
    /// # Errors
    ///
    /// Transport failures, non-200 statuses, and a non-developer role
    /// surface as errors.
    pub fn get_device_columns(&self, system_key: &str) -> Result<Vec<Value>> {
        self.require_developer("read device columns")?;
        let request = Request::get(columns_path(system_key));
        self.dispatch(request)?.into_array()
    }

    /// Adds a column to the device table of a system. Developer role
    /// only.
    ///
    /// # Errors
    ///
    /// Transport failures, non-200 statuses, and a non-developer role
    /// surface as errors.
    pub fn create_device_column(
        &self,
        system_key: &str,
        column_name: &str,
        column_type: &str,
    ) -> Result<()> {
        self.require_developer("create device columns")?;
        let request = Request::post(columns_path(system_key)).with_body(json!({
            "column_name": column_name,
            "type": column_type,
        }));
        self.dispatch(request)?;
        Ok(())
    }

    /// Removes a column from the device table of a system. Developer role
    /// only.
    ///
    /// # Errors
    ///
    /// Transport failures, non-200 statuses, and a non-developer role
    /// surface as errors.
    pub fn delete_device_column(&self, system_key: &str, column_name: &str) -> Result<()> {
        self.require_developer("delete device columns")?;
        let request =
            Request::delete(columns_path(system_key)).with_param("column_name", column_name);
        self.dispatch(request)?;
        Ok(())
    }
}
