//! Stable user and device identity for one client profile.
//!
//! Storage keys:
//! - `user`: JSON object of the signed-in user, at least `{ "id": ... }`
//! - `tempUserId`: UUID assigned to anonymous profiles
//! - `deviceId`: compact UUID, at most 30 chars
//! - `deviceTypeLogged`: `"true"` once the first-visit events were claimed

use analytics_core::limits::MAX_DEVICE_ID_LEN;
use analytics_core::Result;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::storage::KeyValueStore;

pub const USER_KEY: &str = "user";
pub const TEMP_USER_ID_KEY: &str = "tempUserId";
pub const DEVICE_ID_KEY: &str = "deviceId";
pub const DEVICE_TYPE_LOGGED_KEY: &str = "deviceTypeLogged";

/// Source of the identity attached to every emitted event.
pub trait IdentityProvider: Send + Sync {
    /// Signed-in user id, or a persisted temporary id.
    fn resolve_user_id(&self) -> Result<String>;

    /// Persisted device identifier (at most 30 chars).
    fn resolve_device_id(&self) -> Result<String>;

    /// Atomically sets the first-visit guard. Returns true only for the call that set it.
    fn claim_first_visit(&self) -> bool;
}

/// Identity backed by a local key-value store.
///
/// Values are written only when first generated. If the store fails, a
/// fresh ephemeral id is returned on every call instead of an error.
pub struct IdentityStore {
    storage: Arc<dyn KeyValueStore>,
    fill_lock: Mutex<()>,
}

impl IdentityStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            fill_lock: Mutex::new(()),
        }
    }

    /// Reads the id of the signed-in user, if any.
    fn authenticated_user_id(&self) -> Option<String> {
        let raw = match self.storage.get(USER_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Failed to read signed-in user");
                return None;
            }
        };

        let user: Value = match serde_json::from_str(&raw) {
            Ok(user) => user,
            Err(e) => {
                debug!(error = %e, "Ignoring unparseable user record");
                return None;
            }
        };

        match user.get("id") {
            Some(Value::String(id)) if !id.trim().is_empty() => Some(id.clone()),
            // 0 is the anonymous placeholder, not a user.
            Some(Value::Number(id)) if id.as_f64() != Some(0.0) => Some(id.to_string()),
            _ => None,
        }
    }

    /// Returns the stored value for `key`, generating and persisting one if
    /// it is missing or fails `is_valid`.
    fn get_or_create(
        &self,
        key: &str,
        generate: impl Fn() -> String,
        is_valid: impl Fn(&str) -> bool,
    ) -> String {
        let _guard = self.fill_lock.lock();

        match self.storage.get(key) {
            Ok(Some(value)) if is_valid(&value) => value,
            Ok(existing) => {
                if existing.is_some() {
                    warn!(key, "Replacing invalid stored identifier");
                }
                let value = generate();
                if let Err(e) = self.storage.set(key, &value) {
                    warn!(key, error = %e, "Failed to persist identifier, using ephemeral value");
                }
                value
            }
            Err(e) => {
                warn!(key, error = %e, "Storage unavailable, using ephemeral identifier");
                generate()
            }
        }
    }
}

impl IdentityProvider for IdentityStore {
    fn resolve_user_id(&self) -> Result<String> {
        if let Some(id) = self.authenticated_user_id() {
            return Ok(id);
        }
        Ok(self.get_or_create(
            TEMP_USER_ID_KEY,
            || Uuid::new_v4().to_string(),
            |v| !v.trim().is_empty(),
        ))
    }

    fn resolve_device_id(&self) -> Result<String> {
        Ok(self.get_or_create(
            DEVICE_ID_KEY,
            || compact_device_id(Uuid::new_v4()),
            |v| !v.is_empty() && v.len() <= MAX_DEVICE_ID_LEN,
        ))
    }

    fn claim_first_visit(&self) -> bool {
        let _guard = self.fill_lock.lock();

        match self.storage.get(DEVICE_TYPE_LOGGED_KEY) {
            Ok(Some(_)) => false,
            Ok(None) => match self.storage.set(DEVICE_TYPE_LOGGED_KEY, "true") {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "Failed to persist first-visit guard");
                    false
                }
            },
            Err(e) => {
                warn!(error = %e, "Failed to read first-visit guard");
                false
            }
        }
    }
}

/// UUID without separators, truncated to the device id limit.
pub fn compact_device_id(uuid: Uuid) -> String {
    let mut id = uuid.simple().to_string();
    id.truncate(MAX_DEVICE_ID_LEN);
    id
}
