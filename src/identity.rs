//! Anonymous per-browser identity.
//!
//! DESIGN
//! ======
//! The user key is generated once per store and never rotated. It is the only
//! ownership scope the API knows about: list and delete are filtered by it and
//! every create carries it.

#[cfg(test)]
#[path = "identity_test.rs"]
mod identity_test;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::{KeyValueStore, StorageError};

/// Storage key holding the user key string.
pub const USER_KEY_STORAGE_KEY: &str = "user_key";

/// Opaque owner identity attached to every monitor request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserKey(String);

impl UserKey {
    /// Generate a fresh random (v4 UUID) key.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for UserKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for UserKey {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Return the stored user key, generating and persisting one on first use.
///
/// A blank stored value counts as absent.
///
/// # Errors
///
/// Returns a [`StorageError`] if the store cannot be read or written.
pub fn get_or_create_user_key<S>(store: &mut S) -> Result<UserKey, StorageError>
where
    S: KeyValueStore + ?Sized,
{
    if let Some(existing) = store.get(USER_KEY_STORAGE_KEY)? {
        if !existing.trim().is_empty() {
            tracing::debug!(user_key = %existing, "loaded stored user key");
            return Ok(UserKey(existing));
        }
    }

    let key = UserKey::generate();
    store.set(USER_KEY_STORAGE_KEY, key.as_str())?;
    tracing::info!(user_key = %key, "generated new user key");
    Ok(key)
}
