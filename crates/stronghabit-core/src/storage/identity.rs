//! Keyring-backed identity for the remote backend.

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Thin wrapper around the OS keyring for credential storage.
mod keyring_store {
    const SERVICE: &str = "stronghabit";

    pub fn get(key: &str) -> Result<Option<String>, Box<dyn std::error::Error>> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.get_password() {
            Ok(pw) => Ok(Some(pw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set(key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        entry.set_password(value)?;
        Ok(())
    }

    pub fn delete(key: &str) -> Result<(), Box<dyn std::error::Error>> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// An authenticated user for the remote backend.
///
/// The token is opaque to the core: it is attached to requests as-is and
/// never inspected. Both fields live in the OS keyring, not in config files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub access_token: String,
}

impl Identity {
    const USER_KEY: &'static str = "remote_user_id";
    const TOKEN_KEY: &'static str = "remote_access_token";

    /// Load the stored identity, if any.
    pub fn load() -> Result<Option<Self>, StorageError> {
        let user_id = keyring_store::get(Self::USER_KEY).map_err(credential_error)?;
        let access_token = keyring_store::get(Self::TOKEN_KEY).map_err(credential_error)?;
        match (user_id, access_token) {
            (Some(user_id), Some(access_token)) => Ok(Some(Self {
                user_id,
                access_token,
            })),
            _ => Ok(None),
        }
    }

    /// Persist this identity to the OS keyring.
    pub fn save(&self) -> Result<(), StorageError> {
        keyring_store::set(Self::USER_KEY, &self.user_id).map_err(credential_error)?;
        keyring_store::set(Self::TOKEN_KEY, &self.access_token).map_err(credential_error)?;
        Ok(())
    }

    /// Remove any stored identity.
    pub fn clear() -> Result<(), StorageError> {
        keyring_store::delete(Self::TOKEN_KEY).map_err(credential_error)?;
        keyring_store::delete(Self::USER_KEY).map_err(credential_error)?;
        Ok(())
    }
}

fn credential_error(e: Box<dyn std::error::Error>) -> StorageError {
    StorageError::Credentials(e.to_string())
}
