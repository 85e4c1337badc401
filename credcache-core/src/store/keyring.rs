//! OS keyring-backed secret storage implementation.

use keyring::Entry;

use super::{Secret, SecretStore, StoreError};

/// OS keyring-backed secret store.
///
/// This store uses the platform's native keyring service:
/// - macOS: Keychain
/// - Linux: Secret Service, with a kernel keyutils cache in front
/// - Windows: Credential Manager
///
/// The `(service, account)` pair maps directly onto a keyring entry.
pub struct KeyringStore {
    _private: (),
}

impl KeyringStore {
    /// Try to create a new keyring store.
    ///
    /// Performs a real lookup of a probe entry, so a platform whose keyring
    /// service is missing or locked is reported here rather than on first use.
    pub fn try_new() -> Result<Self, StoreError> {
        let lookup = Entry::new("credcache/__probe__", "availability_check")
            .and_then(|entry| entry.get_password().map(|_| ()));
        availability(lookup)?;
        Ok(Self { _private: () })
    }

    fn entry(&self, service: &str, account: &str) -> Result<Entry, StoreError> {
        Entry::new(service, account).map_err(|e| StoreError::BackendError {
            message: format!("failed to create keyring entry: {}", e),
        })
    }
}

/// A lookup that finds nothing still proves the backend answers.
fn availability(lookup: Result<(), keyring::Error>) -> Result<(), StoreError> {
    match lookup {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(StoreError::KeyringUnavailable {
            message: format!("keyring backend not available: {}", e),
        }),
    }
}

impl std::fmt::Debug for KeyringStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyringStore").finish()
    }
}

impl SecretStore for KeyringStore {
    fn get(&self, service: &str, account: &str) -> Result<Option<Secret>, StoreError> {
        let entry = self.entry(service, account)?;

        match entry.get_password() {
            Ok(password) => Ok(Some(Secret::new(password))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(keyring::Error::NoStorageAccess(_)) => Err(StoreError::AccessDenied {
                service: service.to_string(),
                account: account.to_string(),
            }),
            Err(keyring::Error::Ambiguous(_)) => Err(StoreError::BackendError {
                message: format!("ambiguous keyring entry for {}/{}", service, account),
            }),
            Err(keyring::Error::PlatformFailure(e)) => Err(StoreError::BackendError {
                message: format!("platform keyring failure: {}", e),
            }),
            Err(e) => Err(StoreError::BackendError {
                message: format!("keyring error: {}", e),
            }),
        }
    }

    fn set(&self, service: &str, account: &str, secret: &Secret) -> Result<(), StoreError> {
        let entry = self.entry(service, account)?;

        entry
            .set_password(secret.expose())
            .map_err(|e| StoreError::BackendError {
                message: format!("failed to set keyring password: {}", e),
            })
    }

    fn delete(&self, service: &str, account: &str) -> Result<(), StoreError> {
        let entry = self.entry(service, account)?;

        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StoreError::BackendError {
                message: format!("failed to delete keyring entry: {}", e),
            }),
        }
    }
}
