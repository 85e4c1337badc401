//! Secret storage abstraction.
//!
//! This module provides:
//! - [`Secret`] - A wrapper for sensitive values that prevents accidental logging
//! - [`SecretStore`] - Trait for secret storage backends
//! - [`MemoryStore`] - In-memory implementation for testing
//! - [`KeyringStore`] - OS keyring implementation (with `keyring-store` feature)
//! - [`create_store`] - Helper to select backend based on availability
//!
//! # Addressing
//!
//! Secrets are addressed by a `(service, account)` pair, matching the
//! platform keyring model. Credential passwords use the derived secret key
//! as the service and the username as the account.
//!
//! # Example
//!
//! ```rust
//! use credcache_core::store::{MemoryStore, Secret, SecretStore};
//!
//! let store = MemoryStore::new();
//! store.set("cache.yaml.github", "alice", &Secret::new("hunter2")).unwrap();
//!
//! let retrieved = store.get("cache.yaml.github", "alice").unwrap();
//! assert_eq!(retrieved.unwrap().expose(), "hunter2");
//! ```

use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

mod memory;
#[cfg(feature = "keyring-store")]
mod keyring;

pub use memory::MemoryStore;
#[cfg(feature = "keyring-store")]
pub use keyring::KeyringStore;

/// A secret value that prevents accidental exposure in logs.
///
/// The inner value is only accessible via [`expose()`](Secret::expose).
/// Debug and Display implementations show `[REDACTED]` instead of the value,
/// and the buffer is zeroed when the secret is dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Secret(String);

impl Secret {
    /// Create a new secret from a string value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the secret value.
    ///
    /// Use sparingly and never log the result.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Consume the secret and return the inner value.
    pub fn into_inner(mut self) -> String {
        std::mem::take(&mut self.0)
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secret([REDACTED])")
    }
}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Secret {}

/// Error type for secret store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Access to the secret was denied.
    #[error("access denied to secret: {service}/{account}")]
    AccessDenied { service: String, account: String },

    /// The storage backend encountered an error.
    #[error("backend error: {message}")]
    BackendError { message: String },

    /// The keyring backend is not available.
    #[error("keyring not available: {message}")]
    KeyringUnavailable { message: String },
}

/// Abstraction over secret storage backends.
///
/// Implementations include:
/// - [`MemoryStore`] - In-memory storage for testing
/// - [`KeyringStore`] (with `keyring-store` feature) - OS keyring
///
/// All operations are blocking.
pub trait SecretStore: Send {
    /// Retrieve the secret stored under `(service, account)`.
    ///
    /// Returns `Ok(None)` if no such entry exists.
    fn get(&self, service: &str, account: &str) -> Result<Option<Secret>, StoreError>;

    /// Store a secret under `(service, account)`.
    ///
    /// Overwrites any existing value.
    fn set(&self, service: &str, account: &str, secret: &Secret) -> Result<(), StoreError>;

    /// Delete the secret stored under `(service, account)`.
    ///
    /// Returns `Ok(())` even if the entry didn't exist.
    fn delete(&self, service: &str, account: &str) -> Result<(), StoreError>;

    /// Check if an entry exists without handing out the value.
    fn exists(&self, service: &str, account: &str) -> Result<bool, StoreError> {
        Ok(self.get(service, account)?.is_some())
    }
}

impl<S: SecretStore + ?Sized> SecretStore for Box<S> {
    fn get(&self, service: &str, account: &str) -> Result<Option<Secret>, StoreError> {
        (**self).get(service, account)
    }

    fn set(&self, service: &str, account: &str, secret: &Secret) -> Result<(), StoreError> {
        (**self).set(service, account, secret)
    }

    fn delete(&self, service: &str, account: &str) -> Result<(), StoreError> {
        (**self).delete(service, account)
    }
}

/// Create a secret store with automatic backend selection.
///
/// - If `prefer_keyring` is `true` and the `keyring-store` feature is enabled,
///   attempts to create a [`KeyringStore`] and falls back to [`MemoryStore`]
///   with a warning if the keyring is unavailable.
/// - Otherwise returns a [`MemoryStore`].
///
/// Passwords held in a memory store do not outlive the process, so a cache
/// opened on top of one will prompt for them again on the next run.
pub fn create_store(prefer_keyring: bool) -> Box<dyn SecretStore> {
    #[cfg(feature = "keyring-store")]
    if prefer_keyring {
        match KeyringStore::try_new() {
            Ok(store) => {
                tracing::debug!("Using OS keyring for secret storage");
                return Box::new(store);
            }
            Err(e) => {
                tracing::warn!(
                    "Keyring unavailable ({}), falling back to memory store. \
                     Passwords will not persist across runs.",
                    e
                );
            }
        }
    }

    #[cfg(not(feature = "keyring-store"))]
    if prefer_keyring {
        tracing::warn!(
            "Keyring storage requested but keyring-store feature not enabled. \
             Using memory store. Passwords will not persist across runs."
        );
    }

    tracing::debug!("Using in-memory secret storage");
    Box::new(MemoryStore::new())
}
