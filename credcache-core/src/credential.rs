//! Cached username/password credentials.
//!
//! The username is stored in the cache file. The password is stored only in
//! the secret store, under the service name from [`derive_secret_key`] and
//! the current username as the account.

use std::fmt;
use std::path::Path;
use tracing::{debug, info};

use crate::cache::Cache;
use crate::error::{CacheError, ObjectError, ObjectKind};
use crate::store::Secret;
use crate::validator::Validator;

/// Secret-store service name for the credential `key` of the cache at `location`.
///
/// Path separators in the location are replaced with `_`, then `.` and the
/// key are appended.
///
/// ```
/// use credcache_core::derive_secret_key;
/// use std::path::Path;
///
/// let key = derive_secret_key(Path::new("/home/alice/creds.yaml"), "jira");
/// assert_eq!(key, "_home_alice_creds.yaml.jira");
/// ```
pub fn derive_secret_key(location: &Path, key: &str) -> String {
    let location = location.to_string_lossy().replace(['/', '\\'], "_");
    format!("{}.{}", location, key)
}

/// How a credential is acquired when it is missing or reset.
#[derive(Debug, Clone)]
pub struct CredentialOptions {
    pub username_prompt: Option<String>,
    pub password_prompt: Option<String>,
    pub username_validator: Validator,
    pub password_validator: Validator,
    /// Hide typed password characters. On by default.
    pub conceal_password: bool,
}

impl CredentialOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn username_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.username_prompt = Some(prompt.into());
        self
    }

    pub fn password_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.password_prompt = Some(prompt.into());
        self
    }

    pub fn username_validator(mut self, validator: Validator) -> Self {
        self.username_validator = validator;
        self
    }

    pub fn password_validator(mut self, validator: Validator) -> Self {
        self.password_validator = validator;
        self
    }

    pub fn conceal_password(mut self, conceal: bool) -> Self {
        self.conceal_password = conceal;
        self
    }
}

impl Default for CredentialOptions {
    fn default() -> Self {
        Self {
            username_prompt: None,
            password_prompt: None,
            username_validator: Validator::any(),
            password_validator: Validator::any(),
            conceal_password: true,
        }
    }
}

/// A username/password pair bound to the cache it came from.
pub struct Credential<'c> {
    cache: &'c mut Cache,
    key: String,
    secret_key: String,
    username: String,
    password: Secret,
    options: CredentialOptions,
}

impl<'c> Credential<'c> {
    pub(crate) fn acquire(
        cache: &'c mut Cache,
        key: &str,
        options: CredentialOptions,
    ) -> Result<Self, CacheError> {
        let secret_key = cache.secret_key(key);

        let username = match cache.credentials().get(key) {
            Some(username) => {
                debug!("Credential {} found in {}", key, cache.file_name());
                username.clone()
            }
            None => {
                let username = ask_username(cache, key, &options, None)?;
                cache.put_username(key, &username)?;
                info!("Stored credential {} in {}", key, cache.file_name());
                username
            }
        };

        let password = match cache.secret_store().get(&secret_key, &username)? {
            Some(password) => password,
            None => {
                let password = ask_password(cache, key, &options, None)?;
                cache.secret_store().set(&secret_key, &username, &password)?;
                debug!("Stored password for credential {}", key);
                password
            }
        };

        Ok(Self {
            cache,
            key: key.to_string(),
            secret_key,
            username,
            password,
            options,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &Secret {
        &self.password
    }

    /// Secret-store service name this credential's password lives under.
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    /// Prompt for a new password for the current username.
    pub fn reset_password(&mut self, prompt: Option<&str>) -> Result<(), CacheError> {
        let password = ask_password(self.cache, &self.key, &self.options, prompt)?;
        self.cache
            .secret_store()
            .set(&self.secret_key, &self.username, &password)?;
        self.password = password;
        info!("Reset password for credential {}", self.key);
        Ok(())
    }

    /// Prompt for a new username and password.
    ///
    /// The password stored under the old username is deleted before the
    /// username changes, so no entry is left behind under the old address.
    pub fn reset(
        &mut self,
        username_prompt: Option<&str>,
        password_prompt: Option<&str>,
    ) -> Result<(), CacheError> {
        self.cache
            .secret_store()
            .delete(&self.secret_key, &self.username)?;

        let username = ask_username(self.cache, &self.key, &self.options, username_prompt)?;
        self.cache.put_username(&self.key, &username)?;
        self.username = username;

        let password = ask_password(self.cache, &self.key, &self.options, password_prompt)?;
        self.cache
            .secret_store()
            .set(&self.secret_key, &self.username, &password)?;
        self.password = password;

        info!("Reset credential {} in {}", self.key, self.cache.file_name());
        Ok(())
    }

    /// Delete the stored password, keeping the username.
    pub fn remove_password(&mut self) -> Result<(), CacheError> {
        self.cache
            .secret_store()
            .delete(&self.secret_key, &self.username)?;
        debug!("Removed password for credential {}", self.key);
        Ok(())
    }

    /// Delete the stored password, then the credential itself.
    pub fn remove(mut self) -> Result<(), CacheError> {
        self.remove_password()?;
        self.cache.forget_credential(&self.key)
    }

    /// Remove the credential and describe why it was discarded.
    ///
    /// Both the cache entry and the stored password are gone once this
    /// returns `Ok`. The returned error is for the caller to raise.
    pub fn error(self, explanation: impl Into<String>) -> Result<ObjectError, CacheError> {
        let err = ObjectError::new(
            ObjectKind::Credential,
            self.cache.file_name(),
            self.key.as_str(),
            explanation,
        );
        self.remove()?;
        Ok(err)
    }
}

impl fmt::Debug for Credential<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("cache", &self.cache.file_name())
            .field("key", &self.key)
            .field("username", &self.username)
            .field("password", &self.password)
            .finish()
    }
}

fn ask_username(
    cache: &Cache,
    key: &str,
    options: &CredentialOptions,
    prompt: Option<&str>,
) -> Result<String, CacheError> {
    let text = match prompt.or(options.username_prompt.as_deref()) {
        Some(text) => text.to_string(),
        None => cache.default_prompt("username", key),
    };
    cache.ask(&text, false, &options.username_validator)
}

fn ask_password(
    cache: &Cache,
    key: &str,
    options: &CredentialOptions,
    prompt: Option<&str>,
) -> Result<Secret, CacheError> {
    let text = match prompt.or(options.password_prompt.as_deref()) {
        Some(text) => text.to_string(),
        None => cache.default_prompt("password", key),
    };
    let password = cache.ask(&text, options.conceal_password, &options.password_validator)?;
    Ok(Secret::new(password))
}
