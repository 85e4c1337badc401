//! Cached tokens.
//!
//! A token is a single opaque string stored in plaintext in the cache file.

use std::fmt;
use tracing::{debug, info};

use crate::cache::Cache;
use crate::error::{CacheError, ObjectError, ObjectKind};
use crate::validator::Validator;

/// How a token is acquired when it is missing or reset.
#[derive(Debug, Clone, Default)]
pub struct TokenOptions {
    /// Prompt text. Defaults to naming the key and the cache file.
    pub prompt: Option<String>,
    pub validator: Validator,
    /// Hide typed characters.
    pub conceal: bool,
}

impl TokenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn conceal(mut self, conceal: bool) -> Self {
        self.conceal = conceal;
        self
    }
}

/// A token bound to the cache it came from.
///
/// Mutations go through the cache and are persisted immediately.
pub struct Token<'c> {
    cache: &'c mut Cache,
    key: String,
    value: String,
    options: TokenOptions,
}

impl<'c> Token<'c> {
    pub(crate) fn acquire(
        cache: &'c mut Cache,
        key: &str,
        options: TokenOptions,
    ) -> Result<Self, CacheError> {
        let value = match cache.tokens().get(key) {
            Some(value) => {
                debug!("Token {} found in {}", key, cache.file_name());
                value.clone()
            }
            None => {
                let text = options
                    .prompt
                    .clone()
                    .unwrap_or_else(|| cache.default_prompt("token", key));
                let value = cache.ask(&text, options.conceal, &options.validator)?;
                cache.put_token(key, &value)?;
                info!("Stored token {} in {}", key, cache.file_name());
                value
            }
        };

        Ok(Self {
            cache,
            key: key.to_string(),
            value,
            options,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Prompt for a new value and overwrite the cached one.
    ///
    /// `prompt` replaces the configured prompt text for this call only.
    pub fn reset(&mut self, prompt: Option<&str>) -> Result<(), CacheError> {
        let text = match prompt.or(self.options.prompt.as_deref()) {
            Some(text) => text.to_string(),
            None => self.cache.default_prompt("token", &self.key),
        };
        let value = self
            .cache
            .ask(&text, self.options.conceal, &self.options.validator)?;
        self.store(value)
    }

    /// Overwrite the cached value without prompting.
    ///
    /// The value must satisfy the token's validator.
    pub fn set_value(&mut self, value: impl Into<String>) -> Result<(), CacheError> {
        let value = value.into();
        if !self.options.validator.validate(&value) {
            return Err(CacheError::Rejected {
                key: self.key.clone(),
                message: self.options.validator.message().to_string(),
            });
        }
        self.store(value)
    }

    /// Delete the token from its cache.
    pub fn remove(self) -> Result<(), CacheError> {
        self.cache.remove_token(&self.key)?;
        Ok(())
    }

    /// Remove the token and describe why it was discarded.
    ///
    /// Use when the token turns out to be invalid after it was acquired,
    /// e.g. rejected by the service it authenticates against. The returned
    /// error is for the caller to raise.
    pub fn error(self, explanation: impl Into<String>) -> Result<ObjectError, CacheError> {
        let err = ObjectError::new(
            ObjectKind::Token,
            self.cache.file_name(),
            self.key.as_str(),
            explanation,
        );
        self.remove()?;
        Ok(err)
    }

    fn store(&mut self, value: String) -> Result<(), CacheError> {
        self.cache.put_token(&self.key, &value)?;
        self.value = value;
        info!("Reset token {} in {}", self.key, self.cache.file_name());
        Ok(())
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("cache", &self.cache.file_name())
            .field("key", &self.key)
            .field("value", &"[REDACTED]")
            .finish()
    }
}
