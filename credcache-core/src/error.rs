//! Top-level error types for credcache.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::prompt::PromptError;
use crate::store::StoreError;

/// Top-level error type encompassing all cache errors.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache file could not be parsed into a tokens/credentials document.
    #[error("failed to load cache {path:?}: {reason}")]
    Load { path: PathBuf, reason: String },

    /// I/O error reading or writing the cache file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document could not be serialized.
    #[error("YAML error: {0}")]
    Serialize(#[from] serde_yaml::Error),

    /// Error from secret storage operations.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The input provider failed or ran dry.
    #[error("prompt error: {0}")]
    Prompt(#[from] PromptError),

    /// An entry was declared invalid by its user and has been removed.
    #[error(transparent)]
    Object(#[from] ObjectError),

    /// A value supplied without prompting failed its validator.
    #[error("value for {key} rejected: {message}")]
    Rejected { key: String, message: String },
}

/// Kind of cache entry an [`ObjectError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Token,
    Credential,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Token => write!(f, "Token"),
            ObjectKind::Credential => write!(f, "Credential"),
        }
    }
}

/// Failure of a token or credential discovered after it was acquired.
///
/// Produced by [`Token::error`](crate::Token::error) and
/// [`Credential::error`](crate::Credential::error), which remove the entry
/// from its cache before handing this value back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} {key} in cache {file}: {explanation}")]
pub struct ObjectError {
    /// File name of the cache the entry belonged to.
    pub file: String,
    /// Key of the removed entry.
    pub key: String,
    pub kind: ObjectKind,
    pub explanation: String,
}

impl ObjectError {
    /// Build an error; an empty explanation becomes `"{kind} error raised"`.
    pub fn new(
        kind: ObjectKind,
        file: impl Into<String>,
        key: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        let explanation = explanation.into();
        let explanation = if explanation.is_empty() {
            format!("{} error raised", kind)
        } else {
            explanation
        };
        Self {
            file: file.into(),
            key: key.into(),
            kind,
            explanation,
        }
    }
}
