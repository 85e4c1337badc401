//! # credcache Core
//!
//! A small local cache for named tokens and username/password credentials.
//!
//! This crate provides:
//! - [`Cache`] - a YAML file holding tokens and credential usernames
//! - [`Token`] and [`Credential`] - entries that prompt for missing values
//!   and write changes straight back to the file
//! - [`SecretStore`] - where passwords live (OS keyring or in-memory)
//! - [`Validator`] - acceptance rules applied to prompted input
//! - [`Prompter`] - the input provider, swappable for scripted input
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use credcache_core::{Cache, CredentialOptions, Validator};
//!
//! fn jira_login() -> Result<(String, String), credcache_core::CacheError> {
//!     let mut cache = Cache::open("credentials.yaml", "", false)?;
//!     let options = CredentialOptions::new().username_validator(Validator::email());
//!     let credential = cache.get_credential_with("jira", options)?;
//!     Ok((
//!         credential.username().to_string(),
//!         credential.password().expose().to_string(),
//!     ))
//! }
//! ```

pub mod cache;
pub mod credential;
pub mod error;
pub mod prompt;
pub mod store;
pub mod token;
pub mod validator;

// Re-export commonly used types at crate root
pub use cache::{Cache, CacheBuilder, CacheDocument};

pub use credential::{Credential, CredentialOptions, derive_secret_key};

pub use error::{CacheError, ObjectError, ObjectKind};

pub use prompt::{PromptError, PromptRecord, Prompter, ScriptedPrompter, TerminalPrompter};

pub use store::{MemoryStore, Secret, SecretStore, StoreError, create_store};

#[cfg(feature = "keyring-store")]
pub use store::KeyringStore;

pub use token::{Token, TokenOptions};

pub use validator::{PasswordPolicy, Validator};
