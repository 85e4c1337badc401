//! File-backed token and credential cache.
//!
//! A [`Cache`] owns a [`CacheDocument`] mirrored to a YAML file:
//!
//! ```yaml
//! credentials:
//!   jira: alice
//! tokens:
//!   github: ghp_xxx
//! ```
//!
//! Passwords never appear in the file; they live in the [`SecretStore`]
//! under the credential's derived secret key and current username.
//!
//! Every mutating operation rewrites the whole file before returning. The
//! file is not locked; a single process is expected to own a given cache.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::credential::{Credential, CredentialOptions, derive_secret_key};
use crate::error::CacheError;
use crate::prompt::{Prompter, TerminalPrompter, prompt_until_valid};
use crate::store::{SecretStore, create_store};
use crate::token::{Token, TokenOptions};
use crate::validator::Validator;

/// In-memory form of a cache file.
///
/// Both sections are always present, even when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheDocument {
    /// Token name to plaintext token value.
    pub tokens: BTreeMap<String, String>,
    /// Credential name to username.
    pub credentials: BTreeMap<String, String>,
}

impl CacheDocument {
    /// Parse and validate the contents of a cache file.
    ///
    /// The whole document is rejected if it is not a mapping or if either
    /// section is missing or not a mapping. Unquoted numbers and booleans
    /// are kept as their text; nulls, lists and nested mappings are rejected.
    pub fn parse(path: &Path, contents: &str) -> Result<Self, CacheError> {
        let load_error = |reason: String| CacheError::Load {
            path: path.to_path_buf(),
            reason,
        };

        let value: serde_yaml::Value = serde_yaml::from_str(contents)
            .map_err(|e| load_error(format!("invalid YAML: {}", e)))?;

        let serde_yaml::Value::Mapping(root) = value else {
            return Err(load_error("document is not a mapping".to_string()));
        };

        let section = |name: &str| -> Result<BTreeMap<String, String>, CacheError> {
            let entries = match root.get(name) {
                None => return Err(load_error(format!("missing `{}` section", name))),
                Some(serde_yaml::Value::Mapping(entries)) => entries,
                Some(_) => return Err(load_error(format!("`{}` is not a mapping", name))),
            };

            let mut section = BTreeMap::new();
            for (key, value) in entries {
                let Some(key) = scalar_string(key) else {
                    return Err(load_error(format!("`{}` has a non-scalar key", name)));
                };
                let Some(value) = scalar_string(value) else {
                    return Err(load_error(format!(
                        "`{}.{}` must be a string, number or boolean",
                        name, key
                    )));
                };
                section.insert(key, value);
            }
            Ok(section)
        };

        Ok(Self {
            tokens: section("tokens")?,
            credentials: section("credentials")?,
        })
    }
}

fn scalar_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Configures and opens a [`Cache`].
///
/// Defaults: current directory, no reset, OS keyring (with memory
/// fallback), terminal prompting.
pub struct CacheBuilder {
    file_name: String,
    path: PathBuf,
    reset: bool,
    store: Option<Box<dyn SecretStore>>,
    prompter: Option<Box<dyn Prompter>>,
}

impl CacheBuilder {
    fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            path: PathBuf::new(),
            reset: false,
            store: None,
            prompter: None,
        }
    }

    /// Directory holding the cache file.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Discard existing entries, including their stored passwords, on open.
    pub fn reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        self
    }

    /// Secret store for credential passwords.
    pub fn store(mut self, store: impl SecretStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Provider for missing or reset values.
    pub fn prompter(mut self, prompter: impl Prompter + 'static) -> Self {
        self.prompter = Some(Box::new(prompter));
        self
    }

    /// Open the cache file, creating it if needed.
    pub fn open(self) -> Result<Cache, CacheError> {
        let location = if self.path.as_os_str().is_empty() {
            PathBuf::from(&self.file_name)
        } else {
            self.path.join(&self.file_name)
        };

        let mut cache = Cache {
            file_name: self.file_name,
            location,
            document: CacheDocument::default(),
            store: self.store.unwrap_or_else(|| create_store(true)),
            prompter: self
                .prompter
                .unwrap_or_else(|| Box::new(TerminalPrompter::new())),
        };

        if cache.location.is_file() {
            cache.load()?;
            if self.reset {
                cache.clear()?;
                cache.create()?;
                info!("Reset cache {:?}", cache.location);
            }
        } else {
            cache.create()?;
        }

        Ok(cache)
    }
}

/// A token and credential cache backed by a YAML file.
///
/// # Example
///
/// ```rust,no_run
/// use credcache_core::Cache;
///
/// let mut cache = Cache::open("credentials.yaml", "/home/alice/.config/tool", false)?;
/// let token = cache.get_token("github")?;
/// println!("token length: {}", token.value().len());
/// # Ok::<(), credcache_core::CacheError>(())
/// ```
pub struct Cache {
    file_name: String,
    location: PathBuf,
    document: CacheDocument,
    store: Box<dyn SecretStore>,
    prompter: Box<dyn Prompter>,
}

impl Cache {
    /// Start configuring a cache stored as `file_name`.
    pub fn builder(file_name: impl Into<String>) -> CacheBuilder {
        CacheBuilder::new(file_name)
    }

    /// Open `path/file_name` with the OS keyring and terminal prompting.
    pub fn open(
        file_name: impl Into<String>,
        path: impl Into<PathBuf>,
        reset: bool,
    ) -> Result<Self, CacheError> {
        Self::builder(file_name).path(path).reset(reset).open()
    }

    /// File name the cache was opened with.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Full path of the backing file.
    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn document(&self) -> &CacheDocument {
        &self.document
    }

    pub fn tokens(&self) -> &BTreeMap<String, String> {
        &self.document.tokens
    }

    pub fn credentials(&self) -> &BTreeMap<String, String> {
        &self.document.credentials
    }

    pub fn contains_token(&self, key: &str) -> bool {
        self.document.tokens.contains_key(key)
    }

    pub fn contains_credential(&self, key: &str) -> bool {
        self.document.credentials.contains_key(key)
    }

    /// Secret-store service name used for the credential `key`.
    pub fn secret_key(&self, key: &str) -> String {
        derive_secret_key(&self.location, key)
    }

    /// Return the token `key`, prompting for it if it is not cached.
    pub fn get_token(&mut self, key: &str) -> Result<Token<'_>, CacheError> {
        Token::acquire(self, key, TokenOptions::default())
    }

    /// Like [`get_token`](Self::get_token) with a custom prompt or validator.
    pub fn get_token_with(
        &mut self,
        key: &str,
        options: TokenOptions,
    ) -> Result<Token<'_>, CacheError> {
        Token::acquire(self, key, options)
    }

    /// Return the credential `key`, prompting for whatever is missing.
    pub fn get_credential(&mut self, key: &str) -> Result<Credential<'_>, CacheError> {
        Credential::acquire(self, key, CredentialOptions::default())
    }

    /// Like [`get_credential`](Self::get_credential) with custom prompts or validators.
    pub fn get_credential_with(
        &mut self,
        key: &str,
        options: CredentialOptions,
    ) -> Result<Credential<'_>, CacheError> {
        Credential::acquire(self, key, options)
    }

    /// Remove the token `key` without prompting.
    ///
    /// Returns whether a token was removed.
    pub fn remove_token(&mut self, key: &str) -> Result<bool, CacheError> {
        if self.document.tokens.remove(key).is_none() {
            return Ok(false);
        }
        self.persist()?;
        info!("Removed token {} from {}", key, self.file_name);
        Ok(true)
    }

    /// Remove the credential `key` and its stored password without prompting.
    ///
    /// Returns whether a credential was removed.
    pub fn remove_credential(&mut self, key: &str) -> Result<bool, CacheError> {
        let Some(username) = self.document.credentials.get(key) else {
            return Ok(false);
        };
        self.store.delete(&self.secret_key(key), username)?;
        self.forget_credential(key)?;
        Ok(true)
    }

    /// Empty the tokens section.
    pub fn clear_tokens(&mut self) -> Result<(), CacheError> {
        self.document.tokens.clear();
        self.persist()?;
        info!("Cleared tokens in {}", self.file_name);
        Ok(())
    }

    /// Delete every stored password, then empty the credentials section.
    ///
    /// A store failure part way through leaves the section untouched, with
    /// some passwords possibly already gone.
    pub fn clear_credentials(&mut self) -> Result<(), CacheError> {
        for (key, username) in &self.document.credentials {
            let secret_key = derive_secret_key(&self.location, key);
            if self.store.exists(&secret_key, username)? {
                self.store.delete(&secret_key, username)?;
                debug!("Deleted stored password for credential {}", key);
            }
        }
        self.document.credentials.clear();
        self.persist()?;
        info!("Cleared credentials in {}", self.file_name);
        Ok(())
    }

    /// Clear credentials, then tokens.
    pub fn clear(&mut self) -> Result<(), CacheError> {
        self.clear_credentials()?;
        self.clear_tokens()
    }

    pub(crate) fn secret_store(&self) -> &dyn SecretStore {
        self.store.as_ref()
    }

    pub(crate) fn ask(
        &self,
        text: &str,
        conceal: bool,
        validator: &Validator,
    ) -> Result<String, CacheError> {
        Ok(prompt_until_valid(
            self.prompter.as_ref(),
            text,
            conceal,
            validator,
        )?)
    }

    pub(crate) fn default_prompt(&self, what: &str, key: &str) -> String {
        format!(
            "Please input the {} for {} in the {} cache: ",
            what, key, self.file_name
        )
    }

    pub(crate) fn put_token(&mut self, key: &str, value: &str) -> Result<(), CacheError> {
        self.document
            .tokens
            .insert(key.to_string(), value.to_string());
        self.persist()
    }

    pub(crate) fn put_username(&mut self, key: &str, username: &str) -> Result<(), CacheError> {
        self.document
            .credentials
            .insert(key.to_string(), username.to_string());
        self.persist()
    }

    pub(crate) fn forget_credential(&mut self, key: &str) -> Result<(), CacheError> {
        if self.document.credentials.remove(key).is_some() {
            self.persist()?;
            info!("Removed credential {} from {}", key, self.file_name);
        }
        Ok(())
    }

    fn load(&mut self) -> Result<(), CacheError> {
        let bytes = fs::read(&self.location)?;
        if bytes.is_empty() {
            debug!("Cache file {:?} is empty, initializing", self.location);
            return self.create();
        }

        let contents = String::from_utf8(bytes).map_err(|_| CacheError::Load {
            path: self.location.clone(),
            reason: "not valid UTF-8".to_string(),
        })?;
        self.document = CacheDocument::parse(&self.location, &contents)?;
        debug!(
            "Loaded {} tokens and {} credentials from {:?}",
            self.document.tokens.len(),
            self.document.credentials.len(),
            self.location
        );
        Ok(())
    }

    fn create(&mut self) -> Result<(), CacheError> {
        self.document = CacheDocument::default();
        if let Some(parent) = self.location.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        self.persist()?;
        info!("Created cache {:?}", self.location);
        Ok(())
    }

    fn persist(&self) -> Result<(), CacheError> {
        let contents = serde_yaml::to_string(&self.document)?;
        fs::write(&self.location, contents)?;
        debug!("Wrote cache {:?}", self.location);
        Ok(())
    }
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("location", &self.location)
            .field("tokens", &self.document.tokens.len())
            .field("credentials", &self.document.credentials.len())
            .finish()
    }
}
