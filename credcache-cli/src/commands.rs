//! Subcommand implementations.
//!
//! Each command works on an open [`Cache`] and writes its output to `out`,
//! leaving cache construction and terminal handling to `main`.

use anyhow::{Context, Result};
use clap::ValueEnum;
use credcache_core::{Cache, CredentialOptions, TokenOptions};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Serialize)]
struct Listing<'a> {
    file: String,
    tokens: Vec<&'a str>,
    credentials: &'a BTreeMap<String, String>,
}

pub fn token(cache: &mut Cache, key: &str, conceal: bool, out: &mut impl Write) -> Result<()> {
    let token = cache
        .get_token_with(key, TokenOptions::new().conceal(conceal))
        .with_context(|| format!("Failed to get token {}", key))?;
    writeln!(out, "{}", token.value())?;
    Ok(())
}

pub fn credential(
    cache: &mut Cache,
    key: &str,
    show_password: bool,
    out: &mut impl Write,
) -> Result<()> {
    let credential = cache
        .get_credential_with(key, CredentialOptions::new())
        .with_context(|| format!("Failed to get credential {}", key))?;
    writeln!(out, "{}", credential.username())?;
    if show_password {
        writeln!(out, "{}", credential.password().expose())?;
    }
    Ok(())
}

pub fn reset_token(cache: &mut Cache, key: &str, out: &mut impl Write) -> Result<()> {
    let existed = cache.contains_token(key);
    let mut token = cache.get_token(key)?;
    if existed {
        token.reset(None)?;
    }
    writeln!(out, "Token {} updated", key)?;
    Ok(())
}

pub fn reset_credential(
    cache: &mut Cache,
    key: &str,
    password_only: bool,
    out: &mut impl Write,
) -> Result<()> {
    let existed = cache.contains_credential(key);
    let mut credential = cache.get_credential(key)?;
    if existed {
        if password_only {
            credential.reset_password(None)?;
        } else {
            credential.reset(None, None)?;
        }
    }
    writeln!(out, "Credential {} updated", key)?;
    Ok(())
}

pub fn remove_token(cache: &mut Cache, key: &str, out: &mut impl Write) -> Result<()> {
    if cache.remove_token(key)? {
        writeln!(out, "Token {} removed", key)?;
    } else {
        writeln!(out, "No token named {}", key)?;
    }
    Ok(())
}

pub fn remove_credential(cache: &mut Cache, key: &str, out: &mut impl Write) -> Result<()> {
    if cache.remove_credential(key)? {
        writeln!(out, "Credential {} removed", key)?;
    } else {
        writeln!(out, "No credential named {}", key)?;
    }
    Ok(())
}

/// List entry names; token values and passwords are never printed.
pub fn list(cache: &Cache, format: OutputFormat, out: &mut impl Write) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let listing = Listing {
                file: cache.location().display().to_string(),
                tokens: cache.tokens().keys().map(String::as_str).collect(),
                credentials: cache.credentials(),
            };
            serde_json::to_writer_pretty(&mut *out, &listing)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            writeln!(out, "Cache: {}", cache.location().display())?;
            writeln!(out, "Tokens:")?;
            for key in cache.tokens().keys() {
                writeln!(out, "  {}", key)?;
            }
            writeln!(out, "Credentials:")?;
            for (key, username) in cache.credentials() {
                writeln!(out, "  {} ({})", key, username)?;
            }
        }
    }
    Ok(())
}

pub fn clear(
    cache: &mut Cache,
    tokens_only: bool,
    credentials_only: bool,
    out: &mut impl Write,
) -> Result<()> {
    match (tokens_only, credentials_only) {
        (true, false) => {
            cache.clear_tokens()?;
            writeln!(out, "Tokens cleared")?;
        }
        (false, true) => {
            cache.clear_credentials()?;
            writeln!(out, "Credentials cleared")?;
        }
        _ => {
            cache.clear()?;
            writeln!(out, "Cache cleared")?;
        }
    }
    Ok(())
}
