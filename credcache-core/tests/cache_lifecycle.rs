//! Integration tests for cache file lifecycle and token operations.
//!
//! These tests verify:
//! - Creating, loading and resetting cache files
//! - Rejection of malformed documents
//! - Token acquisition, reuse, removal and failure cleanup

use credcache_core::{
    Cache, CacheDocument, CacheError, MemoryStore, ObjectKind, ScriptedPrompter, SecretStore,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const FILE: &str = "cache.yaml";

/// Helper to open a cache in a temporary directory with scripted input.
fn open_with(dir: &Path, prompter: &ScriptedPrompter, store: &MemoryStore) -> Cache {
    Cache::builder(FILE)
        .path(dir)
        .store(store.clone())
        .prompter(prompter.clone())
        .open()
        .unwrap()
}

fn open(dir: &Path) -> Cache {
    open_with(dir, &ScriptedPrompter::default(), &MemoryStore::new())
}

fn read_document(dir: &Path) -> CacheDocument {
    let path = dir.join(FILE);
    let contents = fs::read_to_string(&path).unwrap();
    CacheDocument::parse(&path, &contents).unwrap()
}

#[test]
fn test_fresh_cache_is_empty_on_disk() {
    let temp = TempDir::new().unwrap();
    let cache = open(temp.path());

    assert!(cache.tokens().is_empty());
    assert!(cache.credentials().is_empty());
    assert_eq!(read_document(temp.path()), CacheDocument::default());
}

#[test]
fn test_empty_file_is_initialized() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(FILE), "").unwrap();

    let cache = open(temp.path());
    assert_eq!(cache.document(), &CacheDocument::default());
    assert_eq!(read_document(temp.path()), CacheDocument::default());
}

#[test]
fn test_round_trip_through_file() {
    let temp = TempDir::new().unwrap();
    let prompter = ScriptedPrompter::new(["1", "alice", "pw"]);
    let store = MemoryStore::new();

    let written = {
        let mut cache = open_with(temp.path(), &prompter, &store);
        cache.get_token("a").unwrap();
        cache.get_credential("u").unwrap();
        cache.document().clone()
    };

    let reopened = open_with(temp.path(), &ScriptedPrompter::default(), &store);
    assert_eq!(reopened.document(), &written);
    assert_eq!(reopened.tokens().get("a").map(String::as_str), Some("1"));
    assert_eq!(reopened.credentials().get("u").map(String::as_str), Some("alice"));
}

#[test]
fn test_hand_written_file_is_loaded() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join(FILE),
        "# edited by hand\ntokens:\n  github: ghp_123\ncredentials:\n  jira: alice\n",
    )
    .unwrap();

    let cache = open(temp.path());
    assert_eq!(cache.tokens().get("github").map(String::as_str), Some("ghp_123"));
    assert!(cache.contains_credential("jira"));
}

#[test]
fn test_hand_written_numeric_values_are_usable() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join(FILE),
        "tokens:\n  pin: 1234\ncredentials:\n  jira: alice\n",
    )
    .unwrap();

    let mut cache = open(temp.path());
    assert_eq!(cache.get_token("pin").unwrap().value(), "1234");
    assert!(cache.contains_credential("jira"));
}

#[test]
fn test_missing_credentials_section_fails_to_load() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(FILE);
    fs::write(&path, "tokens:\n  github: ghp_123\n").unwrap();

    let result = Cache::builder(FILE)
        .path(temp.path())
        .store(MemoryStore::new())
        .prompter(ScriptedPrompter::default())
        .open();

    match result {
        Err(CacheError::Load { path: failed, .. }) => assert_eq!(failed, path),
        other => panic!("expected load error, got {:?}", other.map(|_| ())),
    }
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "tokens:\n  github: ghp_123\n",
        "a rejected file must not be rewritten"
    );
}

#[test]
fn test_scalar_document_fails_to_load() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(FILE), "just a string\n").unwrap();

    let result = Cache::builder(FILE)
        .path(temp.path())
        .store(MemoryStore::new())
        .prompter(ScriptedPrompter::default())
        .open();
    assert!(matches!(result, Err(CacheError::Load { .. })));
}

#[test]
fn test_reset_discards_entries_and_passwords() {
    let temp = TempDir::new().unwrap();
    let prompter = ScriptedPrompter::new(["tok", "alice", "pw"]);
    let store = MemoryStore::new();

    {
        let mut cache = open_with(temp.path(), &prompter, &store);
        cache.get_token("github").unwrap();
        cache.get_credential("jira").unwrap();
    }
    assert_eq!(store.len(), 1);

    let cache = Cache::builder(FILE)
        .path(temp.path())
        .reset(true)
        .store(store.clone())
        .prompter(ScriptedPrompter::default())
        .open()
        .unwrap();

    assert_eq!(cache.document(), &CacheDocument::default());
    assert_eq!(read_document(temp.path()), CacheDocument::default());
    assert!(store.is_empty());
}

#[test]
fn test_reset_of_missing_file_creates_it() {
    let temp = TempDir::new().unwrap();
    let cache = Cache::builder(FILE)
        .path(temp.path())
        .reset(true)
        .store(MemoryStore::new())
        .prompter(ScriptedPrompter::default())
        .open()
        .unwrap();

    assert!(cache.location().is_file());
}

#[test]
fn test_get_token_reuses_cached_value() {
    let temp = TempDir::new().unwrap();
    let prompter = ScriptedPrompter::new(["t"]);
    let mut cache = open_with(temp.path(), &prompter, &MemoryStore::new());

    assert_eq!(cache.get_token("k").unwrap().value(), "t");
    assert_eq!(cache.get_token("k").unwrap().value(), "t");
    assert_eq!(prompter.prompt_count(), 1);
}

#[test]
fn test_token_written_through_to_file() {
    let temp = TempDir::new().unwrap();
    let prompter = ScriptedPrompter::new(["ghp_123"]);
    let mut cache = open_with(temp.path(), &prompter, &MemoryStore::new());

    cache.get_token("github").unwrap();
    let on_disk = read_document(temp.path());
    assert_eq!(on_disk.tokens.get("github").map(String::as_str), Some("ghp_123"));
}

#[test]
fn test_removed_token_is_prompted_again() {
    let temp = TempDir::new().unwrap();
    let prompter = ScriptedPrompter::new(["first", "second"]);
    let mut cache = open_with(temp.path(), &prompter, &MemoryStore::new());

    cache.get_token("k").unwrap().remove().unwrap();
    assert!(!cache.contains_token("k"));
    assert!(read_document(temp.path()).tokens.is_empty());

    assert_eq!(cache.get_token("k").unwrap().value(), "second");
    assert_eq!(prompter.prompt_count(), 2);
}

#[test]
fn test_token_reset_persists() {
    let temp = TempDir::new().unwrap();
    let prompter = ScriptedPrompter::new(["old", "new"]);
    let mut cache = open_with(temp.path(), &prompter, &MemoryStore::new());

    cache.get_token("k").unwrap().reset(None).unwrap();

    let reopened = open(temp.path());
    assert_eq!(reopened.tokens().get("k").map(String::as_str), Some("new"));
}

#[test]
fn test_token_error_removes_entry() {
    let temp = TempDir::new().unwrap();
    let prompter = ScriptedPrompter::new(["expired-token"]);
    let mut cache = open_with(temp.path(), &prompter, &MemoryStore::new());

    let token = cache.get_token("github").unwrap();
    let err = token.error("rejected by server").unwrap();

    assert_eq!(err.kind, ObjectKind::Token);
    assert_eq!(err.file, FILE);
    assert_eq!(err.key, "github");
    assert_eq!(err.to_string(), "Token github in cache cache.yaml: rejected by server");
    assert!(!cache.contains_token("github"));
    assert!(read_document(temp.path()).tokens.is_empty());
}

#[test]
fn test_clear_tokens_keeps_credentials() {
    let temp = TempDir::new().unwrap();
    let prompter = ScriptedPrompter::new(["a", "b", "alice", "pw"]);
    let store = MemoryStore::new();
    let mut cache = open_with(temp.path(), &prompter, &store);

    cache.get_token("a").unwrap();
    cache.get_token("b").unwrap();
    cache.get_credential("jira").unwrap();

    cache.clear_tokens().unwrap();
    assert!(cache.tokens().is_empty());
    assert!(cache.contains_credential("jira"));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_clear_empties_everything() {
    let temp = TempDir::new().unwrap();
    let prompter = ScriptedPrompter::new(["a", "alice", "pw"]);
    let store = MemoryStore::new();
    let mut cache = open_with(temp.path(), &prompter, &store);

    cache.get_token("a").unwrap();
    let secret_key = cache.secret_key("jira");
    cache.get_credential("jira").unwrap();

    cache.clear().unwrap();
    assert_eq!(cache.document(), &CacheDocument::default());
    assert_eq!(read_document(temp.path()), CacheDocument::default());
    assert!(!store.exists(&secret_key, "alice").unwrap());
}
