// src/systems/sdk.rs

//! # Systems SDK
//!
//! Seams between the progression systems and the collaborators they do not
//! own: durable storage and the remote character / evolution-chain catalog.
//! Systems only ever talk to these traits, so a game can plug in a file, a
//! browser store or an HTTP client without touching the rules.
//!
//! ## Collaborators
//! - [`KeyValueStore`]: `get(key) -> Option<blob>`, `set(key, blob)`.
//!   Treated as last-write-wins storage with a single in-process writer.
//! - [`CharacterSource`]: list of character records.
//! - [`ChainSource`]: evolution-chain tree for a reference string.
//!
//! ## Failure contract
//! Collaborator errors never reach the reducer. Systems recover locally:
//! - storage read/write errors are logged and the in-memory state stays
//!   authoritative;
//! - source errors (or empty results) swap in the built-in reference data.
//!
//! ## Bundled implementations
//! - [`MemoryStore`]: in-process map with a write counter, handy in tests.
//! - [`Offline`]: a source that always fails, forcing built-in data.

use std::collections::HashMap;

use thiserror::Error;

use crate::systems::catalog::{ChainLink, Character};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("failed to write key {key:?}: {reason}")]
    Write { key: String, reason: String },
}

/// Durable string storage keyed by name.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("data source unreachable: {0}")]
    Unreachable(String),
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("nothing found for {0:?}")]
    NotFound(String),
}

/// Remote list of selectable characters.
pub trait CharacterSource {
    fn fetch_characters(&self) -> Result<Vec<Character>, SourceError>;

    /// One character by id. Defaults to a scan of [`fetch_characters`](Self::fetch_characters).
    fn fetch_character(&self, id: u32) -> Result<Character, SourceError> {
        self.fetch_characters()?
            .into_iter()
            .find(|c| c.id == id)
            .ok_or_else(|| SourceError::NotFound(format!("character {id}")))
    }
}

/// Remote evolution-chain trees.
pub trait ChainSource {
    fn fetch_chain(&self, reference: &str) -> Result<ChainLink, SourceError>;
}

// -----------------------------------------------------------------------------
// Bundled implementations
// -----------------------------------------------------------------------------

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one entry (does not count as a write).
    pub fn with_entry(key: &str, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.to_string(), value.into());
        Self { entries, writes: 0 }
    }

    pub fn peek(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of successful `set` calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        self.writes += 1;
        Ok(())
    }
}

/// No network: every fetch fails, so callers fall back to built-in data.
#[derive(Clone, Copy, Debug, Default)]
pub struct Offline;

impl CharacterSource for Offline {
    fn fetch_characters(&self) -> Result<Vec<Character>, SourceError> {
        Err(SourceError::Unreachable("offline".into()))
    }
}

impl ChainSource for Offline {
    fn fetch_chain(&self, reference: &str) -> Result<ChainLink, SourceError> {
        Err(SourceError::Unreachable(format!("offline ({reference})")))
    }
}
