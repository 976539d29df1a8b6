use alloc::string::{String, ToString};
use hashbrown::HashMap;

use crate::StorageError;

/// Key-value scalar store supplied by the host, such as browser local storage.
pub trait ScoreStore {
    fn get(&self, key: &str) -> core::result::Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> core::result::Result<(), StorageError>;
}

impl<S: ScoreStore + ?Sized> ScoreStore for &mut S {
    fn get(&self, key: &str) -> core::result::Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> core::result::Result<(), StorageError> {
        (**self).set(key, value)
    }
}

pub trait StorageKey {
    const KEY: &'static str;
}

/// Lowest move count of any won game, stored as a decimal string.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BestScore;

impl StorageKey for BestScore {
    const KEY: &'static str = "bestScore";
}

/// In-process store for headless hosts and tests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ScoreStore for MemoryStore {
    fn get(&self, key: &str) -> core::result::Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> core::result::Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
