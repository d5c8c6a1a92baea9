//! Storage is organized through [KeyValueStore].
//! The basic idea is:
//!  - Every piece of application state lives under a single string key.
//!  - Values are opaque strings, the components decide how to encode them (JSON for the most part).
//!  - A write replaces the whole value, there are no partial updates.

pub mod file_store;
pub mod memory;

use std::ops::Deref;

use async_trait::async_trait;

/// Key holding the JSON array of recipes.
pub const RECIPES_KEY: &str = "recipes";
/// Key holding the JSON object of date -> logged entries.
pub const LOGS_KEY: &str = "logs";
/// Key holding the raw daily goal.
pub const DAILY_GOAL_KEY: &str = "dailyGoal";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O failure for key `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Value stored under `{key}` can't be decoded: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Value for `{key}` can't be encoded: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    pub fn io(key: &str, source: std::io::Error) -> Self {
        Self::Io {
            key: key.to_owned(),
            source,
        }
    }
}

/// Interface for abstracting a durable string store. Implementations must make a successful
/// [KeyValueStore::set] visible to every following [KeyValueStore::get], including ones made
/// after a restart.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns `None` if nothing was ever written under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

#[async_trait]
impl<T> KeyValueStore for T
where
    T: Deref + Send + Sync,
    T::Target: KeyValueStore,
{
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.deref().get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.deref().set(key, value).await
    }
}
