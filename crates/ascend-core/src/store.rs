//! Key-value persistence trait.

use async_trait::async_trait;

use crate::error::Result;

/// String-keyed persistence backend.
///
/// Values are opaque strings; callers store JSON text and treat anything
/// that fails to parse as absent. Writes overwrite unconditionally and no
/// ordering is promised between concurrent writers (last write wins).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the raw value stored under `key`, or `None` if never set.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Deletes `key`; deleting an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}
