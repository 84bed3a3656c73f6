//! Durable string-keyed storage used by the report store.

use async_trait::async_trait;

use crate::error::Result;

/// A durable key-value store holding string values.
///
/// Implementations must make a completed `set` or `remove` visible to every
/// later `get` on the same backend. Nothing more is promised: there are no
/// transactions across calls.
#[async_trait]
pub trait KeyValueBackend: Send + Sync {
    /// Short name of the backend (for logging/debugging).
    fn name(&self) -> &'static str;

    /// Read the value stored under `key`, or `None` when the key is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    async fn remove(&self, key: &str) -> Result<()>;
}
