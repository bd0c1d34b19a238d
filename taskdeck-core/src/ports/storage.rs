//! Durable key-value storage port

use crate::domain::result::Result;

/// String key to string value storage that survives process restarts
pub trait KeyValueStore: Send + Sync {
    /// Value for `key`, or `None` if it was never set or has been removed
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}
