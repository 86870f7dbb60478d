pub mod json_backend;
pub mod memory;

use crate::errors::Result;

/// Synchronous key-value persistence adapter.
///
/// Each key names one slot holding a serialized collection. Implementations
/// must make `set` replace the whole slot and `remove` delete it; removing a
/// missing slot is not an error.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

pub use json_backend::JsonStorage;
pub use memory::MemoryStorage;
