mod errors;
mod file_storage;
#[cfg(test)]
mod memory_storage;
mod store;

pub use errors::StorageError;
pub use file_storage::FileStorage;
#[cfg(test)]
pub use memory_storage::{MemoryStorage, ReadOnlyStorage};
pub use store::Store;

pub const TRANSACTIONS_KEY: &str = "axiony_data";
pub const LANGUAGE_KEY: &str = "axiony_lang";
pub const SETTINGS_KEY: &str = "axiony_settings";

/// String values addressed by stable keys, in the manner of browser local storage.
pub trait KeyValueStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}
