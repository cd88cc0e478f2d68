//! Key-value store backends.

mod config_storage;
mod json_file_store;
mod memory_store;
mod secret_storage;

pub use config_storage::{ConfigStorage, ConfigStorageError};
pub use json_file_store::{JsonFileStore, JsonStoreError};
pub use memory_store::MemoryStore;
pub use secret_storage::{GEMINI_API_KEY_ENV, SecretStorage, SecretStorageError};
