#[cfg(feature = "audio")]
pub mod audio;
pub mod catalog_cache;
pub mod geolocation;
pub mod http_catalog_provider;
pub mod paths;
pub mod settings_service;
pub mod storage;

#[cfg(feature = "audio")]
pub use crate::audio::{CpalCapture, RodioPlayback};
pub use crate::catalog_cache::CatalogCache;
pub use crate::geolocation::IpGeolocationProvider;
pub use crate::http_catalog_provider::HttpCatalogProvider;
pub use crate::paths::AscendPaths;
pub use crate::settings_service::SettingsService;
pub use crate::storage::{ConfigStorage, JsonFileStore, MemoryStore, SecretStorage};
