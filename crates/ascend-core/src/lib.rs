//! Core domain of the ASCEND storefront: catalog, cart engine, settings,
//! checkout handoff and the shopping assistant seams.

pub mod assistant;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod settings;
pub mod store;

// Re-export common error type
pub use error::AscendError;
