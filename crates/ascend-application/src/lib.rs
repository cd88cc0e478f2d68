//! Application layer for the ASCEND storefront.
//!
//! Use cases coordinating the domain (`ascend-core`) with storage and
//! network adapters (`ascend-infrastructure`).

pub mod assistant;
pub mod share;
pub mod storefront;

pub use assistant::{AssistantAdapter, VoiceBackend};
pub use share::{ShareGuard, ShareTicket, share_url};
pub use storefront::{CatalogSource, RefreshOutcome, Storefront, StorefrontOptions};
