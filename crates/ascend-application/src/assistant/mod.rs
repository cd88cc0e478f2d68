//! Assistant session adapter: text chat and live voice on one handle.

mod adapter;
mod voice;

#[cfg(test)]
mod tests;

pub use adapter::{AssistantAdapter, DESCRIPTION_FALLBACK};
pub use voice::{VoiceBackend, VolumeMeter};
