//! Gemini-backed implementations of the assistant seams.

pub mod gemini_api_oracle;
pub mod gemini_live;

pub use gemini_api_oracle::{DEFAULT_GEMINI_MODEL, GeminiApiOracle, GeminiChatSession};
pub use gemini_live::GeminiLiveTransport;
