//! Shopping assistant domain: oracle seams, live audio framing and the
//! system instruction builder.

pub mod audio;
pub mod device;
pub mod error;
pub mod geo;
pub mod live;
pub mod model;
pub mod oracle;
pub mod playback;
pub mod prompt;

pub use error::AssistantError;
pub use model::{
    AssistantMode, ChatMessage, ChatRole, Citation, GeoLocation, OracleReply, FALLBACK_REPLY,
};
pub use oracle::{ChatConfig, ChatSession, ConversationalOracle, OracleTool};
