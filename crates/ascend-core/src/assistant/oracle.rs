//! Conversational oracle traits.
//!
//! The oracle is an external black box. These traits are the seam the
//! assistant adapter talks through; `ascend-interaction` provides the Gemini
//! implementation and tests provide scripted ones.

use async_trait::async_trait;

use super::error::AssistantError;
use super::model::{GeoLocation, OracleReply};

/// Augmentation tools the oracle may invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OracleTool {
    WebSearch,
    Maps,
}

/// Parameters fixed at chat-session creation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    pub system_instruction: String,
    pub tools: Vec<OracleTool>,
    /// Biases the maps tool when present.
    pub location: Option<GeoLocation>,
}

impl ChatConfig {
    /// Session with web search and maps enabled.
    pub fn with_grounding(system_instruction: impl Into<String>, location: Option<GeoLocation>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            tools: vec![OracleTool::WebSearch, OracleTool::Maps],
            location,
        }
    }
}

/// A persistent multi-turn conversation.
#[async_trait]
pub trait ChatSession: Send + Sync {
    /// Appends `message` to the conversation and returns the oracle's reply.
    async fn send_message(&self, message: &str) -> Result<OracleReply, AssistantError>;
}

/// Factory for chat sessions plus one-shot generation.
#[async_trait]
pub trait ConversationalOracle: Send + Sync {
    async fn start_chat(&self, config: ChatConfig) -> Result<Box<dyn ChatSession>, AssistantError>;

    /// Single prompt without conversation state.
    async fn generate(&self, prompt: &str) -> Result<String, AssistantError>;
}
