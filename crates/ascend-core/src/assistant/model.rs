//! Assistant domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::settings::Language;

/// Reply shown when the oracle fails during text chat.
pub const FALLBACK_REPLY: &str =
    "I'm having a little trouble connecting to the inventory right now. Please try again in a moment!";

/// A grounding source returned when the oracle used search or maps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    pub uri: String,
}

/// Text reply from the oracle.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OracleReply {
    pub text: String,
    /// Empty when no augmentation tool was used.
    #[serde(default)]
    pub citations: Vec<Citation>,
}

impl OracleReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            citations: Vec::new(),
        }
    }

    pub fn with_citations(mut self, citations: Vec<Citation>) -> Self {
        self.citations = citations;
        self
    }

    /// The scripted apology used in place of an oracle failure.
    pub fn fallback() -> Self {
        Self::text(FALLBACK_REPLY)
    }

    pub fn is_fallback(&self) -> bool {
        self.text == FALLBACK_REPLY && self.citations.is_empty()
    }
}

/// Approximate device location used to bias the maps tool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// Lifecycle of the assistant adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AssistantMode {
    /// No chat session yet; `send_text` fails.
    #[default]
    Uninitialized,
    /// Text chat available.
    TextReady,
    /// A live audio session is running on top of text chat.
    VoiceActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One entry of the chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub text: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(ChatRole::User, text.into(), Vec::new())
    }

    pub fn model(reply: OracleReply) -> Self {
        Self::new(ChatRole::Model, reply.text, reply.citations)
    }

    /// Greeting placed at the top of an empty transcript.
    pub fn welcome(language: Language) -> Self {
        let text = match language {
            Language::En => {
                "Hi! I'm the ASCEND Assistant. Ask me about any product, or tell me what you're looking for."
            }
            Language::Ar => "مرحباً! أنا مساعد ASCEND. اسألني عن أي منتج أو أخبرني بما تبحث عنه.",
        };
        let mut message = Self::new(ChatRole::Model, text.to_string(), Vec::new());
        message.id = "welcome".to_string();
        message
    }

    fn new(role: ChatRole, text: String, citations: Vec<Citation>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            text,
            citations,
            timestamp: Utc::now(),
        }
    }
}
