//! Assistant error types.

use thiserror::Error;

/// Failures surfaced by the assistant adapter and its collaborators.
///
/// Oracle failures during text chat never reach the end user (they become
/// [`super::FALLBACK_REPLY`]); the other variants are returned to callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssistantError {
    /// `send_text` or voice was used before `initialize`.
    #[error("Chat session not initialized")]
    Uninitialized,

    /// `start_voice` was called while a voice session is running.
    #[error("Voice session already active")]
    VoiceAlreadyActive,

    /// Microphone, playback or live-connection setup failed.
    #[error("Voice session setup failed: {0}")]
    VoiceSetup(String),

    /// The conversational oracle rejected or failed a request.
    #[error("Oracle error: {message}")]
    Oracle {
        status_code: Option<u16>,
        message: String,
        is_retryable: bool,
    },

    /// Live transport failure after setup.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Audio payload could not be decoded.
    #[error("Audio decode error: {0}")]
    AudioDecode(String),

    /// System instruction rendering failed.
    #[error("Prompt error: {0}")]
    Prompt(String),
}

impl AssistantError {
    /// Creates an Oracle error without an HTTP status.
    pub fn oracle(message: impl Into<String>) -> Self {
        Self::Oracle {
            status_code: None,
            message: message.into(),
            is_retryable: false,
        }
    }

    pub fn voice_setup(message: impl Into<String>) -> Self {
        Self::VoiceSetup(message.into())
    }

    /// True for failures the user can act on (e.g. microphone permission).
    pub fn is_user_actionable(&self) -> bool {
        matches!(self, Self::VoiceSetup(_) | Self::VoiceAlreadyActive)
    }
}
