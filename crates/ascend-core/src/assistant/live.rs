//! Live (bidirectional audio) session seam.
//!
//! A [`LiveTransport`] opens a [`LiveLink`]: an ordered outbound channel for
//! microphone chunks, an inbound channel of server events, and a handle that
//! closes the connection.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::AssistantError;

/// Sample rate of microphone audio sent upstream.
pub const INPUT_SAMPLE_RATE: u32 = 16_000;
/// Sample rate of model audio received downstream.
pub const OUTPUT_SAMPLE_RATE: u32 = 24_000;

/// Parameters for opening a live session.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveConfig {
    pub model: String,
    pub voice_name: String,
    pub system_instruction: Option<String>,
}

/// One base64 PCM chunk sent to the oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealtimeInput {
    pub mime_type: String,
    pub data: String,
}

impl RealtimeInput {
    /// Chunk of 16-bit PCM at `sample_rate`.
    pub fn pcm(sample_rate: u32, data: String) -> Self {
        Self {
            mime_type: format!("audio/pcm;rate={sample_rate}"),
            data,
        }
    }
}

/// Events delivered by the live session.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveEvent {
    /// Server acknowledged the session setup.
    Ready,
    /// Base64 PCM16 audio from the model.
    Audio { data: String },
    /// Partial transcript of what the model said.
    Transcript(String),
    TurnComplete,
    /// The user barged in; queued playback is stale.
    Interrupted,
    Closed,
    Error(String),
}

/// Closes a live connection. Must be idempotent.
#[async_trait]
pub trait LiveHandle: Send + Sync {
    async fn close(&self);
}

/// An open live session.
pub struct LiveLink {
    /// Chunks are delivered to the oracle in send order.
    pub outbound: mpsc::UnboundedSender<RealtimeInput>,
    pub inbound: mpsc::UnboundedReceiver<LiveEvent>,
    pub handle: Box<dyn LiveHandle>,
}

#[async_trait]
pub trait LiveTransport: Send + Sync {
    async fn connect(&self, config: &LiveConfig) -> Result<LiveLink, AssistantError>;
}
