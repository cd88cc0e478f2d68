//! Audio device seams: microphone capture and speaker playback.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::audio::DecodedAudio;
use super::error::AssistantError;

/// One buffer delivered by the capture callback.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureFrame {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Microphone input.
#[async_trait]
pub trait AudioCapture: Send + Sync {
    /// Starts capturing, preferring `sample_rate`.
    ///
    /// Frames arrive on the returned channel in callback order. Permission
    /// denial or a missing device is reported as
    /// [`AssistantError::VoiceSetup`].
    async fn open(
        &self,
        sample_rate: u32,
    ) -> Result<mpsc::UnboundedReceiver<CaptureFrame>, AssistantError>;

    /// Releases the microphone. Idempotent.
    fn close(&self);
}

/// Speaker output with its own clock.
pub trait PlaybackSink: Send + Sync {
    /// Prepares the output at `sample_rate`.
    fn open(&self, sample_rate: u32) -> Result<(), AssistantError>;

    /// Current position of the output clock in seconds.
    fn current_time(&self) -> f64;

    /// Queues `audio` to start at `start` seconds on the output clock.
    fn play_at(&self, start: f64, audio: DecodedAudio);

    /// Drops anything queued but not yet played.
    fn flush(&self);

    /// Releases the output. Idempotent.
    fn close(&self);
}
