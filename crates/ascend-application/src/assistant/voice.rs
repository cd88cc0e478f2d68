//! Live voice pipeline: microphone uplink, speaker downlink and teardown.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use ascend_core::assistant::AssistantError;
use ascend_core::assistant::audio::{decode_chunk, encode_frame, rms};
use ascend_core::assistant::device::{AudioCapture, CaptureFrame, PlaybackSink};
use ascend_core::assistant::live::{
    INPUT_SAMPLE_RATE, LiveConfig, LiveEvent, LiveHandle, LiveLink, LiveTransport,
    OUTPUT_SAMPLE_RATE, RealtimeInput,
};
use ascend_core::assistant::playback::PlaybackScheduler;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Collaborators needed for voice mode.
#[derive(Clone)]
pub struct VoiceBackend {
    pub transport: Arc<dyn LiveTransport>,
    pub capture: Arc<dyn AudioCapture>,
    pub playback: Arc<dyn PlaybackSink>,
    pub model: String,
    pub voice_name: String,
}

/// Input level of the most recent microphone frame (RMS, 0.0 when idle).
#[derive(Clone, Default)]
pub struct VolumeMeter {
    bits: Arc<AtomicU32>,
}

impl VolumeMeter {
    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    fn set(&self, level: f32) {
        self.bits.store(level.to_bits(), Ordering::Relaxed);
    }

    pub(crate) fn reset(&self) {
        self.set(0.0);
    }
}

/// A running voice session.
pub(crate) struct VoiceSession {
    cancel: CancellationToken,
    handle: Box<dyn LiveHandle>,
    tasks: Vec<JoinHandle<()>>,
}

impl VoiceSession {
    /// Opens the live link only; no device is touched.
    pub(crate) async fn connect(
        backend: &VoiceBackend,
        system_instruction: Option<String>,
    ) -> Result<LiveLink, AssistantError> {
        let config = LiveConfig {
            model: backend.model.clone(),
            voice_name: backend.voice_name.clone(),
            system_instruction,
        };
        backend.transport.connect(&config).await.map_err(into_setup_error)
    }

    /// Opens the devices on an established link and spawns both pipeline
    /// halves.
    ///
    /// On failure everything opened so far, the link included, is released.
    pub(crate) async fn start(
        backend: &VoiceBackend,
        link: LiveLink,
        volume: VolumeMeter,
    ) -> Result<Self, AssistantError> {
        let frames = match backend.capture.open(INPUT_SAMPLE_RATE).await {
            Ok(frames) => frames,
            Err(e) => {
                link.handle.close().await;
                return Err(into_setup_error(e));
            }
        };

        if let Err(e) = backend.playback.open(OUTPUT_SAMPLE_RATE) {
            backend.capture.close();
            link.handle.close().await;
            return Err(into_setup_error(e));
        }

        let cancel = CancellationToken::new();
        let uplink = tokio::spawn(run_uplink(
            frames,
            link.outbound,
            volume,
            cancel.clone(),
        ));
        let downlink = tokio::spawn(run_downlink(
            link.inbound,
            backend.playback.clone(),
            cancel.clone(),
        ));

        Ok(Self {
            cancel,
            handle: link.handle,
            tasks: vec![uplink, downlink],
        })
    }

    /// Stops both halves and releases devices and the connection.
    pub(crate) async fn close(self, backend: &VoiceBackend) {
        self.cancel.cancel();
        backend.capture.close();
        backend.playback.close();
        self.handle.close().await;
        for task in self.tasks {
            task.abort();
        }
    }
}

fn into_setup_error(error: AssistantError) -> AssistantError {
    match error {
        AssistantError::VoiceSetup(_) => error,
        other => AssistantError::VoiceSetup(other.to_string()),
    }
}

/// Forwards microphone frames upstream in capture order.
async fn run_uplink(
    mut frames: mpsc::UnboundedReceiver<CaptureFrame>,
    outbound: mpsc::UnboundedSender<RealtimeInput>,
    volume: VolumeMeter,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            frame = frames.recv() => {
                let Some(frame) = frame else { break };
                volume.set(rms(&frame.samples));
                let chunk = encode_frame(&frame.samples, frame.sample_rate, INPUT_SAMPLE_RATE);
                if outbound.send(chunk).is_err() {
                    tracing::debug!("[Voice] Live link closed, stopping uplink");
                    break;
                }
            }
        }
    }
}

/// Decodes model audio and queues it gaplessly on the playback clock.
async fn run_downlink(
    mut inbound: mpsc::UnboundedReceiver<LiveEvent>,
    playback: Arc<dyn PlaybackSink>,
    cancel: CancellationToken,
) {
    let mut scheduler = PlaybackScheduler::new();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            event = inbound.recv() => match event {
                Some(LiveEvent::Audio { data }) => match decode_chunk(&data, OUTPUT_SAMPLE_RATE, 1) {
                    Ok(audio) => {
                        let slot = scheduler.schedule(playback.current_time(), audio.duration());
                        playback.play_at(slot.start, audio);
                    }
                    Err(e) => tracing::warn!("[Voice] Dropping audio chunk: {}", e),
                },
                Some(LiveEvent::Interrupted) => {
                    playback.flush();
                    scheduler.reset();
                }
                Some(LiveEvent::Ready) => tracing::info!("[Voice] Live session ready"),
                Some(LiveEvent::Transcript(text)) => tracing::debug!("[Voice] Model said: {}", text),
                Some(LiveEvent::TurnComplete) => {}
                Some(LiveEvent::Error(e)) => {
                    tracing::warn!("[Voice] Live session error: {}", e);
                    break;
                }
                Some(LiveEvent::Closed) | None => {
                    tracing::info!("[Voice] Live session closed by server");
                    break;
                }
            }
        }
    }
}
