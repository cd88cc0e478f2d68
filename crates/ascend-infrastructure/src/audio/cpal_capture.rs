//! Microphone capture on the default cpal input device.

use std::sync::mpsc as std_mpsc;
use std::sync::{Mutex, PoisonError};
use std::thread;

use ascend_core::assistant::AssistantError;
use ascend_core::assistant::device::{AudioCapture, CaptureFrame};
use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample};
use tokio::sync::{mpsc, oneshot};

/// Captures mono frames from the default input device.
///
/// A cpal stream is not `Send`, so each capture lives on its own thread
/// and is dropped there once `close` drops the stop sender.
#[derive(Default)]
pub struct CpalCapture {
    stop: Mutex<Option<std_mpsc::Sender<()>>>,
}

impl CpalCapture {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AudioCapture for CpalCapture {
    async fn open(
        &self,
        sample_rate: u32,
    ) -> Result<mpsc::UnboundedReceiver<CaptureFrame>, AssistantError> {
        self.close();

        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = oneshot::channel();
        let (stop_tx, stop_rx) = std_mpsc::channel::<()>();

        thread::Builder::new()
            .name("ascend-capture".to_string())
            .spawn(move || {
                let stream = match start_stream(sample_rate, frame_tx) {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));

                // Returns once the sender is dropped.
                let _ = stop_rx.recv();
                drop(stream);
                tracing::debug!("[Capture] Input stream released");
            })
            .map_err(|e| {
                AssistantError::voice_setup(format!("Failed to start capture thread: {e}"))
            })?;

        match ready_rx.await {
            Ok(Ok(())) => {
                *self.stop.lock().unwrap_or_else(PoisonError::into_inner) = Some(stop_tx);
                Ok(frame_rx)
            }
            Ok(Err(message)) => {
                tracing::warn!("[Capture] {}", message);
                Err(AssistantError::voice_setup(message))
            }
            Err(_) => Err(AssistantError::voice_setup(
                "capture thread exited during setup",
            )),
        }
    }

    fn close(&self) {
        let stop = self
            .stop
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if stop.is_some() {
            tracing::debug!("[Capture] Closing microphone");
        }
    }
}

fn start_stream(
    preferred_rate: u32,
    frames: mpsc::UnboundedSender<CaptureFrame>,
) -> Result<cpal::Stream, String> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or("No microphone found")?;

    let supported = input_config(&device, preferred_rate)?;
    let format = supported.sample_format();
    let config: cpal::StreamConfig = supported.into();
    tracing::info!(
        "[Capture] Opening {} at {} Hz, {} channel(s)",
        device.name().unwrap_or_else(|_| "input device".to_string()),
        config.sample_rate.0,
        config.channels
    );

    let stream = match format {
        SampleFormat::F32 => build_stream::<f32>(&device, &config, frames),
        SampleFormat::I16 => build_stream::<i16>(&device, &config, frames),
        SampleFormat::U16 => build_stream::<u16>(&device, &config, frames),
        other => return Err(format!("Unsupported microphone sample format {other:?}")),
    }
    .map_err(|e| format!("Failed to open microphone: {e}"))?;

    stream
        .play()
        .map_err(|e| format!("Failed to start microphone: {e}"))?;
    Ok(stream)
}

/// Uses `preferred_rate` when the device supports it, the device default
/// otherwise. Frames carry their real rate; the uplink resamples.
fn input_config(
    device: &cpal::Device,
    preferred_rate: u32,
) -> Result<cpal::SupportedStreamConfig, String> {
    let rate = cpal::SampleRate(preferred_rate);
    if let Ok(mut ranges) = device.supported_input_configs() {
        if let Some(range) =
            ranges.find(|r| r.min_sample_rate() <= rate && rate <= r.max_sample_rate())
        {
            return Ok(range.with_sample_rate(rate));
        }
    }

    device
        .default_input_config()
        .map_err(|e| format!("Microphone unavailable: {e}"))
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    frames: mpsc::UnboundedSender<CaptureFrame>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = usize::from(config.channels);
    let sample_rate = config.sample_rate.0;

    device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            let _ = frames.send(CaptureFrame {
                samples: downmix(data, channels),
                sample_rate,
            });
        },
        |err| tracing::error!("[Capture] Input stream error: {}", err),
        None,
    )
}

/// Averages interleaved channels into mono `f32` samples.
fn downmix<T>(data: &[T], channels: usize) -> Vec<f32>
where
    T: Sample,
    f32: FromSample<T>,
{
    data.chunks(channels.max(1))
        .map(|frame| {
            frame.iter().map(|&s| s.to_sample::<f32>()).sum::<f32>() / frame.len() as f32
        })
        .collect()
}
