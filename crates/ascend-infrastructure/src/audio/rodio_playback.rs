//! Speaker playback on the default rodio output.

use std::sync::mpsc as std_mpsc;
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use ascend_core::assistant::AssistantError;
use ascend_core::assistant::audio::DecodedAudio;
use ascend_core::assistant::device::PlaybackSink;
use rodio::buffer::SamplesBuffer;
use rodio::source::Zero;
use rodio::{OutputStream, Sink, Source};

enum Command {
    Play { start: f64, audio: DecodedAudio },
    Flush,
}

struct ActiveOutput {
    commands: std_mpsc::Sender<Command>,
    opened_at: Instant,
}

/// Plays decoded chunks through the default output device.
///
/// The output clock counts seconds since `open`. Chunks are queued on a
/// rodio sink owned by a dedicated thread; a gap before a chunk's start is
/// filled with silence.
#[derive(Default)]
pub struct RodioPlayback {
    active: Mutex<Option<ActiveOutput>>,
}

impl RodioPlayback {
    pub fn new() -> Self {
        Self::default()
    }

    fn send(&self, command: Command) {
        let active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(output) = active.as_ref() {
            if output.commands.send(command).is_err() {
                tracing::warn!("[Playback] Output thread is gone");
            }
        }
    }
}

impl PlaybackSink for RodioPlayback {
    fn open(&self, sample_rate: u32) -> Result<(), AssistantError> {
        self.close();

        let (command_tx, command_rx) = std_mpsc::channel();
        let (ready_tx, ready_rx) = std_mpsc::channel();
        let opened_at = Instant::now();

        thread::Builder::new()
            .name("ascend-playback".to_string())
            .spawn(move || run_output(command_rx, ready_tx, opened_at))
            .map_err(|e| {
                AssistantError::voice_setup(format!("Failed to start playback thread: {e}"))
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                tracing::info!("[Playback] Output opened for {} Hz audio", sample_rate);
                *self.active.lock().unwrap_or_else(PoisonError::into_inner) = Some(ActiveOutput {
                    commands: command_tx,
                    opened_at,
                });
                Ok(())
            }
            Ok(Err(message)) => {
                tracing::warn!("[Playback] {}", message);
                Err(AssistantError::voice_setup(message))
            }
            Err(_) => Err(AssistantError::voice_setup(
                "playback thread exited during setup",
            )),
        }
    }

    fn current_time(&self) -> f64 {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|output| output.opened_at.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn play_at(&self, start: f64, audio: DecodedAudio) {
        self.send(Command::Play { start, audio });
    }

    fn flush(&self) {
        self.send(Command::Flush);
    }

    fn close(&self) {
        // Dropping the sender ends the output thread.
        let closed = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if closed.is_some() {
            tracing::debug!("[Playback] Closing output");
        }
    }
}

fn run_output(
    commands: std_mpsc::Receiver<Command>,
    ready: std_mpsc::Sender<Result<(), String>>,
    opened_at: Instant,
) {
    let (_stream, handle) = match OutputStream::try_default() {
        Ok(output) => output,
        Err(e) => {
            let _ = ready.send(Err(format!("No speaker available: {e}")));
            return;
        }
    };
    let mut sink = match Sink::try_new(&handle) {
        Ok(sink) => sink,
        Err(e) => {
            let _ = ready.send(Err(format!("Failed to open speaker: {e}")));
            return;
        }
    };
    let _ = ready.send(Ok(()));

    // Output-clock time at which everything queued has played.
    let mut queued_until = 0.0_f64;

    for command in commands {
        let now = opened_at.elapsed().as_secs_f64();
        match command {
            Command::Play { start, audio } => {
                if sink.empty() || queued_until < now {
                    queued_until = now;
                }
                if let Some(gap) = silence_before(start, queued_until) {
                    sink.append(
                        Zero::<f32>::new(audio.channels, audio.sample_rate).take_duration(gap),
                    );
                    queued_until = start;
                }
                queued_until += audio.duration();
                sink.append(SamplesBuffer::new(
                    audio.channels,
                    audio.sample_rate,
                    audio.samples,
                ));
            }
            Command::Flush => {
                sink.stop();
                sink = match Sink::try_new(&handle) {
                    Ok(fresh) => fresh,
                    Err(e) => {
                        tracing::error!("[Playback] Failed to reopen speaker: {}", e);
                        break;
                    }
                };
                queued_until = now;
            }
        }
    }

    tracing::debug!("[Playback] Output released");
}

/// Silence needed so a chunk starting at `start` does not play early.
fn silence_before(start: f64, queued_until: f64) -> Option<Duration> {
    let gap = start - queued_until;
    (gap.is_finite() && gap > 0.0).then(|| Duration::from_secs_f64(gap))
}
