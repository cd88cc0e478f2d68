//! Audio devices for voice mode.

mod cpal_capture;
mod rodio_playback;

pub use cpal_capture::CpalCapture;
pub use rodio_playback::RodioPlayback;
