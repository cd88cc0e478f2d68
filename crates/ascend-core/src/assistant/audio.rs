//! PCM16 framing for live audio.
//!
//! Upstream: float microphone samples are resampled to 16 kHz, converted to
//! little-endian 16-bit PCM and base64-encoded, one capture frame per chunk.
//! Downstream: base64 PCM16 chunks are decoded back into float samples.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;

use super::error::AssistantError;
use super::live::RealtimeInput;

/// Decoded audio ready for playback.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Interleaved samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl DecodedAudio {
    pub fn frame_count(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count() as f64 / f64::from(self.sample_rate)
    }
}

/// Root-mean-square level of a frame; 0 for an empty frame.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}

/// Converts float samples to little-endian PCM16, clamping out-of-range input.
pub fn encode_pcm16(samples: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let scaled = (sample.clamp(-1.0, 1.0) * 32768.0).round();
        let value = scaled.clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16;
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Converts little-endian PCM16 to float samples. A trailing odd byte is dropped.
pub fn decode_pcm16(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / 32768.0)
        .collect()
}

/// Linear-interpolation resampler.
pub fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() || from_rate == 0 || to_rate == 0 {
        return samples.to_vec();
    }
    let ratio = f64::from(from_rate) / f64::from(to_rate);
    let out_len = ((samples.len() as f64) / ratio).round().max(1.0) as usize;
    let last = samples.len() - 1;

    (0..out_len)
        .map(|i| {
            let pos = i as f64 * ratio;
            let idx = (pos.floor() as usize).min(last);
            let next = (idx + 1).min(last);
            let frac = (pos - idx as f64) as f32;
            samples[idx] + (samples[next] - samples[idx]) * frac
        })
        .collect()
}

/// Encodes one capture frame as an upstream chunk at `target_rate`.
pub fn encode_frame(samples: &[f32], source_rate: u32, target_rate: u32) -> RealtimeInput {
    let resampled = resample_linear(samples, source_rate, target_rate);
    let data = BASE64_STANDARD.encode(encode_pcm16(&resampled));
    RealtimeInput::pcm(target_rate, data)
}

/// Decodes a downstream base64 PCM16 chunk.
pub fn decode_chunk(
    data: &str,
    sample_rate: u32,
    channels: u16,
) -> Result<DecodedAudio, AssistantError> {
    let bytes = BASE64_STANDARD
        .decode(data)
        .map_err(|err| AssistantError::AudioDecode(format!("invalid base64 audio: {err}")))?;
    Ok(DecodedAudio {
        samples: decode_pcm16(&bytes),
        sample_rate,
        channels,
    })
}
