//! Core audio data types
//!
//! Stream descriptor shared by both decoders and the WAV writer.

use crate::error::DecoderError;

/// Output bit depth. Every WAV produced is 32-bit IEEE float.
pub const OUTPUT_BITS_PER_SAMPLE: u16 = 32;

/// Bytes per output sample (one channel, one frame).
pub const OUTPUT_BYTES_PER_SAMPLE: u16 = OUTPUT_BITS_PER_SAMPLE / 8;

/// Stream descriptor derived once from decoder metadata at open time.
///
/// Immutable for the rest of the decode run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
    /// Sample rate in Hz (always > 0)
    pub sample_rate: u32,

    /// Channel count (always > 0)
    pub channels: u16,

    /// Total frames declared by the stream metadata, if the decoder knows it
    pub total_frames: Option<u64>,
}

impl StreamInfo {
    /// Build a descriptor, rejecting a zero rate or channel count.
    pub fn new(
        decoder: &'static str,
        sample_rate: u32,
        channels: u16,
        total_frames: Option<u64>,
    ) -> Result<Self, DecoderError> {
        if sample_rate == 0 {
            return Err(DecoderError::Metadata {
                decoder,
                reason: "sample rate is zero".to_string(),
            });
        }
        if channels == 0 {
            return Err(DecoderError::Metadata {
                decoder,
                reason: "channel count is zero".to_string(),
            });
        }

        Ok(Self {
            sample_rate,
            channels,
            total_frames,
        })
    }

    /// Declared duration in milliseconds, when the total is known
    pub fn duration_ms(&self) -> Option<u64> {
        self.total_frames
            .map(|frames| frames * 1000 / self.sample_rate as u64)
    }
}
