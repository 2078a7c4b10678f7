//! Shared test helpers
//!
//! - [`SyntheticDecoder`]: a [`VorbisDecoder`] producing a known signal, so the
//!   pipeline can be exercised without Vorbis fixtures
//! - [`read_wav`]: read a produced WAV back with hound

#![allow(dead_code)]

use oggcmp::audio::{PcmBlock, StreamInfo};
use oggcmp::decoder::VorbisDecoder;
use oggcmp::error::DecoderError;
use std::path::{Path, PathBuf};

/// Signal produced by a [`SyntheticDecoder`]
#[derive(Debug, Clone, Copy)]
pub enum Signal {
    /// All zeros
    Silence,
    /// Distinct value per frame and channel, within ±0.5
    Ramp,
}

impl Signal {
    pub fn sample(&self, frame: usize, channel: usize) -> f32 {
        match self {
            Signal::Silence => 0.0,
            Signal::Ramp => ((frame % 1000) as f32 * 0.001 + channel as f32 * 0.1).fract() - 0.5,
        }
    }
}

/// Decoder stand-in that emits `total` frames in packets of `packet` frames,
/// interleaved like a native decoder, and optionally fails after the last one.
pub struct SyntheticDecoder {
    info: StreamInfo,
    signal: Signal,
    total: usize,
    position: usize,
    packet: usize,
    fail_at_end: bool,
}

impl SyntheticDecoder {
    pub fn new(sample_rate: u32, channels: u16, frames: usize, signal: Signal) -> Self {
        Self {
            info: StreamInfo::new("synthetic", sample_rate, channels, Some(frames as u64))
                .expect("valid synthetic stream"),
            signal,
            total: frames,
            position: 0,
            packet: 1024,
            fail_at_end: false,
        }
    }

    /// Emit packets of `frames` frames (before block capacity limits)
    pub fn with_packet_size(mut self, frames: usize) -> Self {
        self.packet = frames;
        self
    }

    /// Declare a total frame count other than the frames actually produced
    pub fn with_declared(mut self, frames: Option<u64>) -> Self {
        self.info.total_frames = frames;
        self
    }

    /// Return a decode error instead of end of stream
    pub fn failing(mut self) -> Self {
        self.fail_at_end = true;
        self
    }

    /// Every sample this decoder produces, interleaved
    pub fn expected_interleaved(&self) -> Vec<f32> {
        let channels = self.info.channels as usize;
        (0..self.total)
            .flat_map(|frame| (0..channels).map(move |ch| (frame, ch)))
            .map(|(frame, ch)| self.signal.sample(frame, ch))
            .collect()
    }
}

impl VorbisDecoder for SyntheticDecoder {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn stream_info(&self) -> &StreamInfo {
        &self.info
    }

    fn read(&mut self, block: &mut PcmBlock) -> oggcmp::Result<usize> {
        let remaining = self.total - self.position;
        if remaining == 0 {
            if self.fail_at_end {
                return Err(DecoderError::Decode {
                    decoder: "synthetic",
                    reason: "injected failure".to_string(),
                }
                .into());
            }
            block.clear();
            return Ok(0);
        }

        let channels = self.info.channels as usize;
        let frames = remaining.min(self.packet).min(block.capacity());
        let mut interleaved = Vec::with_capacity(frames * channels);
        for frame in self.position..self.position + frames {
            for ch in 0..channels {
                interleaved.push(self.signal.sample(frame, ch));
            }
        }

        self.position += frames;
        Ok(block.fill_interleaved(&interleaved)?)
    }
}

/// Read a WAV file back: its spec and interleaved samples
pub fn read_wav(path: &Path) -> (hound::WavSpec, Vec<f32>) {
    let mut reader = hound::WavReader::open(path).expect("produced WAV should parse");
    let spec = reader.spec();
    let samples = reader
        .samples::<f32>()
        .collect::<Result<Vec<_>, _>>()
        .expect("samples should decode");
    (spec, samples)
}

/// Path of an Ogg Vorbis fixture under `tests/fixtures/audio`
pub fn fixture_path(filename: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/fixtures/audio");
    path.push(filename);
    path
}
