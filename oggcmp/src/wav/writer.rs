//! Streaming WAV writer for 32-bit IEEE float samples
//!
//! Writes the header up front with zero-length placeholders, streams interleaved
//! frames, and patches the RIFF and `data` lengths on close. The format chunk is
//! always WAVE_FORMAT_EXTENSIBLE with the IEEE float sub-format.
//!
//! Layout (68 header bytes):
//!
//! | offset | field                                  |
//! |--------|----------------------------------------|
//! | 0      | `RIFF`, file size - 8                  |
//! | 8      | `WAVE`                                 |
//! | 12     | `fmt `, 40                             |
//! | 20     | format tag 0xFFFE ... sub-format GUID  |
//! | 60     | `data`, data length                    |

use crate::audio::types::{OUTPUT_BITS_PER_SAMPLE, OUTPUT_BYTES_PER_SAMPLE};
use crate::error::WavError;
use std::fs::File;
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Bytes before the first sample
pub const HEADER_LEN: u64 = 68;

const FMT_CHUNK_LEN: u32 = 40;
const RIFF_SIZE_OFFSET: u64 = 4;
const DATA_SIZE_OFFSET: u64 = 64;

/// RIFF size = everything after the first 8 bytes
const RIFF_OVERHEAD: u64 = HEADER_LEN - 8;

/// Largest data chunk the 32-bit RIFF size field can describe
const MAX_DATA_LEN: u64 = u32::MAX as u64 - RIFF_OVERHEAD;

const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;
const EXTENSIBLE_CB_SIZE: u16 = 22;

/// KSDATAFORMAT_SUBTYPE_IEEE_FLOAT, 00000003-0000-0010-8000-00aa00389b71
const SUBTYPE_IEEE_FLOAT: [u8; 16] = [
    0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x80, 0x00, 0x00, 0xAA, 0x00, 0x38, 0x9B, 0x71,
];

const SPEAKER_FRONT_LEFT: u32 = 0x1;
const SPEAKER_FRONT_RIGHT: u32 = 0x2;
const SPEAKER_FRONT_CENTER: u32 = 0x4;

/// WAV format parameters, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    channels: u16,
    sample_rate: u32,
}

impl WavSpec {
    /// Validate rate and channel count and derive the block alignment.
    pub fn new(sample_rate: u32, channels: u16) -> Result<Self, WavError> {
        if sample_rate == 0 {
            return Err(WavError::InvalidSpec("sample rate must be > 0".to_string()));
        }
        if channels == 0 {
            return Err(WavError::InvalidSpec("channel count must be > 0".to_string()));
        }
        if channels.checked_mul(OUTPUT_BYTES_PER_SAMPLE).is_none() {
            return Err(WavError::InvalidSpec(format!(
                "{} channels overflow the block alignment field",
                channels
            )));
        }
        let block_align = (channels * OUTPUT_BYTES_PER_SAMPLE) as u32;
        if sample_rate.checked_mul(block_align).is_none() {
            return Err(WavError::InvalidSpec(format!(
                "{} Hz x {} channels overflows the byte rate field",
                sample_rate, channels
            )));
        }

        Ok(Self {
            channels,
            sample_rate,
        })
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Bytes per frame
    pub fn block_align(&self) -> u16 {
        self.channels * OUTPUT_BYTES_PER_SAMPLE
    }

    /// Average bytes per second
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }

    /// Speaker mask. Layouts beyond stereo are left unassigned since Vorbis
    /// channel order is written unchanged.
    pub fn channel_mask(&self) -> u32 {
        match self.channels {
            1 => SPEAKER_FRONT_CENTER,
            2 => SPEAKER_FRONT_LEFT | SPEAKER_FRONT_RIGHT,
            _ => 0,
        }
    }
}

/// Write the full 68-byte header with the given data length.
fn write_header<W: Write>(writer: &mut W, spec: &WavSpec, data_len: u32) -> io::Result<()> {
    let riff_len = data_len + RIFF_OVERHEAD as u32;

    // RIFF header
    writer.write_all(b"RIFF")?;
    writer.write_all(&riff_len.to_le_bytes())?;
    writer.write_all(b"WAVE")?;

    // fmt chunk (WAVEFORMATEXTENSIBLE)
    writer.write_all(b"fmt ")?;
    writer.write_all(&FMT_CHUNK_LEN.to_le_bytes())?;
    writer.write_all(&WAVE_FORMAT_EXTENSIBLE.to_le_bytes())?;
    writer.write_all(&spec.channels.to_le_bytes())?;
    writer.write_all(&spec.sample_rate.to_le_bytes())?;
    writer.write_all(&spec.byte_rate().to_le_bytes())?;
    writer.write_all(&spec.block_align().to_le_bytes())?;
    writer.write_all(&OUTPUT_BITS_PER_SAMPLE.to_le_bytes())?;
    writer.write_all(&EXTENSIBLE_CB_SIZE.to_le_bytes())?;
    writer.write_all(&OUTPUT_BITS_PER_SAMPLE.to_le_bytes())?; // valid bits
    writer.write_all(&spec.channel_mask().to_le_bytes())?;
    writer.write_all(&SUBTYPE_IEEE_FLOAT)?;

    // data chunk
    writer.write_all(b"data")?;
    writer.write_all(&data_len.to_le_bytes())?;

    Ok(())
}

/// Streaming WAV writer.
///
/// Owns its sink for its whole lifetime. [`WavWriter::close`] must be called
/// exactly once; writes after close fail with [`WavError::Closed`]. A writer
/// dropped without closing is finalized on a best-effort basis.
pub struct WavWriter<W: Write + Seek> {
    sink: Option<W>,
    spec: WavSpec,
    data_len: u64,
    closed: bool,
    scratch: Vec<u8>,
}

impl WavWriter<BufWriter<File>> {
    /// Create (or truncate) `path` and write the header.
    pub fn create<P: AsRef<Path>>(path: P, spec: WavSpec) -> Result<Self, WavError> {
        let file = File::create(path.as_ref())?;
        debug!(
            "Created {} ({} Hz, {} channels)",
            path.as_ref().display(),
            spec.sample_rate,
            spec.channels
        );
        Self::new(BufWriter::new(file), spec)
    }
}

impl<W: Write + Seek> WavWriter<W> {
    /// Write the header to `sink` with zero-length placeholders.
    pub fn new(mut sink: W, spec: WavSpec) -> Result<Self, WavError> {
        write_header(&mut sink, &spec, 0)?;

        Ok(Self {
            sink: Some(sink),
            spec,
            data_len: 0,
            closed: false,
            scratch: Vec::new(),
        })
    }

    pub fn spec(&self) -> &WavSpec {
        &self.spec
    }

    /// Bytes of sample data written so far
    pub fn data_len(&self) -> u64 {
        self.data_len
    }

    pub fn frames_written(&self) -> u64 {
        self.data_len / self.spec.block_align() as u64
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Write one sequence per channel, interleaved frame by frame.
    ///
    /// Input is validated before anything reaches the sink, so a rejected call
    /// leaves previously written data intact. If the sink fails partway, the
    /// bytes it accepted still count toward the data length patched on close.
    /// Returns the number of frames written.
    pub fn write<P: AsRef<[f32]>>(&mut self, channels: &[P]) -> Result<usize, WavError> {
        if self.closed {
            return Err(WavError::Closed);
        }

        let expected_channels = self.spec.channels as usize;
        if channels.len() != expected_channels {
            return Err(WavError::ChannelMismatch {
                expected: expected_channels,
                actual: channels.len(),
            });
        }

        let frames = channels[0].as_ref().len();
        for (channel, samples) in channels.iter().enumerate().skip(1) {
            let actual = samples.as_ref().len();
            if actual != frames {
                return Err(WavError::LengthMismatch {
                    channel,
                    expected: frames,
                    actual,
                });
            }
        }

        let bytes = frames as u64 * self.spec.block_align() as u64;
        if self.data_len + bytes > MAX_DATA_LEN {
            return Err(WavError::TooLarge {
                limit: MAX_DATA_LEN,
            });
        }
        if frames == 0 {
            return Ok(0);
        }

        self.scratch.clear();
        self.scratch.reserve(bytes as usize);
        for frame_idx in 0..frames {
            for samples in channels {
                self.scratch
                    .extend_from_slice(&samples.as_ref()[frame_idx].to_le_bytes());
            }
        }

        let sink = self.sink.as_mut().ok_or(WavError::Closed)?;
        let mut written = 0;
        while written < self.scratch.len() {
            match sink.write(&self.scratch[written..]) {
                Ok(0) => {
                    self.data_len += written as u64;
                    return Err(io::Error::from(io::ErrorKind::WriteZero).into());
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.data_len += written as u64;
                    return Err(e.into());
                }
            }
        }
        self.data_len += bytes;

        Ok(frames)
    }

    /// Patch the length fields and flush.
    ///
    /// The writer counts as closed even if finalizing fails.
    pub fn close(&mut self) -> Result<(), WavError> {
        if self.closed {
            return Err(WavError::Closed);
        }
        self.closed = true;
        self.finalize()
    }

    /// Close if still open and hand back the sink.
    pub fn into_inner(mut self) -> Result<W, WavError> {
        if !self.closed {
            self.close()?;
        }
        self.sink.take().ok_or(WavError::Closed)
    }

    fn finalize(&mut self) -> Result<(), WavError> {
        let data_len = self.data_len as u32;
        let riff_len = data_len + RIFF_OVERHEAD as u32;
        let sink = self.sink.as_mut().ok_or(WavError::Closed)?;

        sink.seek(SeekFrom::Start(RIFF_SIZE_OFFSET))?;
        sink.write_all(&riff_len.to_le_bytes())?;
        sink.seek(SeekFrom::Start(DATA_SIZE_OFFSET))?;
        sink.write_all(&data_len.to_le_bytes())?;
        sink.seek(SeekFrom::End(0))?;
        sink.flush()?;

        debug!(
            "Finalized WAV: {} frames, {} data bytes",
            self.frames_written(),
            data_len
        );
        Ok(())
    }
}

impl<W: Write + Seek> Drop for WavWriter<W> {
    fn drop(&mut self) {
        if self.closed || self.sink.is_none() {
            return;
        }
        self.closed = true;
        if let Err(e) = self.finalize() {
            warn!("Failed to finalize WAV on drop: {}", e);
        }
    }
}
