//! Decode pipeline: decoder → layout conversion → WAV writer
//!
//! One run decodes one input through one decoder into one WAV file:
//!
//! ```text
//! Opened → (Reading → Writing)* → Closed
//! ```
//!
//! End of stream, or reaching the declared total frame count, moves to
//! `Closed` without error. Frames past the declared total are encoder padding
//! and are not written. Any stage error aborts the run; the partially written
//! output is finalized by the writer's drop and left on disk.

use crate::audio::{PcmBlock, StreamInfo};
use crate::decoder::{self, DecoderKind, VorbisDecoder};
use crate::error::Result;
use crate::wav::{WavSpec, WavWriter};
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

/// Frames per read when nothing else is configured
pub const DEFAULT_BLOCK_FRAMES: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Opened,
    Reading,
    Writing,
    Closed,
}

/// Outcome of one decode run
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeReport {
    /// Decoder label
    pub label: &'static str,

    /// Stream descriptor reported at open time
    pub info: StreamInfo,

    /// Frames actually decoded and written
    pub decoded_frames: u64,

    /// Output file, when written to disk
    pub output: Option<PathBuf>,
}

impl DecodeReport {
    /// Declared minus decoded frames, when the declared count is known
    pub fn frame_shortfall(&self) -> Option<i64> {
        self.info
            .total_frames
            .map(|declared| declared as i64 - self.decoded_frames as i64)
    }
}

fn transition(label: &str, from: PipelineState, to: PipelineState) -> PipelineState {
    trace!("{}: {:?} -> {:?}", label, from, to);
    to
}

/// Open `input` with `kind` and decode it into `output`.
pub fn run(
    kind: DecoderKind,
    input: &Path,
    output: &Path,
    block_frames: usize,
) -> Result<DecodeReport> {
    let mut decoder = decoder::open(kind, input)?;
    decode_to_wav(decoder.as_mut(), output, block_frames)
}

/// Decode everything `decoder` produces into a new WAV file at `output`.
pub fn decode_to_wav<D: VorbisDecoder + ?Sized>(
    decoder: &mut D,
    output: &Path,
    block_frames: usize,
) -> Result<DecodeReport> {
    let label = decoder.name();
    let info = *decoder.stream_info();

    info!("{}:", label);
    match info.total_frames {
        Some(total) => info!("  samples: {}", total),
        None => info!("  samples: unknown"),
    }
    if let Some(ms) = info.duration_ms() {
        debug!("{}: declared duration {} ms", label, ms);
    }

    let spec = WavSpec::new(info.sample_rate, info.channels)?;
    let mut block = PcmBlock::new(info.channels as usize, block_frames)?;
    let mut writer = WavWriter::create(output, spec)?;

    let decoded_frames = decode_into(decoder, &mut writer, &mut block)?;
    writer.close()?;

    info!("  decoded samples: {}", decoded_frames);
    debug!("{}: wrote {}", label, output.display());

    let report = DecodeReport {
        label,
        info,
        decoded_frames,
        output: Some(output.to_path_buf()),
    };
    if let Some(shortfall) = report.frame_shortfall().filter(|&n| n != 0) {
        warn!("{}: stream ended {} samples short of its declared length", label, shortfall);
    }

    Ok(report)
}

/// Pump blocks from `decoder` into `writer` until end of stream or until the
/// declared total frame count has been written.
///
/// Returns the number of frames written. The writer is left open.
pub fn decode_into<D, W>(
    decoder: &mut D,
    writer: &mut WavWriter<W>,
    block: &mut PcmBlock,
) -> Result<u64>
where
    D: VorbisDecoder + ?Sized,
    W: Write + Seek,
{
    let label = decoder.name();
    let declared = decoder.stream_info().total_frames;
    let mut state = PipelineState::Opened;
    let mut decoded_frames = 0u64;

    loop {
        if declared.is_some_and(|total| decoded_frames >= total) {
            debug!("{}: reached declared length", label);
            break;
        }

        state = transition(label, state, PipelineState::Reading);
        let mut frames = decoder.read(block)?;
        if frames == 0 {
            break;
        }

        if let Some(total) = declared {
            let remaining = total - decoded_frames;
            if frames as u64 > remaining {
                debug!("{}: dropping {} padding samples", label, frames as u64 - remaining);
                frames = remaining as usize;
                block.truncate(frames);
            }
        }

        state = transition(label, state, PipelineState::Writing);
        writer.write(&block.planes())?;
        decoded_frames += frames as u64;
    }

    transition(label, state, PipelineState::Closed);
    Ok(decoded_frames)
}
