//! Vorbis decoding through symphonia
//!
//! symphonia hands out one planar `AudioBufferRef` per packet; it is copied
//! interleaved into a `SampleBuffer<f32>` and served to callers in blocks of at
//! most the block capacity, deinterleaved by [`PcmBlock::fill_interleaved`].
//! Frames beyond the block capacity carry over to the next read.
//!
//! The demuxer runs in gapless mode, so encoder padding is trimmed and the
//! declared length is the last page's granule position.

use super::{ogg_page, VorbisDecoder};
use crate::audio::{PcmBlock, StreamInfo};
use crate::error::{DecoderError, Error, LayoutError, Result};
use std::fmt::Display;
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_VORBIS};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

pub const NAME: &str = "symphonia";

fn open_error(path: &Path, reason: impl Display) -> Error {
    DecoderError::Open {
        decoder: NAME,
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
    .into()
}

fn metadata_error(reason: impl Display) -> Error {
    DecoderError::Metadata {
        decoder: NAME,
        reason: reason.to_string(),
    }
    .into()
}

fn decode_error(reason: impl Display) -> Error {
    DecoderError::Decode {
        decoder: NAME,
        reason: reason.to_string(),
    }
    .into()
}

/// Ogg Vorbis decoder backed by symphonia's Ogg demuxer and Vorbis codec.
pub struct SymphoniaDecoder {
    /// Symphonia format reader
    format: Box<dyn FormatReader>,

    /// Symphonia decoder
    decoder: Box<dyn Decoder>,

    /// Vorbis track being decoded
    track_id: u32,

    info: StreamInfo,

    /// Interleaved copy target, reallocated only when a packet outgrows it
    sample_buf: Option<SampleBuffer<f32>>,
    sample_buf_frames: u64,

    /// Interleaved samples of the current packet not yet handed out
    pending: Vec<f32>,
    pending_pos: usize,

    finished: bool,
}

impl SymphoniaDecoder {
    /// Open `path` and read the stream headers.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Opening {} with {}", path.display(), NAME);

        let file = File::open(path).map_err(|e| open_error(path, e))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // Create hint from file extension
        let mut hint = Hint::new();
        hint.with_extension(
            path.extension()
                .and_then(|ext| ext.to_str())
                .unwrap_or("ogg"),
        );

        // Probe format
        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions {
                    enable_gapless: true,
                    ..Default::default()
                },
                &MetadataOptions::default(),
            )
            .map_err(|e| open_error(path, e))?;

        let format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec == CODEC_TYPE_VORBIS)
            .ok_or_else(|| open_error(path, "no Vorbis track found"))?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let sample_rate = codec_params
            .sample_rate
            .ok_or_else(|| metadata_error("sample rate not found"))?;
        let channels = codec_params
            .channels
            .map(|c| c.count())
            .ok_or_else(|| metadata_error("channel count not found"))?;
        let channels = u16::try_from(channels)
            .map_err(|_| metadata_error(format!("unsupported channel count {}", channels)))?;

        // A stream without audio pages has no end bound; fall back to the last granule
        let total_frames = codec_params
            .n_frames
            .or_else(|| ogg_page::declared_frames(path));
        let info = StreamInfo::new(NAME, sample_rate, channels, total_frames)?;

        let decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| open_error(path, e))?;

        debug!(
            "Audio format: sample_rate={}, channels={}, frames={:?}",
            info.sample_rate, info.channels, info.total_frames
        );

        Ok(Self {
            format,
            decoder,
            track_id,
            info,
            sample_buf: None,
            sample_buf_frames: 0,
            pending: Vec::new(),
            pending_pos: 0,
            finished: false,
        })
    }

    /// Decode the next packet with audio into `pending`.
    ///
    /// Returns `false` at end of stream.
    fn decode_next(&mut self) -> Result<bool> {
        self.pending.clear();
        self.pending_pos = 0;

        loop {
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    debug!("Reached end of stream");
                    return Ok(false);
                }
                Err(SymphoniaError::ResetRequired) => {
                    // Chained streams may change format; only the first is decoded
                    debug!("Stream reset required, stopping at chain boundary");
                    return Ok(false);
                }
                Err(e) => return Err(decode_error(e)),
            };

            // Skip packets for other tracks
            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = self.decoder.decode(&packet).map_err(decode_error)?;
            let frames = decoded.frames();
            if frames == 0 {
                continue;
            }

            let spec = *decoded.spec();
            let channels = spec.channels.count();
            if channels != self.info.channels as usize {
                return Err(decode_error(format!(
                    "packet has {} channels, stream declared {}",
                    channels, self.info.channels
                )));
            }

            let capacity = decoded.capacity() as u64;
            if self.sample_buf.is_none() || self.sample_buf_frames < capacity {
                self.sample_buf = Some(SampleBuffer::new(capacity, spec));
                self.sample_buf_frames = capacity;
            }

            if let Some(buf) = self.sample_buf.as_mut() {
                buf.copy_interleaved_ref(decoded);
                self.pending.extend_from_slice(buf.samples());
            }

            return Ok(true);
        }
    }
}

impl VorbisDecoder for SymphoniaDecoder {
    fn name(&self) -> &'static str {
        NAME
    }

    fn stream_info(&self) -> &StreamInfo {
        &self.info
    }

    fn read(&mut self, block: &mut PcmBlock) -> Result<usize> {
        let channels = self.info.channels as usize;
        if block.channels() != channels {
            return Err(LayoutError::ChannelMismatch {
                expected: channels,
                actual: block.channels(),
            }
            .into());
        }

        while self.pending_pos >= self.pending.len() {
            if self.finished || !self.decode_next()? {
                self.finished = true;
                block.clear();
                return Ok(0);
            }
        }

        let available = &self.pending[self.pending_pos..];
        let take = available.len().min(block.capacity() * channels);
        let frames = block.fill_interleaved(&available[..take])?;
        self.pending_pos += frames * channels;

        Ok(frames)
    }
}
