//! Vorbis decoding through lewton
//!
//! lewton returns one `Vec<f32>` per channel per packet, so blocks are filled
//! with [`PcmBlock::fill_planar`] straight from bounded sub-slices of the
//! current packet. The declared length comes from the last Ogg page.

use super::{ogg_page, VorbisDecoder};
use crate::audio::{PcmBlock, StreamInfo};
use crate::error::{DecoderError, Error, Result};
use lewton::inside_ogg::OggStreamReader;
use std::fmt::Debug;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

pub const NAME: &str = "lewton";

fn open_error(path: &Path, reason: impl Debug) -> Error {
    DecoderError::Open {
        decoder: NAME,
        path: path.to_path_buf(),
        reason: format!("{:?}", reason),
    }
    .into()
}

fn decode_error(reason: impl Debug) -> Error {
    DecoderError::Decode {
        decoder: NAME,
        reason: format!("{:?}", reason),
    }
    .into()
}

/// Ogg Vorbis decoder backed by lewton.
pub struct LewtonDecoder {
    reader: OggStreamReader<BufReader<File>>,

    info: StreamInfo,

    /// Per-channel samples of the current packet
    pending: Vec<Vec<f32>>,
    /// Frames of `pending` already handed out
    pending_pos: usize,

    finished: bool,
}

impl LewtonDecoder {
    /// Open `path` and read the three Vorbis header packets.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Opening {} with {}", path.display(), NAME);

        let file = File::open(path).map_err(|e| open_error(path, e))?;
        let total_frames = ogg_page::declared_frames(path);

        let reader =
            OggStreamReader::new(BufReader::new(file)).map_err(|e| open_error(path, e))?;

        let info = StreamInfo::new(
            NAME,
            reader.ident_hdr.audio_sample_rate,
            reader.ident_hdr.audio_channels as u16,
            total_frames,
        )?;

        debug!(
            "Audio format: sample_rate={}, channels={}, frames={:?}",
            info.sample_rate, info.channels, info.total_frames
        );

        Ok(Self {
            reader,
            info,
            pending: Vec::new(),
            pending_pos: 0,
            finished: false,
        })
    }

    fn pending_frames(&self) -> usize {
        self.pending.first().map_or(0, Vec::len)
    }
}

impl VorbisDecoder for LewtonDecoder {
    fn name(&self) -> &'static str {
        NAME
    }

    fn stream_info(&self) -> &StreamInfo {
        &self.info
    }

    fn read(&mut self, block: &mut PcmBlock) -> Result<usize> {
        while self.pending_pos >= self.pending_frames() {
            if self.finished {
                block.clear();
                return Ok(0);
            }

            match self
                .reader
                .read_dec_packet_generic::<Vec<Vec<f32>>>()
                .map_err(decode_error)?
            {
                Some(packet) => {
                    self.pending = packet;
                    self.pending_pos = 0;
                }
                None => {
                    debug!("Reached end of stream");
                    self.finished = true;
                }
            }
        }

        let start = self.pending_pos;
        let end = (start + block.capacity()).min(self.pending_frames());
        let planes: Vec<&[f32]> = self
            .pending
            .iter()
            .map(|channel| channel.get(start..end).unwrap_or_default())
            .collect();

        let frames = block.fill_planar(&planes)?;
        self.pending_pos += frames;

        Ok(frames)
    }
}
