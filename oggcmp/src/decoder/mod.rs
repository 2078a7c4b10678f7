//! Vorbis decoders
//!
//! Both decoders implement [`VorbisDecoder`]: open a path, report the stream
//! descriptor, and fill a [`PcmBlock`] per read until end of stream. They own
//! their file handles and codec state, which are released on drop whichever
//! way a decode run ends.

pub mod lewton_decoder;
pub mod ogg_page;
pub mod symphonia_decoder;

pub use lewton_decoder::LewtonDecoder;
pub use symphonia_decoder::SymphoniaDecoder;

use crate::audio::{PcmBlock, StreamInfo};
use crate::error::Result;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Minimal capability set shared by the decoders.
pub trait VorbisDecoder {
    /// Label used in logs and reports
    fn name(&self) -> &'static str;

    /// Stream descriptor read at open time
    fn stream_info(&self) -> &StreamInfo;

    /// Fill `block` with up to its capacity of frames.
    ///
    /// Returns the number of frames stored; `Ok(0)` means end of stream.
    fn read(&mut self, block: &mut PcmBlock) -> Result<usize>;
}

/// Selectable decoder implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DecoderKind {
    Symphonia,
    Lewton,
}

impl DecoderKind {
    /// Every decoder, in run order
    pub const ALL: [DecoderKind; 2] = [DecoderKind::Symphonia, DecoderKind::Lewton];

    pub fn name(&self) -> &'static str {
        match self {
            DecoderKind::Symphonia => symphonia_decoder::NAME,
            DecoderKind::Lewton => lewton_decoder::NAME,
        }
    }

    /// Output file used when none is configured
    pub fn default_output(&self) -> &'static str {
        match self {
            DecoderKind::Symphonia => "test_symphonia.wav",
            DecoderKind::Lewton => "test_lewton.wav",
        }
    }
}

impl fmt::Display for DecoderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Open `path` with the selected decoder.
pub fn open(kind: DecoderKind, path: &Path) -> Result<Box<dyn VorbisDecoder>> {
    let decoder: Box<dyn VorbisDecoder> = match kind {
        DecoderKind::Symphonia => Box::new(SymphoniaDecoder::open(path)?),
        DecoderKind::Lewton => Box::new(LewtonDecoder::open(path)?),
    };
    Ok(decoder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Selection {
        decoders: Vec<DecoderKind>,
    }

    #[test]
    fn test_decoder_kind_names() {
        assert_eq!(DecoderKind::Symphonia.to_string(), "symphonia");
        assert_eq!(DecoderKind::Lewton.to_string(), "lewton");
        assert_ne!(
            DecoderKind::Symphonia.default_output(),
            DecoderKind::Lewton.default_output()
        );
    }

    #[test]
    fn test_decoder_kind_deserialize() {
        let selection: Selection = toml::from_str(r#"decoders = ["lewton", "symphonia"]"#).unwrap();
        assert_eq!(
            selection.decoders,
            vec![DecoderKind::Lewton, DecoderKind::Symphonia]
        );

        assert!(toml::from_str::<Selection>(r#"decoders = ["libvorbis"]"#).is_err());
    }
}
