//! WAV container output

pub mod writer;

pub use writer::{WavSpec, WavWriter, HEADER_LEN};
