//! # oggcmp
//!
//! Decode one Ogg Vorbis file through two independent decoders and write each
//! result to its own 32-bit float WAV file for side-by-side comparison.
//!
//! **Architecture:** decoder (symphonia or lewton) → [`audio::PcmBlock`] layout
//! conversion → [`wav::WavWriter`], driven by [`pipeline`]. Runs are sequential
//! and single-threaded.

pub mod audio;
pub mod compare;
pub mod config;
pub mod decoder;
pub mod error;
pub mod pipeline;
pub mod wav;

pub use error::{Error, Result};
