//! Error types for oggcmp
//!
//! Defines module-specific error types using thiserror for clear error propagation.
//! Every failure is fatal to the decode run that raised it; nothing here is retried.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for oggcmp
#[derive(Error, Debug)]
pub enum Error {
    /// Decoder open, metadata, or decode-time errors
    #[error("Decoder error: {0}")]
    Decoder(#[from] DecoderError),

    /// WAV container errors
    #[error("WAV writer error: {0}")]
    Wav(#[from] WavError),

    /// Sample layout conversion errors
    #[error("Sample layout error: {0}")]
    Layout(#[from] LayoutError),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors raised by a Vorbis decoder.
///
/// `reason` carries the decoder's own error text, which includes its
/// error code where the decoder provides one.
#[derive(Error, Debug)]
pub enum DecoderError {
    /// Input missing/unreadable, or the decoder rejected the stream
    #[error("{decoder}: could not open {}: {reason}", path.display())]
    Open {
        decoder: &'static str,
        path: PathBuf,
        reason: String,
    },

    /// Decoder could not report sample rate or channel count
    #[error("{decoder}: could not get stream info: {reason}")]
    Metadata {
        decoder: &'static str,
        reason: String,
    },

    /// Read failed mid-stream
    #[error("{decoder}: decode failed: {reason}")]
    Decode {
        decoder: &'static str,
        reason: String,
    },
}

/// Errors raised by the WAV container writer.
#[derive(Error, Debug)]
pub enum WavError {
    /// Rejected sample rate / channel count at construction
    #[error("invalid WAV format: {0}")]
    InvalidSpec(String),

    /// Number of channel sequences differs from the configured channel count
    #[error("expected {expected} channels, got {actual}")]
    ChannelMismatch { expected: usize, actual: usize },

    /// Channel sequences of unequal length
    #[error("channel {channel} has {actual} samples, expected {expected}")]
    LengthMismatch {
        channel: usize,
        expected: usize,
        actual: usize,
    },

    /// Data chunk would overflow the 32-bit RIFF size fields
    #[error("data chunk would exceed {limit} bytes")]
    TooLarge { limit: u64 },

    /// Write or close after the writer was closed
    #[error("writer already closed")]
    Closed,

    /// Output file creation, write, seek, or flush failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised when converting between interleaved and per-channel layouts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("channel count must be greater than zero")]
    ZeroChannels,

    #[error("block capacity must be greater than zero")]
    ZeroCapacity,

    #[error("expected {expected} channels, got {actual}")]
    ChannelMismatch { expected: usize, actual: usize },

    #[error("channel {channel} has {actual} frames, expected {expected}")]
    LengthMismatch {
        channel: usize,
        expected: usize,
        actual: usize,
    },

    /// Read length exceeds the block's declared capacity
    #[error("{requested} frames exceed block capacity of {capacity}")]
    CapacityExceeded { requested: usize, capacity: usize },
}

/// Convenience Result type using oggcmp Error
pub type Result<T> = std::result::Result<T, Error>;
