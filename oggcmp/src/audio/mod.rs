//! Audio sample types and layout conversion

pub mod layout;
pub mod types;

pub use layout::{deinterleave, interleave, PcmBlock};
pub use types::StreamInfo;
