//! Side-by-side comparison of two decode runs
//!
//! The decoders are not expected to produce bit-identical output, so a
//! disagreement is reported, never treated as a failure.

use crate::pipeline::DecodeReport;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub left: &'static str,
    pub right: &'static str,
    pub sample_rate_match: bool,
    pub channels_match: bool,
    pub frames_match: bool,
    /// Left decoded frames minus right decoded frames
    pub frame_delta: i64,
}

impl Comparison {
    pub fn between(left: &DecodeReport, right: &DecodeReport) -> Self {
        Self {
            left: left.label,
            right: right.label,
            sample_rate_match: left.info.sample_rate == right.info.sample_rate,
            channels_match: left.info.channels == right.info.channels,
            frames_match: left.decoded_frames == right.decoded_frames,
            frame_delta: left.decoded_frames as i64 - right.decoded_frames as i64,
        }
    }

    /// Rate, channel count, and decoded length all agree
    pub fn agrees(&self) -> bool {
        self.sample_rate_match && self.channels_match && self.frames_match
    }

    pub fn log(&self) {
        if self.agrees() {
            info!("{} and {} agree on stream format and length", self.left, self.right);
            return;
        }

        if !self.sample_rate_match {
            warn!("{} and {} disagree on sample rate", self.left, self.right);
        }
        if !self.channels_match {
            warn!("{} and {} disagree on channel count", self.left, self.right);
        }
        if !self.frames_match {
            warn!("{}", self.frames_summary());
        }
    }

    /// e.g. "symphonia decoded 100 fewer samples than lewton"
    pub fn frames_summary(&self) -> String {
        let relation = if self.frame_delta < 0 { "fewer" } else { "more" };
        format!(
            "{} decoded {} {} samples than {}",
            self.left,
            self.frame_delta.unsigned_abs(),
            relation,
            self.right
        )
    }
}
