//! PCM layout conversion
//!
//! Decoders hand out samples either interleaved (`[f0c0, f0c1, f1c0, f1c1, ...]`)
//! or as one sequence per channel. The WAV writer takes one slice per channel.
//! [`PcmBlock`] is the fixed-capacity buffer both decoder paths fill on every
//! read; its views are always bounded to the frames of the current fill.

use crate::error::LayoutError;

/// Split an interleaved buffer into one sequence per channel.
///
/// A trailing partial frame is dropped. Returns no channels when `channels` is 0.
pub fn deinterleave(interleaved: &[f32], channels: usize) -> Vec<Vec<f32>> {
    if channels == 0 {
        return Vec::new();
    }

    let frames = interleaved.len() / channels;
    let mut planes = vec![Vec::with_capacity(frames); channels];

    for frame in interleaved.chunks_exact(channels) {
        for (plane, &sample) in planes.iter_mut().zip(frame) {
            plane.push(sample);
        }
    }

    planes
}

/// Merge per-channel sequences into one interleaved buffer.
///
/// All sequences must have the same length.
pub fn interleave<P: AsRef<[f32]>>(planes: &[P]) -> Result<Vec<f32>, LayoutError> {
    let frames = common_length(planes)?;
    let mut out = Vec::with_capacity(frames * planes.len());

    for frame_idx in 0..frames {
        for plane in planes {
            out.push(plane.as_ref()[frame_idx]);
        }
    }

    Ok(out)
}

/// Length shared by every plane, or the first plane that disagrees.
fn common_length<P: AsRef<[f32]>>(planes: &[P]) -> Result<usize, LayoutError> {
    let expected = planes.first().map(|p| p.as_ref().len()).unwrap_or(0);

    for (channel, plane) in planes.iter().enumerate() {
        let actual = plane.as_ref().len();
        if actual != expected {
            return Err(LayoutError::LengthMismatch {
                channel,
                expected,
                actual,
            });
        }
    }

    Ok(expected)
}

/// Fixed-capacity block of planar samples.
///
/// Storage is `channels × capacity` samples, one contiguous region per channel.
/// Every fill validates its length against the capacity before copying, so a
/// rejected fill leaves the block untouched.
#[derive(Debug, Clone)]
pub struct PcmBlock {
    samples: Vec<f32>,
    channels: usize,
    capacity: usize,
    frames: usize,
}

impl PcmBlock {
    /// Allocate a block for `channels` channels and up to `capacity` frames.
    pub fn new(channels: usize, capacity: usize) -> Result<Self, LayoutError> {
        if channels == 0 {
            return Err(LayoutError::ZeroChannels);
        }
        if capacity == 0 {
            return Err(LayoutError::ZeroCapacity);
        }

        Ok(Self {
            samples: vec![0.0; channels * capacity],
            channels,
            capacity,
            frames: 0,
        })
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Maximum frames one fill may hold
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Frames held by the current fill
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames == 0
    }

    /// Mark the block empty. Storage is kept for reuse.
    pub fn clear(&mut self) {
        self.frames = 0;
    }

    /// Keep only the first `frames` frames of the current fill.
    pub fn truncate(&mut self, frames: usize) {
        self.frames = self.frames.min(frames);
    }

    /// Deinterleave `interleaved` into the block.
    ///
    /// A trailing partial frame is dropped. Returns the number of frames stored.
    pub fn fill_interleaved(&mut self, interleaved: &[f32]) -> Result<usize, LayoutError> {
        let frames = interleaved.len() / self.channels;
        self.check_capacity(frames)?;

        for (frame_idx, frame) in interleaved.chunks_exact(self.channels).enumerate() {
            for (channel, &sample) in frame.iter().enumerate() {
                self.samples[channel * self.capacity + frame_idx] = sample;
            }
        }

        self.frames = frames;
        Ok(frames)
    }

    /// Copy per-channel sequences into the block.
    ///
    /// Channel count, equal lengths, and capacity are all checked before any copy.
    pub fn fill_planar<P: AsRef<[f32]>>(&mut self, planes: &[P]) -> Result<usize, LayoutError> {
        if planes.len() != self.channels {
            return Err(LayoutError::ChannelMismatch {
                expected: self.channels,
                actual: planes.len(),
            });
        }

        let frames = common_length(planes)?;
        self.check_capacity(frames)?;

        for (channel, plane) in planes.iter().enumerate() {
            let start = channel * self.capacity;
            self.samples[start..start + frames].copy_from_slice(plane.as_ref());
        }

        self.frames = frames;
        Ok(frames)
    }

    /// Samples of one channel for the current fill
    pub fn channel(&self, channel: usize) -> Option<&[f32]> {
        if channel >= self.channels {
            return None;
        }
        let start = channel * self.capacity;
        Some(&self.samples[start..start + self.frames])
    }

    /// One slice per channel, in channel order
    pub fn planes(&self) -> Vec<&[f32]> {
        self.samples
            .chunks_exact(self.capacity)
            .map(|region| &region[..self.frames])
            .collect()
    }

    /// Append the current fill to `out` in interleaved order.
    pub fn write_interleaved(&self, out: &mut Vec<f32>) {
        out.reserve(self.frames * self.channels);
        for frame_idx in 0..self.frames {
            for channel in 0..self.channels {
                out.push(self.samples[channel * self.capacity + frame_idx]);
            }
        }
    }

    pub fn to_interleaved(&self) -> Vec<f32> {
        let mut out = Vec::new();
        self.write_interleaved(&mut out);
        out
    }

    fn check_capacity(&self, requested: usize) -> Result<(), LayoutError> {
        if requested > self.capacity {
            return Err(LayoutError::CapacityExceeded {
                requested,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}
