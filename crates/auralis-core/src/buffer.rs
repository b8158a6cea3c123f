//! Multichannel sample buffer.

use crate::sample::Sample;

/// A set of equal-length channels of [`Sample`]s.
///
/// Every channel always has exactly [`size`](Self::size) samples. Resizing
/// keeps existing data up to the smaller of the old and new lengths and
/// zeroes anything new. Shrinking never releases capacity, so a buffer that
/// oscillates between block sizes stops allocating once it has seen the
/// largest one. A buffer with no channels or zero length owns no heap memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SoundBuffer {
    channels: Vec<Vec<Sample>>,
    size: usize,
}

impl SoundBuffer {
    /// Creates an empty buffer with no channels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a zeroed buffer with the given shape.
    pub fn with_shape(num_channels: usize, size: usize) -> Self {
        Self {
            channels: vec![vec![0.0; size]; num_channels],
            size,
        }
    }

    /// Returns the number of channels.
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Sets the number of channels.
    ///
    /// Existing channels keep their contents; added channels are zeroed.
    pub fn set_num_channels(&mut self, num_channels: usize) {
        let size = self.size;
        self.channels.resize_with(num_channels, || vec![0.0; size]);
    }

    /// Returns the length of every channel in samples.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Sets the length of every channel in samples.
    pub fn set_size(&mut self, size: usize) {
        if size == self.size {
            return;
        }
        for channel in &mut self.channels {
            channel.resize(size, 0.0);
        }
        self.size = size;
    }

    /// Grows the buffer to at least the given shape. Never shrinks.
    pub fn reserve_shape(&mut self, num_channels: usize, size: usize) {
        if size > self.size {
            self.set_size(size);
        }
        if num_channels > self.num_channels() {
            self.set_num_channels(num_channels);
        }
    }

    /// Returns true if the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty() || self.size == 0
    }

    /// Returns the samples of one channel.
    ///
    /// Panics if `index >= num_channels()`.
    #[inline]
    pub fn channel(&self, index: usize) -> &[Sample] {
        &self.channels[index]
    }

    /// Returns the samples of one channel mutably.
    ///
    /// Panics if `index >= num_channels()`.
    #[inline]
    pub fn channel_mut(&mut self, index: usize) -> &mut [Sample] {
        &mut self.channels[index]
    }

    /// Iterates over the channels.
    pub fn channels(&self) -> impl Iterator<Item = &[Sample]> {
        self.channels.iter().map(Vec::as_slice)
    }

    /// Iterates over the channels mutably.
    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut [Sample]> {
        self.channels.iter_mut().map(Vec::as_mut_slice)
    }

    /// Sets every sample to zero.
    pub fn zero(&mut self) {
        for channel in &mut self.channels {
            channel.fill(0.0);
        }
    }

    /// Zeroes `len` samples of every channel starting at `start`.
    ///
    /// The range is clamped to the buffer size.
    pub fn zero_range(&mut self, start: usize, len: usize) {
        let start = start.min(self.size);
        let end = start.saturating_add(len).min(self.size);
        for channel in &mut self.channels {
            channel[start..end].fill(0.0);
        }
    }

    /// Copies shape and contents from another buffer, reusing allocations.
    pub fn copy_from(&mut self, other: &SoundBuffer) {
        self.channels.clone_from(&other.channels);
        self.size = other.size;
    }
}
