//! Multi-band audio stream.

use crate::buffer::SoundBuffer;
use crate::sample::Sample;

/// An ordered set of same-shaped [`SoundBuffer`]s, one per band.
///
/// Single-band streams carry ordinary audio. Producers with several parallel
/// outputs, such as a crossover, write one band per output. The stream owns
/// the channel count and size: every setter applies to all bands, so all
/// bands always share one shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SoundStream {
    buffers: Vec<SoundBuffer>,
    num_channels: usize,
    size: usize,
}

impl SoundStream {
    /// Creates an empty stream with no bands.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a zeroed stream with the given shape.
    pub fn with_shape(num_buffers: usize, num_channels: usize, size: usize) -> Self {
        Self {
            buffers: vec![SoundBuffer::with_shape(num_channels, size); num_buffers],
            num_channels,
            size,
        }
    }

    /// Returns the number of bands.
    pub fn num_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// Sets the number of bands. Added bands take the current shape.
    pub fn set_num_buffers(&mut self, num_buffers: usize) {
        let (num_channels, size) = (self.num_channels, self.size);
        self.buffers
            .resize_with(num_buffers, || SoundBuffer::with_shape(num_channels, size));
    }

    /// Returns the channel count shared by every band.
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Sets the channel count of every band.
    pub fn set_num_channels(&mut self, num_channels: usize) {
        self.num_channels = num_channels;
        for buffer in &mut self.buffers {
            buffer.set_num_channels(num_channels);
        }
    }

    /// Returns the length shared by every band.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Sets the length of every band.
    pub fn set_size(&mut self, size: usize) {
        self.size = size;
        for buffer in &mut self.buffers {
            buffer.set_size(size);
        }
    }

    /// Grows the stream to at least the given shape. Never shrinks.
    pub fn reserve_shape(&mut self, num_buffers: usize, num_channels: usize, size: usize) {
        if size > self.size {
            self.set_size(size);
        }
        if num_channels > self.num_channels {
            self.set_num_channels(num_channels);
        }
        if num_buffers > self.num_buffers() {
            self.set_num_buffers(num_buffers);
        }
    }

    /// Returns one band.
    ///
    /// Panics if `index >= num_buffers()`.
    #[inline]
    pub fn buffer(&self, index: usize) -> &SoundBuffer {
        &self.buffers[index]
    }

    /// Returns the samples of one channel of one band mutably.
    ///
    /// Bands are only handed out immutably, so every band keeps the
    /// stream's shape.
    ///
    /// Panics if `band >= num_buffers()` or `channel >= num_channels()`.
    #[inline]
    pub fn channel_mut(&mut self, band: usize, channel: usize) -> &mut [Sample] {
        self.buffers[band].channel_mut(channel)
    }

    /// Iterates over the bands.
    pub fn buffers(&self) -> impl Iterator<Item = &SoundBuffer> {
        self.buffers.iter()
    }

    /// Iterates mutably over the channels of one band.
    ///
    /// Panics if `band >= num_buffers()`.
    pub fn band_channels_mut(&mut self, band: usize) -> impl Iterator<Item = &mut [Sample]> {
        self.buffers[band].channels_mut()
    }

    /// Iterates mutably over every channel of every band.
    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut [Sample]> {
        self.buffers.iter_mut().flat_map(|buffer| buffer.channels_mut())
    }

    /// Sets every sample of every band to zero.
    pub fn zero(&mut self) {
        for buffer in &mut self.buffers {
            buffer.zero();
        }
    }

    /// Zeroes `len` samples of every band and channel starting at `start`.
    ///
    /// The range is clamped to the stream size.
    pub fn zero_range(&mut self, start: usize, len: usize) {
        for buffer in &mut self.buffers {
            buffer.zero_range(start, len);
        }
    }
}
