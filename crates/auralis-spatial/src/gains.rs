//! Per-channel gain coefficients produced by panning.

/// A resizable array of per-channel gains.
///
/// Resizing discards the old gains: every channel starts at 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelGainArray {
    gains: Vec<f32>,
}

impl ChannelGainArray {
    /// Creates an array of `num_channels` zero gains.
    pub fn new(num_channels: usize) -> Self {
        Self {
            gains: vec![0.0; num_channels],
        }
    }

    /// Returns the number of channels.
    pub fn num_channels(&self) -> usize {
        self.gains.len()
    }

    /// Resizes to `num_channels` and resets every gain to 0.
    pub fn set_num_channels(&mut self, num_channels: usize) {
        self.gains.clear();
        self.gains.resize(num_channels, 0.0);
    }

    /// Returns the gain of `channel`.
    ///
    /// Panics if `channel >= num_channels()`.
    pub fn gain(&self, channel: usize) -> f32 {
        self.gains[channel]
    }

    /// Sets the gain of `channel`.
    ///
    /// Panics if `channel >= num_channels()`.
    pub fn set_gain(&mut self, channel: usize, gain: f32) {
        self.gains[channel] = gain;
    }

    /// Sets every channel to `gain`.
    pub fn set_all(&mut self, gain: f32) {
        self.gains.fill(gain);
    }

    /// Sets every channel to 0.
    pub fn zero(&mut self) {
        self.set_all(0.0);
    }

    /// Returns the gains in channel order.
    pub fn as_slice(&self) -> &[f32] {
        &self.gains
    }

    /// Sum of squared gains.
    pub fn power(&self) -> f32 {
        self.gains.iter().map(|g| g * g).sum()
    }
}
