//! Linkwitz-Riley crossover filter bank.
//!
//! [`Crossover`] splits one producer into `N + 1` contiguous frequency bands
//! for `N` crossover frequencies and writes one band per output of the
//! caller's stream. Each crossover point is a 4th-order Linkwitz-Riley pair:
//! two identical 2nd-order Butterworth sections in series for the low-pass
//! half and the same for the high-pass half.
//!
//! # Band topology
//!
//! For sorted frequencies `f0 < f1 < ... < f(N-1)`:
//!
//! ```text
//! x ──┬─ LP0 ─ AP1 ─ ... ─ AP(N-1) ──────────────▶ band 0
//!     └─ HP0 ─┬─ LP1 ─ AP2 ─ ... ─ AP(N-1) ──────▶ band 1
//!             └─ HP1 ─ ...                 ...
//!                       └─ HP(N-1) ──────────────▶ band N
//! ```
//!
//! Each lower band runs through the all-pass of every higher crossover
//! point so its phase lines up with the bands split off later. The bands
//! then sum to an all-pass response: adding them back together restores the
//! input's magnitude spectrum exactly, for any spacing of the frequencies.

use auralis_core::{SharedOutput, SoundInput, SoundOutput, SoundStream};

use crate::biquad::{Biquad, BiquadCoefficients};

/// Per-channel state for a cascade of identical biquad sections.
#[derive(Debug, Clone)]
struct SectionBank {
    coefficients: BiquadCoefficients,
    stages: usize,
    /// `stages` sections per channel, channel-major.
    sections: Vec<Biquad>,
}

impl SectionBank {
    fn new(stages: usize, num_channels: usize) -> Self {
        let mut bank = Self {
            coefficients: BiquadCoefficients::PASSTHROUGH,
            stages,
            sections: Vec::new(),
        };
        bank.set_num_channels(num_channels);
        bank
    }

    fn set_coefficients(&mut self, coefficients: BiquadCoefficients) {
        self.coefficients = coefficients;
        for section in &mut self.sections {
            section.set_coefficients(coefficients);
        }
    }

    /// Reallocates cleared state when the channel count changes.
    fn set_num_channels(&mut self, num_channels: usize) {
        let len = num_channels * self.stages;
        if self.sections.len() != len {
            self.sections = vec![Biquad::with_coefficients(self.coefficients); len];
        }
    }

    fn process(&mut self, channel: usize, samples: &mut [f32]) {
        let stages = self.stages;
        for section in &mut self.sections[channel * stages..(channel + 1) * stages] {
            section.process_in_place(samples);
        }
    }
}

/// One crossover frequency and the filters it owns.
#[derive(Debug, Clone)]
struct CrossoverPoint {
    frequency: f32,
    lowpass: SectionBank,
    highpass: SectionBank,
    /// Phase alignment for each lower band; entry `i` filters band `i`.
    compensation: Vec<SectionBank>,
}

impl CrossoverPoint {
    fn new(frequency: f32, num_channels: usize) -> Self {
        Self {
            frequency,
            lowpass: SectionBank::new(2, num_channels),
            highpass: SectionBank::new(2, num_channels),
            compensation: Vec::new(),
        }
    }

    fn update_coefficients(&mut self, sample_rate: f32) {
        self.lowpass
            .set_coefficients(BiquadCoefficients::butterworth_lowpass(self.frequency, sample_rate));
        self.highpass
            .set_coefficients(BiquadCoefficients::butterworth_highpass(self.frequency, sample_rate));
        let allpass = BiquadCoefficients::allpass(self.frequency, sample_rate);
        for bank in &mut self.compensation {
            bank.set_coefficients(allpass);
        }
    }

    fn set_num_channels(&mut self, num_channels: usize) {
        self.lowpass.set_num_channels(num_channels);
        self.highpass.set_num_channels(num_channels);
        for bank in &mut self.compensation {
            bank.set_num_channels(num_channels);
        }
    }
}

/// Splits a producer into frequency bands.
///
/// With no crossover frequencies the input passes straight through.
/// Filter state persists across pulls and is cleared only when the channel
/// count changes or the frequency list is restructured.
pub struct Crossover {
    input: Option<SharedOutput>,
    points: Vec<CrossoverPoint>,
    /// Rate the coefficients were computed for.
    sample_rate: f32,
    /// Channel count the filter state is allocated for.
    num_channels: usize,
    scratch: SoundStream,
}

impl Crossover {
    /// Creates a crossover with no input and no frequencies.
    pub fn new() -> Self {
        Self {
            input: None,
            points: Vec::new(),
            sample_rate: 0.0,
            num_channels: 0,
            scratch: SoundStream::new(),
        }
    }

    /// Creates a crossover reading from `input`.
    pub fn with_input(input: Option<SharedOutput>) -> Self {
        let mut crossover = Self::new();
        crossover.set_input(input);
        crossover
    }

    /// Adds each frequency in turn, skipping rejected ones.
    pub fn with_frequencies(mut self, frequencies: &[f32]) -> Self {
        for &frequency in frequencies {
            self.add_crossover_frequency(frequency);
        }
        self
    }

    /// Returns the number of crossover frequencies.
    pub fn num_crossover_frequencies(&self) -> usize {
        self.points.len()
    }

    /// Returns the crossover frequency at `index`, in ascending order.
    ///
    /// Panics if `index >= num_crossover_frequencies()`.
    pub fn crossover_frequency(&self, index: usize) -> f32 {
        self.points[index].frequency
    }

    /// Iterates over the crossover frequencies in ascending order.
    pub fn crossover_frequencies(&self) -> impl Iterator<Item = f32> + '_ {
        self.points.iter().map(|p| p.frequency)
    }

    /// Adds a crossover frequency, keeping the list sorted.
    ///
    /// Returns false, leaving the crossover unchanged, if the frequency is
    /// not inside `(0, nyquist)`. Without a known sample rate any finite
    /// positive frequency is accepted.
    pub fn add_crossover_frequency(&mut self, frequency: f32) -> bool {
        let in_range = frequency.is_finite()
            && frequency > 0.0
            && (self.sample_rate <= 0.0 || frequency < self.sample_rate * 0.5);

        if !in_range {
            #[cfg(feature = "tracing")]
            tracing::debug!(frequency, sample_rate = self.sample_rate, "crossover: frequency rejected");
            return false;
        }

        let index = self.points.partition_point(|p| p.frequency <= frequency);
        self.points
            .insert(index, CrossoverPoint::new(frequency, self.num_channels));
        self.rebuild();

        #[cfg(feature = "tracing")]
        tracing::debug!(frequency, bands = self.points.len() + 1, "crossover: frequency added");
        true
    }

    /// Removes the crossover frequency at `index`.
    ///
    /// Panics if `index >= num_crossover_frequencies()`.
    pub fn remove_crossover_frequency(&mut self, index: usize) {
        assert!(
            index < self.points.len(),
            "crossover frequency index {index} out of range ({} frequencies)",
            self.points.len()
        );
        let _removed = self.points.remove(index);
        self.rebuild();

        #[cfg(feature = "tracing")]
        tracing::debug!(frequency = _removed.frequency, "crossover: frequency removed");
    }

    /// Replaces the frequency list. Returns how many were accepted.
    pub fn set_crossover_frequencies(&mut self, frequencies: &[f32]) -> usize {
        self.clear_crossover_frequencies();
        frequencies
            .iter()
            .filter(|&&frequency| self.add_crossover_frequency(frequency))
            .count()
    }

    /// Removes every crossover frequency, leaving a pass-through.
    pub fn clear_crossover_frequencies(&mut self) {
        self.points.clear();
    }

    /// Resizes the phase-compensation chains after the point list changed
    /// and refreshes all coefficients.
    fn rebuild(&mut self) {
        let num_channels = self.num_channels;
        for (index, point) in self.points.iter_mut().enumerate() {
            point.compensation = (0..index).map(|_| SectionBank::new(1, num_channels)).collect();
        }
        self.update_coefficients();
    }

    fn update_coefficients(&mut self) {
        for point in &mut self.points {
            point.update_coefficients(self.sample_rate);
        }
    }

    fn set_num_channels(&mut self, num_channels: usize) {
        if num_channels != self.num_channels {
            self.num_channels = num_channels;
            for point in &mut self.points {
                point.set_num_channels(num_channels);
            }
        }
    }
}

impl Default for Crossover {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundInput for Crossover {
    fn input(&self) -> Option<&SharedOutput> {
        self.input.as_ref()
    }

    fn set_input(&mut self, input: Option<SharedOutput>) {
        if let Some(new_input) = &input {
            let sample_rate = new_input.lock().sample_rate();
            if sample_rate != self.sample_rate {
                self.sample_rate = sample_rate;
                self.update_coefficients();
            }
        }
        self.input = input;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            attached = self.input.is_some(),
            sample_rate = self.sample_rate,
            "crossover: input changed"
        );
    }
}

impl SoundOutput for Crossover {
    fn sample_rate(&self) -> f32 {
        self.input.as_ref().map_or(0.0, |input| input.lock().sample_rate())
    }

    fn num_channels(&self) -> usize {
        self.input.as_ref().map_or(0, |input| input.lock().num_channels())
    }

    fn num_outputs(&self) -> usize {
        self.points.len() + 1
    }

    fn has_output_remaining(&self) -> bool {
        self.input
            .as_ref()
            .is_some_and(|input| input.lock().has_output_remaining())
    }

    fn fill_buffer(&mut self, stream: &mut SoundStream, start: usize, num_samples: usize) -> usize {
        let Some(input) = self.input.clone() else {
            return 0;
        };
        let mut input = input.lock();

        if !input.has_output_remaining() {
            return 0;
        }

        let sample_rate = input.sample_rate();
        if sample_rate != self.sample_rate {
            self.sample_rate = sample_rate;
            self.update_coefficients();
            #[cfg(feature = "tracing")]
            tracing::debug!(sample_rate, "crossover: coefficients recomputed");
        }

        if self.points.is_empty() {
            return input.get_samples(stream, start, num_samples);
        }

        let num_channels = input.num_channels();
        let read = input.get_samples(&mut self.scratch, 0, num_samples);
        drop(input);

        let num_channels = num_channels
            .min(self.scratch.num_channels())
            .min(stream.num_channels());
        self.set_num_channels(num_channels);

        let Self { points, scratch, .. } = self;
        let last = points.len();
        let range = start..start + read;

        for channel in 0..num_channels {
            let residual = &mut scratch.channel_mut(0, channel)[..read];

            for i in 0..last {
                let band = &mut stream.channel_mut(i, channel)[range.clone()];
                band.copy_from_slice(residual);
                points[i].lowpass.process(channel, band);
                for point in &mut points[i + 1..] {
                    point.compensation[i].process(channel, band);
                }
                points[i].highpass.process(channel, residual);
            }

            stream.channel_mut(last, channel)[range.clone()].copy_from_slice(residual);
        }

        read
    }
}
