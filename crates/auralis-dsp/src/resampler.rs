//! Linear-interpolation sample rate converter.
//!
//! [`SampleRateConverter`] pulls from one upstream producer and delivers its
//! audio at a target rate. Each output sample is interpolated between the
//! two input samples that bracket it. The fractional position between those
//! two samples (the phase) and the samples themselves persist across pulls,
//! so a signal pulled in many small blocks is identical to the same signal
//! pulled in one large block.

use auralis_core::{SharedOutput, SoundInput, SoundOutput, SoundStream, mix, scale};

/// Scratch positions holding the two most recent input samples.
const HISTORY: usize = 2;

/// Resamples one producer to a target sample rate.
///
/// - Equal input and output rates pass audio through untouched.
/// - A zero rate on either side produces nothing.
/// - Attaching a different input resets the phase; changing the output
///   rate does not.
pub struct SampleRateConverter {
    input: Option<SharedOutput>,
    sample_rate: f32,
    /// Position between the two history samples, in `[0, 1)`.
    phase: f64,
    /// Input samples read but not yet consumed by the phase walk.
    pending: usize,
    /// Positions 0 and 1 of every channel carry the history, followed by
    /// `pending` unconsumed samples; new input is read after those.
    scratch: SoundStream,
}

impl SampleRateConverter {
    /// Creates a converter with no input.
    ///
    /// Negative rates clamp to 0. A rate of 0 adopts the rate of the first
    /// input attached.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            input: None,
            sample_rate: sample_rate.max(0.0),
            phase: 0.0,
            pending: 0,
            scratch: SoundStream::new(),
        }
    }

    /// Creates a converter reading from `input`.
    pub fn with_input(input: Option<SharedOutput>, sample_rate: f32) -> Self {
        let mut converter = Self::new(sample_rate);
        converter.set_input(input);
        converter
    }

    /// Sets the output sample rate. Negative rates clamp to 0.
    ///
    /// The phase is kept so a running stream does not jump.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate.max(0.0);
        #[cfg(feature = "tracing")]
        tracing::debug!(sample_rate = self.sample_rate, "resampler: output rate changed");
    }

    /// Returns the fractional phase carried to the next pull.
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Silences the history, drops unconsumed input and rewinds the phase.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.pending = 0;
        self.scratch.zero_range(0, HISTORY);
    }

    /// Copies up to `num_samples` unconsumed input samples straight to
    /// `stream`. Returns how many were copied.
    fn flush_pending(&mut self, stream: &mut SoundStream, start: usize, num_samples: usize) -> usize {
        let count = self.pending.min(num_samples);
        if count == 0 {
            return 0;
        }

        let num_bands = self.scratch.num_buffers().min(stream.num_buffers());
        let num_channels = self.scratch.num_channels().min(stream.num_channels());
        for band in 0..num_bands {
            let source = self.scratch.buffer(band);
            for channel in 0..num_channels {
                stream.channel_mut(band, channel)[start..start + count]
                    .copy_from_slice(&source.channel(channel)[HISTORY..HISTORY + count]);
            }
        }

        let remaining = HISTORY + self.pending;
        for channel in self.scratch.channels_mut() {
            channel.copy_within(HISTORY + count..remaining, HISTORY);
        }
        self.pending -= count;
        count
    }
}

impl SoundInput for SampleRateConverter {
    fn input(&self) -> Option<&SharedOutput> {
        self.input.as_ref()
    }

    fn set_input(&mut self, input: Option<SharedOutput>) {
        if let Some(new_input) = &input
            && self.sample_rate == 0.0
        {
            self.sample_rate = new_input.lock().sample_rate().max(0.0);
        }
        self.input = input;
        self.reset();
        #[cfg(feature = "tracing")]
        tracing::debug!(
            attached = self.input.is_some(),
            sample_rate = self.sample_rate,
            "resampler: input changed"
        );
    }
}

/// Walks the phase over up to `num_samples` outputs.
///
/// Returns the number of outputs, the number of new input samples they
/// consume and the phase left over. With `available` set, stops before the
/// walk would need more input than that.
fn advance(phase: f64, ratio: f64, num_samples: usize, available: Option<usize>) -> (usize, usize, f64) {
    let mut phase = phase;
    let mut consumed = 0;

    for produced in 0..num_samples {
        let next = phase + ratio;
        let step = libm::floor(next);
        let steps = step as usize;
        if let Some(available) = available
            && consumed + steps > available
        {
            return (produced, consumed, phase);
        }
        consumed += steps;
        phase = next - step;
    }

    (num_samples, consumed, phase)
}

/// Interpolates `output.len()` samples from `history`, starting at `phase`.
///
/// Uses the same phase arithmetic as [`advance`], so it reads exactly the
/// input samples `advance` counted as consumed.
fn interpolate(history: &[f32], output: &mut [f32], phase: f64, ratio: f64) {
    let mut phase = phase;
    let mut index = 0;

    for out in output {
        let a = phase as f32;
        *out = mix(scale(history[index + 1], a), scale(history[index], 1.0 - a));

        let next = phase + ratio;
        let step = libm::floor(next);
        index += step as usize;
        phase = next - step;
    }
}

impl SoundOutput for SampleRateConverter {
    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn num_channels(&self) -> usize {
        self.input.as_ref().map_or(0, |input| input.lock().num_channels())
    }

    fn num_outputs(&self) -> usize {
        self.input.as_ref().map_or(0, |input| input.lock().num_outputs())
    }

    fn has_output_remaining(&self) -> bool {
        self.input
            .as_ref()
            .is_some_and(|input| self.pending > 0 || input.lock().has_output_remaining())
    }

    fn fill_buffer(&mut self, stream: &mut SoundStream, start: usize, num_samples: usize) -> usize {
        let Some(input) = self.input.clone() else {
            return 0;
        };
        let mut input = input.lock();

        if self.pending == 0 && !input.has_output_remaining() {
            return 0;
        }

        let input_rate = input.sample_rate();
        if input_rate == self.sample_rate {
            let flushed = self.flush_pending(stream, start, num_samples);
            if self.pending > 0 {
                return flushed;
            }
            // Interpolation restarts from silence when the rates diverge again.
            self.reset();
            let read = if flushed < num_samples && input.has_output_remaining() {
                input.get_samples(stream, start + flushed, num_samples - flushed)
            } else {
                0
            };
            return flushed + read;
        }
        if input_rate <= 0.0 || self.sample_rate <= 0.0 {
            return 0;
        }

        let ratio = f64::from(input_rate) / f64::from(self.sample_rate);
        let num_bands = input.num_outputs();
        let num_channels = input.num_channels();
        let buffered = HISTORY + self.pending;
        self.scratch.reserve_shape(num_bands, num_channels, buffered);

        let (_, needed, _) = advance(self.phase, ratio, num_samples, None);
        let mut available = self.pending;
        if needed > available && input.has_output_remaining() {
            available += input.get_samples(&mut self.scratch, buffered, needed - available);
        }
        drop(input);

        let (produced, consumed, end_phase) =
            advance(self.phase, ratio, num_samples, Some(available));

        let num_bands = num_bands.min(self.scratch.num_buffers());
        let num_channels = num_channels.min(self.scratch.num_channels());

        for band in 0..num_bands {
            for channel in 0..num_channels {
                let history = self.scratch.channel_mut(band, channel);
                if band < stream.num_buffers() && channel < stream.num_channels() {
                    let output =
                        &mut stream.channel_mut(band, channel)[start..start + produced];
                    interpolate(history, output, self.phase, ratio);
                }
                // Keep the last two consumed samples and everything after them.
                history.copy_within(consumed..HISTORY + available, 0);
            }
        }

        self.pending = available - consumed;
        self.phase = end_phase;
        produced
    }
}
