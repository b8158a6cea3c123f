//! Multi-input summing producer.
//!
//! [`SoundMixer`] pulls every attached producer, converts each one to the
//! mixer's sample rate and adds the results band by band, channel by
//! channel. Its shape is the widest of its inputs: an input with fewer
//! bands or channels contributes silence to the ones it lacks.

use auralis_core::{SharedOutput, SoundInput, SoundOutput, SoundStream, mix_into, same_output};

use crate::resampler::SampleRateConverter;

/// An attached producer and the converter that retimes it.
struct MixerInput {
    output: SharedOutput,
    converter: SampleRateConverter,
}

impl MixerInput {
    fn new(output: SharedOutput, sample_rate: f32) -> Self {
        Self {
            converter: SampleRateConverter::with_input(Some(output.clone()), sample_rate),
            output,
        }
    }

    fn set_output(&mut self, output: SharedOutput) {
        self.converter.set_input(Some(output.clone()));
        self.output = output;
    }
}

/// Sums any number of producers into one.
///
/// ## Example
///
/// ```rust,ignore
/// let mut mixer = SoundMixer::new(48000.0);
/// mixer.add_input(voice.clone());
/// mixer.add_input(music.clone());
///
/// let mut stream = SoundStream::new();
/// let written = mixer.get_samples(&mut stream, 0, 512);
/// ```
pub struct SoundMixer {
    inputs: Vec<MixerInput>,
    sample_rate: f32,
    rate_conversion: bool,
    num_channels: usize,
    num_outputs: usize,
    scratch: SoundStream,
}

impl SoundMixer {
    /// Creates an empty mixer. Negative rates clamp to 0.
    ///
    /// A rate of 0 adopts the rate of the first input added.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            inputs: Vec::new(),
            sample_rate: sample_rate.max(0.0),
            rate_conversion: true,
            num_channels: 0,
            num_outputs: 0,
            scratch: SoundStream::new(),
        }
    }

    /// Sets the output rate of the mixer and of every input's converter.
    ///
    /// Converter phases are left alone.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate.max(0.0);
        for input in &mut self.inputs {
            input.converter.set_sample_rate(self.sample_rate);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(sample_rate = self.sample_rate, "mixer: output rate changed");
    }

    /// Returns true if inputs are converted to the mixer's rate.
    pub fn is_sample_rate_conversion_enabled(&self) -> bool {
        self.rate_conversion
    }

    /// Enables or disables rate conversion.
    ///
    /// When disabled, inputs are pulled directly and mixed at whatever rate
    /// they produce. Re-enabling restarts every converter from silence.
    pub fn set_sample_rate_conversion_enabled(&mut self, enabled: bool) {
        if enabled && !self.rate_conversion {
            for input in &mut self.inputs {
                input.converter.reset();
            }
        }
        self.rate_conversion = enabled;
    }

    /// Returns the number of attached inputs.
    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Returns the input at `index`.
    ///
    /// Panics if `index >= num_inputs()`.
    pub fn input(&self, index: usize) -> &SharedOutput {
        &self.inputs[index].output
    }

    /// Appends an input.
    pub fn add_input(&mut self, input: SharedOutput) {
        let (sample_rate, num_outputs, num_channels) = {
            let output = input.lock();
            (output.sample_rate(), output.num_outputs(), output.num_channels())
        };
        if self.sample_rate == 0.0 {
            self.sample_rate = sample_rate.max(0.0);
        }

        self.inputs.push(MixerInput::new(input, self.sample_rate));
        self.num_outputs = self.num_outputs.max(num_outputs);
        self.num_channels = self.num_channels.max(num_channels);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            inputs = self.inputs.len(),
            input_rate = sample_rate,
            sample_rate = self.sample_rate,
            "mixer: input added"
        );
    }

    /// Replaces the input at `index`. `None` removes the slot.
    ///
    /// Panics if `index >= num_inputs()`.
    pub fn set_input(&mut self, index: usize, input: Option<SharedOutput>) {
        match input {
            Some(input) => {
                self.inputs[index].set_output(input);
                self.update_format();
                #[cfg(feature = "tracing")]
                tracing::debug!(index, "mixer: input replaced");
            }
            None => self.remove_input(index),
        }
    }

    /// Removes the input at `index`.
    ///
    /// Panics if `index >= num_inputs()`.
    pub fn remove_input(&mut self, index: usize) {
        assert!(
            index < self.inputs.len(),
            "mixer input index {index} out of range ({} inputs)",
            self.inputs.len()
        );
        self.inputs.remove(index);
        self.update_format();
        #[cfg(feature = "tracing")]
        tracing::debug!(index, inputs = self.inputs.len(), "mixer: input removed");
    }

    /// Removes the first slot holding `input`. Returns false if none does.
    pub fn remove_input_ref(&mut self, input: &SharedOutput) -> bool {
        match self.inputs.iter().position(|slot| same_output(&slot.output, input)) {
            Some(index) => {
                self.remove_input(index);
                true
            }
            None => false,
        }
    }

    /// Removes every input.
    pub fn clear_inputs(&mut self) {
        self.inputs.clear();
        self.num_outputs = 0;
        self.num_channels = 0;
        #[cfg(feature = "tracing")]
        tracing::debug!("mixer: inputs cleared");
    }

    /// Recomputes the output shape as the widest of the inputs.
    fn update_format(&mut self) {
        let (num_outputs, num_channels) = self.inputs.iter().fold((0, 0), |(bands, channels), input| {
            let output = input.output.lock();
            (bands.max(output.num_outputs()), channels.max(output.num_channels()))
        });
        self.num_outputs = num_outputs;
        self.num_channels = num_channels;
    }
}

impl SoundOutput for SoundMixer {
    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn num_channels(&self) -> usize {
        self.num_channels
    }

    fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    fn has_output_remaining(&self) -> bool {
        self.inputs
            .iter()
            .any(|input| input.output.lock().has_output_remaining())
    }

    fn fill_buffer(&mut self, stream: &mut SoundStream, start: usize, num_samples: usize) -> usize {
        stream.zero_range(start, num_samples);

        let mut max_read = 0;

        for input in &mut self.inputs {
            let (num_outputs, num_channels) = {
                let output = input.output.lock();
                (output.num_outputs(), output.num_channels())
            };

            let read = if self.rate_conversion {
                input.converter.get_samples(&mut self.scratch, 0, num_samples)
            } else {
                input.output.lock().get_samples(&mut self.scratch, 0, num_samples)
            };
            max_read = max_read.max(read);

            let num_outputs = num_outputs.min(stream.num_buffers()).min(self.scratch.num_buffers());
            let num_channels = num_channels.min(stream.num_channels()).min(self.scratch.num_channels());

            for band in 0..num_outputs {
                let source = self.scratch.buffer(band);
                for channel in 0..num_channels {
                    mix_into(
                        &mut stream.channel_mut(band, channel)[start..start + read],
                        &source.channel(channel)[..read],
                    );
                }
            }
        }

        max_read
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auralis_core::shared;

    /// Producer emitting a constant on every band and channel.
    struct Constant {
        rate: f32,
        channels: usize,
        bands: usize,
        value: f32,
        remaining: usize,
    }

    impl SoundOutput for Constant {
        fn sample_rate(&self) -> f32 {
            self.rate
        }

        fn num_channels(&self) -> usize {
            self.channels
        }

        fn num_outputs(&self) -> usize {
            self.bands
        }

        fn has_output_remaining(&self) -> bool {
            self.remaining > 0
        }

        fn fill_buffer(&mut self, stream: &mut SoundStream, start: usize, num_samples: usize) -> usize {
            let count = num_samples.min(self.remaining);
            for band in 0..self.bands {
                for channel in 0..self.channels {
                    stream.channel_mut(band, channel)[start..start + count].fill(self.value);
                }
            }
            self.remaining -= count;
            count
        }
    }

    fn constant(rate: f32, channels: usize, value: f32, remaining: usize) -> SharedOutput {
        shared(Constant {
            rate,
            channels,
            bands: 1,
            value,
            remaining,
        })
    }

    #[test]
    fn test_empty_mixer() {
        let mut mixer = SoundMixer::new(48000.0);
        let mut stream = SoundStream::with_shape(1, 1, 16);
        stream.channel_mut(0, 0).fill(1.0);
        assert_eq!(mixer.get_samples(&mut stream, 0, 16), 0);
        assert!(stream.buffer(0).channel(0).iter().all(|&s| s == 0.0));
        assert!(!mixer.has_output_remaining());
    }

    #[test]
    fn test_shape_is_widest_input() {
        let mut mixer = SoundMixer::new(48000.0);
        mixer.add_input(constant(48000.0, 1, 0.0, 10));
        mixer.add_input(shared(Constant {
            rate: 48000.0,
            channels: 2,
            bands: 3,
            value: 0.0,
            remaining: 10,
        }));
        assert_eq!(mixer.num_channels(), 2);
        assert_eq!(mixer.num_outputs(), 3);
        mixer.remove_input(1);
        assert_eq!(mixer.num_channels(), 1);
        assert_eq!(mixer.num_outputs(), 1);
        mixer.clear_inputs();
        assert_eq!(mixer.num_channels(), 0);
    }

    #[test]
    fn test_sums_inputs() {
        let mut mixer = SoundMixer::new(48000.0);
        mixer.add_input(constant(48000.0, 2, 0.25, 100));
        mixer.add_input(constant(48000.0, 1, 0.5, 100));
        let mut stream = SoundStream::new();
        assert_eq!(mixer.get_samples(&mut stream, 0, 8), 8);
        assert!(stream.buffer(0).channel(0).iter().all(|&s| s == 0.75));
        assert!(stream.buffer(0).channel(1).iter().all(|&s| s == 0.25));
    }

    #[test]
    fn test_reports_longest_input() {
        let mut mixer = SoundMixer::new(48000.0);
        mixer.add_input(constant(48000.0, 1, 1.0, 3));
        mixer.add_input(constant(48000.0, 1, 1.0, 5));
        let mut stream = SoundStream::new();
        assert_eq!(mixer.get_samples(&mut stream, 0, 8), 5);
        assert_eq!(&stream.buffer(0).channel(0)[..6], &[2.0, 2.0, 2.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_zero_rate_adopts_first_input() {
        let mut mixer = SoundMixer::new(0.0);
        mixer.add_input(constant(44100.0, 1, 0.0, 1));
        mixer.add_input(constant(22050.0, 1, 0.0, 1));
        assert_eq!(mixer.sample_rate(), 44100.0);
        assert_eq!(SoundMixer::new(-1.0).sample_rate(), 0.0);
    }

    #[test]
    fn test_input_management() {
        let a = constant(48000.0, 1, 0.0, 1);
        let b = constant(48000.0, 4, 0.0, 1);
        let mut mixer = SoundMixer::new(48000.0);
        mixer.add_input(a.clone());
        mixer.add_input(b.clone());
        assert!(same_output(mixer.input(1), &b));

        assert!(mixer.remove_input_ref(&b));
        assert!(!mixer.remove_input_ref(&b));
        assert_eq!(mixer.num_inputs(), 1);

        mixer.set_input(0, Some(b.clone()));
        assert!(same_output(mixer.input(0), &b));
        assert_eq!(mixer.num_channels(), 4);

        mixer.set_input(0, None);
        assert_eq!(mixer.num_inputs(), 0);
        assert_eq!(mixer.num_channels(), 0);
    }

    #[test]
    #[should_panic]
    fn test_remove_invalid_index_panics() {
        let mut mixer = SoundMixer::new(48000.0);
        mixer.remove_input(0);
    }

    #[test]
    fn test_conversion_can_be_bypassed() {
        let mut mixer = SoundMixer::new(48000.0);
        mixer.add_input(constant(24000.0, 1, 1.0, 100));
        mixer.set_sample_rate_conversion_enabled(false);
        assert!(!mixer.is_sample_rate_conversion_enabled());
        let mut stream = SoundStream::new();
        assert_eq!(mixer.get_samples(&mut stream, 0, 4), 4);
        assert_eq!(stream.buffer(0).channel(0), &[1.0; 4]);
    }

    /// Mono producer emitting `0, 1, 2, ...` forever.
    struct Ramp {
        rate: f32,
        position: usize,
    }

    impl SoundOutput for Ramp {
        fn sample_rate(&self) -> f32 {
            self.rate
        }

        fn num_channels(&self) -> usize {
            1
        }

        fn num_outputs(&self) -> usize {
            1
        }

        fn has_output_remaining(&self) -> bool {
            true
        }

        fn fill_buffer(&mut self, stream: &mut SoundStream, start: usize, num_samples: usize) -> usize {
            let channel = &mut stream.channel_mut(0, 0)[start..start + num_samples];
            for (i, s) in channel.iter_mut().enumerate() {
                *s = (self.position + i) as f32;
            }
            self.position += num_samples;
            num_samples
        }
    }

    #[test]
    fn test_reenabling_conversion_starts_from_silence() {
        let mut mixer = SoundMixer::new(48000.0);
        mixer.add_input(shared(Ramp { rate: 24000.0, position: 0 }));
        let mut stream = SoundStream::new();

        // Consumes input samples 0 to 3.
        assert_eq!(mixer.get_samples(&mut stream, 0, 8), 8);

        mixer.set_sample_rate_conversion_enabled(false);
        assert_eq!(mixer.get_samples(&mut stream, 0, 1000), 1000);
        assert_eq!(stream.buffer(0).channel(0)[999], 1003.0);

        mixer.set_sample_rate_conversion_enabled(true);
        assert_eq!(mixer.get_samples(&mut stream, 0, 6), 6);
        assert_eq!(
            &stream.buffer(0).channel(0)[..6],
            &[0.0, 0.0, 0.0, 502.0, 1004.0, 1004.5]
        );
    }

    #[test]
    fn test_writes_at_start_offset() {
        let mut mixer = SoundMixer::new(48000.0);
        mixer.add_input(constant(48000.0, 1, 1.0, 100));
        let mut stream = SoundStream::with_shape(1, 1, 8);
        stream.channel_mut(0, 0).fill(9.0);
        assert_eq!(mixer.get_samples(&mut stream, 4, 4), 4);
        assert_eq!(stream.buffer(0).channel(0), &[9.0, 9.0, 9.0, 9.0, 1.0, 1.0, 1.0, 1.0]);
    }
}
