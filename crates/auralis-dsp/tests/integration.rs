//! Integration tests for auralis-dsp producers.
//!
//! Verifies behavior with signal-level measurements: crossover band
//! reconstruction from impulse responses, resampler continuity across pull
//! boundaries, mixer additivity, and an end-to-end mixing scenario with one
//! input needing rate conversion.

use auralis_core::{SharedOutput, SoundOutput, SoundStream, shared};
use auralis_dsp::{Crossover, SampleRateConverter, SoundMixer};

const SAMPLE_RATE: f32 = 48000.0;
const TAU: f64 = core::f64::consts::TAU;

// ============================================================================
// Test producers
// ============================================================================

/// Sine generator with a distinct frequency per channel.
struct Sine {
    rate: f32,
    frequencies: Vec<f32>,
    position: usize,
}

impl Sine {
    fn new(rate: f32, frequencies: &[f32]) -> Self {
        Self {
            rate,
            frequencies: frequencies.to_vec(),
            position: 0,
        }
    }
}

impl SoundOutput for Sine {
    fn sample_rate(&self) -> f32 {
        self.rate
    }

    fn num_channels(&self) -> usize {
        self.frequencies.len()
    }

    fn num_outputs(&self) -> usize {
        1
    }

    fn has_output_remaining(&self) -> bool {
        true
    }

    fn fill_buffer(&mut self, stream: &mut SoundStream, start: usize, num_samples: usize) -> usize {
        for (channel, &frequency) in self.frequencies.iter().enumerate() {
            let samples = &mut stream.channel_mut(0, channel)[start..start + num_samples];
            for (i, s) in samples.iter_mut().enumerate() {
                let n = (self.position + i) as f64;
                *s = libm::sin(TAU * f64::from(frequency) * n / f64::from(self.rate)) as f32;
            }
        }
        self.position += num_samples;
        num_samples
    }
}

/// Full-scale mono square wave.
struct Square {
    rate: f32,
    period: usize,
    position: usize,
}

impl SoundOutput for Square {
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
        let samples = &mut stream.channel_mut(0, 0)[start..start + num_samples];
        for (i, s) in samples.iter_mut().enumerate() {
            let phase = (self.position + i) % self.period;
            *s = if phase < self.period / 2 { 1.0 } else { -1.0 };
        }
        self.position += num_samples;
        num_samples
    }
}

/// Unit impulse followed by silence, mono.
struct Impulse {
    rate: f32,
    position: usize,
}

impl SoundOutput for Impulse {
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
        let samples = &mut stream.channel_mut(0, 0)[start..start + num_samples];
        samples.fill(0.0);
        if self.position == 0 && num_samples > 0 {
            samples[0] = 1.0;
        }
        self.position += num_samples;
        num_samples
    }
}

/// Silent mono producer.
struct Silence {
    rate: f32,
}

impl SoundOutput for Silence {
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
        stream.channel_mut(0, 0)[start..start + num_samples].fill(0.0);
        num_samples
    }
}

// ============================================================================
// Measurement helpers
// ============================================================================

/// Magnitude of the DFT of `signal` at `frequency`.
fn magnitude_at(signal: &[f32], frequency: f64, sample_rate: f64) -> f64 {
    let (mut re, mut im) = (0.0, 0.0);
    for (n, &s) in signal.iter().enumerate() {
        let w = TAU * frequency * n as f64 / sample_rate;
        re += f64::from(s) * libm::cos(w);
        im -= f64::from(s) * libm::sin(w);
    }
    libm::sqrt(re * re + im * im)
}

/// Sum of squared samples.
fn energy(signal: &[f32]) -> f64 {
    signal.iter().map(|&s| f64::from(s) * f64::from(s)).sum()
}

/// Convert linear amplitude to dB.
fn to_db(linear: f64) -> f64 {
    20.0 * libm::log10(linear.max(1e-10))
}

// ============================================================================
// 1. Crossover reconstruction
// ============================================================================

/// Splits an impulse and returns the sum of all bands.
fn summed_impulse_response(frequencies: &[f32], length: usize) -> Vec<f32> {
    let source: SharedOutput = shared(Impulse {
        rate: SAMPLE_RATE,
        position: 0,
    });
    let mut crossover = Crossover::with_input(Some(source)).with_frequencies(frequencies);
    assert_eq!(crossover.num_crossover_frequencies(), frequencies.len());

    let mut stream = SoundStream::new();
    assert_eq!(crossover.get_samples(&mut stream, 0, length), length);
    assert_eq!(stream.num_buffers(), frequencies.len() + 1);

    let mut sum = vec![0.0_f32; length];
    for buffer in stream.buffers() {
        auralis_core::mix_into(&mut sum, &buffer.channel(0)[..length]);
    }
    sum
}

#[test]
fn crossover_bands_sum_flat() {
    let layouts: [&[f32]; 4] = [
        &[1000.0],
        &[500.0, 2000.0],
        &[250.0, 1000.0, 4000.0],
        &[200.0, 400.0, 800.0, 1600.0],
    ];
    let probes = [100.0, 200.0, 315.0, 500.0, 1000.0, 1600.0, 2500.0, 4000.0, 8000.0, 16000.0];

    for frequencies in layouts {
        let response = summed_impulse_response(frequencies, 8192);
        for &probe in &probes {
            let gain_db = to_db(magnitude_at(&response, probe, f64::from(SAMPLE_RATE)));
            assert!(
                gain_db.abs() < 0.1,
                "crossover {frequencies:?}: summed bands at {probe} Hz are {gain_db:.3} dB"
            );
        }
    }
}

#[test]
fn crossover_bands_are_band_limited() {
    let response_of_band = |band: usize| {
        let source: SharedOutput = shared(Impulse {
            rate: SAMPLE_RATE,
            position: 0,
        });
        let mut crossover = Crossover::with_input(Some(source)).with_frequencies(&[500.0, 4000.0]);
        let mut stream = SoundStream::new();
        crossover.get_samples(&mut stream, 0, 8192);
        stream.buffer(band).channel(0).to_vec()
    };
    let sr = f64::from(SAMPLE_RATE);

    let low = response_of_band(0);
    assert!(to_db(magnitude_at(&low, 100.0, sr)) > -0.5);
    assert!(to_db(magnitude_at(&low, 8000.0, sr)) < -40.0);

    let mid = response_of_band(1);
    assert!(to_db(magnitude_at(&mid, 1400.0, sr)) > -1.5);
    assert!(to_db(magnitude_at(&mid, 50.0, sr)) < -30.0);

    let high = response_of_band(2);
    assert!(to_db(magnitude_at(&high, 16000.0, sr)) > -0.5);
    assert!(to_db(magnitude_at(&high, 200.0, sr)) < -40.0);
}

#[test]
fn crossover_follows_input_rate_change() {
    let source = shared(Sine::new(48000.0, &[100.0]));
    let mut crossover = Crossover::with_input(Some(source.clone())).with_frequencies(&[1000.0]);
    let mut stream = SoundStream::new();
    crossover.get_samples(&mut stream, 0, 256);

    source.lock().rate = 96000.0;
    crossover.get_samples(&mut stream, 0, 256);
    assert_eq!(crossover.sample_rate(), 96000.0);
    for buffer in stream.buffers() {
        assert!(buffer.channel(0).iter().all(|s| s.is_finite()));
    }
}

#[test]
fn crossover_keeps_channels_independent() {
    let source = shared(Sine::new(SAMPLE_RATE, &[1000.0, 0.0]));
    let mut crossover = Crossover::with_input(Some(source)).with_frequencies(&[300.0, 3000.0]);
    let mut stream = SoundStream::new();

    for _ in 0..4 {
        assert_eq!(crossover.get_samples(&mut stream, 0, 512), 512);
        assert_eq!(stream.num_buffers(), 3);
        for buffer in stream.buffers() {
            assert!(buffer.channel(1).iter().all(|&s| s == 0.0));
        }
        assert!(energy(stream.buffer(1).channel(0)) > 0.0);
    }
}

#[test]
fn crossover_follows_channel_count_change() {
    let source = shared(Sine::new(SAMPLE_RATE, &[440.0]));
    let mut crossover = Crossover::with_input(Some(source.clone())).with_frequencies(&[1000.0]);
    let mut stream = SoundStream::new();
    assert_eq!(crossover.get_samples(&mut stream, 0, 256), 256);
    assert_eq!(stream.num_channels(), 1);

    source.lock().frequencies.extend([5000.0, 60.0]);
    assert_eq!(crossover.num_channels(), 3);
    assert_eq!(crossover.get_samples(&mut stream, 0, 256), 256);

    assert_eq!(stream.num_buffers(), 2);
    assert_eq!(stream.num_channels(), 3);
    for buffer in stream.buffers() {
        for channel in buffer.channels() {
            assert!(channel[..256].iter().all(|s| s.is_finite()));
        }
    }
    // The new channels carry signal in the band their tone falls in.
    assert!(energy(&stream.buffer(1).channel(1)[..256]) > energy(&stream.buffer(0).channel(1)[..256]));
    assert!(energy(&stream.buffer(0).channel(2)[..256]) > energy(&stream.buffer(1).channel(2)[..256]));
}

// ============================================================================
// 2. Resampler continuity
// ============================================================================

#[test]
fn resampler_chunked_matches_single_pull() {
    for (input_rate, output_rate) in [(44100.0, 48000.0), (48000.0, 44100.0), (22050.0, 48000.0), (96000.0, 44100.0)] {
        let mut chunked = SampleRateConverter::with_input(Some(shared(Sine::new(input_rate, &[440.0]))), output_rate);
        let mut single = SampleRateConverter::with_input(Some(shared(Sine::new(input_rate, &[440.0]))), output_rate);

        let mut chunks = SoundStream::with_shape(1, 1, 640);
        let mut written = 0;
        for _ in 0..10 {
            written += chunked.get_samples(&mut chunks, written, 64);
        }
        assert_eq!(written, 640);

        let mut whole = SoundStream::new();
        assert_eq!(single.get_samples(&mut whole, 0, 640), 640);

        for (i, (a, b)) in chunks.buffer(0).channel(0).iter().zip(whole.buffer(0).channel(0)).enumerate() {
            assert!(
                (a - b).abs() < 1e-4,
                "{input_rate} -> {output_rate}: sample {i} differs ({a} vs {b})"
            );
        }
    }
}

#[test]
fn resampler_preserves_sine_amplitude() {
    let mut converter = SampleRateConverter::with_input(Some(shared(Sine::new(44100.0, &[440.0]))), 48000.0);
    let mut stream = SoundStream::new();
    converter.get_samples(&mut stream, 0, 4800);
    let settled = &stream.buffer(0).channel(0)[100..];
    let peak = settled.iter().fold(0.0_f32, |m, &s| m.max(s.abs()));
    assert!((peak - 1.0).abs() < 0.01, "peak after resampling was {peak}");
}

// ============================================================================
// 3. Mixer
// ============================================================================

#[test]
fn mixer_output_is_sum_of_inputs() {
    let mut mixer = SoundMixer::new(SAMPLE_RATE);
    mixer.add_input(shared(Sine::new(SAMPLE_RATE, &[220.0, 330.0])));
    mixer.add_input(shared(Sine::new(SAMPLE_RATE, &[1000.0])));
    assert_eq!(mixer.num_channels(), 2);

    let mut mixed = SoundStream::new();
    assert_eq!(mixer.get_samples(&mut mixed, 0, 512), 512);

    let mut wide = SoundStream::new();
    Sine::new(SAMPLE_RATE, &[220.0, 330.0]).get_samples(&mut wide, 0, 512);
    let mut narrow = SoundStream::new();
    Sine::new(SAMPLE_RATE, &[1000.0]).get_samples(&mut narrow, 0, 512);

    for i in 0..512 {
        let left = wide.buffer(0).channel(0)[i] + narrow.buffer(0).channel(0)[i];
        let right = wide.buffer(0).channel(1)[i];
        assert!((mixed.buffer(0).channel(0)[i] - left).abs() < 1e-6);
        assert!((mixed.buffer(0).channel(1)[i] - right).abs() < 1e-6);
    }
}

#[test]
fn mixer_converts_only_mismatched_rates() {
    let mut mixer = SoundMixer::new(48000.0);
    mixer.add_input(shared(Silence { rate: 48000.0 }));
    mixer.add_input(shared(Square {
        rate: 44100.0,
        period: 100,
        position: 0,
    }));

    let mut mixed = SoundStream::new();
    let written = mixer.get_samples(&mut mixed, 0, 512);
    assert!(written <= 512);
    assert!(written > 0);

    let mut reference = SampleRateConverter::with_input(
        Some(shared(Square {
            rate: 44100.0,
            period: 100,
            position: 0,
        })),
        48000.0,
    );
    let mut resampled = SoundStream::new();
    assert_eq!(reference.get_samples(&mut resampled, 0, written), written);

    let mixed_energy = energy(&mixed.buffer(0).channel(0)[..written]);
    let square_energy = energy(&resampled.buffer(0).channel(0)[..written]);
    assert!(mixed_energy > 0.0);
    assert!(mixed_energy <= square_energy + 1e-6);
    assert_eq!(mixed.buffer(0).channel(0)[..written], resampled.buffer(0).channel(0)[..written]);
}

#[test]
fn mixer_feeds_crossover() {
    let mixer = shared(SoundMixer::new(SAMPLE_RATE));
    mixer.lock().add_input(shared(Sine::new(SAMPLE_RATE, &[100.0])));
    mixer.lock().add_input(shared(Sine::new(SAMPLE_RATE, &[10000.0])));

    let mut crossover = Crossover::with_input(Some(mixer.clone())).with_frequencies(&[1000.0]);
    let mut stream = SoundStream::new();
    for _ in 0..8 {
        assert_eq!(crossover.get_samples(&mut stream, 0, 512), 512);
    }

    let sr = f64::from(SAMPLE_RATE);
    let low = stream.buffer(0).channel(0);
    let high = stream.buffer(1).channel(0);
    assert!(magnitude_at(low, 100.0, sr) > 10.0 * magnitude_at(low, 10000.0, sr));
    assert!(magnitude_at(high, 10000.0, sr) > 10.0 * magnitude_at(high, 100.0, sr));
}
