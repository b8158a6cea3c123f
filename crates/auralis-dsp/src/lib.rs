//! Auralis DSP - producers that transform other producers
//!
//! Every type here implements [`SoundOutput`](auralis_core::SoundOutput) and
//! pulls from one or more upstream producers on demand.
//!
//! # Producers
//!
//! - [`SampleRateConverter`] - linear-interpolation resampling with phase
//!   carried across pulls
//! - [`Crossover`] - Linkwitz-Riley band splitting into `N + 1` bands
//! - [`SoundMixer`] - sums any number of producers, retiming each to a
//!   common rate
//!
//! # Filters
//!
//! - [`Biquad`] - second-order IIR section
//! - [`BiquadCoefficients`] - Butterworth low/high-pass and matching all-pass
//!
//! # Logging
//!
//! Enable the `tracing` feature to emit `debug` events whenever a producer
//! is reconfigured. The render path never logs.
//!
//! # Example
//!
//! ```rust
//! use auralis_core::{SoundOutput, SoundStream, shared};
//! use auralis_dsp::{Crossover, SoundMixer};
//!
//! let mixer = shared(SoundMixer::new(48000.0));
//! let mut crossover = Crossover::with_input(Some(mixer.clone())).with_frequencies(&[120.0, 2000.0]);
//!
//! let mut stream = SoundStream::new();
//! crossover.get_samples(&mut stream, 0, 256);
//! assert_eq!(crossover.num_outputs(), 3);
//! ```

pub mod biquad;
pub mod crossover;
pub mod mixer;
pub mod resampler;

pub use biquad::{Biquad, BiquadCoefficients};
pub use crossover::Crossover;
pub use mixer::SoundMixer;
pub use resampler::SampleRateConverter;
