//! Auralis Core - pull-based audio streaming primitives
//!
//! This crate holds the data model shared by every stage of the auralis
//! render graph. Producers are pulled, never pushed: a consumer (usually a
//! device callback) asks the outermost producer for samples and each producer
//! pulls from its own inputs in turn.
//!
//! # Core Abstractions
//!
//! ## Samples
//!
//! - [`Sample`] - the in-graph representation (`f32`, unclamped)
//! - [`convert`], [`mix`], [`scale`] - format conversion and saturating arithmetic
//!   over 8/16/24/32/64-bit integers and 32/64-bit floats
//! - [`SampleLanes`], [`mix_into`], [`scale_in_place`] - vector-width block kernels
//!
//! ## Containers
//!
//! - [`SoundBuffer`] - equal-length channels of samples
//! - [`SoundStream`] - one buffer per band, all sharing one shape
//!
//! ## Producers
//!
//! - [`SoundOutput`] - the pull contract
//! - [`SoundInput`] - transforms with one upstream producer
//! - [`SharedOutput`] - a lockable, shareable producer handle
//!
//! # Example
//!
//! ```rust
//! use auralis_core::{SoundStream, convert};
//!
//! let mut stream = SoundStream::with_shape(1, 2, 256);
//! stream.channel_mut(0, 0)[0] = 0.5;
//!
//! // Format conversion happens only at the device boundary
//! let device_sample: i16 = convert(stream.buffer(0).channel(0)[0]);
//! assert_eq!(device_sample, 16383);
//! ```

pub mod buffer;
pub mod output;
pub mod sample;
pub mod stream;

pub use buffer::SoundBuffer;
pub use output::{SharedOutput, SoundInput, SoundOutput, same_output, shared};
pub use sample::{
    FullScale, I24, LANES, Sample, SampleFormat, SampleLanes, SampleValue, convert, mix,
    mix_into, scale, scale_in_place,
};
pub use stream::SoundStream;

pub use parking_lot::{Mutex, MutexGuard};
