//! Auralis Spatial - loudspeaker panning and channel routing
//!
//! Turns a listener-relative direction into per-channel gains for a
//! speaker layout, and describes how logical channels reach device
//! channels.
//!
//! # Core Types
//!
//! - [`SpeakerConfiguration`] - speakers around the listener, with standard
//!   layouts from mono to 7.1
//! - [`ChannelGainArray`] - the per-channel gains panning produces
//! - [`ChannelIOMap`] - input/output channel routing with identity fallback
//! - [`Vec2`], [`Vec3`] - listener-relative directions (forward is `-Z`)
//!
//! # Example
//!
//! ```rust
//! use auralis_spatial::{ChannelGainArray, SpeakerConfiguration, Vec3};
//!
//! let mut gains = ChannelGainArray::default();
//! SpeakerConfiguration::stereo().spatialize(Vec3::FORWARD, &mut gains);
//!
//! // Straight ahead splits power equally between left and right
//! assert!((gains.gain(0) - gains.gain(1)).abs() < 1e-6);
//! assert!((gains.power() - 1.0).abs() < 1e-6);
//! ```

pub mod gains;
pub mod io_map;
pub mod speaker;
pub mod vector;

pub use gains::ChannelGainArray;
pub use io_map::ChannelIOMap;
pub use speaker::{ParseRoleError, Speaker, SpeakerConfiguration, SpeakerRole};
pub use vector::{Vec2, Vec3};
