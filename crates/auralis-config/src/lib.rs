//! Render configuration for auralis.
//!
//! Describes a render graph in TOML (sample rate, mixer behavior, crossover
//! frequencies, speaker layout and channel routing) and builds the matching
//! components from it.
//!
//! # Features
//!
//! - **Render configs**: load and save [`RenderConfig`] files
//! - **Validation**: range and consistency checks that collect every problem
//! - **Factory configs**: built-in layouts that are always available
//! - **Builders**: turn a config into a [`SoundMixer`](auralis_dsp::SoundMixer),
//!   [`Crossover`](auralis_dsp::Crossover),
//!   [`SpeakerConfiguration`](auralis_spatial::SpeakerConfiguration) and
//!   [`ChannelIOMap`](auralis_spatial::ChannelIOMap)
//!
//! # Example
//!
//! ```rust
//! use auralis_config::{RenderConfig, get_factory_config};
//!
//! let config = get_factory_config("surround_5_1").unwrap();
//! let speakers = config.build_speakers().unwrap();
//! assert_eq!(speakers.num_channels(), 6);
//!
//! let crossover = config.build_crossover(None).unwrap();
//! assert_eq!(crossover.num_crossover_frequencies(), 1);
//!
//! let custom = RenderConfig::new("Desk")
//!     .with_sample_rate(44100)
//!     .with_channel_mapping(0, 1)
//!     .with_channel_mapping(1, 0);
//! let map = custom.build_channel_map().unwrap();
//! assert_eq!(map.output_for_input(0), Some(1));
//! ```

mod error;
mod render_config;

/// Render configuration validation.
pub mod validation;

/// Render configurations bundled with the library.
pub mod factory_configs;

pub use error::ConfigError;
pub use factory_configs::{
    FACTORY_CONFIG_NAMES, factory_config_names, factory_configs, get_factory_config,
    is_factory_config,
};
pub use render_config::{
    ChannelMapping, CrossoverSection, MixerSection, RenderConfig, SpeakerEntry, SpeakerSection,
};
pub use validation::{
    MAX_SAMPLE_RATE, MIN_SAMPLE_RATE, ValidationError, ValidationResult,
    validate_config, validate_crossover_frequency, validate_role, validate_sample_rate,
};
