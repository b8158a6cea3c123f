//! Render configuration validation.
//!
//! Checks every field of a [`RenderConfig`] against the ranges the render
//! components accept, collecting all problems rather than stopping at the
//! first one.
//!
//! # Example
//!
//! ```rust
//! use auralis_config::{RenderConfig, validate_config};
//!
//! let config = RenderConfig::new("Studio").with_crossover_frequency(80.0);
//! validate_config(&config).expect("80 Hz is below Nyquist");
//! ```

use std::collections::HashSet;

use auralis_spatial::{SpeakerConfiguration, SpeakerRole};
use thiserror::Error;

use crate::render_config::RenderConfig;

/// Lowest accepted render sample rate in Hz.
pub const MIN_SAMPLE_RATE: u32 = 1;

/// Highest accepted render sample rate in Hz.
pub const MAX_SAMPLE_RATE: u32 = 384_000;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Value out of range.
    #[error("parameter '{param}' value {value} out of range ({min}, {max})")]
    OutOfRange {
        /// Name of the parameter.
        param: String,
        /// The value that was out of range.
        value: f64,
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// Unknown speaker role name.
    #[error("unknown speaker role: {0}")]
    UnknownRole(String),

    /// Unknown standard layout name.
    #[error("unknown speaker layout: {0}")]
    UnknownLayout(String),

    /// Speaker section is structurally wrong.
    #[error("invalid speaker layout: {0}")]
    InvalidSpeakerLayout(String),

    /// A channel appears in more than one route on the same side.
    #[error("{side} channel {channel} is mapped more than once")]
    DuplicateMapping {
        /// `"input"` or `"output"`.
        side: &'static str,
        /// The repeated channel.
        channel: usize,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate the render sample rate.
pub fn validate_sample_rate(sample_rate: u32) -> ValidationResult<()> {
    if (MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&sample_rate) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            param: "sample_rate".to_string(),
            value: f64::from(sample_rate),
            min: f64::from(MIN_SAMPLE_RATE),
            max: f64::from(MAX_SAMPLE_RATE),
        })
    }
}

/// Validate one crossover frequency against the render sample rate.
///
/// The frequency must lie strictly between 0 and Nyquist.
pub fn validate_crossover_frequency(frequency: f32, sample_rate: u32) -> ValidationResult<()> {
    let nyquist = f64::from(sample_rate) / 2.0;
    let value = f64::from(frequency);
    if frequency.is_finite() && value > 0.0 && value < nyquist {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            param: "crossover.frequencies".to_string(),
            value,
            min: 0.0,
            max: nyquist,
        })
    }
}

/// Validate a speaker role name.
pub fn validate_role(name: &str) -> ValidationResult<SpeakerRole> {
    name.parse()
        .map_err(|_| ValidationError::UnknownRole(name.to_string()))
}

fn validate_speakers(config: &RenderConfig, errors: &mut Vec<ValidationError>) {
    let speakers = &config.speakers;
    match (&speakers.layout, speakers.custom.is_empty()) {
        (Some(_), false) => errors.push(ValidationError::InvalidSpeakerLayout(
            "set either 'layout' or 'custom', not both".to_string(),
        )),
        (None, true) => errors.push(ValidationError::InvalidSpeakerLayout(
            "no speakers: set 'layout' or add 'custom' entries".to_string(),
        )),
        (Some(layout), true) => {
            if SpeakerConfiguration::preset(layout).is_none() {
                errors.push(ValidationError::UnknownLayout(layout.clone()));
            }
        }
        (None, false) => {
            for (index, entry) in speakers.custom.iter().enumerate() {
                if let Err(e) = validate_role(&entry.role) {
                    errors.push(e);
                }
                let [x, z] = entry.direction;
                if !(x.is_finite() && z.is_finite()) || x * x + z * z < 1e-12 {
                    errors.push(ValidationError::InvalidSpeakerLayout(format!(
                        "speaker {index} has no direction"
                    )));
                }
            }
        }
    }
}

fn validate_channel_map(config: &RenderConfig, errors: &mut Vec<ValidationError>) {
    let mut inputs = HashSet::new();
    let mut outputs = HashSet::new();
    for mapping in &config.channel_map {
        if !inputs.insert(mapping.input) {
            errors.push(ValidationError::DuplicateMapping {
                side: "input",
                channel: mapping.input,
            });
        }
        if !outputs.insert(mapping.output) {
            errors.push(ValidationError::DuplicateMapping {
                side: "output",
                channel: mapping.output,
            });
        }
    }
}

/// Validate a whole render configuration.
///
/// Returns the single error if there is one, or
/// [`ValidationError::Multiple`] listing all of them.
pub fn validate_config(config: &RenderConfig) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if let Err(e) = validate_sample_rate(config.sample_rate) {
        errors.push(e);
    }

    for &frequency in &config.crossover.frequencies {
        if let Err(e) = validate_crossover_frequency(frequency, config.sample_rate) {
            errors.push(e);
        }
    }

    validate_speakers(config, &mut errors);
    validate_channel_map(config, &mut errors);

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}
