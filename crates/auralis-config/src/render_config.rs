//! Render configuration file format and builders.

use serde::{Deserialize, Serialize};
use std::path::Path;

use auralis_core::{SharedOutput, SoundOutput};
use auralis_dsp::{Crossover, SoundMixer};
use auralis_spatial::{ChannelIOMap, SpeakerConfiguration, SpeakerRole, Vec2};

use crate::error::ConfigError;
use crate::validation::{ValidationError, validate_config};

/// Mixer settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MixerSection {
    /// Convert every input to the render sample rate (defaults to true).
    #[serde(default = "default_true")]
    pub sample_rate_conversion: bool,
}

impl Default for MixerSection {
    fn default() -> Self {
        Self {
            sample_rate_conversion: true,
        }
    }
}

/// Crossover settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CrossoverSection {
    /// Crossover frequencies in Hz, in any order. Empty means one band.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frequencies: Vec<f32>,
}

/// One speaker of a custom layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeakerEntry {
    /// Horizontal direction `[x, z]`; forward is `[0, -1]`.
    pub direction: [f32; 2],
    /// Output channel.
    pub channel: usize,
    /// Role name such as `"front_left"` (defaults to `"undefined"`).
    #[serde(default = "default_role")]
    pub role: String,
}

/// Speaker layout: a standard layout name or a custom speaker list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SpeakerSection {
    /// Standard layout name, see [`SpeakerConfiguration::PRESET_NAMES`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,

    /// Custom speakers, used when `layout` is absent.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom: Vec<SpeakerEntry>,
}

/// One explicit channel route.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelMapping {
    /// Logical (render) channel.
    pub input: usize,
    /// Device channel.
    pub output: usize,
}

/// Configuration of a render graph: mixer, crossover, speakers and
/// channel routing.
///
/// # TOML Format
///
/// ```toml
/// name = "Living Room 5.1"
/// description = "Surround with a subwoofer split"
/// sample_rate = 48000
///
/// [mixer]
/// sample_rate_conversion = true
///
/// [crossover]
/// frequencies = [120.0]
///
/// [speakers]
/// layout = "surround_5_1"
///
/// [[channel_map]]
/// input = 3
/// output = 5
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderConfig {
    /// Name of the configuration.
    pub name: String,

    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Render sample rate in Hz (defaults to 48000).
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Mixer settings.
    #[serde(default)]
    pub mixer: MixerSection,

    /// Crossover settings.
    #[serde(default)]
    pub crossover: CrossoverSection,

    /// Speaker layout.
    #[serde(default)]
    pub speakers: SpeakerSection,

    /// Explicit channel routes; unlisted channels route to themselves.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channel_map: Vec<ChannelMapping>,
}

fn default_sample_rate() -> u32 {
    48000
}

fn default_true() -> bool {
    true
}

fn default_role() -> String {
    SpeakerRole::Undefined.name().to_string()
}

impl RenderConfig {
    /// Create a stereo configuration at 48 kHz with no crossover.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            sample_rate: default_sample_rate(),
            mixer: MixerSection::default(),
            crossover: CrossoverSection::default(),
            speakers: SpeakerSection {
                layout: Some("stereo".to_string()),
                custom: Vec::new(),
            },
            channel_map: Vec::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the render sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Enable or disable mixer rate conversion.
    pub fn with_sample_rate_conversion(mut self, enabled: bool) -> Self {
        self.mixer.sample_rate_conversion = enabled;
        self
    }

    /// Add a crossover frequency.
    pub fn with_crossover_frequency(mut self, frequency: f32) -> Self {
        self.crossover.frequencies.push(frequency);
        self
    }

    /// Use a standard speaker layout, dropping any custom speakers.
    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.speakers.layout = Some(layout.into());
        self.speakers.custom.clear();
        self
    }

    /// Add a custom speaker, dropping any standard layout.
    pub fn with_speaker(mut self, direction: [f32; 2], channel: usize, role: SpeakerRole) -> Self {
        self.speakers.layout = None;
        self.speakers.custom.push(SpeakerEntry {
            direction,
            channel,
            role: role.name().to_string(),
        });
        self
    }

    /// Route render channel `input` to device channel `output`.
    pub fn with_channel_mapping(mut self, input: usize, output: usize) -> Self {
        self.channel_map.push(ChannelMapping { input, output });
        self
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every value against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Ok(validate_config(self)?)
    }

    /// Number of crossover bands this configuration renders.
    pub fn num_bands(&self) -> usize {
        self.crossover.frequencies.len() + 1
    }

    /// Build an empty mixer running at the configured rate.
    pub fn build_mixer(&self) -> Result<SoundMixer, ConfigError> {
        self.validate()?;
        let mut mixer = SoundMixer::new(self.sample_rate as f32);
        mixer.set_sample_rate_conversion_enabled(self.mixer.sample_rate_conversion);
        Ok(mixer)
    }

    /// Build a crossover reading from `input`.
    ///
    /// Fails if a frequency does not fit below the input's Nyquist
    /// frequency.
    pub fn build_crossover(&self, input: Option<SharedOutput>) -> Result<Crossover, ConfigError> {
        self.validate()?;
        let mut crossover = Crossover::with_input(input);
        for &frequency in &self.crossover.frequencies {
            if !crossover.add_crossover_frequency(frequency) {
                return Err(ValidationError::OutOfRange {
                    param: "crossover.frequencies".to_string(),
                    value: f64::from(frequency),
                    min: 0.0,
                    max: f64::from(crossover.sample_rate()) / 2.0,
                }
                .into());
            }
        }
        Ok(crossover)
    }

    /// Build the speaker layout.
    pub fn build_speakers(&self) -> Result<SpeakerConfiguration, ConfigError> {
        self.validate()?;

        if let Some(layout) = &self.speakers.layout {
            return SpeakerConfiguration::preset(layout)
                .cloned()
                .ok_or_else(|| ValidationError::UnknownLayout(layout.clone()).into());
        }

        let mut speakers = SpeakerConfiguration::new();
        for entry in &self.speakers.custom {
            let role = entry
                .role
                .parse::<SpeakerRole>()
                .map_err(|_| ValidationError::UnknownRole(entry.role.clone()))?;
            speakers.add_speaker(Vec2::from(entry.direction), entry.channel, role);
        }
        Ok(speakers)
    }

    /// Build the channel routing. Each entry is set in both directions.
    pub fn build_channel_map(&self) -> Result<ChannelIOMap, ConfigError> {
        self.validate()?;
        let mut map = ChannelIOMap::new();
        for mapping in &self.channel_map {
            map.set_mapping(mapping.input, mapping.output);
        }
        Ok(map)
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults() {
        let config = RenderConfig::new("Desk");
        assert_eq!(config.name, "Desk");
        assert!(config.description.is_none());
        assert_eq!(config.sample_rate, 48000);
        assert!(config.mixer.sample_rate_conversion);
        assert_eq!(config.speakers.layout.as_deref(), Some("stereo"));
        assert_eq!(config.num_bands(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = RenderConfig::new("Bi-amp")
            .with_description("Two-way")
            .with_sample_rate(96000)
            .with_crossover_frequency(2500.0)
            .with_layout("quad")
            .with_channel_mapping(0, 2)
            .with_sample_rate_conversion(false);

        assert_eq!(config.description.as_deref(), Some("Two-way"));
        assert_eq!(config.sample_rate, 96000);
        assert_eq!(config.crossover.frequencies, vec![2500.0]);
        assert_eq!(config.num_bands(), 2);
        assert_eq!(config.channel_map, vec![ChannelMapping { input: 0, output: 2 }]);
        assert!(!config.mixer.sample_rate_conversion);
    }

    #[test]
    fn test_custom_speakers_replace_layout() {
        let config = RenderConfig::new("Custom")
            .with_speaker([-1.0, 0.0], 0, SpeakerRole::Left)
            .with_speaker([1.0, 0.0], 1, SpeakerRole::Right);
        assert!(config.speakers.layout.is_none());
        assert_eq!(config.speakers.custom.len(), 2);

        let speakers = config.build_speakers().unwrap();
        assert_eq!(speakers.num_speakers(), 2);
        assert_eq!(speakers.speaker_role(1), SpeakerRole::Right);
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
name = "Theater"
description = "7.1 room"
sample_rate = 44100

[mixer]
sample_rate_conversion = false

[crossover]
frequencies = [2000.0, 120.0]

[speakers]
layout = "surround_7_1"

[[channel_map]]
input = 3
output = 7
"#;

        let config = RenderConfig::from_toml(toml).unwrap();
        assert_eq!(config.name, "Theater");
        assert_eq!(config.sample_rate, 44100);
        assert!(!config.mixer.sample_rate_conversion);
        assert_eq!(config.crossover.frequencies, vec![2000.0, 120.0]);
        assert_eq!(config.speakers.layout.as_deref(), Some("surround_7_1"));
        assert_eq!(config.channel_map[0], ChannelMapping { input: 3, output: 7 });

        let speakers = config.build_speakers().unwrap();
        assert_eq!(speakers.num_channels(), 8);

        let map = config.build_channel_map().unwrap();
        assert_eq!(map.output_for_input(3), Some(7));
        assert_eq!(map.input_for_output(7), Some(3));
    }

    #[test]
    fn test_minimal_toml() {
        let config = RenderConfig::from_toml("name = \"Minimal\"\n[speakers]\nlayout = \"mono\"\n").unwrap();
        assert_eq!(config.sample_rate, 48000);
        assert!(config.mixer.sample_rate_conversion);
        assert!(config.crossover.frequencies.is_empty());
        assert!(config.channel_map.is_empty());
    }

    #[test]
    fn test_custom_role_defaults_to_undefined() {
        let toml = r#"
name = "Custom"

[[speakers.custom]]
direction = [0.0, -1.0]
channel = 0
"#;
        let config = RenderConfig::from_toml(toml).unwrap();
        assert_eq!(config.speakers.custom[0].role, "undefined");
        let speakers = config.build_speakers().unwrap();
        assert_eq!(speakers.speaker_role(0), SpeakerRole::Undefined);
    }

    #[test]
    fn test_roundtrip() {
        let original = RenderConfig::new("Roundtrip")
            .with_description("Serialization")
            .with_sample_rate(88200)
            .with_crossover_frequency(300.0)
            .with_speaker([-0.5, -0.866], 0, SpeakerRole::FrontLeft)
            .with_speaker([0.5, -0.866], 1, SpeakerRole::FrontRight)
            .with_channel_mapping(1, 0);

        let toml = original.to_toml().unwrap();
        let parsed = RenderConfig::from_toml(&toml).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_build_mixer() {
        let mixer = RenderConfig::new("Mix")
            .with_sample_rate(44100)
            .with_sample_rate_conversion(false)
            .build_mixer()
            .unwrap();
        assert_eq!(mixer.sample_rate(), 44100.0);
        assert!(!mixer.is_sample_rate_conversion_enabled());
    }

    #[test]
    fn test_build_rejects_invalid() {
        let config = RenderConfig::new("Bad").with_crossover_frequency(30000.0);
        assert!(matches!(config.build_crossover(None), Err(ConfigError::Validation(_))));
        assert!(matches!(config.build_mixer(), Err(ConfigError::Validation(_))));
    }
}
