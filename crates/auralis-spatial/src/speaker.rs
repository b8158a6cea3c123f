//! Loudspeaker layouts and pairwise amplitude panning.
//!
//! A [`SpeakerConfiguration`] holds speakers placed around the listener in
//! the horizontal plane. [`SpeakerConfiguration::spatialize`] turns a
//! direction into per-channel gains by finding the two speakers whose
//! azimuths bracket it and cross-fading between them with a raised-cosine
//! pan law whose gain pair is normalized to unit power.

use core::f32::consts::{PI, TAU};
use core::fmt;
use core::str::FromStr;
use std::sync::LazyLock;

use thiserror::Error;

use crate::gains::ChannelGainArray;
use crate::vector::{Vec2, Vec3};

/// What a speaker is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpeakerRole {
    /// Non-directional single speaker.
    Mono,
    /// Left of a stereo pair.
    Left,
    /// Right of a stereo pair.
    Right,
    /// Directly in front.
    Center,
    /// Front left of a surround layout.
    FrontLeft,
    /// Front right of a surround layout.
    FrontRight,
    /// Behind and to the left.
    BackLeft,
    /// Directly behind.
    BackCenter,
    /// Behind and to the right.
    BackRight,
    /// Beside the listener on the left.
    SideLeft,
    /// Beside the listener on the right.
    SideRight,
    /// Left headphone driver.
    HeadphoneLeft,
    /// Right headphone driver.
    HeadphoneRight,
    /// Low-frequency effects.
    Subwoofer,
    /// Unknown purpose.
    #[default]
    Undefined,
}

impl SpeakerRole {
    /// Every role, in declaration order.
    pub const ALL: [Self; 15] = [
        Self::Mono,
        Self::Left,
        Self::Right,
        Self::Center,
        Self::FrontLeft,
        Self::FrontRight,
        Self::BackLeft,
        Self::BackCenter,
        Self::BackRight,
        Self::SideLeft,
        Self::SideRight,
        Self::HeadphoneLeft,
        Self::HeadphoneRight,
        Self::Subwoofer,
        Self::Undefined,
    ];

    /// Stable lowercase name, as used in configuration files.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mono => "mono",
            Self::Left => "left",
            Self::Right => "right",
            Self::Center => "center",
            Self::FrontLeft => "front_left",
            Self::FrontRight => "front_right",
            Self::BackLeft => "back_left",
            Self::BackCenter => "back_center",
            Self::BackRight => "back_right",
            Self::SideLeft => "side_left",
            Self::SideRight => "side_right",
            Self::HeadphoneLeft => "headphone_left",
            Self::HeadphoneRight => "headphone_right",
            Self::Subwoofer => "subwoofer",
            Self::Undefined => "undefined",
        }
    }
}

impl fmt::Display for SpeakerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown speaker role name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown speaker role '{0}'")]
pub struct ParseRoleError(pub String);

impl FromStr for SpeakerRole {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseRoleError(s.to_string()))
    }
}

/// One loudspeaker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Speaker {
    /// Unit direction from the listener in the horizontal plane, or zero
    /// for a non-directional speaker.
    pub direction: Vec2,
    /// Output channel the speaker is wired to.
    pub channel: usize,
    /// What the speaker is for.
    pub role: SpeakerRole,
}

/// Two speakers adjacent in azimuth.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SpeakerPair {
    speakers: [usize; 2],
    /// Azimuths of the two speakers. The second exceeds `TAU` for the pair
    /// that wraps around.
    angles: [f32; 2],
}

/// A set of speakers around the listener.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeakerConfiguration {
    speakers: Vec<Speaker>,
    /// Adjacent pairs sorted by the first speaker's azimuth.
    pairs: Vec<SpeakerPair>,
    num_channels: usize,
}

impl SpeakerConfiguration {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a speaker and returns its index. `direction` is normalized.
    pub fn add_speaker(&mut self, direction: Vec2, channel: usize, role: SpeakerRole) -> usize {
        let index = self.speakers.len();
        self.speakers.push(Speaker {
            direction: direction.normalize(),
            channel,
            role,
        });
        self.update_pairs();
        self.update_num_channels();

        #[cfg(feature = "tracing")]
        tracing::debug!(index, channel, %role, "speakers: speaker added");
        index
    }

    /// Builder form of [`add_speaker`](Self::add_speaker).
    pub fn with_speaker(mut self, direction: Vec2, channel: usize, role: SpeakerRole) -> Self {
        self.add_speaker(direction, channel, role);
        self
    }

    /// Returns the number of speakers.
    pub fn num_speakers(&self) -> usize {
        self.speakers.len()
    }

    /// Returns one more than the highest channel any speaker uses.
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Returns the speaker at `index`.
    ///
    /// Panics if `index >= num_speakers()`.
    pub fn speaker(&self, index: usize) -> &Speaker {
        &self.speakers[index]
    }

    /// Returns all speakers in insertion order.
    pub fn speakers(&self) -> &[Speaker] {
        &self.speakers
    }

    /// Returns the direction of the speaker at `index` as `(x, 0, z)`.
    ///
    /// Panics if `index >= num_speakers()`.
    pub fn speaker_direction(&self, index: usize) -> Vec3 {
        Vec3::from(self.speakers[index].direction)
    }

    /// Moves the speaker at `index`. `direction` is normalized.
    ///
    /// Panics if `index >= num_speakers()`.
    pub fn set_speaker_direction(&mut self, index: usize, direction: Vec2) {
        self.speakers[index].direction = direction.normalize();
        self.update_pairs();
    }

    /// Returns the channel of the speaker at `index`.
    ///
    /// Panics if `index >= num_speakers()`.
    pub fn speaker_channel(&self, index: usize) -> usize {
        self.speakers[index].channel
    }

    /// Rewires the speaker at `index`.
    ///
    /// Panics if `index >= num_speakers()`.
    pub fn set_speaker_channel(&mut self, index: usize, channel: usize) {
        self.speakers[index].channel = channel;
        self.update_num_channels();
    }

    /// Returns the role of the speaker at `index`.
    ///
    /// Panics if `index >= num_speakers()`.
    pub fn speaker_role(&self, index: usize) -> SpeakerRole {
        self.speakers[index].role
    }

    /// Changes the role of the speaker at `index`.
    ///
    /// Panics if `index >= num_speakers()`.
    pub fn set_speaker_role(&mut self, index: usize, role: SpeakerRole) {
        self.speakers[index].role = role;
    }

    /// Removes every speaker.
    pub fn clear_speakers(&mut self) {
        self.speakers.clear();
        self.pairs.clear();
        self.num_channels = 0;
    }

    /// Computes the gain of every channel for a sound arriving from
    /// `direction`.
    ///
    /// `gains` is resized to [`num_channels`](Self::num_channels) (which
    /// zeroes it) or zeroed in place. Only the horizontal part of
    /// `direction` matters.
    pub fn spatialize(&self, direction: Vec3, gains: &mut ChannelGainArray) {
        if gains.num_channels() == self.num_channels {
            gains.zero();
        } else {
            gains.set_num_channels(self.num_channels);
        }

        match self.speakers.as_slice() {
            [] => {}
            [speaker] => gains.set_gain(speaker.channel, 1.0),
            _ => {
                let angle = direction.xz().azimuth();
                let (pair, t) = self.locate(angle);
                let (g0, g1) = pan_gains(t);

                for (index, gain) in pair.speakers.into_iter().zip([g0, g1]) {
                    let channel = self.speakers[index].channel;
                    let accumulated = gains.gain(channel).max(gain).min(1.0);
                    gains.set_gain(channel, accumulated);
                }
            }
        }
    }

    /// Finds the pair bracketing `angle` and the normalized position in it.
    fn locate(&self, angle: f32) -> (&SpeakerPair, f32) {
        let last = self.pairs.len() - 1;
        let index = self.pairs[..last]
            .iter()
            .position(|pair| angle >= pair.angles[0] && angle <= pair.angles[1])
            .unwrap_or(last);
        let pair = &self.pairs[index];

        let angle = if angle < pair.angles[0] { angle + TAU } else { angle };
        let span = pair.angles[1] - pair.angles[0];
        let t = if span > 0.0 {
            ((angle - pair.angles[0]) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        (pair, t)
    }

    fn update_pairs(&mut self) {
        self.pairs.clear();
        if self.speakers.len() < 2 {
            return;
        }

        let mut order: Vec<(usize, f32)> = self
            .speakers
            .iter()
            .enumerate()
            .map(|(i, speaker)| (i, speaker.direction.azimuth()))
            .collect();
        order.sort_by(|a, b| a.1.total_cmp(&b.1));

        let count = order.len();
        self.pairs = (0..count)
            .map(|i| {
                let (first, first_angle) = order[i];
                let (second, second_angle) = order[(i + 1) % count];
                let second_angle = if i + 1 == count { second_angle + TAU } else { second_angle };
                SpeakerPair {
                    speakers: [first, second],
                    angles: [first_angle, second_angle],
                }
            })
            .collect();
    }

    fn update_num_channels(&mut self) {
        self.num_channels = self
            .speakers
            .iter()
            .map(|speaker| speaker.channel + 1)
            .max()
            .unwrap_or(0);
    }
}

/// Unit-power gains for a position `t` in `[0, 1]` between two speakers.
fn pan_gains(t: f32) -> (f32, f32) {
    let pan = libm::cosf(PI * t);
    let (a, b) = if pan > 0.0 { (1.0, 1.0 - pan) } else { (1.0 + pan, 1.0) };
    let norm = libm::sqrtf(a * a + b * b);
    (a / norm, b / norm)
}

// ============================================================================
// Standard layouts
// ============================================================================

const FRONT_LEFT_30: Vec2 = Vec2::new(-0.5, -0.866_025_4);
const FRONT_RIGHT_30: Vec2 = Vec2::new(0.5, -0.866_025_4);
const FRONT_CENTER: Vec2 = Vec2::new(0.0, -1.0);
const LEFT_90: Vec2 = Vec2::new(-1.0, 0.0);
const RIGHT_90: Vec2 = Vec2::new(1.0, 0.0);

static MONO: LazyLock<SpeakerConfiguration> =
    LazyLock::new(|| SpeakerConfiguration::new().with_speaker(Vec2::ZERO, 0, SpeakerRole::Mono));

static STEREO: LazyLock<SpeakerConfiguration> = LazyLock::new(|| {
    SpeakerConfiguration::new()
        .with_speaker(LEFT_90, 0, SpeakerRole::Left)
        .with_speaker(RIGHT_90, 1, SpeakerRole::Right)
});

static HEADPHONES: LazyLock<SpeakerConfiguration> = LazyLock::new(|| {
    SpeakerConfiguration::new()
        .with_speaker(LEFT_90, 0, SpeakerRole::HeadphoneLeft)
        .with_speaker(RIGHT_90, 1, SpeakerRole::HeadphoneRight)
});

static QUAD: LazyLock<SpeakerConfiguration> = LazyLock::new(|| {
    SpeakerConfiguration::new()
        .with_speaker(Vec2::new(-1.0, -1.0), 0, SpeakerRole::FrontLeft)
        .with_speaker(Vec2::new(1.0, -1.0), 1, SpeakerRole::FrontRight)
        .with_speaker(Vec2::new(-1.0, 1.0), 2, SpeakerRole::BackLeft)
        .with_speaker(Vec2::new(1.0, 1.0), 3, SpeakerRole::BackRight)
});

// Channel 3 is left to the LFE feed in both surround layouts.
static SURROUND_5_1: LazyLock<SpeakerConfiguration> = LazyLock::new(|| {
    SpeakerConfiguration::new()
        .with_speaker(FRONT_LEFT_30, 0, SpeakerRole::FrontLeft)
        .with_speaker(FRONT_RIGHT_30, 1, SpeakerRole::FrontRight)
        .with_speaker(FRONT_CENTER, 2, SpeakerRole::Center)
        .with_speaker(Vec2::new(-0.939_693, 0.342_02), 4, SpeakerRole::BackLeft)
        .with_speaker(Vec2::new(0.939_693, 0.342_02), 5, SpeakerRole::BackRight)
});

static SURROUND_7_1: LazyLock<SpeakerConfiguration> = LazyLock::new(|| {
    SpeakerConfiguration::new()
        .with_speaker(FRONT_LEFT_30, 0, SpeakerRole::FrontLeft)
        .with_speaker(FRONT_RIGHT_30, 1, SpeakerRole::FrontRight)
        .with_speaker(FRONT_CENTER, 2, SpeakerRole::Center)
        .with_speaker(Vec2::new(-0.707_106_8, 0.707_106_8), 4, SpeakerRole::BackLeft)
        .with_speaker(Vec2::new(0.707_106_8, 0.707_106_8), 5, SpeakerRole::BackRight)
        .with_speaker(LEFT_90, 6, SpeakerRole::SideLeft)
        .with_speaker(RIGHT_90, 7, SpeakerRole::SideRight)
});

impl SpeakerConfiguration {
    /// One non-directional speaker on channel 0.
    pub fn mono() -> &'static Self {
        &MONO
    }

    /// Left and right at ±90° on channels 0 and 1.
    pub fn stereo() -> &'static Self {
        &STEREO
    }

    /// Headphone drivers at ±90° on channels 0 and 1.
    pub fn headphones() -> &'static Self {
        &HEADPHONES
    }

    /// Four corner speakers at ±45° and ±135° on channels 0 to 3.
    pub fn quad() -> &'static Self {
        &QUAD
    }

    /// ITU 5.1: fronts at ±30°, center, surrounds at ±110°.
    ///
    /// Channels follow the usual order `L R C LFE Ls Rs`; the LFE channel
    /// has no speaker here and receives no panned signal.
    pub fn surround_5_1() -> &'static Self {
        &SURROUND_5_1
    }

    /// 7.1: fronts at ±30°, center, backs at ±135°, sides at ±90°.
    ///
    /// Channels follow `L R C LFE Lb Rb Ls Rs`.
    pub fn surround_7_1() -> &'static Self {
        &SURROUND_7_1
    }

    /// Looks up a standard layout by its configuration name.
    pub fn preset(name: &str) -> Option<&'static Self> {
        match name {
            "mono" => Some(Self::mono()),
            "stereo" => Some(Self::stereo()),
            "headphones" => Some(Self::headphones()),
            "quad" => Some(Self::quad()),
            "surround_5_1" => Some(Self::surround_5_1()),
            "surround_7_1" => Some(Self::surround_7_1()),
            _ => None,
        }
    }

    /// Names accepted by [`preset`](Self::preset).
    pub const PRESET_NAMES: [&'static str; 6] =
        ["mono", "stereo", "headphones", "quad", "surround_5_1", "surround_7_1"];
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::FRAC_1_SQRT_2;

    fn gains_for(config: &SpeakerConfiguration, direction: Vec3) -> ChannelGainArray {
        let mut gains = ChannelGainArray::default();
        config.spatialize(direction, &mut gains);
        gains
    }

    #[test]
    fn test_empty_configuration_is_silent() {
        let config = SpeakerConfiguration::new();
        let mut gains = ChannelGainArray::new(3);
        gains.set_all(1.0);
        config.spatialize(Vec3::FORWARD, &mut gains);
        assert_eq!(gains.num_channels(), 0);
    }

    #[test]
    fn test_mono_is_unity_everywhere() {
        for direction in [Vec3::FORWARD, Vec3::new(1.0, 0.0, 0.0), Vec3::UP] {
            assert_eq!(gains_for(SpeakerConfiguration::mono(), direction).as_slice(), &[1.0]);
        }
    }

    #[test]
    fn test_stereo_front_is_centered() {
        let gains = gains_for(SpeakerConfiguration::stereo(), Vec3::FORWARD);
        assert!((gains.gain(0) - FRAC_1_SQRT_2).abs() < 1e-6);
        assert!((gains.gain(1) - FRAC_1_SQRT_2).abs() < 1e-6);
        assert!((gains.power() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_stereo_hard_pan() {
        let right = gains_for(SpeakerConfiguration::stereo(), Vec3::new(1.0, 0.0, 0.0));
        assert!((right.gain(1) - 1.0).abs() < 1e-6);
        assert!(right.gain(0).abs() < 1e-6);

        let left = gains_for(SpeakerConfiguration::stereo(), Vec3::new(-1.0, 0.0, 0.0));
        assert!((left.gain(0) - 1.0).abs() < 1e-6);
        assert!(left.gain(1).abs() < 1e-6);
    }

    #[test]
    fn test_behind_pans_through_wrapping_pair() {
        let gains = gains_for(SpeakerConfiguration::stereo(), Vec3::new(0.0, 0.0, 1.0));
        assert!((gains.gain(0) - gains.gain(1)).abs() < 1e-6);
        assert!((gains.power() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_surround_center_hits_center_speaker() {
        let gains = gains_for(SpeakerConfiguration::surround_5_1(), Vec3::FORWARD);
        assert_eq!(gains.num_channels(), 6);
        assert!((gains.gain(2) - 1.0).abs() < 1e-5);
        for channel in [0, 1, 3, 4, 5] {
            assert!(gains.gain(channel).abs() < 1e-5, "channel {channel}: {}", gains.gain(channel));
        }
    }

    #[test]
    fn test_shared_channel_takes_larger_gain() {
        let config = SpeakerConfiguration::new()
            .with_speaker(Vec2::new(-1.0, 0.0), 0, SpeakerRole::Left)
            .with_speaker(Vec2::new(0.0, -1.0), 0, SpeakerRole::Center)
            .with_speaker(Vec2::new(1.0, 0.0), 1, SpeakerRole::Right);
        assert_eq!(config.num_channels(), 2);
        let gains = gains_for(&config, Vec3::new(-1.0, 0.0, -1.0));
        assert!(gains.gain(0) <= 1.0);
        assert!((gains.gain(0) - FRAC_1_SQRT_2).abs() < 1e-5);
        assert_eq!(gains.gain(1), 0.0);
    }

    #[test]
    fn test_edits_update_derived_state() {
        let mut config = SpeakerConfiguration::stereo().clone();
        config.set_speaker_channel(1, 5);
        assert_eq!(config.num_channels(), 6);
        config.set_speaker_direction(0, Vec2::new(0.0, -3.0));
        assert_eq!(config.speaker_direction(0), Vec3::new(0.0, 0.0, -1.0));
        let gains = gains_for(&config, Vec3::FORWARD);
        assert!((gains.gain(0) - 1.0).abs() < 1e-6);
        config.set_speaker_role(0, SpeakerRole::Center);
        assert_eq!(config.speaker_role(0), SpeakerRole::Center);
        config.clear_speakers();
        assert_eq!(config.num_channels(), 0);
        assert_eq!(config.num_speakers(), 0);
    }

    #[test]
    fn test_presets() {
        assert_eq!(SpeakerConfiguration::quad().num_channels(), 4);
        assert_eq!(SpeakerConfiguration::surround_7_1().num_channels(), 8);
        assert_eq!(SpeakerConfiguration::headphones().speaker_role(0), SpeakerRole::HeadphoneLeft);
        for name in SpeakerConfiguration::PRESET_NAMES {
            assert!(SpeakerConfiguration::preset(name).is_some(), "{name}");
        }
        assert!(SpeakerConfiguration::preset("dolby_atmos").is_none());
    }

    #[test]
    fn test_role_names_round_trip() {
        for role in SpeakerRole::ALL {
            assert_eq!(role.name().parse::<SpeakerRole>(), Ok(role));
        }
        assert_eq!("FRONT_LEFT".parse::<SpeakerRole>(), Ok(SpeakerRole::FrontLeft));
        assert!("tweeter".parse::<SpeakerRole>().is_err());
    }
}
