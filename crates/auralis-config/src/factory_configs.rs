//! Render configurations bundled with the library.
//!
//! Each is embedded as TOML so it round-trips through the same parser as
//! user files.

use crate::RenderConfig;

/// Names of the factory configurations.
pub static FACTORY_CONFIG_NAMES: &[&str] = &[
    "stereo",
    "headphones",
    "quad",
    "surround_5_1",
    "surround_7_1_bi_amp",
];

static FACTORY_CONFIGS_TOML: &[(&str, &str)] = &[
    ("stereo", STEREO_CONFIG),
    ("headphones", HEADPHONES_CONFIG),
    ("quad", QUAD_CONFIG),
    ("surround_5_1", SURROUND_5_1_CONFIG),
    ("surround_7_1_bi_amp", SURROUND_7_1_BI_AMP_CONFIG),
];

const STEREO_CONFIG: &str = r#"
name = "Stereo"
description = "Two speakers, hard left and right"
sample_rate = 48000

[speakers]
layout = "stereo"
"#;

const HEADPHONES_CONFIG: &str = r#"
name = "Headphones"
description = "Headphone drivers on channels 0 and 1"
sample_rate = 48000

[speakers]
layout = "headphones"
"#;

const QUAD_CONFIG: &str = r#"
name = "Quad"
description = "Four corner speakers"
sample_rate = 48000

[speakers]
layout = "quad"
"#;

// Low band of the crossover feeds the subwoofer on channel 3.
const SURROUND_5_1_CONFIG: &str = r#"
name = "Surround 5.1"
description = "ITU 5.1 with a 120 Hz subwoofer split"
sample_rate = 48000

[crossover]
frequencies = [120.0]

[speakers]
layout = "surround_5_1"
"#;

const SURROUND_7_1_BI_AMP_CONFIG: &str = r#"
name = "Surround 7.1 Bi-Amp"
description = "7.1 with a two-way split for bi-amplified speakers"
sample_rate = 48000

[mixer]
sample_rate_conversion = true

[crossover]
frequencies = [2000.0]

[speakers]
layout = "surround_7_1"
"#;

/// Get all factory configurations.
///
/// # Example
///
/// ```rust
/// use auralis_config::factory_configs;
///
/// for config in factory_configs() {
///     println!("{}: {} bands", config.name, config.num_bands());
/// }
/// ```
pub fn factory_configs() -> Vec<RenderConfig> {
    FACTORY_CONFIGS_TOML
        .iter()
        .filter_map(|(_, toml)| RenderConfig::from_toml(toml).ok())
        .collect()
}

/// Get a factory configuration by key or display name, ignoring case.
///
/// ```rust
/// use auralis_config::get_factory_config;
///
/// let config = get_factory_config("Surround 5.1").unwrap();
/// assert_eq!(config.crossover.frequencies, vec![120.0]);
/// ```
pub fn get_factory_config(name: &str) -> Option<RenderConfig> {
    let name_lower = name.to_lowercase();

    if let Some((_, toml)) = FACTORY_CONFIGS_TOML
        .iter()
        .find(|(key, _)| key.to_lowercase() == name_lower)
    {
        return RenderConfig::from_toml(toml).ok();
    }

    factory_configs()
        .into_iter()
        .find(|config| config.name.to_lowercase() == name_lower)
}

/// Keys of the factory configurations.
pub fn factory_config_names() -> &'static [&'static str] {
    FACTORY_CONFIG_NAMES
}

/// Check whether `name` is a factory configuration key or display name.
pub fn is_factory_config(name: &str) -> bool {
    get_factory_config(name).is_some()
}
