//! Sensor profiles and resolution fallback.

use std::collections::BTreeSet;

use serde::Deserialize;

/// What a sensor model supports.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SensorProfile {
    /// Sensor model name, e.g. `IMX378`.
    pub name: String,
    /// Resolution used when the requested one is not supported.
    pub default_resolution: String,
    /// Resolution labels the sensor accepts.
    pub allowed_resolutions: BTreeSet<String>,
    /// Whether the sensor delivers color frames.
    #[serde(default)]
    pub color: bool,
}

impl SensorProfile {
    /// Create a profile.
    pub fn new<I, S>(name: &str, default_resolution: &str, allowed: I, color: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_owned(),
            default_resolution: default_resolution.to_owned(),
            allowed_resolutions: allowed.into_iter().map(Into::into).collect(),
            color,
        }
    }

    /// Whether `resolution` is in the allowed set.
    #[must_use]
    pub fn supports(&self, resolution: &str) -> bool {
        self.allowed_resolutions.contains(resolution)
    }
}

/// Outcome of [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResolution {
    /// Resolution to apply.
    pub resolution: String,
    /// True if the request was replaced by the profile default.
    pub used_fallback: bool,
}

/// Pick the resolution to apply for `requested` on a sensor.
///
/// Unsupported requests are not an error: the profile default is returned
/// with `used_fallback` set, and the caller reports the substitution.
#[must_use]
pub fn resolve(requested: &str, profile: &SensorProfile) -> ResolvedResolution {
    if profile.supports(requested) {
        ResolvedResolution {
            resolution: requested.to_owned(),
            used_fallback: false,
        }
    } else {
        ResolvedResolution {
            resolution: profile.default_resolution.clone(),
            used_fallback: true,
        }
    }
}

/// Known sensor models: name, default resolution, allowed resolutions, color.
const KNOWN_SENSORS: &[(&str, &str, &[&str], bool)] = &[
    ("IMX378", "1080p", &["12mp", "4k", "1080p"], true),
    ("OV9282", "800p", &["800p", "720p", "400p"], false),
    ("OV9782", "800p", &["800p", "720p"], true),
    ("OV9281", "800p", &["800p", "720p"], true),
    ("IMX214", "1080p", &["13mp", "12mp", "4k", "1080p"], true),
    ("IMX412", "1080p", &["13mp", "12mp", "4k", "1080p"], true),
    ("OV7750", "480p", &["480p", "400p"], false),
    ("OV7251", "480p", &["480p", "400p"], false),
    ("IMX477", "1080p", &["12mp", "4k", "1080p"], true),
    ("IMX577", "1080p", &["12mp", "4k", "1080p"], true),
    ("AR0234", "1200p", &["1200p"], true),
    ("IMX582", "4k", &["48mp", "12mp", "4k"], true),
    ("LCM48", "4k", &["48mp", "12mp", "4k"], true),
];

/// Profiles for all known sensor models.
#[must_use]
pub fn known_sensors() -> Vec<SensorProfile> {
    KNOWN_SENSORS
        .iter()
        .map(|(name, default, allowed, color)| {
            SensorProfile::new(name, default, allowed.iter().copied(), *color)
        })
        .collect()
}

/// Look up a known sensor model by name, ignoring case.
#[must_use]
pub fn find_sensor(name: &str) -> Option<SensorProfile> {
    known_sensors()
        .into_iter()
        .find(|profile| profile.name.eq_ignore_ascii_case(name))
}
