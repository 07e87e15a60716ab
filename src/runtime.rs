//! Runtime reconfiguration: per-sensor control groups and identity dispatch.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::control::{build_control, CameraControl, ControlRequest};
use crate::handler::SensorParamHandler;
use crate::params::ParamStore;
use crate::traits::Result;

/// Which physical sensor a handler drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorIdentity {
    /// Color sensor.
    Rgb,
    /// Left mono sensor.
    Left,
    /// Right mono sensor.
    Right,
}

impl SensorIdentity {
    /// All identities.
    pub const ALL: [Self; 3] = [Self::Rgb, Self::Left, Self::Right];

    /// Name prefix of this identity's configuration group.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Rgb => "rgb",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Identity whose prefix equals `name`, if any.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.prefix() == name)
    }
}

impl fmt::Display for SensorIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Runtime control groups, one per sensor identity.
///
/// Keys missing from a group take that sensor's defaults. Unknown groups or
/// keys are rejected.
///
/// ```toml
/// [rgb]
/// r_set_man_exposure = true
/// r_exposure = 10000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RuntimeFile")]
pub struct RuntimeConfig {
    /// Color sensor group.
    pub rgb: ControlRequest,
    /// Left sensor group.
    pub left: ControlRequest,
    /// Right sensor group.
    pub right: ControlRequest,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeFile::default().into()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RuntimeFile {
    rgb: ControlGroup,
    left: ControlGroup,
    right: ControlGroup,
}

impl From<RuntimeFile> for RuntimeConfig {
    fn from(file: RuntimeFile) -> Self {
        Self {
            rgb: file.rgb.into_request(SensorIdentity::Rgb),
            left: file.left.into_request(SensorIdentity::Left),
            right: file.right.into_request(SensorIdentity::Right),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ControlGroup {
    r_set_man_exposure: Option<bool>,
    r_exposure: Option<u32>,
    r_iso: Option<u32>,
    r_set_man_focus: Option<bool>,
    r_focus: Option<u32>,
    r_set_man_whitebalance: Option<bool>,
    r_whitebalance: Option<u32>,
}

impl ControlGroup {
    fn into_request(self, identity: SensorIdentity) -> ControlRequest {
        let defaults = ControlRequest::defaults_for(identity);
        ControlRequest {
            manual_exposure_enabled: self
                .r_set_man_exposure
                .unwrap_or(defaults.manual_exposure_enabled),
            exposure_time_us: self.r_exposure.unwrap_or(defaults.exposure_time_us),
            iso: self.r_iso.unwrap_or(defaults.iso),
            manual_focus_enabled: self
                .r_set_man_focus
                .unwrap_or(defaults.manual_focus_enabled),
            focus_position: self.r_focus.unwrap_or(defaults.focus_position),
            manual_white_balance_enabled: self
                .r_set_man_whitebalance
                .unwrap_or(defaults.manual_white_balance_enabled),
            white_balance_k: self.r_whitebalance.unwrap_or(defaults.white_balance_k),
        }
    }
}

impl RuntimeConfig {
    /// Parse runtime groups from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::Toml`] on malformed input or unknown keys.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }

    /// Read runtime groups from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::Io`] if the file cannot be read.
    pub fn from_path(path: &Path) -> Result<Self> {
        let input = std::fs::read_to_string(path)?;
        Self::from_toml_str(&input)
    }

    /// Rebuild all groups from the `<prefix>_r_*` keys of a store.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::ParamType`] if a stored value has the wrong type.
    pub fn from_params<S: ParamStore>(store: S) -> Result<(Self, S)> {
        let mut handler = SensorParamHandler::new(store, SensorIdentity::Rgb.prefix());
        let rgb = ControlRequest::from_params(&mut handler)?;
        let mut handler =
            SensorParamHandler::new(handler.into_store(), SensorIdentity::Left.prefix());
        let left = ControlRequest::from_params(&mut handler)?;
        let mut handler =
            SensorParamHandler::new(handler.into_store(), SensorIdentity::Right.prefix());
        let right = ControlRequest::from_params(&mut handler)?;
        Ok((Self { rgb, left, right }, handler.into_store()))
    }

    /// Group belonging to `identity`.
    #[must_use]
    pub const fn group(&self, identity: SensorIdentity) -> &ControlRequest {
        match identity {
            SensorIdentity::Rgb => &self.rgb,
            SensorIdentity::Left => &self.left,
            SensorIdentity::Right => &self.right,
        }
    }
}

/// Result of mapping runtime configuration onto one sensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeControl {
    /// Command to send to the sensor.
    Apply(CameraControl),
    /// The handler's name matches no configuration group; nothing to send.
    UnknownIdentity(String),
}

/// Map a runtime configuration onto the sensor with `identity`.
#[must_use]
pub fn runtime_control(
    identity: Option<SensorIdentity>,
    name: &str,
    config: &RuntimeConfig,
) -> RuntimeControl {
    match identity {
        Some(identity) => RuntimeControl::Apply(build_control(config.group(identity))),
        None => RuntimeControl::UnknownIdentity(name.to_owned()),
    }
}
