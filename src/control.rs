//! Camera control commands and the runtime control builder.

use serde::Deserialize;

use crate::handler::SensorParamHandler;
use crate::options::FrameSyncMode;
use crate::params::ParamStore;
use crate::runtime::SensorIdentity;
use crate::traits::Result;

/// Default exposure time of the color sensor, in microseconds.
pub const COLOR_EXPOSURE_US: u32 = 20_000;
/// Default exposure time of the mono sensors, in microseconds.
pub const MONO_EXPOSURE_US: u32 = 1000;

/// Auto-focus algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoFocusMode {
    /// Single sweep on request.
    Auto,
    /// Continuous focus tuned for video.
    ContinuousVideo,
    /// Continuous focus tuned for stills.
    ContinuousPicture,
}

/// Auto white balance algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoWhiteBalanceMode {
    /// Automatic.
    Auto,
    /// Daylight preset.
    Daylight,
}

/// Exposure part of a control command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExposureSetting {
    /// Let the device run auto exposure.
    Auto,
    /// Fixed exposure time and sensitivity.
    Manual {
        /// Exposure time in microseconds.
        exposure_time_us: u32,
        /// Sensor sensitivity.
        iso: u32,
    },
}

/// Focus part of a control command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusSetting {
    /// Auto focus with the given algorithm.
    Auto(AutoFocusMode),
    /// Fixed lens position.
    Manual(u32),
}

/// White balance part of a control command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhiteBalanceSetting {
    /// Auto white balance with the given algorithm.
    Auto(AutoWhiteBalanceMode),
    /// Fixed color temperature in Kelvin.
    Manual(u32),
}

/// External trigger configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalTrigger {
    /// Frames captured per trigger pulse.
    pub num_frames_burst: u32,
    /// Frames discarded before the burst.
    pub num_frames_discard: u32,
}

/// A control command for one sensor. Unset parts leave the device untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CameraControl {
    /// Exposure setting.
    pub exposure: Option<ExposureSetting>,
    /// Focus setting.
    pub focus: Option<FocusSetting>,
    /// White balance setting.
    pub white_balance: Option<WhiteBalanceSetting>,
    /// Frame sync mode.
    pub frame_sync: Option<FrameSyncMode>,
    /// External trigger.
    pub external_trigger: Option<ExternalTrigger>,
}

impl CameraControl {
    /// Request a fixed exposure.
    pub fn set_manual_exposure(&mut self, exposure_time_us: u32, iso: u32) -> &mut Self {
        self.exposure = Some(ExposureSetting::Manual {
            exposure_time_us,
            iso,
        });
        self
    }

    /// Request auto exposure.
    pub fn set_auto_exposure_enable(&mut self) -> &mut Self {
        self.exposure = Some(ExposureSetting::Auto);
        self
    }

    /// Request a fixed lens position.
    pub fn set_manual_focus(&mut self, position: u32) -> &mut Self {
        self.focus = Some(FocusSetting::Manual(position));
        self
    }

    /// Request auto focus.
    pub fn set_auto_focus_mode(&mut self, mode: AutoFocusMode) -> &mut Self {
        self.focus = Some(FocusSetting::Auto(mode));
        self
    }

    /// Request a fixed white balance.
    pub fn set_manual_white_balance(&mut self, kelvin: u32) -> &mut Self {
        self.white_balance = Some(WhiteBalanceSetting::Manual(kelvin));
        self
    }

    /// Request auto white balance.
    pub fn set_auto_white_balance_mode(&mut self, mode: AutoWhiteBalanceMode) -> &mut Self {
        self.white_balance = Some(WhiteBalanceSetting::Auto(mode));
        self
    }

    /// Request a frame sync mode.
    pub fn set_frame_sync_mode(&mut self, mode: FrameSyncMode) -> &mut Self {
        self.frame_sync = Some(mode);
        self
    }

    /// Request external triggering.
    pub fn set_external_trigger(
        &mut self,
        num_frames_burst: u32,
        num_frames_discard: u32,
    ) -> &mut Self {
        self.external_trigger = Some(ExternalTrigger {
            num_frames_burst,
            num_frames_discard,
        });
        self
    }

    /// True if the command changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.exposure.is_none()
            && self.focus.is_none()
            && self.white_balance.is_none()
            && self.frame_sync.is_none()
            && self.external_trigger.is_none()
    }
}

/// Requested exposure, focus and white balance for one sensor.
///
/// Field names on disk follow the runtime parameter names (`r_exposure`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlRequest {
    /// Use `exposure_time_us` and `iso` instead of auto exposure.
    #[serde(rename = "r_set_man_exposure")]
    pub manual_exposure_enabled: bool,
    /// Exposure time in microseconds.
    #[serde(rename = "r_exposure")]
    pub exposure_time_us: u32,
    /// Sensor sensitivity.
    #[serde(rename = "r_iso")]
    pub iso: u32,
    /// Use `focus_position` instead of continuous auto focus.
    #[serde(rename = "r_set_man_focus")]
    pub manual_focus_enabled: bool,
    /// Lens position.
    #[serde(rename = "r_focus")]
    pub focus_position: u32,
    /// Use `white_balance_k` instead of auto white balance.
    #[serde(rename = "r_set_man_whitebalance")]
    pub manual_white_balance_enabled: bool,
    /// Color temperature in Kelvin.
    #[serde(rename = "r_whitebalance")]
    pub white_balance_k: u32,
}

impl Default for ControlRequest {
    fn default() -> Self {
        Self {
            manual_exposure_enabled: false,
            exposure_time_us: COLOR_EXPOSURE_US,
            iso: 800,
            manual_focus_enabled: false,
            focus_position: 1,
            manual_white_balance_enabled: false,
            white_balance_k: 3300,
        }
    }
}

impl ControlRequest {
    /// Defaults for the sensor with `identity`. Mono sensors default to a
    /// shorter exposure.
    #[must_use]
    pub fn defaults_for(identity: SensorIdentity) -> Self {
        let exposure_time_us = match identity {
            SensorIdentity::Rgb => COLOR_EXPOSURE_US,
            SensorIdentity::Left | SensorIdentity::Right => MONO_EXPOSURE_US,
        };
        Self {
            exposure_time_us,
            ..Self::default()
        }
    }

    /// Read the `r_*` parameters of a handler's group, declaring defaults
    /// for any that are missing.
    ///
    /// Defaults follow the handler's identity; a name with no identity gets
    /// the color defaults.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::ParamType`] if a stored value has the wrong type.
    pub fn from_params<S: ParamStore>(handler: &mut SensorParamHandler<S>) -> Result<Self> {
        let defaults = handler.identity().map_or_else(Self::default, Self::defaults_for);
        Ok(Self {
            manual_exposure_enabled: handler
                .get_param("r_set_man_exposure", defaults.manual_exposure_enabled)?,
            exposure_time_us: handler.get_param("r_exposure", defaults.exposure_time_us)?,
            iso: handler.get_param("r_iso", defaults.iso)?,
            manual_focus_enabled: handler
                .get_param("r_set_man_focus", defaults.manual_focus_enabled)?,
            focus_position: handler.get_param("r_focus", defaults.focus_position)?,
            manual_white_balance_enabled: handler
                .get_param("r_set_man_whitebalance", defaults.manual_white_balance_enabled)?,
            white_balance_k: handler.get_param("r_whitebalance", defaults.white_balance_k)?,
        })
    }

    /// Command holding only the parts switched to manual.
    ///
    /// Used for the initial control of a sensor, where anything not set
    /// manually stays at the device default.
    #[must_use]
    pub fn manual_overrides(&self) -> CameraControl {
        let mut ctrl = CameraControl::default();
        if self.manual_focus_enabled {
            ctrl.set_manual_focus(self.focus_position);
        }
        if self.manual_exposure_enabled {
            ctrl.set_manual_exposure(self.exposure_time_us, self.iso);
        }
        if self.manual_white_balance_enabled {
            ctrl.set_manual_white_balance(self.white_balance_k);
        }
        ctrl
    }
}

/// Build the full runtime control for a request.
///
/// Every part is set: manual values where the flag is on, the device's
/// continuous auto algorithm otherwise.
#[must_use]
pub fn build_control(request: &ControlRequest) -> CameraControl {
    let mut ctrl = CameraControl::default();

    if request.manual_exposure_enabled {
        ctrl.set_manual_exposure(request.exposure_time_us, request.iso);
    } else {
        ctrl.set_auto_exposure_enable();
    }

    if request.manual_focus_enabled {
        ctrl.set_manual_focus(request.focus_position);
    } else {
        ctrl.set_auto_focus_mode(AutoFocusMode::ContinuousPicture);
    }

    if request.manual_white_balance_enabled {
        ctrl.set_manual_white_balance(request.white_balance_k);
    } else {
        ctrl.set_auto_white_balance_mode(AutoWhiteBalanceMode::Auto);
    }

    ctrl
}
