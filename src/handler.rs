//! Sensor parameter handler.
//!
//! Reads a sensor's parameters from a [`ParamStore`] and applies them to a
//! sensor node. Parameters missing from the store are declared with their
//! defaults, so after a configuration pass the store holds the complete set
//! of values that was applied.

use std::fmt;

use log::{info, warn};

use crate::control::{CameraControl, ControlRequest, MONO_EXPOSURE_US};
use crate::options::{
    lookup, BoardSocket, COLOR_RESOLUTIONS, FRAME_SYNC_MODES, IMAGE_ORIENTATIONS,
    MONO_RESOLUTIONS,
};
use crate::params::{ParamStore, ParamType};
use crate::resolution::{resolve, SensorProfile};
use crate::runtime::{runtime_control, RuntimeConfig, RuntimeControl, SensorIdentity};
use crate::scale::{compute_scaled_dimensions, Dimensions, ScaleFraction};
use crate::traits::{ColorSensorNode, ConfigError, MonoSensorNode, Result, SensorNode};

/// Applies stored parameters to one named sensor.
pub struct SensorParamHandler<S> {
    store: S,
    name: String,
    identity: Option<SensorIdentity>,
}

impl<S: ParamStore> SensorParamHandler<S> {
    /// Create a handler for the sensor called `name`.
    ///
    /// The name is the key prefix of the sensor's parameters and selects its
    /// runtime configuration group.
    pub fn new(store: S, name: &str) -> Self {
        Self {
            store,
            name: name.to_owned(),
            identity: SensorIdentity::from_name(name),
        }
    }

    /// Sensor name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runtime identity, or `None` if the name matches no configuration group.
    #[must_use]
    pub const fn identity(&self) -> Option<SensorIdentity> {
        self.identity
    }

    /// Underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Give back the store.
    pub fn into_store(self) -> S {
        self.store
    }

    fn full_name(&self, name: &str) -> String {
        format!("{}_{name}", self.name)
    }

    /// Read a parameter, declaring `default` if it is not set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParamType`] if the stored value cannot be read as `T`.
    pub fn get_param<T: ParamType>(&mut self, name: &str, default: T) -> Result<T> {
        let key = self.full_name(name);
        if let Some(value) = self.store.value(&key) {
            return T::from_param(value).ok_or_else(|| ConfigError::ParamType {
                key: key.clone(),
                expected: T::KIND,
                found: value.kind(),
            });
        }
        self.store.set_value(&key, default.to_param());
        Ok(default)
    }

    /// Overwrite a parameter.
    pub fn set_param<T: ParamType>(&mut self, name: &str, value: &T) {
        let key = self.full_name(name);
        self.store.set_value(&key, value.to_param());
    }

    /// Like [`Self::get_param`], and log the value in effect.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParamType`] if the stored value cannot be read as `T`.
    pub fn declare_and_log_param<T: ParamType + fmt::Debug>(
        &mut self,
        name: &str,
        default: T,
    ) -> Result<T> {
        let value = self.get_param(name, default)?;
        info!("{}: {value:?}", self.full_name(name));
        Ok(value)
    }

    /// Configure a mono sensor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownOption`] for an unknown `i_resolution`,
    /// a [`ConfigError::ParamType`] for mistyped parameters, or any error
    /// reported by the node.
    pub fn declare_mono_params<N: MonoSensorNode>(
        &mut self,
        node: &mut N,
        socket: BoardSocket,
        publish: bool,
    ) -> Result<()> {
        self.get_param("i_max_q_size", 30_i64)?;
        self.get_param("i_publish_topic", publish)?;
        self.get_param("i_board_socket_id", socket.id())?;

        node.set_board_socket(socket)?;
        node.set_fps(self.get_param("i_fps", 30.0)?)?;

        let label: String = self.get_param("i_resolution", "720".to_owned())?;
        let resolution = lookup("i_resolution", MONO_RESOLUTIONS, &label)?;
        node.set_mono_resolution(resolution)?;

        let size = resolution.dimensions();
        self.get_param("i_width", size.width)?;
        self.get_param("i_height", size.height)?;

        let iso = self.get_param("r_iso", 800_u32)?;
        let exposure_default = self.identity.map_or(MONO_EXPOSURE_US, |identity| {
            ControlRequest::defaults_for(identity).exposure_time_us
        });
        let exposure = self.get_param("r_exposure", exposure_default)?;
        if self.get_param("r_set_man_exposure", false)? {
            let mut ctrl = CameraControl::default();
            ctrl.set_manual_exposure(exposure, iso);
            node.set_initial_control(&ctrl)?;
        }

        Ok(())
    }

    /// Configure a color sensor and return the video size it will output.
    ///
    /// An unsupported `i_resolution` is replaced by the sensor default with a
    /// warning. With `i_set_isp_scale` on, the ISP output size is derived from
    /// `i_isp_num`/`i_isp_den` and checked against `i_preview_size`; with
    /// `i_output_isp` on, that size is written back to `i_width`/`i_height`.
    ///
    /// Settings are applied as they are read. When an error aborts the pass,
    /// everything applied before it stays applied on the node.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Scale`] if the scaled size is below the preview
    /// size or the fraction is invalid, [`ConfigError::UnknownOption`] for
    /// labels missing from the option tables, [`ConfigError::ParamType`] for
    /// mistyped parameters, or any error reported by the node.
    pub fn declare_color_params<N: ColorSensorNode>(
        &mut self,
        node: &mut N,
        socket: BoardSocket,
        sensor: &SensorProfile,
        publish: bool,
    ) -> Result<Dimensions> {
        self.get_param("i_max_q_size", 30_i64)?;
        self.get_param("i_publish_topic", publish)?;
        self.get_param("i_enable_preview", false)?;
        self.get_param("i_board_socket_id", socket.id())?;

        node.set_board_socket(socket)?;
        node.set_fps(self.get_param("i_fps", 30.0)?)?;

        let preview_size: u32 = self.get_param("i_preview_size", 300)?;
        self.get_param("i_preview_width", preview_size)?;
        self.get_param("i_preview_height", preview_size)?;

        let requested: String = self.get_param("i_resolution", sensor.default_resolution.clone())?;
        let resolved = resolve(&requested, sensor);
        if resolved.used_fallback {
            warn!(
                "Resolution {requested} not supported by sensor {}. Using default resolution {}",
                sensor.name, resolved.resolution
            );
        }
        node.set_color_resolution(lookup(
            "i_resolution",
            COLOR_RESOLUTIONS,
            &resolved.resolution,
        )?)?;
        let native = node.resolution_size();

        node.set_interleaved(self.get_param("i_interleaved", false)?)?;

        let output = if self.get_param("i_set_isp_scale", true)? {
            let scale = ScaleFraction::from_params(
                self.get_param("i_isp_num", 2_i64)?,
                self.get_param("i_isp_den", 3_i64)?,
            )?;
            let scaled = compute_scaled_dimensions(native, scale, preview_size, true)?;
            node.set_isp_scale(scale)?;
            for warning in &scaled.warnings {
                warn!("{warning}");
            }
            scaled.dimensions
        } else {
            native
        };

        if self.get_param("i_output_isp", true)? {
            self.set_param("i_width", &output.width);
            self.set_param("i_height", &output.height);
        }
        let video = Dimensions::new(
            self.get_param("i_width", output.width)?,
            self.get_param("i_height", output.height)?,
        );
        node.set_video_size(video)?;

        node.set_preview_keep_aspect_ratio(self.get_param("i_keep_preview_aspect_ratio", true)?)?;

        let mut initial = ControlRequest::from_params(self)?.manual_overrides();
        if self.declare_and_log_param("i_fsync_continuous", false)? {
            let mode: String = self.declare_and_log_param("i_fsync_mode", "INPUT".to_owned())?;
            initial.set_frame_sync_mode(lookup("i_fsync_mode", FRAME_SYNC_MODES, &mode)?);
        }
        if self.declare_and_log_param("i_fsync_trigger", false)? {
            initial.set_external_trigger(
                self.declare_and_log_param("i_num_frames_burst", 1_u32)?,
                self.declare_and_log_param("i_num_frames_discard", 0_u32)?,
            );
        }
        if !initial.is_empty() {
            node.set_initial_control(&initial)?;
        }

        if self.declare_and_log_param("i_set_isp3a_fps", false)? {
            node.set_isp3a_fps(self.declare_and_log_param("i_isp3a_fps", 10_u32)?)?;
        }

        let orientation: String =
            self.declare_and_log_param("i_sensor_img_orientation", "NORMAL".to_owned())?;
        node.set_image_orientation(lookup(
            "i_sensor_img_orientation",
            IMAGE_ORIENTATIONS,
            &orientation,
        )?)?;

        Ok(video)
    }

    /// Build the runtime control for this sensor from a runtime configuration.
    #[must_use]
    pub fn runtime_control(&self, config: &RuntimeConfig) -> RuntimeControl {
        runtime_control(self.identity, &self.name, config)
    }

    /// Send the runtime control for this sensor to `node`.
    ///
    /// Returns `false` without touching the node if the sensor has no
    /// configuration group.
    ///
    /// # Errors
    ///
    /// Returns any error reported by the node.
    pub fn apply_runtime_params<N: SensorNode>(
        &self,
        node: &mut N,
        config: &RuntimeConfig,
    ) -> Result<bool> {
        match self.runtime_control(config) {
            RuntimeControl::Apply(ctrl) => {
                node.send_control(&ctrl)?;
                Ok(true)
            }
            RuntimeControl::UnknownIdentity(name) => {
                warn!("No runtime parameters for sensor {name}");
                Ok(false)
            }
        }
    }
}
