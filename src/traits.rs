//! Core traits and error type for configuring sensor nodes.

use thiserror::Error;

use crate::control::CameraControl;
use crate::options::{BoardSocket, ColorResolution, ImageOrientation, MonoResolution};
use crate::scale::{Dimensions, ScaleError, ScaleFraction};

/// Device capability flags.
#[derive(Debug, Clone, Default)]
pub struct DeviceCapabilities {
    /// Driver name.
    pub driver: String,
    /// Card/device name.
    pub card: String,
    /// Bus information.
    pub bus_info: String,
    /// Whether the device can capture video.
    pub can_capture: bool,
    /// Whether the device supports streaming.
    pub can_stream: bool,
}

/// Error type for sensor configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// ISP scaling cannot produce a usable output size.
    #[error(transparent)]
    Scale(#[from] ScaleError),
    /// A string option has no entry in its lookup table.
    #[error("unknown value '{value}' for {option}")]
    UnknownOption {
        /// Option name.
        option: &'static str,
        /// Rejected value.
        value: String,
    },
    /// A stored parameter has the wrong type.
    #[error("parameter {key} should be {expected}, found {found}")]
    ParamType {
        /// Full parameter key.
        key: String,
        /// Expected type.
        expected: &'static str,
        /// Stored type.
        found: &'static str,
    },
    /// A parameter file holds a value that is not a scalar.
    #[error("unsupported value for parameter {key}")]
    UnsupportedParam {
        /// Full parameter key.
        key: String,
    },
    /// The device rejected a setting.
    #[error("device error: {0}")]
    Device(String),
    /// Malformed TOML.
    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sensor configuration.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Settings shared by every sensor node.
pub trait SensorNode {
    /// Assign the board socket the sensor is attached to.
    fn set_board_socket(&mut self, socket: BoardSocket) -> Result<()>;

    /// Set the capture frame rate.
    fn set_fps(&mut self, fps: f64) -> Result<()>;

    /// Control applied when the sensor starts.
    fn set_initial_control(&mut self, control: &CameraControl) -> Result<()>;

    /// Send a control command to a running sensor.
    fn send_control(&mut self, control: &CameraControl) -> Result<()>;
}

/// A mono (grayscale) sensor node.
pub trait MonoSensorNode: SensorNode {
    /// Select the sensor resolution.
    fn set_mono_resolution(&mut self, resolution: MonoResolution) -> Result<()>;
}

/// A color sensor node with an ISP.
pub trait ColorSensorNode: SensorNode {
    /// Select the sensor resolution.
    fn set_color_resolution(&mut self, resolution: ColorResolution) -> Result<()>;

    /// Native size of the currently selected resolution.
    fn resolution_size(&self) -> Dimensions;

    /// Choose interleaved or planar output.
    fn set_interleaved(&mut self, interleaved: bool) -> Result<()>;

    /// Set the ISP downscale fraction.
    fn set_isp_scale(&mut self, scale: ScaleFraction) -> Result<()>;

    /// Set the video output size.
    fn set_video_size(&mut self, size: Dimensions) -> Result<()>;

    /// Keep aspect ratio when producing the preview.
    fn set_preview_keep_aspect_ratio(&mut self, keep: bool) -> Result<()>;

    /// Limit the rate of the auto exposure/focus/white balance loop.
    fn set_isp3a_fps(&mut self, fps: u32) -> Result<()>;

    /// Set the sensor image orientation.
    fn set_image_orientation(&mut self, orientation: ImageOrientation) -> Result<()>;
}
