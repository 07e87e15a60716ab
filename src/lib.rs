//! Cam-Sensor-Config: camera sensor parameter translation
//!
//! This library turns named sensor parameters into validated device settings
//! and control commands. Sensor nodes are reached through traits, so the same
//! configuration pass drives a V4L2 camera in production and a recording mock
//! in tests.

pub mod control;
pub mod device;
pub mod handler;
pub mod options;
pub mod params;
pub mod resolution;
pub mod runtime;
pub mod scale;
pub mod traits;

#[cfg(test)]
pub mod mock;

pub use control::{build_control, CameraControl, ControlRequest};
pub use device::V4L2Device;
pub use handler::SensorParamHandler;
pub use options::BoardSocket;
pub use params::{MemoryParamStore, ParamStore, ParamValue};
pub use resolution::{find_sensor, resolve, SensorProfile};
pub use runtime::{RuntimeConfig, RuntimeControl, SensorIdentity};
pub use scale::{compute_scaled_dimensions, Dimensions, ScaleError, ScaleFraction};
pub use traits::{ColorSensorNode, ConfigError, MonoSensorNode, SensorNode};
