//! V4L2 sensor node implementation using the v4l crate.

use std::collections::BTreeSet;

use log::{debug, warn};
use v4l::control::{Control, Value};
use v4l::video::capture::Parameters;
use v4l::video::Capture;
use v4l::Device;

use crate::control::{CameraControl, ExposureSetting, FocusSetting, WhiteBalanceSetting};
use crate::options::{BoardSocket, ColorResolution, ImageOrientation, MonoResolution};
use crate::scale::{Dimensions, ScaleFraction};
use crate::traits::{
    ColorSensorNode, ConfigError, DeviceCapabilities, MonoSensorNode, Result, SensorNode,
};

const CID_BASE: u32 = 0x0098_0900;
const CID_CAMERA_CLASS_BASE: u32 = 0x009a_0900;

/// `V4L2_CID_AUTO_WHITE_BALANCE`.
pub const CID_AUTO_WHITE_BALANCE: u32 = CID_BASE + 12;
/// `V4L2_CID_HFLIP`.
pub const CID_HFLIP: u32 = CID_BASE + 20;
/// `V4L2_CID_VFLIP`.
pub const CID_VFLIP: u32 = CID_BASE + 21;
/// `V4L2_CID_WHITE_BALANCE_TEMPERATURE`.
pub const CID_WHITE_BALANCE_TEMPERATURE: u32 = CID_BASE + 26;
/// `V4L2_CID_EXPOSURE_AUTO`.
pub const CID_EXPOSURE_AUTO: u32 = CID_CAMERA_CLASS_BASE + 1;
/// `V4L2_CID_EXPOSURE_ABSOLUTE`, in units of 100 µs.
pub const CID_EXPOSURE_ABSOLUTE: u32 = CID_CAMERA_CLASS_BASE + 2;
/// `V4L2_CID_FOCUS_ABSOLUTE`.
pub const CID_FOCUS_ABSOLUTE: u32 = CID_CAMERA_CLASS_BASE + 10;
/// `V4L2_CID_FOCUS_AUTO`.
pub const CID_FOCUS_AUTO: u32 = CID_CAMERA_CLASS_BASE + 12;
/// `V4L2_CID_ISO_SENSITIVITY`.
pub const CID_ISO_SENSITIVITY: u32 = CID_CAMERA_CLASS_BASE + 23;
/// `V4L2_CID_ISO_SENSITIVITY_AUTO`.
pub const CID_ISO_SENSITIVITY_AUTO: u32 = CID_CAMERA_CLASS_BASE + 24;

const EXPOSURE_MANUAL: i64 = 1;
const EXPOSURE_APERTURE_PRIORITY: i64 = 3;

/// Translate a control command into V4L2 control writes.
///
/// Auto-mode switches come before the values they gate, since most drivers
/// reject a manual value while the auto loop is on.
#[must_use]
pub fn v4l2_controls(control: &CameraControl) -> Vec<(u32, i64)> {
    let mut writes = Vec::new();

    match control.exposure {
        Some(ExposureSetting::Auto) => {
            writes.push((CID_EXPOSURE_AUTO, EXPOSURE_APERTURE_PRIORITY));
            writes.push((CID_ISO_SENSITIVITY_AUTO, 1));
        }
        Some(ExposureSetting::Manual {
            exposure_time_us,
            iso,
        }) => {
            writes.push((CID_EXPOSURE_AUTO, EXPOSURE_MANUAL));
            writes.push((
                CID_EXPOSURE_ABSOLUTE,
                i64::from(exposure_time_us.div_ceil(100).max(1)),
            ));
            writes.push((CID_ISO_SENSITIVITY_AUTO, 0));
            writes.push((CID_ISO_SENSITIVITY, i64::from(iso)));
        }
        None => {}
    }

    match control.focus {
        Some(FocusSetting::Auto(_)) => writes.push((CID_FOCUS_AUTO, 1)),
        Some(FocusSetting::Manual(position)) => {
            writes.push((CID_FOCUS_AUTO, 0));
            writes.push((CID_FOCUS_ABSOLUTE, i64::from(position)));
        }
        None => {}
    }

    match control.white_balance {
        Some(WhiteBalanceSetting::Auto(_)) => writes.push((CID_AUTO_WHITE_BALANCE, 1)),
        Some(WhiteBalanceSetting::Manual(kelvin)) => {
            writes.push((CID_AUTO_WHITE_BALANCE, 0));
            writes.push((CID_WHITE_BALANCE_TEMPERATURE, i64::from(kelvin)));
        }
        None => {}
    }

    writes
}

/// HFLIP/VFLIP values for an orientation, or `None` to leave them alone.
#[must_use]
pub const fn flip_controls(orientation: ImageOrientation) -> Option<(bool, bool)> {
    match orientation {
        ImageOrientation::Normal => Some((false, false)),
        ImageOrientation::Rotate180Deg => Some((true, true)),
        ImageOrientation::HorizontalMirror => Some((true, false)),
        ImageOrientation::VerticalFlip => Some((false, true)),
        ImageOrientation::Auto => None,
    }
}

/// Drop writes to controls the driver does not expose.
#[must_use]
pub fn supported_controls(
    writes: impl IntoIterator<Item = (u32, i64)>,
    supported: &BTreeSet<u32>,
) -> Vec<(u32, i64)> {
    writes
        .into_iter()
        .filter(|(id, value)| {
            let known = supported.contains(id);
            if !known {
                debug!("Control {id:#x} not exposed by the driver; skipping value {value}");
            }
            known
        })
        .collect()
}

/// V4L2 device exposed as a sensor node.
pub struct V4L2Device {
    device: Device,
    capabilities: DeviceCapabilities,
    controls: BTreeSet<u32>,
    socket: BoardSocket,
    resolution: Dimensions,
    isp_scale: Option<ScaleFraction>,
}

impl V4L2Device {
    /// Open a V4L2 device by index (e.g., 0 for /dev/video0).
    pub fn open(index: u32) -> Result<Self> {
        let device =
            Device::new(index as usize).map_err(|err| ConfigError::Device(err.to_string()))?;

        let caps = device
            .query_caps()
            .map_err(|err| ConfigError::Device(err.to_string()))?;

        let capabilities = DeviceCapabilities {
            driver: caps.driver,
            card: caps.card,
            bus_info: caps.bus,
            can_capture: caps.capabilities.contains(v4l::capability::Flags::VIDEO_CAPTURE),
            can_stream: caps.capabilities.contains(v4l::capability::Flags::STREAMING),
        };

        let controls = device
            .query_controls()
            .map_err(|err| ConfigError::Device(err.to_string()))?
            .into_iter()
            .map(|desc| desc.id)
            .collect();

        let fmt = device
            .format()
            .map_err(|err| ConfigError::Device(err.to_string()))?;

        Ok(Self {
            device,
            capabilities,
            controls,
            socket: BoardSocket::Auto,
            resolution: Dimensions::new(fmt.width, fmt.height),
            isp_scale: None,
        })
    }

    /// Device capabilities.
    #[must_use]
    pub const fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    /// True if the driver exposes the control `id`.
    #[must_use]
    pub fn supports_control(&self, id: u32) -> bool {
        self.controls.contains(&id)
    }

    /// Board socket assigned by the last configuration pass.
    #[must_use]
    pub const fn board_socket(&self) -> BoardSocket {
        self.socket
    }

    /// ISP scale assigned by the last configuration pass.
    #[must_use]
    pub const fn isp_scale(&self) -> Option<ScaleFraction> {
        self.isp_scale
    }

    /// Current capture size reported by the driver.
    pub fn format_size(&self) -> Result<Dimensions> {
        let fmt = self
            .device
            .format()
            .map_err(|err| ConfigError::Device(err.to_string()))?;
        Ok(Dimensions::new(fmt.width, fmt.height))
    }

    fn set_format_size(&self, size: Dimensions) -> Result<Dimensions> {
        let mut fmt = self
            .device
            .format()
            .map_err(|err| ConfigError::Device(err.to_string()))?;

        fmt.width = size.width;
        fmt.height = size.height;

        let fmt = self
            .device
            .set_format(&fmt)
            .map_err(|err| ConfigError::Device(err.to_string()))?;

        if fmt.width != size.width || fmt.height != size.height {
            warn!("Driver adjusted {size} to {}x{}", fmt.width, fmt.height);
        }
        Ok(Dimensions::new(fmt.width, fmt.height))
    }

    fn write_control(&self, id: u32, value: i64) -> Result<()> {
        self.device
            .set_control(Control {
                id,
                value: Value::Integer(value),
            })
            .map_err(|err| ConfigError::Device(format!("control {id:#x}: {err}")))
    }

    fn write_controls(&self, writes: impl IntoIterator<Item = (u32, i64)>) -> Result<()> {
        for (id, value) in supported_controls(writes, &self.controls) {
            self.write_control(id, value)?;
        }
        Ok(())
    }

    fn apply_control(&self, control: &CameraControl) -> Result<()> {
        self.write_controls(v4l2_controls(control))?;
        if control.frame_sync.is_some() || control.external_trigger.is_some() {
            debug!("V4L2 has no frame sync or external trigger controls; ignoring");
        }
        Ok(())
    }
}

impl SensorNode for V4L2Device {
    fn set_board_socket(&mut self, socket: BoardSocket) -> Result<()> {
        self.socket = socket;
        Ok(())
    }

    fn set_fps(&mut self, fps: f64) -> Result<()> {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let fps = fps.round().max(1.0) as u32;
        self.device
            .set_params(&Parameters::with_fps(fps))
            .map_err(|err| ConfigError::Device(err.to_string()))?;
        Ok(())
    }

    fn set_initial_control(&mut self, control: &CameraControl) -> Result<()> {
        self.apply_control(control)
    }

    fn send_control(&mut self, control: &CameraControl) -> Result<()> {
        self.apply_control(control)
    }
}

impl MonoSensorNode for V4L2Device {
    fn set_mono_resolution(&mut self, resolution: MonoResolution) -> Result<()> {
        self.resolution = self.set_format_size(resolution.dimensions())?;
        Ok(())
    }
}

impl ColorSensorNode for V4L2Device {
    fn set_color_resolution(&mut self, resolution: ColorResolution) -> Result<()> {
        self.resolution = self.set_format_size(resolution.dimensions())?;
        Ok(())
    }

    fn resolution_size(&self) -> Dimensions {
        self.resolution
    }

    fn set_interleaved(&mut self, interleaved: bool) -> Result<()> {
        debug!("Interleaved output {interleaved} follows the pixel format on V4L2");
        Ok(())
    }

    fn set_isp_scale(&mut self, scale: ScaleFraction) -> Result<()> {
        self.isp_scale = Some(scale);
        Ok(())
    }

    fn set_video_size(&mut self, size: Dimensions) -> Result<()> {
        self.set_format_size(size)?;
        Ok(())
    }

    fn set_preview_keep_aspect_ratio(&mut self, keep: bool) -> Result<()> {
        debug!("Preview aspect ratio {keep} has no V4L2 counterpart");
        Ok(())
    }

    fn set_isp3a_fps(&mut self, fps: u32) -> Result<()> {
        debug!("ISP 3A rate {fps} has no V4L2 counterpart");
        Ok(())
    }

    fn set_image_orientation(&mut self, orientation: ImageOrientation) -> Result<()> {
        if let Some((hflip, vflip)) = flip_controls(orientation) {
            self.write_controls([
                (CID_HFLIP, i64::from(hflip)),
                (CID_VFLIP, i64::from(vflip)),
            ])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{build_control, ControlRequest};

    #[test]
    fn test_auto_controls() {
        let writes = v4l2_controls(&build_control(&ControlRequest::default()));
        assert_eq!(
            writes,
            vec![
                (CID_EXPOSURE_AUTO, EXPOSURE_APERTURE_PRIORITY),
                (CID_ISO_SENSITIVITY_AUTO, 1),
                (CID_FOCUS_AUTO, 1),
                (CID_AUTO_WHITE_BALANCE, 1),
            ]
        );
    }

    #[test]
    fn test_manual_controls_disable_auto_first() {
        let mut ctrl = CameraControl::default();
        ctrl.set_manual_exposure(20_000, 800)
            .set_manual_focus(130)
            .set_manual_white_balance(5600);

        assert_eq!(
            v4l2_controls(&ctrl),
            vec![
                (CID_EXPOSURE_AUTO, EXPOSURE_MANUAL),
                (CID_EXPOSURE_ABSOLUTE, 200),
                (CID_ISO_SENSITIVITY_AUTO, 0),
                (CID_ISO_SENSITIVITY, 800),
                (CID_FOCUS_AUTO, 0),
                (CID_FOCUS_ABSOLUTE, 130),
                (CID_AUTO_WHITE_BALANCE, 0),
                (CID_WHITE_BALANCE_TEMPERATURE, 5600),
            ]
        );
    }

    #[test]
    fn test_short_exposure_rounds_up() {
        let mut ctrl = CameraControl::default();
        ctrl.set_manual_exposure(50, 100);
        assert!(v4l2_controls(&ctrl).contains(&(CID_EXPOSURE_ABSOLUTE, 1)));
    }

    #[test]
    fn test_empty_control_writes_nothing() {
        let mut ctrl = CameraControl::default();
        ctrl.set_external_trigger(1, 0);
        assert!(v4l2_controls(&ctrl).is_empty());
    }

    #[test]
    fn test_flip_controls() {
        assert_eq!(flip_controls(ImageOrientation::Normal), Some((false, false)));
        assert_eq!(flip_controls(ImageOrientation::Rotate180Deg), Some((true, true)));
        assert_eq!(flip_controls(ImageOrientation::Auto), None);
    }

    #[test]
    fn test_unsupported_controls_are_skipped() {
        // A webcam with exposure and white balance but no ISO or focus.
        let supported = BTreeSet::from([
            CID_EXPOSURE_AUTO,
            CID_EXPOSURE_ABSOLUTE,
            CID_AUTO_WHITE_BALANCE,
            CID_WHITE_BALANCE_TEMPERATURE,
        ]);
        let writes = supported_controls(
            v4l2_controls(&build_control(&ControlRequest::default())),
            &supported,
        );
        assert_eq!(
            writes,
            vec![
                (CID_EXPOSURE_AUTO, EXPOSURE_APERTURE_PRIORITY),
                (CID_AUTO_WHITE_BALANCE, 1),
            ]
        );
    }

    #[test]
    fn test_no_flip_controls_writes_nothing() {
        let writes = supported_controls([(CID_HFLIP, 0), (CID_VFLIP, 0)], &BTreeSet::new());
        assert!(writes.is_empty());
    }

    #[test]
    fn test_control_ids_match_videodev2() {
        assert_eq!(CID_EXPOSURE_AUTO, 0x009a_0901);
        assert_eq!(CID_FOCUS_AUTO, 0x009a_090c);
        assert_eq!(CID_WHITE_BALANCE_TEMPERATURE, 0x0098_091a);
    }
}
