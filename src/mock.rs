//! Mock sensor node for testing without hardware.

use crate::control::CameraControl;
use crate::options::{BoardSocket, ColorResolution, ImageOrientation, MonoResolution};
use crate::scale::{Dimensions, ScaleFraction};
use crate::traits::{ColorSensorNode, MonoSensorNode, Result, SensorNode};

/// A setting received by [`MockSensorNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum NodeCall {
    /// `set_board_socket`.
    BoardSocket(BoardSocket),
    /// `set_fps`.
    Fps(f64),
    /// `set_initial_control`.
    InitialControl(CameraControl),
    /// `send_control`.
    Control(CameraControl),
    /// `set_mono_resolution`.
    MonoResolution(MonoResolution),
    /// `set_color_resolution`.
    ColorResolution(ColorResolution),
    /// `set_interleaved`.
    Interleaved(bool),
    /// `set_isp_scale`.
    IspScale(ScaleFraction),
    /// `set_video_size`.
    VideoSize(Dimensions),
    /// `set_preview_keep_aspect_ratio`.
    PreviewKeepAspectRatio(bool),
    /// `set_isp3a_fps`.
    Isp3aFps(u32),
    /// `set_image_orientation`.
    ImageOrientation(ImageOrientation),
}

/// Sensor node that records every call in order.
pub struct MockSensorNode {
    /// Calls received so far.
    pub calls: Vec<NodeCall>,
    resolution: Dimensions,
}

impl Default for MockSensorNode {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSensorNode {
    /// Create a mock reporting a 1080p native resolution.
    #[must_use]
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            resolution: ColorResolution::The1080P.dimensions(),
        }
    }
}

impl SensorNode for MockSensorNode {
    fn set_board_socket(&mut self, socket: BoardSocket) -> Result<()> {
        self.calls.push(NodeCall::BoardSocket(socket));
        Ok(())
    }

    fn set_fps(&mut self, fps: f64) -> Result<()> {
        self.calls.push(NodeCall::Fps(fps));
        Ok(())
    }

    fn set_initial_control(&mut self, control: &CameraControl) -> Result<()> {
        self.calls.push(NodeCall::InitialControl(control.clone()));
        Ok(())
    }

    fn send_control(&mut self, control: &CameraControl) -> Result<()> {
        self.calls.push(NodeCall::Control(control.clone()));
        Ok(())
    }
}

impl MonoSensorNode for MockSensorNode {
    fn set_mono_resolution(&mut self, resolution: MonoResolution) -> Result<()> {
        self.resolution = resolution.dimensions();
        self.calls.push(NodeCall::MonoResolution(resolution));
        Ok(())
    }
}

impl ColorSensorNode for MockSensorNode {
    fn set_color_resolution(&mut self, resolution: ColorResolution) -> Result<()> {
        self.resolution = resolution.dimensions();
        self.calls.push(NodeCall::ColorResolution(resolution));
        Ok(())
    }

    fn resolution_size(&self) -> Dimensions {
        self.resolution
    }

    fn set_interleaved(&mut self, interleaved: bool) -> Result<()> {
        self.calls.push(NodeCall::Interleaved(interleaved));
        Ok(())
    }

    fn set_isp_scale(&mut self, scale: ScaleFraction) -> Result<()> {
        self.calls.push(NodeCall::IspScale(scale));
        Ok(())
    }

    fn set_video_size(&mut self, size: Dimensions) -> Result<()> {
        self.calls.push(NodeCall::VideoSize(size));
        Ok(())
    }

    fn set_preview_keep_aspect_ratio(&mut self, keep: bool) -> Result<()> {
        self.calls.push(NodeCall::PreviewKeepAspectRatio(keep));
        Ok(())
    }

    fn set_isp3a_fps(&mut self, fps: u32) -> Result<()> {
        self.calls.push(NodeCall::Isp3aFps(fps));
        Ok(())
    }

    fn set_image_orientation(&mut self, orientation: ImageOrientation) -> Result<()> {
        self.calls.push(NodeCall::ImageOrientation(orientation));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_tracks_resolution() {
        let mut node = MockSensorNode::new();
        assert_eq!(node.resolution_size(), Dimensions::new(1920, 1080));

        node.set_color_resolution(ColorResolution::The12Mp)
            .expect("mock never fails");
        assert_eq!(node.resolution_size(), Dimensions::new(4056, 3040));
    }

    #[test]
    fn test_mock_records_calls_in_order() {
        let mut node = MockSensorNode::new();
        node.set_board_socket(BoardSocket::CamB).expect("mock never fails");
        node.set_fps(15.0).expect("mock never fails");
        assert_eq!(
            node.calls,
            vec![NodeCall::BoardSocket(BoardSocket::CamB), NodeCall::Fps(15.0)]
        );
    }
}
