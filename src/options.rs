//! Device setting enums and the static string tables used to parse them.
//!
//! Option values arrive from the parameter store as strings. Each table maps
//! the accepted labels to a device setting; anything else is rejected with
//! [`ConfigError::UnknownOption`].

use crate::scale::Dimensions;
use crate::traits::{ConfigError, Result};

/// Physical connector a sensor is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardSocket {
    /// Let the device pick the socket.
    Auto,
    /// Socket A, conventionally the color sensor.
    CamA,
    /// Socket B, conventionally the left mono sensor.
    CamB,
    /// Socket C, conventionally the right mono sensor.
    CamC,
    /// Socket D.
    CamD,
}

impl BoardSocket {
    /// Numeric socket id as stored in `i_board_socket_id`.
    #[must_use]
    pub const fn id(self) -> i32 {
        match self {
            Self::Auto => -1,
            Self::CamA => 0,
            Self::CamB => 1,
            Self::CamC => 2,
            Self::CamD => 3,
        }
    }
}

/// Sensor resolutions supported by mono sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonoResolution {
    /// 640x400.
    The400P,
    /// 640x480.
    The480P,
    /// 1280x720.
    The720P,
    /// 1280x800.
    The800P,
    /// 1920x1200.
    The1200P,
}

impl MonoResolution {
    /// Native sensor output size for this resolution.
    #[must_use]
    pub const fn dimensions(self) -> Dimensions {
        match self {
            Self::The400P => Dimensions::new(640, 400),
            Self::The480P => Dimensions::new(640, 480),
            Self::The720P => Dimensions::new(1280, 720),
            Self::The800P => Dimensions::new(1280, 800),
            Self::The1200P => Dimensions::new(1920, 1200),
        }
    }
}

/// Sensor resolutions supported by color sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorResolution {
    /// 1280x720.
    The720P,
    /// 1920x1080.
    The1080P,
    /// 3840x2160.
    The4K,
    /// 4056x3040.
    The12Mp,
    /// 4208x3120.
    The13Mp,
    /// 1280x800.
    The800P,
    /// 1920x1200.
    The1200P,
    /// 2592x1944.
    The5Mp,
    /// 4000x3000.
    The4000X3000,
    /// 5312x6000.
    The5312X6000,
    /// 8000x6000.
    The48Mp,
    /// 1440x1080.
    The1440X1080,
}

impl ColorResolution {
    /// Native sensor output size for this resolution.
    #[must_use]
    pub const fn dimensions(self) -> Dimensions {
        match self {
            Self::The720P => Dimensions::new(1280, 720),
            Self::The1080P => Dimensions::new(1920, 1080),
            Self::The4K => Dimensions::new(3840, 2160),
            Self::The12Mp => Dimensions::new(4056, 3040),
            Self::The13Mp => Dimensions::new(4208, 3120),
            Self::The800P => Dimensions::new(1280, 800),
            Self::The1200P => Dimensions::new(1920, 1200),
            Self::The5Mp => Dimensions::new(2592, 1944),
            Self::The4000X3000 => Dimensions::new(4000, 3000),
            Self::The5312X6000 => Dimensions::new(5312, 6000),
            Self::The48Mp => Dimensions::new(8000, 6000),
            Self::The1440X1080 => Dimensions::new(1440, 1080),
        }
    }
}

/// Hardware frame synchronisation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSyncMode {
    /// No frame sync.
    Off,
    /// Drive the sync line.
    Output,
    /// Follow the sync line.
    Input,
}

/// Orientation applied by the sensor before output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageOrientation {
    /// As mounted.
    Normal,
    /// Rotated by 180 degrees.
    Rotate180Deg,
    /// Chosen by the device from calibration data.
    Auto,
    /// Mirrored left to right.
    HorizontalMirror,
    /// Flipped top to bottom.
    VerticalFlip,
}

/// Labels accepted for `i_resolution` on mono sensors.
pub const MONO_RESOLUTIONS: &[(&str, MonoResolution)] = &[
    ("400", MonoResolution::The400P),
    ("480", MonoResolution::The480P),
    ("720", MonoResolution::The720P),
    ("800", MonoResolution::The800P),
    ("1200", MonoResolution::The1200P),
];

/// Labels accepted for `i_resolution` on color sensors.
pub const COLOR_RESOLUTIONS: &[(&str, ColorResolution)] = &[
    ("720p", ColorResolution::The720P),
    ("1080p", ColorResolution::The1080P),
    ("4k", ColorResolution::The4K),
    ("12mp", ColorResolution::The12Mp),
    ("13mp", ColorResolution::The13Mp),
    ("800p", ColorResolution::The800P),
    ("1200p", ColorResolution::The1200P),
    ("5MP", ColorResolution::The5Mp),
    ("4000x3000", ColorResolution::The4000X3000),
    ("5312X6000", ColorResolution::The5312X6000),
    ("48mp", ColorResolution::The48Mp),
    ("1440X1080", ColorResolution::The1440X1080),
];

/// Labels accepted for `i_fsync_mode`.
pub const FRAME_SYNC_MODES: &[(&str, FrameSyncMode)] = &[
    ("OFF", FrameSyncMode::Off),
    ("OUTPUT", FrameSyncMode::Output),
    ("INPUT", FrameSyncMode::Input),
];

/// Labels accepted for `i_sensor_img_orientation`.
pub const IMAGE_ORIENTATIONS: &[(&str, ImageOrientation)] = &[
    ("NORMAL", ImageOrientation::Normal),
    ("ROTATE_180_DEG", ImageOrientation::Rotate180Deg),
    ("AUTO", ImageOrientation::Auto),
    ("HORIZONTAL_MIRROR", ImageOrientation::HorizontalMirror),
    ("VERTICAL_FLIP", ImageOrientation::VerticalFlip),
];

/// Look up `key` in a static option table.
///
/// Matching is exact: labels are case sensitive, as stored in the tables.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownOption`] naming `option` when `key` has no entry.
pub fn lookup<T: Copy>(option: &'static str, table: &[(&str, T)], key: &str) -> Result<T> {
    table
        .iter()
        .find(|(label, _)| *label == key)
        .map(|(_, value)| *value)
        .ok_or_else(|| ConfigError::UnknownOption {
            option,
            value: key.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_labels() {
        assert_eq!(
            lookup("i_resolution", COLOR_RESOLUTIONS, "1080p").expect("known label"),
            ColorResolution::The1080P
        );
        assert_eq!(
            lookup("i_resolution", MONO_RESOLUTIONS, "400").expect("known label"),
            MonoResolution::The400P
        );
        assert_eq!(
            lookup("i_fsync_mode", FRAME_SYNC_MODES, "OUTPUT").expect("known label"),
            FrameSyncMode::Output
        );
        assert_eq!(
            lookup("i_sensor_img_orientation", IMAGE_ORIENTATIONS, "ROTATE_180_DEG")
                .expect("known label"),
            ImageOrientation::Rotate180Deg
        );
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let err = lookup("i_resolution", COLOR_RESOLUTIONS, "1080P")
            .expect_err("upper-case label is not in the table");
        assert!(matches!(
            err,
            ConfigError::UnknownOption { option: "i_resolution", ref value } if value == "1080P"
        ));
    }

    #[test]
    fn test_mono_labels_are_not_color_labels() {
        assert!(lookup("i_resolution", COLOR_RESOLUTIONS, "720").is_err());
        assert!(lookup("i_resolution", MONO_RESOLUTIONS, "720p").is_err());
    }

    #[test]
    fn test_resolution_dimensions() {
        assert_eq!(ColorResolution::The4K.dimensions(), Dimensions::new(3840, 2160));
        assert_eq!(MonoResolution::The800P.dimensions(), Dimensions::new(1280, 800));
    }

    #[test]
    fn test_board_socket_ids() {
        assert_eq!(BoardSocket::Auto.id(), -1);
        assert_eq!(BoardSocket::CamA.id(), 0);
        assert_eq!(BoardSocket::CamC.id(), 2);
    }
}
