//! ISP output size negotiation.
//!
//! The image signal processor downscales the sensor's native frame by an
//! integer fraction. The scaled frame has to stay at least as large as the
//! preview crop taken from it, and stereo-to-color alignment expects sizes
//! that are multiples of 16.

use std::fmt;

use thiserror::Error;

/// Alignment expected by downstream stereo-to-color alignment.
pub const ALIGNMENT: u32 = 16;

/// Width and height of an image in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create a new size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// ISP scale as `numerator / denominator`, both non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScaleFraction {
    numerator: u32,
    denominator: u32,
}

impl ScaleFraction {
    /// Create a fraction.
    ///
    /// # Errors
    ///
    /// Returns [`ScaleError::InvalidFraction`] if either term is zero.
    pub fn new(numerator: u32, denominator: u32) -> Result<Self, ScaleError> {
        if numerator == 0 || denominator == 0 {
            return Err(ScaleError::InvalidFraction {
                numerator: i64::from(numerator),
                denominator: i64::from(denominator),
            });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Create a fraction from signed parameter values.
    ///
    /// # Errors
    ///
    /// Returns [`ScaleError::InvalidFraction`] unless both terms are positive.
    pub fn from_params(numerator: i64, denominator: i64) -> Result<Self, ScaleError> {
        let invalid = || ScaleError::InvalidFraction {
            numerator,
            denominator,
        };
        let num = u32::try_from(numerator).map_err(|_| invalid())?;
        let den = u32::try_from(denominator).map_err(|_| invalid())?;
        Self::new(num, den).map_err(|_| invalid())
    }

    /// Numerator.
    #[must_use]
    pub const fn numerator(self) -> u32 {
        self.numerator
    }

    /// Denominator.
    #[must_use]
    pub const fn denominator(self) -> u32 {
        self.denominator
    }

    /// Scale one side, rounding up the way the ISP does.
    fn apply(self, side: u32) -> Result<u32, ScaleError> {
        let scaled = (u64::from(side) * u64::from(self.numerator))
            .div_ceil(u64::from(self.denominator));
        u32::try_from(scaled).map_err(|_| ScaleError::InvalidFraction {
            numerator: i64::from(self.numerator),
            denominator: i64::from(self.denominator),
        })
    }
}

impl fmt::Display for ScaleFraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Errors that abort scaling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScaleError {
    /// The scaled frame is smaller than the preview taken from it.
    #[error(
        "ISP image size {width}x{height} lower than preview size {min_size}! \
         Adjust preview size accordingly"
    )]
    PreviewExceedsScaledSize {
        /// Scaled width.
        width: u32,
        /// Scaled height.
        height: u32,
        /// Required minimum for both sides.
        min_size: u32,
    },
    /// The fraction has a non-positive term or overflows the output size.
    #[error("invalid ISP scale {numerator}/{denominator}")]
    InvalidFraction {
        /// Requested numerator.
        numerator: i64,
        /// Requested denominator.
        denominator: i64,
    },
}

/// Non-fatal findings about a scaled size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScaleWarning {
    /// Neither side of the scaled frame is a multiple of [`ALIGNMENT`].
    Misaligned {
        /// Fraction that produced the size.
        scale: ScaleFraction,
        /// Resulting size.
        dimensions: Dimensions,
    },
}

impl fmt::Display for ScaleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Misaligned { scale, dimensions } => write!(
                f,
                "ISP scaling with num: {} and den: {} results in width: {} and height: {} \
                 which are not divisible by {ALIGNMENT}. This will result in errors when \
                 aligning stereo to RGB. To fix that, either adjust i_isp_num and i_isp_den \
                 values or set i_output_isp parameter to false and set i_width and i_height \
                 parameters accordingly.",
                scale.numerator, scale.denominator, dimensions.width, dimensions.height
            ),
        }
    }
}

/// Output of [`compute_scaled_dimensions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaledDimensions {
    /// Size the sensor will output.
    pub dimensions: Dimensions,
    /// Warnings the caller should report; never fatal.
    pub warnings: Vec<ScaleWarning>,
}

/// Compute the ISP output size for a sensor.
///
/// With scaling disabled the native size is returned untouched and no checks
/// run. Otherwise each side is scaled by `scale` with ceiling division, both
/// sides must reach `min_size`, and a [`ScaleWarning::Misaligned`] is attached
/// when neither side is a multiple of [`ALIGNMENT`].
///
/// # Errors
///
/// Returns [`ScaleError::PreviewExceedsScaledSize`] if either scaled side is
/// below `min_size`.
pub fn compute_scaled_dimensions(
    native: Dimensions,
    scale: ScaleFraction,
    min_size: u32,
    isp_scaling_enabled: bool,
) -> Result<ScaledDimensions, ScaleError> {
    if !isp_scaling_enabled {
        return Ok(ScaledDimensions {
            dimensions: native,
            warnings: Vec::new(),
        });
    }

    let dimensions = Dimensions::new(scale.apply(native.width)?, scale.apply(native.height)?);

    if dimensions.width < min_size || dimensions.height < min_size {
        return Err(ScaleError::PreviewExceedsScaledSize {
            width: dimensions.width,
            height: dimensions.height,
            min_size,
        });
    }

    // Only trips when both sides are off; a single misaligned side passes.
    let mut warnings = Vec::new();
    if dimensions.width % ALIGNMENT != 0 && dimensions.height % ALIGNMENT != 0 {
        warnings.push(ScaleWarning::Misaligned { scale, dimensions });
    }

    Ok(ScaledDimensions {
        dimensions,
        warnings,
    })
}
