use crate::error::CurveError;

/// Default number of samples per segment.
pub const DEFAULT_RESOLUTION: f64 = 30.0;

/// Largest accepted resolution. Higher values are rejected as invalid.
pub const MAX_RESOLUTION: f64 = 1_000_000.0;

/// Parameters controlling a curve's topology and sampling density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveSettings {
    /// Whether an implicit segment joins the last point back to the first.
    pub closed: bool,
    /// Samples per segment for length approximation and tessellation.
    pub resolution: f64,
}

impl Default for CurveSettings {
    fn default() -> Self {
        Self {
            closed: false,
            resolution: DEFAULT_RESOLUTION,
        }
    }
}

impl CurveSettings {
    /// Checks that the resolution lies in `(0, MAX_RESOLUTION]`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidResolution` otherwise.
    pub fn validate(&self) -> Result<(), CurveError> {
        validate_resolution(self.resolution).map(|_| ())
    }

    /// Number of polyline steps per segment: the resolution rounded up.
    ///
    /// Unvalidated settings are capped at [`MAX_RESOLUTION`].
    #[must_use]
    pub fn sample_steps(&self) -> usize {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let steps = self.resolution.min(MAX_RESOLUTION).ceil() as usize;
        steps.max(1)
    }
}

/// Returns `resolution` unchanged if it lies in `(0, MAX_RESOLUTION]`.
///
/// # Errors
///
/// Returns `InvalidResolution` for NaN and for values outside that range.
pub fn validate_resolution(resolution: f64) -> Result<f64, CurveError> {
    if resolution > 0.0 && resolution <= MAX_RESOLUTION {
        Ok(resolution)
    } else {
        Err(CurveError::InvalidResolution { value: resolution })
    }
}
