//! Data model for one loaded experiment.

mod frame;
mod polygon;

pub use frame::{Frame, FrameId, ImageRef};
pub use polygon::{PolyOp, Polygon, PolygonId};

use serde::{Deserialize, Serialize};

/// Unique identifier for an experiment (opaque, assigned by the backend).
pub type ExperimentId = String;

/// Name of the unprocessed image version every frame carries.
pub const VERSION_ORIGINAL: &str = "original";

/// Name of the virtual tone-mapped display mode.
///
/// No frame stores an image under this name; it is resolved to
/// [`VERSION_ORIGINAL`] and the LUT parameters are applied at URL level.
pub const VERSION_ADJUSTED: &str = "adjusted";

/// Experiment metadata, opaque to the store beyond its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experiment {
    /// Backend-assigned identifier, immutable for the session
    pub id: ExperimentId,
    /// Display name
    pub name: String,
}

/// Which image version the UI is currently displaying.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ShownVersion {
    /// The unprocessed image as captured
    #[default]
    Original,
    /// The original image with the LUT curve applied at display time
    Adjusted,
    /// A named processed variant stored on the frame
    Named(String),
}

impl ShownVersion {
    /// The stored image version this display mode reads from.
    ///
    /// `Adjusted` is not a stored variant; it falls back to `"original"`
    /// and the tone mapping is encoded into the display URL instead.
    pub fn effective(&self) -> &str {
        match self {
            ShownVersion::Original | ShownVersion::Adjusted => VERSION_ORIGINAL,
            ShownVersion::Named(name) => name,
        }
    }
}

/// Piecewise-linear tone-mapping curve.
///
/// `x` holds input intensity breakpoints and `y` the corresponding output
/// values. Both sequences have the same length and are monotonically
/// non-decreasing by convention; neither is enforced here. The image
/// service applies the remapping server-side at request time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LutCurve {
    /// Input breakpoints
    pub x: Vec<u32>,
    /// Output breakpoints
    pub y: Vec<u32>,
}

impl Default for LutCurve {
    /// Identity curve: intensities map to themselves.
    fn default() -> Self {
        Self {
            x: vec![0, 128, 256],
            y: vec![0, 128, 256],
        }
    }
}
