//! Frame and image reference types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::polygon::Polygon;

/// Unique identifier for a frame (opaque, assigned by the backend).
pub type FrameId = String;

/// Reference to a remote raster image.
///
/// Immutable once fetched; the same reference may back multiple display
/// requests with different tone-mapping query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// URL of the raster resource on the image service
    pub url: String,
    /// Precomputed bucketed intensity counts (256 buckets)
    #[serde(default)]
    pub histogram: Vec<u64>,
}

/// One image capture timepoint within an experiment.
///
/// The ordinal position of a frame is its index in the experiment's frame
/// sequence; the sequence length and order are fixed after the initial
/// load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Backend-assigned identifier
    pub id: FrameId,
    /// Image versions by name; at minimum `"original"`
    #[serde(default)]
    pub versions: BTreeMap<String, ImageRef>,
    /// Annotation polygons, in backend order
    #[serde(default)]
    pub polygons: Vec<Polygon>,
}

impl Frame {
    /// Look up a stored image version by name.
    pub fn image(&self, version: &str) -> Option<&ImageRef> {
        self.versions.get(version)
    }

    /// Sum of the polygons' fractional surface areas.
    pub fn surface(&self) -> f64 {
        self.polygons.iter().map(|poly| poly.surface).sum()
    }
}
