//! Annotation polygon types.

use serde::{Deserialize, Serialize};

/// Unique identifier for a polygon (opaque, assigned by the backend).
pub type PolygonId = String;

/// How a polygon contributes to the frame's wound mask.
///
/// Serialized as the backend's single-character codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PolyOp {
    /// Region is added to the wound area (manual outline, wound detection)
    #[default]
    #[serde(rename = "+")]
    Add,
    /// Region is subtracted from the wound area (free cells)
    #[serde(rename = "-")]
    Subtract,
}

/// One annotated region within a frame.
///
/// The geometric `data` payload is opaque to this crate; the editor and the
/// backend agree on its shape (normalized vertex coordinates). The store
/// only moves it around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    /// Backend identifier; `None` until the first server round-trip
    #[serde(default)]
    pub id: Option<PolygonId>,

    /// Opaque vertex payload, never interpreted here
    pub data: serde_json::Value,

    /// Provenance / mask contribution of this polygon
    #[serde(default)]
    pub operation: PolyOp,

    /// Signed fractional area, precomputed server-side; feeds the plot
    #[serde(default)]
    pub surface: f64,

    /// Local-only UI selection state, never sent to the backend
    #[serde(skip)]
    pub selected: bool,
}
