//! Remote annotation service boundary.
//!
//! The store talks to the backend exclusively through [`AnnotationClient`].
//! Transport and encoding are the implementor's concern; the trait fixes the
//! payload schemas so responses are parsed into typed values at the boundary
//! instead of being trusted shapelessly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{ExperimentId, Frame, FrameId, PolyOp, Polygon, PolygonId};

/// Opaque transport-level failure reported by a client implementation.
///
/// The store propagates these unmodified; it neither retries nor rolls back
/// optimistic local mutations on failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ClientError(pub String);

impl ClientError {
    /// Wrap a transport error message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Full experiment payload returned by the initial fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentPayload {
    /// Experiment identifier
    pub id: ExperimentId,
    /// Experiment display name
    #[serde(default)]
    pub name: String,
    /// All frames, in capture order
    #[serde(default)]
    pub frames: Vec<Frame>,
}

/// Per-frame polygon set returned by experiment-scoped batch operations.
///
/// Responses are index-aligned with the experiment's frame sequence; the
/// backend preserves frame order and count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FramePolygons {
    /// Identifier of the frame these polygons belong to
    pub id: FrameId,
    /// The frame's new complete polygon sequence
    #[serde(default)]
    pub polygons: Vec<Polygon>,
}

/// Async RPC boundary to the annotation service.
///
/// All methods are request/response round-trips; none are cancellable once
/// started, and timeouts are the transport's concern.
#[allow(async_fn_in_trait)] // single-threaded UI context, no Send bound wanted
pub trait AnnotationClient {
    /// Fetch experiment metadata together with all frames.
    async fn experiment_info(&self, id: &ExperimentId)
    -> Result<ExperimentPayload, ClientError>;

    /// Persist a polygon's data and operation; returns the canonical value.
    async fn update_polygon(
        &self,
        id: &PolygonId,
        data: &serde_json::Value,
        operation: PolyOp,
    ) -> Result<Polygon, ClientError>;

    /// Create a new polygon scoped to a frame; the server assigns the id.
    async fn create_polygon(&self, frame_id: &FrameId) -> Result<Polygon, ClientError>;

    /// Delete the identified polygons.
    async fn delete_polygons(&self, ids: &[PolygonId]) -> Result<(), ClientError>;

    /// Run wound detection on one frame; returns the new polygons only.
    async fn detect_wound(&self, frame_id: &FrameId) -> Result<Vec<Polygon>, ClientError>;

    /// Run free-cell detection on one frame; returns the new polygons only.
    async fn detect_free_cells(&self, frame_id: &FrameId) -> Result<Vec<Polygon>, ClientError>;

    /// Run wound detection over every frame of the experiment.
    async fn detect_wound_all(
        &self,
        id: &ExperimentId,
    ) -> Result<Vec<FramePolygons>, ClientError>;

    /// Run free-cell detection over every frame of the experiment.
    async fn detect_free_cells_all(
        &self,
        id: &ExperimentId,
    ) -> Result<Vec<FramePolygons>, ClientError>;

    /// Run wound and free-cell detection over every frame.
    async fn detect_full_all(&self, id: &ExperimentId)
    -> Result<Vec<FramePolygons>, ClientError>;

    /// Irreversibly delete every polygon in the experiment.
    async fn clear_polys_experiment(
        &self,
        id: &ExperimentId,
    ) -> Result<Vec<FramePolygons>, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_experiment_payload_from_wire() {
        let payload: ExperimentPayload = serde_json::from_value(json!({
            "id": "exp-1",
            "name": "scratch assay 3",
            "frames": [
                { "id": "frame-0" },
                { "id": "frame-1" }
            ]
        }))
        .expect("payload should parse");

        assert_eq!(payload.id, "exp-1");
        assert_eq!(payload.name, "scratch assay 3");
        assert_eq!(payload.frames.len(), 2);
    }

    #[test]
    fn test_frame_polygons_defaults_to_empty() {
        let cleared: FramePolygons =
            serde_json::from_value(json!({ "id": "frame-0" })).expect("payload should parse");
        assert!(cleared.polygons.is_empty());
    }
}
