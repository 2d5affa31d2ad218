//! woundview - experiment state core for a wound-healing annotation tool
//!
//! This crate holds the in-memory model of one experiment (an ordered
//! sequence of microscopy frames, each carrying a set of annotation
//! polygons), mediates all reads and writes against the remote annotation
//! service, and derives view-level values (display URLs, histograms, the
//! wound-area plot) from that model.
//!
//! The rendering layer, routing and the annotation service itself live
//! elsewhere; this crate only talks to them through the [`AnnotationClient`]
//! and [`UiGate`] traits.

mod client;
mod error;
mod model;
mod store;
mod view;

pub use client::{AnnotationClient, ClientError, ExperimentPayload, FramePolygons};
pub use error::{Result, StoreError};
pub use model::{
    Experiment, ExperimentId, Frame, FrameId, ImageRef, LutCurve, PolyOp, Polygon, PolygonId,
    ShownVersion, VERSION_ADJUSTED, VERSION_ORIGINAL,
};
pub use store::{CLEAR_CONFIRM_MESSAGE, ExperimentStore, UiGate};
pub use view::PlotSeries;
