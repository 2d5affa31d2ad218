//! View projections over the experiment model.
//!
//! Everything here is a pure derivation recomputed from current state on
//! every read; there is no caching to invalidate. The renderer reads these,
//! it never reaches into the model directly.

use serde::Serialize;

use crate::model::{Frame, ImageRef, ShownVersion};
use crate::store::ExperimentStore;

/// One aggregate series for the plotting widget.
///
/// `x` holds 0-based frame ordinals, `y` the per-frame wound area in
/// percent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotSeries {
    /// Frame ordinals
    pub x: Vec<usize>,
    /// 100 x the summed polygon surfaces of each frame
    pub y: Vec<f64>,
}

impl<C, U> ExperimentStore<C, U> {
    /// Frame under the navigation cursor, if any frames are loaded.
    pub fn current_frame(&self) -> Option<&Frame> {
        self.frames.get(self.frame_idx)
    }

    /// Ring-adjusted cursor position `k` steps away, without navigating.
    ///
    /// `k` may be negative and larger than the frame count in magnitude;
    /// the result is always a valid index while any frames are loaded.
    pub fn offset(&self, k: isize) -> usize {
        let len = self.frames.len();
        if len == 0 {
            return 0;
        }
        (self.frame_idx as isize + k).rem_euclid(len as isize) as usize
    }

    /// Stored image shown for the frame at `idx` under the effective
    /// display mode.
    ///
    /// The `Adjusted` mode has no stored variant of its own; it reads the
    /// `"original"` image and the tone mapping is applied at URL level.
    pub fn frame_image(&self, idx: usize) -> Option<&ImageRef> {
        self.frames.get(idx)?.image(self.shown_version.effective())
    }

    /// Image shown for the current frame.
    pub fn current_image(&self) -> Option<&ImageRef> {
        self.frame_image(self.frame_idx)
    }

    /// Display URL for the frame at `idx`.
    ///
    /// In `Adjusted` mode the LUT breakpoint sequences are appended as
    /// `lut_in` / `lut_out` query parameters, JSON-serialized, so the image
    /// service applies the tone mapping server-side at request time.
    pub fn frame_url(&self, idx: usize) -> Option<String> {
        let image = self.frame_image(idx)?;
        let mut url = image.url.clone();

        if self.shown_version == ShownVersion::Adjusted {
            let lut_in = serde_json::to_string(&self.adjust.x).ok()?;
            let lut_out = serde_json::to_string(&self.adjust.y).ok()?;
            let sep = if url.contains('?') { '&' } else { '?' };
            url = format!("{url}{sep}lut_in={lut_in}&lut_out={lut_out}");
        }
        Some(url)
    }

    /// Display URL for the current frame.
    pub fn current_url(&self) -> Option<String> {
        self.frame_url(self.frame_idx)
    }

    /// Intensity histogram of the currently displayed stored image.
    ///
    /// Always the stored image's own histogram; tone mapping is not
    /// reflected here.
    pub fn current_histogram(&self) -> Option<&[u64]> {
        self.current_image().map(|image| image.histogram.as_slice())
    }

    /// Wound-area series over all frames: per frame, 100 x the sum of its
    /// polygons' `surface` values, indexed by frame ordinal.
    pub fn plot(&self) -> PlotSeries {
        let y: Vec<f64> = self
            .frames
            .iter()
            .map(|frame| 100.0 * frame.surface())
            .collect();
        PlotSeries {
            x: (0..y.len()).collect(),
            y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LutCurve, Polygon};
    use serde_json::json;
    use std::collections::BTreeMap;

    // View projections need no client or UI gate; a unit store suffices.
    fn view_store(frames: Vec<Frame>) -> ExperimentStore<(), ()> {
        let mut store = ExperimentStore::new((), ());
        store.frames = frames;
        store.loaded = true;
        store
    }

    fn frame_with_image(id: &str, url: &str, histogram: Vec<u64>) -> Frame {
        let mut versions = BTreeMap::new();
        versions.insert(
            "original".to_string(),
            ImageRef {
                url: url.to_string(),
                histogram,
            },
        );
        Frame {
            id: id.to_string(),
            versions,
            polygons: Vec::new(),
        }
    }

    fn surface_poly(surface: f64) -> Polygon {
        Polygon {
            id: None,
            data: json!([]),
            operation: Default::default(),
            surface,
            selected: false,
        }
    }

    #[test]
    fn test_current_frame_empty_store() {
        let store = ExperimentStore::new((), ());
        assert!(store.current_frame().is_none());
        assert!(store.current_image().is_none());
        assert!(store.current_url().is_none());
        assert!(store.current_histogram().is_none());
    }

    #[test]
    fn test_offset_wraps_both_directions() {
        let mut store = view_store(vec![
            frame_with_image("f0", "/f0", vec![]),
            frame_with_image("f1", "/f1", vec![]),
            frame_with_image("f2", "/f2", vec![]),
        ]);
        store.frame_idx = 1;

        assert_eq!(store.offset(0), 1);
        assert_eq!(store.offset(1), 2);
        assert_eq!(store.offset(2), 0);
        assert_eq!(store.offset(-1), 0);
        assert_eq!(store.offset(-2), 2);
        // Magnitudes far beyond the length stay congruent mod 3
        assert_eq!(store.offset(7), 2);
        assert_eq!(store.offset(-7), 0);
    }

    #[test]
    fn test_offset_empty_store() {
        let store = ExperimentStore::new((), ());
        assert_eq!(store.offset(5), 0);
        assert_eq!(store.offset(-5), 0);
    }

    #[test]
    fn test_adjusted_mode_falls_back_to_original_image() {
        let mut store = view_store(vec![frame_with_image("f0", "/frames/f0/", vec![1, 2, 3])]);
        store.shown_version = ShownVersion::Adjusted;

        let image = store.current_image().expect("image under adjusted mode");
        assert_eq!(image.url, "/frames/f0/");
        assert_eq!(store.current_histogram(), Some(&[1u64, 2, 3][..]));
    }

    #[test]
    fn test_unknown_named_version_yields_none() {
        let mut store = view_store(vec![frame_with_image("f0", "/frames/f0/", vec![])]);
        store.shown_version = ShownVersion::Named("equalized".to_string());
        assert!(store.current_image().is_none());
        assert!(store.current_url().is_none());
    }

    #[test]
    fn test_frame_url_original_mode_has_no_lut_params() {
        let store = view_store(vec![frame_with_image("f0", "/frames/f0/", vec![])]);
        let url = store.frame_url(0).expect("url");
        assert_eq!(url, "/frames/f0/");
        assert!(!url.contains("lut_in"));
        assert!(!url.contains("lut_out"));
    }

    #[test]
    fn test_frame_url_adjusted_mode_carries_lut_params() {
        let mut store = view_store(vec![frame_with_image("f0", "/frames/f0/", vec![])]);
        store.shown_version = ShownVersion::Adjusted;
        store.adjust = LutCurve {
            x: vec![0, 128, 256],
            y: vec![0, 64, 256],
        };

        let url = store.frame_url(0).expect("url");
        assert_eq!(url, "/frames/f0/?lut_in=[0,128,256]&lut_out=[0,64,256]");
    }

    #[test]
    fn test_frame_url_appends_to_existing_query() {
        let mut store = view_store(vec![frame_with_image("f0", "/frames/f0/?mask=1", vec![])]);
        store.shown_version = ShownVersion::Adjusted;

        let url = store.frame_url(0).expect("url");
        assert!(url.starts_with("/frames/f0/?mask=1&lut_in="));
    }

    #[test]
    fn test_plot_sums_surfaces_per_frame() {
        let mut frame0 = frame_with_image("f0", "/f0", vec![]);
        frame0.polygons = vec![surface_poly(0.1), surface_poly(0.2)];
        let mut frame1 = frame_with_image("f1", "/f1", vec![]);
        frame1.polygons = vec![surface_poly(0.05)];

        let store = view_store(vec![frame0, frame1]);
        let series = store.plot();

        assert_eq!(series.x, vec![0, 1]);
        assert_eq!(series.y.len(), 2);
        assert!((series.y[0] - 30.0).abs() < 1e-9);
        assert!((series.y[1] - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_plot_empty_store() {
        let store = ExperimentStore::new((), ());
        let series = store.plot();
        assert!(series.x.is_empty());
        assert!(series.y.is_empty());
    }
}
