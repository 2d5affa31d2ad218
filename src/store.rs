//! Experiment state coordinator.
//!
//! [`ExperimentStore`] owns the frame sequence for one experiment and is the
//! single place local state is mutated. Every action is an async round-trip
//! to the [`AnnotationClient`]; between suspension points mutations run to
//! completion, so the UI always observes a consistent model.

use crate::client::{AnnotationClient, ClientError, FramePolygons};
use crate::error::{Result, StoreError};
use crate::model::{Experiment, ExperimentId, Frame, LutCurve, PolygonId, ShownVersion};

/// Confirmation message shown before deleting every polygon in the
/// experiment.
pub const CLEAR_CONFIRM_MESSAGE: &str =
    "Are you sure you want to delete all polygons in this experiment?";

/// UI-side gate the store drives during experiment-scoped batch operations.
///
/// `processing_started` opens the blocking modal, `processing_finished`
/// closes it. The store guarantees every `processing_started` is paired
/// with a `processing_finished`, remote failures included.
pub trait UiGate {
    /// Enter the blocking "processing" state.
    fn processing_started(&mut self);
    /// Leave the blocking "processing" state.
    fn processing_finished(&mut self);
    /// Ask the user to confirm a destructive action.
    fn confirm(&mut self, message: &str) -> bool;
}

/// Batch-operation state machine backing the advisory UI modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum BatchState {
    #[default]
    Idle,
    Processing,
}

/// In-memory model of one experiment plus the actions that mutate it.
///
/// Constructed once per session with its client and UI gate injected;
/// [`setup`](ExperimentStore::setup) must complete before any frame-scoped
/// action is usable.
pub struct ExperimentStore<C, U> {
    pub(crate) client: C,
    pub(crate) ui: U,
    pub(crate) experiment: Option<Experiment>,
    pub(crate) frames: Vec<Frame>,
    pub(crate) frame_idx: usize,
    pub(crate) loaded: bool,
    pub(crate) shown_version: ShownVersion,
    pub(crate) adjust: LutCurve,
    batch: BatchState,
}

impl<C, U> ExperimentStore<C, U> {
    /// Create an empty, unloaded store.
    pub fn new(client: C, ui: U) -> Self {
        Self {
            client,
            ui,
            experiment: None,
            frames: Vec::new(),
            frame_idx: 0,
            loaded: false,
            shown_version: ShownVersion::default(),
            adjust: LutCurve::default(),
            batch: BatchState::default(),
        }
    }

    /// Experiment metadata, once loaded.
    pub fn experiment(&self) -> Option<&Experiment> {
        self.experiment.as_ref()
    }

    /// All frames, in capture order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Current position of the navigation cursor.
    pub fn frame_idx(&self) -> usize {
        self.frame_idx
    }

    /// Whether the initial fetch has completed.
    pub fn loaded(&self) -> bool {
        self.loaded
    }

    /// Whether an experiment-scoped batch operation is in flight.
    pub fn is_processing(&self) -> bool {
        self.batch == BatchState::Processing
    }

    /// Active display mode.
    pub fn shown_version(&self) -> &ShownVersion {
        &self.shown_version
    }

    /// Switch the active display mode.
    pub fn set_shown_version(&mut self, version: ShownVersion) {
        self.shown_version = version;
    }

    /// Active tone-mapping curve.
    pub fn adjust(&self) -> &LutCurve {
        &self.adjust
    }

    /// Replace the tone-mapping curve.
    pub fn set_adjust(&mut self, lut: LutCurve) {
        self.adjust = lut;
    }

    /// Mutable access to the current frame, for in-place polygon edits and
    /// selection toggling by the editor.
    pub fn current_frame_mut(&mut self) -> Option<&mut Frame> {
        self.frames.get_mut(self.frame_idx)
    }

    /// The injected UI gate.
    pub fn ui(&self) -> &U {
        &self.ui
    }

    /// The injected remote client.
    pub fn client(&self) -> &C {
        &self.client
    }

    fn require_loaded(&self, action: &'static str) -> Result<()> {
        if self.loaded {
            Ok(())
        } else {
            Err(StoreError::NotLoaded { action })
        }
    }

    /// Index of the current frame, or a precondition error naming `action`.
    fn require_current_frame(&self, action: &'static str) -> Result<usize> {
        self.require_loaded(action)?;
        if self.frames.is_empty() {
            return Err(StoreError::NotLoaded { action });
        }
        Ok(self.frame_idx)
    }

    fn require_experiment(&self, action: &'static str) -> Result<ExperimentId> {
        self.require_loaded(action)?;
        match &self.experiment {
            Some(experiment) => Ok(experiment.id.clone()),
            None => Err(StoreError::NotLoaded { action }),
        }
    }
}

impl<C: AnnotationClient, U: UiGate> ExperimentStore<C, U> {
    /// Fetch the full experiment payload and install it as the model.
    ///
    /// All-or-nothing: a failed fetch leaves the store unloaded and
    /// untouched. Re-invocation replaces the entire model and resets the
    /// cursor; nothing is merged.
    pub async fn setup(&mut self, id: ExperimentId) -> Result<()> {
        let payload = self.client.experiment_info(&id).await?;

        let mut frames = payload.frames;
        for frame in &mut frames {
            for poly in &mut frame.polygons {
                poly.selected = false;
            }
        }

        log::info!(
            "loaded experiment '{}' with {} frames",
            payload.id,
            frames.len()
        );

        self.experiment = Some(Experiment {
            id: payload.id,
            name: payload.name,
        });
        self.frames = frames;
        self.frame_idx = 0;
        self.loaded = true;
        Ok(())
    }

    /// Advance the cursor one frame, wrapping past the end.
    pub fn next_frame(&mut self) -> Result<()> {
        self.require_loaded("next_frame")?;
        if !self.frames.is_empty() {
            self.frame_idx = (self.frame_idx + 1) % self.frames.len();
        }
        Ok(())
    }

    /// Retreat the cursor one frame, wrapping past the start.
    pub fn prev_frame(&mut self) -> Result<()> {
        self.require_loaded("prev_frame")?;
        let len = self.frames.len();
        if len > 0 {
            self.frame_idx = (self.frame_idx + len - 1) % len;
        }
        Ok(())
    }

    /// Persist the polygon at `index` in the current frame.
    ///
    /// The server is authoritative for shape and metadata after a save; the
    /// local slot is replaced wholesale with the canonical response. The
    /// local selection flag is carried across the replace, since it never
    /// takes part in the round-trip.
    pub async fn save_polygon(&mut self, index: usize) -> Result<()> {
        let frame_idx = self.require_current_frame("save_polygon")?;

        let (id, data, operation, selected) = {
            let poly = self.frames[frame_idx]
                .polygons
                .get(index)
                .ok_or(StoreError::PolygonIndex { index })?;
            let id = poly.id.clone().ok_or(StoreError::Unsynced { index })?;
            (id, poly.data.clone(), poly.operation, poly.selected)
        };

        let mut saved = self.client.update_polygon(&id, &data, operation).await?;
        saved.selected = selected;

        if let Some(slot) = self.frames[frame_idx].polygons.get_mut(index) {
            *slot = saved;
        }
        Ok(())
    }

    /// Create a new polygon on the current frame and append it.
    ///
    /// No optimistic placeholder is shown; the polygon appears once the
    /// server has assigned its identifier.
    pub async fn create_polygon(&mut self) -> Result<()> {
        let frame_idx = self.require_current_frame("create_polygon")?;
        let frame_id = self.frames[frame_idx].id.clone();

        let mut poly = self.client.create_polygon(&frame_id).await?;
        poly.selected = false;
        self.frames[frame_idx].polygons.push(poly);
        Ok(())
    }

    /// Remove the selected polygons from the current frame, then delete
    /// them remotely.
    ///
    /// Removal is optimistic: the local model updates before the request
    /// and is not rolled back if the request fails.
    pub async fn delete_selected_polygons(&mut self) -> Result<()> {
        let frame_idx = self.require_current_frame("delete_selected_polygons")?;

        let frame = &mut self.frames[frame_idx];
        let ids: Vec<PolygonId> = frame
            .polygons
            .iter()
            .filter(|poly| poly.selected)
            .filter_map(|poly| poly.id.clone())
            .collect();
        frame.polygons.retain(|poly| !poly.selected);

        if ids.is_empty() {
            return Ok(());
        }
        self.client.delete_polygons(&ids).await?;
        Ok(())
    }

    /// Remove the identified polygons from the current frame, then delete
    /// them remotely. Same optimistic pattern as
    /// [`delete_selected_polygons`](Self::delete_selected_polygons).
    pub async fn delete_polygons(&mut self, ids: &[PolygonId]) -> Result<()> {
        let frame_idx = self.require_current_frame("delete_polygons")?;

        self.frames[frame_idx].polygons.retain(|poly| {
            poly.id
                .as_ref()
                .map_or(true, |id| !ids.contains(id))
        });

        if ids.is_empty() {
            return Ok(());
        }
        self.client.delete_polygons(ids).await?;
        Ok(())
    }

    /// Run wound detection on the current frame; detected polygons are
    /// appended to the frame's existing ones.
    pub async fn detect_wound(&mut self) -> Result<()> {
        let frame_idx = self.require_current_frame("detect_wound")?;
        let frame_id = self.frames[frame_idx].id.clone();

        let polys = self.client.detect_wound(&frame_id).await?;
        self.append_polygons(frame_idx, polys);
        Ok(())
    }

    /// Run free-cell detection on the current frame; detected polygons are
    /// appended to the frame's existing ones.
    pub async fn detect_free_cells(&mut self) -> Result<()> {
        let frame_idx = self.require_current_frame("detect_free_cells")?;
        let frame_id = self.frames[frame_idx].id.clone();

        let polys = self.client.detect_free_cells(&frame_id).await?;
        self.append_polygons(frame_idx, polys);
        Ok(())
    }

    /// Run wound detection over every frame of the experiment.
    ///
    /// Experiment-scoped: opens the blocking UI gate, awaits the batch
    /// request, then replaces every frame's polygon sequence wholesale
    /// from the index-aligned response.
    pub async fn detect_wound_all(&mut self) -> Result<()> {
        let id = self.require_experiment("detect_wound_all")?;
        self.enter_processing()?;
        log::debug!("detect_wound_all over {} frames", self.frames.len());
        let result = self.client.detect_wound_all(&id).await;
        self.finish_batch(result)
    }

    /// Run free-cell detection over every frame of the experiment.
    pub async fn detect_free_cells_all(&mut self) -> Result<()> {
        let id = self.require_experiment("detect_free_cells_all")?;
        self.enter_processing()?;
        log::debug!("detect_free_cells_all over {} frames", self.frames.len());
        let result = self.client.detect_free_cells_all(&id).await;
        self.finish_batch(result)
    }

    /// Run wound and free-cell detection over every frame of the
    /// experiment.
    pub async fn detect_full_all(&mut self) -> Result<()> {
        let id = self.require_experiment("detect_full_all")?;
        self.enter_processing()?;
        log::debug!("detect_full_all over {} frames", self.frames.len());
        let result = self.client.detect_full_all(&id).await;
        self.finish_batch(result)
    }

    /// Delete every polygon in the experiment, after interactive
    /// confirmation.
    ///
    /// Declining the confirmation is a silent no-op: no state change, no
    /// remote call.
    pub async fn clear_polys_experiment(&mut self) -> Result<()> {
        let id = self.require_experiment("clear_polys_experiment")?;
        if !self.ui.confirm(CLEAR_CONFIRM_MESSAGE) {
            log::debug!("clear_polys_experiment declined");
            return Ok(());
        }

        self.enter_processing()?;
        let result = self.client.clear_polys_experiment(&id).await;
        self.finish_batch(result)
    }

    fn append_polygons(&mut self, frame_idx: usize, polys: Vec<crate::model::Polygon>) {
        let frame = &mut self.frames[frame_idx];
        for mut poly in polys {
            poly.selected = false;
            frame.polygons.push(poly);
        }
    }

    fn enter_processing(&mut self) -> Result<()> {
        if self.batch == BatchState::Processing {
            return Err(StoreError::Busy);
        }
        self.batch = BatchState::Processing;
        self.ui.processing_started();
        Ok(())
    }

    /// Release the gate and apply an experiment-scoped batch response.
    ///
    /// The gate is released on every path: remote failure and frame-count
    /// mismatch included. A permanently blocked UI is a defect, a failed
    /// detection run is not.
    fn finish_batch(
        &mut self,
        result: std::result::Result<Vec<FramePolygons>, ClientError>,
    ) -> Result<()> {
        self.batch = BatchState::Idle;
        self.ui.processing_finished();
        self.apply_frame_polygons(result?)
    }

    /// Replace every frame's polygon sequence from an index-aligned batch
    /// response. Frame identifiers, images and ordering are untouched.
    fn apply_frame_polygons(&mut self, updates: Vec<FramePolygons>) -> Result<()> {
        if updates.len() != self.frames.len() {
            return Err(StoreError::FrameMismatch {
                expected: self.frames.len(),
                got: updates.len(),
            });
        }

        for (frame, update) in self.frames.iter_mut().zip(updates) {
            let mut polygons = update.polygons;
            for poly in &mut polygons {
                poly.selected = false;
            }
            frame.polygons = polygons;
        }
        Ok(())
    }
}
