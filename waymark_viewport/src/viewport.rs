// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashSet;
use kurbo::{Point, Rect, Vec2};
use waymark_buffer::{BufferResize, PanOutcome, RenderTarget, ViewBuffer};
use waymark_clip::clip_envelope;
use waymark_dirty::RegionInvalidator;
use waymark_history::ExtentHistory;
use waymark_transform::{
    CoordinateTransform, Extent, TransformError, scale_denominator, units_per_pixel_at_scale,
};

use crate::config::ViewportConfig;
use crate::error::{LayerRenderError, ViewportError};
use crate::event::{CompletionOutcome, RenderCompletion, ViewEvent};
use crate::gesture::PanGesture;
use crate::layer::{DrawScratch, Layer, LayerId, LayerStack, RenderArgs, RenderStatus};

/// Where the viewport is in its update cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ViewportState {
    /// Nothing pending beyond what the next paint handles.
    #[default]
    Idle,
    /// A pan gesture is in progress.
    Panning,
    /// The view rectangle is being applied.
    Resizing,
    /// The whole buffer is stale and layers are re-rendering it.
    Rebuilding,
}

/// Summary of one [`Viewport::draw`] call.
#[derive(Debug, Default)]
pub struct DrawReport {
    /// Number of dirty regions handed to layers.
    pub regions: usize,
    /// Layers that finished painting.
    pub layers_rendered: usize,
    /// Layers that will deliver their pixels later.
    pub layers_deferred: usize,
    /// Layers that failed; their regions stay stale for the next paint.
    pub failures: Vec<LayerRenderError>,
    /// Whether anything was copied to the target.
    pub presented: bool,
}

/// Interactive map view: extent, buffer, dirty regions, history and layers.
///
/// All operations run on the host's UI thread. Rendering is pull-based: view
/// changes only record what is stale, and [`draw`](Self::draw) asks layers to
/// paint it and copies the visible window to the screen.
///
/// Every change to the mapping between geographic coordinates and buffer
/// pixels increments the [`generation`](Self::generation); deferred layer
/// output tagged with an older generation is dropped.
#[derive(Debug)]
pub struct Viewport {
    config: ViewportConfig,
    view: Rect,
    angle: f64,
    /// Extent asked for; what history records.
    requested: Option<Extent>,
    /// `requested` corrected to the view's aspect ratio.
    visible: Option<Extent>,
    transform: Option<CoordinateTransform>,
    buffer_transform: Option<CoordinateTransform>,
    buffer: ViewBuffer,
    dirty: RegionInvalidator,
    history: ExtentHistory,
    layers: LayerStack,
    state: ViewportState,
    generation: u64,
    gesture: PanGesture,
    failing: HashSet<LayerId>,
    pending_deferred: usize,
    deferred_regions: Vec<Rect>,
    allocation_failed: bool,
    reference_scale: Option<f64>,
    events: Vec<ViewEvent>,
    scratch: DrawScratch,
}

impl Viewport {
    /// Creates a viewport showing nothing inside `view`.
    ///
    /// The buffer is allocated lazily on the first [`draw`](Self::draw). Use
    /// [`zoom_to_extent`](Self::zoom_to_extent) or
    /// [`zoom_to_max_extent`](Self::zoom_to_max_extent) to show something.
    #[must_use]
    pub fn new(config: ViewportConfig, view: Rect) -> Self {
        let config = config.validated();
        Self {
            buffer: ViewBuffer::new(config.extend_coefficient, config.max_surface_dimension),
            dirty: RegionInvalidator::new()
                .with_coalesce(config.coalesce)
                .with_max_regions(config.max_regions),
            history: ExtentHistory::new(config.history_capacity),
            config,
            view: view.abs(),
            angle: 0.0,
            requested: None,
            visible: None,
            transform: None,
            buffer_transform: None,
            layers: LayerStack::new(),
            state: ViewportState::Idle,
            generation: 0,
            gesture: PanGesture::default(),
            failing: HashSet::new(),
            pending_deferred: 0,
            deferred_regions: Vec::new(),
            allocation_failed: false,
            reference_scale: None,
            events: Vec::new(),
            scratch: DrawScratch::default(),
        }
    }

    // --- properties ---

    /// The configuration in effect.
    #[must_use]
    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// Device rectangle the map is shown in.
    #[must_use]
    pub fn view(&self) -> Rect {
        self.view
    }

    /// Rotation in degrees, in `[0, 360)`.
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// The extent last asked for, before aspect correction.
    #[must_use]
    pub fn extent(&self) -> Option<Extent> {
        self.requested
    }

    /// The extent actually shown: [`extent`](Self::extent) grown to the
    /// view's aspect ratio.
    #[must_use]
    pub fn visible_extent(&self) -> Option<Extent> {
        self.visible
    }

    /// The geographic ↔ screen transform, if an extent is shown.
    #[must_use]
    pub fn transform(&self) -> Option<&CoordinateTransform> {
        self.transform.as_ref()
    }

    /// The geographic ↔ buffer transform layers render with.
    #[must_use]
    pub fn buffer_transform(&self) -> Option<&CoordinateTransform> {
        self.buffer_transform.as_ref()
    }

    /// The off-screen buffer.
    #[must_use]
    pub fn buffer(&self) -> &ViewBuffer {
        &self.buffer
    }

    /// The extent history.
    #[must_use]
    pub fn history(&self) -> &ExtentHistory {
        &self.history
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ViewportState {
        self.state
    }

    /// Current render generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` while a pan gesture is in progress.
    ///
    /// Hosts may suppress expensive paints while this is set.
    #[must_use]
    pub fn is_panning(&self) -> bool {
        self.gesture.is_active()
    }

    /// Whether the buffer pre-fetches a margin around the view.
    #[must_use]
    pub fn extend_buffer(&self) -> bool {
        self.config.extend_buffer
    }

    /// Turns the pre-fetch margin on or off, rechecking the buffer size.
    pub fn set_extend_buffer(&mut self, extend: bool) {
        if self.config.extend_buffer != extend {
            self.config.extend_buffer = extend;
            self.reset_buffer();
        }
    }

    /// Buffer multiplier used when [`extend_buffer`](Self::extend_buffer) is on.
    #[must_use]
    pub fn extend_coefficient(&self) -> u32 {
        self.buffer.extend_coefficient()
    }

    /// Denominator `N` of the current `1:N` scale.
    #[must_use]
    pub fn current_scale(&self) -> Option<f64> {
        let tx = self.transform.as_ref()?;
        Some(self.scale_of(tx))
    }

    /// Scale at which symbols are drawn at their nominal size, if any.
    #[must_use]
    pub fn reference_scale(&self) -> Option<f64> {
        self.reference_scale
    }

    /// Sets the reference scale. Non-positive values clear it.
    ///
    /// Symbol sizes depend on it, so the buffer is re-rendered.
    pub fn set_reference_scale(&mut self, scale: Option<f64>) {
        let scale = scale.filter(|s| s.is_finite() && *s > 0.0);
        if self.reference_scale != scale {
            self.reference_scale = scale;
            self.invalidate_everything();
        }
    }

    /// Factor symbols are scaled by: reference scale over current scale, or
    /// `1.0` without a reference scale.
    #[must_use]
    pub fn symbol_scale_factor(&self) -> f64 {
        match (self.reference_scale, self.current_scale()) {
            (Some(reference), Some(current)) if current > 0.0 => reference / current,
            _ => 1.0,
        }
    }

    /// Drains queued notifications.
    pub fn take_events(&mut self) -> Vec<ViewEvent> {
        core::mem::take(&mut self.events)
    }

    // --- layers ---

    /// The layer stack.
    #[must_use]
    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    /// Mutable access to one layer.
    ///
    /// Call [`initialize`](Self::initialize) or [`reset`](Self::reset)
    /// afterwards if its data changed.
    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut (dyn Layer + 'static)> {
        self.layers.get_mut(id)
    }

    /// Adds a layer on top of the stack and rebuilds the buffer.
    ///
    /// Returns `None` if the stack has run out of handles; see [`LayerId`].
    pub fn add_layer(&mut self, layer: Box<dyn Layer>) -> Option<LayerId> {
        let Some(id) = self.layers.push(layer) else {
            log::warn!("layer stack is out of handles; layer dropped");
            return None;
        };
        self.reset();
        Some(id)
    }

    /// Removes a layer and rebuilds the buffer.
    pub fn remove_layer(&mut self, id: LayerId) -> Option<Box<dyn Layer>> {
        let layer = self.layers.remove(id)?;
        self.failing.remove(&id);
        self.reset();
        Some(layer)
    }

    /// Shows or hides a layer, rebuilding the buffer if that changed anything.
    pub fn set_layer_visible(&mut self, id: LayerId, visible: bool) -> bool {
        let changed = self.layers.set_visible(id, visible);
        if changed {
            self.reset();
        }
        changed
    }

    // --- coordinate conversion ---

    /// Geographic point to screen pixel.
    #[must_use]
    pub fn proj_to_pixel(&self, pt: Point) -> Option<Point> {
        Some(self.transform.as_ref()?.proj_to_pixel(pt))
    }

    /// Screen pixel to geographic point.
    #[must_use]
    pub fn pixel_to_proj(&self, pt: Point) -> Option<Point> {
        Some(self.transform.as_ref()?.pixel_to_proj(pt))
    }

    /// Geographic extent to the screen rectangle bounding it.
    #[must_use]
    pub fn proj_to_pixel_rect(&self, extent: Extent) -> Option<Rect> {
        Some(self.transform.as_ref()?.proj_to_pixel_rect(extent))
    }

    /// Screen rectangle to the geographic extent bounding it.
    #[must_use]
    pub fn pixel_to_proj_rect(&self, rect: Rect) -> Option<Extent> {
        Some(self.transform.as_ref()?.pixel_to_proj_rect(rect))
    }

    // --- view changes ---

    /// Applies a new view rectangle.
    ///
    /// The visible extent is re-derived from the requested one, so resizing
    /// back restores the previous view exactly. The buffer is reallocated if
    /// its pixel size no longer fits.
    pub fn resize(&mut self, view: Rect) {
        let view = view.abs();
        let size_changed = view.size() != self.view.size();
        let moved = view.origin() != self.view.origin();
        self.view = view;
        self.state = ViewportState::Resizing;
        let rebuilt = self.ensure_buffer();
        if !rebuilt && size_changed {
            self.buffer.recenter();
            self.refresh_transforms();
            self.invalidate_everything();
        } else if !rebuilt && moved {
            self.refresh_transforms();
        }
        if size_changed {
            self.push_extent_changed();
        }
        if self.state == ViewportState::Resizing {
            self.state = ViewportState::Idle;
        }
    }

    /// Rechecks the buffer size without changing the extent.
    pub fn reset_buffer(&mut self) {
        self.ensure_buffer();
    }

    /// Discards the buffer and renders everything again.
    pub fn reset(&mut self) {
        self.buffer.dispose();
        if !self.ensure_buffer() {
            self.invalidate_everything();
        }
    }

    /// Moves the map by `delta` pixels, as if dragged.
    ///
    /// Outside a gesture this is a complete pan and is recorded in the
    /// history; during a gesture only [`end_pan`](Self::end_pan) records.
    /// Returns `None` when no extent is shown.
    pub fn pan(&mut self, delta: Vec2) -> Option<PanOutcome> {
        let outcome = self.pan_by(delta)?;
        if !self.gesture.is_active() {
            self.finish_pan();
        }
        Some(outcome)
    }

    /// Starts a pan gesture with the pointer at `at` (screen pixels).
    pub fn begin_pan(&mut self, at: Point) {
        self.gesture.begin(at);
        self.state = ViewportState::Panning;
    }

    /// Moves the pointer of the current gesture to `at`.
    ///
    /// Returns `None` if no gesture is active or nothing is shown.
    pub fn pan_to(&mut self, at: Point) -> Option<PanOutcome> {
        let delta = self.gesture.update(at)?;
        self.pan_by(delta)
    }

    /// Ends the current gesture and records the resulting extent.
    ///
    /// Returns `false` if no gesture was active.
    pub fn end_pan(&mut self) -> bool {
        if self.gesture.end().is_none() {
            return false;
        }
        self.finish_pan();
        true
    }

    /// Scales the view by `factor` (above one zooms in) about `about`, a
    /// screen pixel that keeps its geographic position, or the center.
    pub fn zoom(&mut self, factor: f64, about: Option<Point>) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let Some(requested) = self.requested else {
            return false;
        };
        let anchor = match (about, &self.transform) {
            (Some(px), Some(tx)) => tx.pixel_to_proj(px),
            _ => requested.center(),
        };
        self.show_extent(requested.scaled_about(anchor, 1.0 / factor), true);
        true
    }

    /// Zooms in by one step.
    pub fn zoom_in(&mut self) -> bool {
        self.zoom(self.config.zoom_step, None)
    }

    /// Zooms out by one step.
    pub fn zoom_out(&mut self) -> bool {
        self.zoom(1.0 / self.config.zoom_step, None)
    }

    /// Shows `extent`, recording it in the history.
    ///
    /// Extents thinner than the configured epsilon (a single point, a
    /// horizontal line) are widened by it instead of failing.
    ///
    /// # Errors
    ///
    /// [`TransformError::NonFinite`] if `extent` has NaN or infinite bounds.
    pub fn zoom_to_extent(&mut self, extent: Extent) -> Result<(), ViewportError> {
        if !extent.is_finite() {
            return Err(TransformError::NonFinite.into());
        }
        self.show_extent(extent, true);
        Ok(())
    }

    /// Returns `true` if [`zoom_to_previous`](Self::zoom_to_previous) would move.
    #[must_use]
    pub fn can_zoom_to_previous(&self) -> bool {
        self.history.can_zoom_to_previous()
    }

    /// Returns `true` if [`zoom_to_next`](Self::zoom_to_next) would move.
    #[must_use]
    pub fn can_zoom_to_next(&self) -> bool {
        self.history.can_zoom_to_next()
    }

    /// Goes back to the previous extent. Does nothing at the oldest entry.
    pub fn zoom_to_previous(&mut self) -> bool {
        if !self.history.can_zoom_to_previous() {
            return false;
        }
        match self.history.zoom_to_previous() {
            Some(extent) => {
                self.show_extent(extent, false);
                true
            }
            None => false,
        }
    }

    /// Goes forward to the next extent. Does nothing at the newest entry.
    pub fn zoom_to_next(&mut self) -> bool {
        if !self.history.can_zoom_to_next() {
            return false;
        }
        match self.history.zoom_to_next() {
            Some(extent) => {
                self.show_extent(extent, false);
                true
            }
            None => false,
        }
    }

    /// Shows the union of all visible layers' extents.
    pub fn zoom_to_max_extent(&mut self) -> bool {
        match self.layers.visible_extent() {
            Some(extent) => self.zoom_to_extent(extent).is_ok(),
            None => false,
        }
    }

    /// Re-centers the view on a geographic point.
    pub fn center_on(&mut self, center: Point) -> bool {
        let Some(requested) = self.requested else {
            return false;
        };
        if !center.is_finite() {
            return false;
        }
        self.show_extent(requested.centered_on(center), true);
        true
    }

    /// Zooms about the view center so that the scale becomes `1:denominator`.
    pub fn zoom_to_scale(&mut self, denominator: f64) -> bool {
        if !denominator.is_finite() || denominator <= 0.0 {
            return false;
        }
        let Some(visible) = self.visible else {
            return false;
        };
        let upp = units_per_pixel_at_scale(denominator, self.config.map_unit, self.config.dpi);
        let size = self.view.size();
        let extent = Extent::from_center_size(visible.center(), size.width * upp, size.height * upp);
        self.show_extent(extent, true);
        true
    }

    /// Rotates the map to `degrees`, normalised into `[0, 360)`.
    ///
    /// Rotation is not recorded in the history.
    pub fn set_angle(&mut self, degrees: f64) {
        if !degrees.is_finite() {
            return;
        }
        let mut angle = degrees % 360.0;
        if angle < 0.0 {
            angle += 360.0;
        }
        if angle >= 360.0 {
            angle = 0.0;
        }
        if angle == self.angle {
            return;
        }
        self.angle = angle;
        self.refresh_transforms();
        self.invalidate_everything();
        self.push_extent_changed();
    }

    /// Re-renders only the given geographic regions, for layers whose data
    /// changed there. Returns how many regions were queued.
    pub fn initialize(&mut self, regions: &[Extent]) -> usize {
        let Some(tx) = self.buffer_transform else {
            return 0;
        };
        let queued = regions
            .iter()
            .filter(|e| e.is_finite())
            .filter(|e| self.dirty.invalidate_extent(**e, &tx))
            .count();
        if queued > 0 {
            self.events
                .push(ViewEvent::RegionsInvalidated { regions: queued });
        }
        queued
    }

    // --- rendering ---

    /// Renders stale regions and copies the visible window to `target`.
    ///
    /// `clip` is the part of the target that needs repainting, in the same
    /// coordinates as [`view`](Self::view). Layer failures are caught and
    /// reported; they never abort the frame.
    pub fn draw<T: RenderTarget + ?Sized>(&mut self, target: &mut T, clip: Rect) -> DrawReport {
        let mut report = DrawReport::default();
        if !self.buffer.is_allocated() {
            self.ensure_buffer();
        }
        self.render_pending(&mut report);
        report.presented = self.buffer.present(target, self.view, clip);
        if self.state == ViewportState::Rebuilding
            && self.pending_deferred == 0
            && self.dirty.is_empty()
        {
            self.state = ViewportState::Idle;
        }
        report
    }

    /// Composites the output of a deferred layer render.
    ///
    /// Output from a superseded generation is dropped.
    pub fn complete_render(&mut self, completion: RenderCompletion) -> CompletionOutcome {
        if completion.generation != self.generation
            || self.pending_deferred == 0
            || self.layers.get(completion.layer).is_none()
        {
            log::trace!(
                "dropping render of {:?} for generation {} (current {})",
                completion.layer,
                completion.generation,
                self.generation
            );
            return CompletionOutcome::Discarded;
        }
        let Some(surface) = self.buffer.surface_mut() else {
            return CompletionOutcome::Discarded;
        };
        surface.composite(&completion.tile, completion.origin);
        self.pending_deferred -= 1;
        if self.pending_deferred == 0 {
            self.deferred_regions.clear();
            if self.state == ViewportState::Rebuilding && self.dirty.is_empty() {
                self.state = ViewportState::Idle;
            }
        }
        CompletionOutcome::Composited
    }

    fn render_pending(&mut self, report: &mut DrawReport) {
        let Some(tx) = self.buffer_transform else {
            return;
        };
        if self.dirty.is_empty() {
            return;
        }
        let clip = clip_envelope(self.buffer.buffer_rect(), self.config.clip_margin);
        let scale = self.scale_of(&tx);
        let regions = self.dirty.take_pending();
        let Some(surface) = self.buffer.surface_mut() else {
            return;
        };
        for region in &regions {
            surface.clear_rect(*region, self.config.background);
        }
        let geo: Vec<Extent> = regions.iter().map(|r| tx.pixel_to_proj_rect(*r)).collect();
        report.regions = regions.len();

        let mut deferred = false;
        let mut retry = false;
        for (id, layer) in self.layers.drawable_mut(scale) {
            let mut args = RenderArgs {
                surface: &mut *surface,
                transform: &tx,
                clip,
                regions: &regions,
                generation: self.generation,
                scale,
                scratch: &mut self.scratch,
            };
            match layer.draw_regions(&mut args, &geo) {
                Ok(status) => {
                    if status == RenderStatus::Deferred {
                        report.layers_deferred += 1;
                        self.pending_deferred += 1;
                        deferred = true;
                    } else {
                        report.layers_rendered += 1;
                    }
                    if self.failing.remove(&id) {
                        log::info!("layer `{}` renders again", layer.name());
                    }
                }
                Err(source) => {
                    retry = true;
                    let name = String::from(layer.name());
                    if self.failing.insert(id) {
                        log::warn!("layer `{name}` failed to render: {source}");
                    } else {
                        log::debug!("layer `{name}` still failing: {source}");
                    }
                    report.failures.push(LayerRenderError {
                        layer: id,
                        name,
                        source,
                    });
                }
            }
        }

        if deferred {
            self.deferred_regions.extend(regions.iter().copied());
        }
        if retry {
            for region in regions {
                self.dirty.invalidate(region);
            }
        }
    }

    // --- internals ---

    fn scale_of(&self, tx: &CoordinateTransform) -> f64 {
        scale_denominator(tx.units_per_pixel(), self.config.map_unit, self.config.dpi)
    }

    fn pan_by(&mut self, delta: Vec2) -> Option<PanOutcome> {
        let tx = self.transform?;
        let requested = self.requested?;
        if !delta.is_finite() {
            return None;
        }
        self.state = ViewportState::Panning;
        if delta == Vec2::ZERO {
            return Some(PanOutcome::Reused);
        }

        self.requested = Some(requested.translated(-tx.pixel_to_proj_vec(delta)));
        let outcome = self.buffer.pan(delta, &mut self.dirty);
        match &outcome {
            PanOutcome::Reused => self.refresh_transforms(),
            PanOutcome::Shifted { shift, revealed } => {
                self.refresh_transforms();
                self.bump_generation();
                // Deferred renders of the old generation will be dropped;
                // their regions moved with the contents and must be redone.
                for region in core::mem::take(&mut self.deferred_regions) {
                    self.dirty.invalidate(region + *shift);
                }
                self.events.push(ViewEvent::RegionsInvalidated {
                    regions: revealed.len(),
                });
            }
            PanOutcome::Invalidated => {
                self.refresh_transforms();
                self.invalidate_everything();
            }
        }
        self.push_extent_changed();
        Some(outcome)
    }

    fn finish_pan(&mut self) {
        if let Some(extent) = self.requested {
            self.history.commit(extent);
        }
        self.state = if self.pending_deferred > 0 || !self.dirty.is_empty() {
            ViewportState::Rebuilding
        } else {
            ViewportState::Idle
        };
    }

    fn show_extent(&mut self, extent: Extent, commit: bool) {
        let epsilon = self.config.extent_epsilon;
        let extent = if extent.is_degenerate(epsilon) {
            log::debug!("widening degenerate extent {extent:?}");
            extent.widened(epsilon)
        } else {
            extent
        };
        if commit {
            self.history.commit(extent);
        }
        self.requested = Some(extent);
        self.buffer.recenter();
        self.refresh_transforms();
        self.invalidate_everything();
        self.push_extent_changed();
    }

    /// Brings the buffer in line with the view. Returns `true` if a new
    /// surface was allocated (and everything invalidated).
    fn ensure_buffer(&mut self) -> bool {
        let resize = match self.buffer.ensure_size(self.view, self.config.extend_buffer) {
            Ok(resize) => resize,
            Err(err) => {
                if !self.allocation_failed {
                    log::warn!("view buffer allocation failed: {err}");
                    self.events.push(ViewEvent::Warning(err.into()));
                    self.allocation_failed = true;
                }
                self.dirty.clear();
                self.dirty.set_bounds(None);
                self.refresh_transforms();
                return false;
            }
        };
        self.allocation_failed = false;
        match resize {
            BufferResize::Unchanged => false,
            BufferResize::Released => {
                self.dirty.clear();
                self.dirty.set_bounds(None);
                self.refresh_transforms();
                false
            }
            BufferResize::Rebuilt | BufferResize::Degraded(_) => {
                if let BufferResize::Degraded(err) = resize {
                    self.events.push(ViewEvent::Warning(err.into()));
                }
                let rect = self.buffer.buffer_rect();
                self.dirty.set_bounds(Some(rect));
                self.events
                    .push(ViewEvent::BufferRebuilt { size: rect.size() });
                self.refresh_transforms();
                self.invalidate_everything();
                true
            }
        }
    }

    fn refresh_transforms(&mut self) {
        self.visible = None;
        self.transform = None;
        self.buffer_transform = None;
        let Some(requested) = self.requested else {
            return;
        };
        if self.view.width() <= 0.0 || self.view.height() <= 0.0 {
            return;
        }
        let visible = requested.fit_aspect(self.view.width() / self.view.height());
        self.visible = Some(visible);
        match CoordinateTransform::new(visible, self.view, self.angle) {
            Ok(tx) => self.transform = Some(tx),
            Err(err) => {
                log::warn!("cannot show {visible:?} in {:?}: {err}", self.view);
                return;
            }
        }
        if self.buffer.is_allocated() {
            self.buffer_transform = self.buffer.transform(visible, self.angle).ok();
        }
    }

    fn bump_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.pending_deferred = 0;
    }

    fn invalidate_everything(&mut self) {
        self.bump_generation();
        self.deferred_regions.clear();
        self.dirty.clear();
        self.dirty.invalidate_all();
        if !self.gesture.is_active() {
            self.state = ViewportState::Rebuilding;
        }
    }

    fn push_extent_changed(&mut self) {
        if let Some(extent) = self.visible.or(self.requested) {
            self.events.push(ViewEvent::ExtentChanged {
                extent,
                generation: self.generation,
            });
        }
    }
}
