// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _; // for `ceil` and `floor`
use kurbo::{Point, Rect, Size, Vec2};
use peniko::Color;
use smallvec::SmallVec;
use waymark_dirty::RegionInvalidator;
use waymark_transform::{CoordinateTransform, Extent, TransformError};

use crate::error::BufferAllocationError;
use crate::surface::PixelSurface;
use crate::target::RenderTarget;

/// Default multiplier between the view and the buffer when pre-fetch is on.
pub const DEFAULT_EXTEND_COEFFICIENT: u32 = 3;

/// Default limit for one side of a surface, in pixels.
pub const DEFAULT_MAX_DIMENSION: u32 = 16_384;

/// What [`ViewBuffer::ensure_size`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferResize {
    /// The surface already had the required size. Its contents and the view
    /// window position are kept.
    Unchanged,
    /// A new surface was allocated; everything must be rendered.
    Rebuilt,
    /// The extended surface could not be allocated and an unextended one was
    /// used instead; everything must be rendered.
    Degraded(BufferAllocationError),
    /// The view is empty and the surface was released.
    Released,
}

impl BufferResize {
    /// Returns `true` if the surface was replaced and needs a full render.
    #[must_use]
    pub fn is_rebuilt(&self) -> bool {
        matches!(self, Self::Rebuilt | Self::Degraded(_))
    }
}

/// Rectangles uncovered by one shift; at most a column and a row strip.
pub type RevealedStrips = SmallVec<[Rect; 2]>;

/// What [`ViewBuffer::pan`] did.
#[derive(Clone, Debug, PartialEq)]
pub enum PanOutcome {
    /// The view window still lies inside the rendered buffer; nothing to draw.
    Reused,
    /// The contents were shifted back under the view window by a whole
    /// number of pixels, and the uncovered strips were invalidated.
    Shifted {
        /// Whole-pixel displacement applied to the contents.
        shift: Vec2,
        /// Buffer-space strips that must be rendered.
        revealed: RevealedStrips,
    },
    /// The pan was larger than the buffer; the whole buffer was invalidated.
    Invalidated,
}

impl PanOutcome {
    /// Returns `true` if layers have to render something.
    #[must_use]
    pub fn requires_render(&self) -> bool {
        !matches!(self, Self::Reused)
    }
}

/// Off-screen buffer larger than the view, for cheap panning.
///
/// With pre-fetch enabled the buffer is [`extend_coefficient`] times the view
/// in each direction and the view window sits in its middle. A pan first
/// moves only the window; when the window would leave the buffer, the
/// contents are shifted back under it and the uncovered strips are queued
/// for rendering.
///
/// The surface is owned: replacing it drops the old one before allocating
/// the new one, and [`dispose`](Self::dispose) releases it deterministically.
///
/// [`extend_coefficient`]: Self::extend_coefficient
#[derive(Debug)]
pub struct ViewBuffer {
    surface: Option<PixelSurface>,
    extend_coefficient: u32,
    max_dimension: u32,
    extended: bool,
    view_size: Size,
    /// Top-left of the view window inside the buffer.
    view_offset: Vec2,
    home: Vec2,
    /// View pixel size for which the extended allocation already failed.
    degraded_for: Option<(u32, u32)>,
}

impl Default for ViewBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_EXTEND_COEFFICIENT, DEFAULT_MAX_DIMENSION)
    }
}

impl ViewBuffer {
    /// Creates a buffer with no surface yet.
    ///
    /// A coefficient of zero is treated as one.
    #[must_use]
    pub fn new(extend_coefficient: u32, max_dimension: u32) -> Self {
        Self {
            surface: None,
            extend_coefficient: extend_coefficient.max(1),
            max_dimension,
            extended: false,
            view_size: Size::ZERO,
            view_offset: Vec2::ZERO,
            home: Vec2::ZERO,
            degraded_for: None,
        }
    }

    /// Multiplier applied to the view size when pre-fetch is enabled.
    #[must_use]
    pub fn extend_coefficient(&self) -> u32 {
        self.extend_coefficient
    }

    /// Returns `true` if the current surface is larger than the view.
    #[must_use]
    pub fn is_extended(&self) -> bool {
        self.extended
    }

    /// Returns `true` if a surface is allocated.
    #[must_use]
    pub fn is_allocated(&self) -> bool {
        self.surface.is_some()
    }

    /// The raster surface, if allocated.
    #[must_use]
    pub fn surface(&self) -> Option<&PixelSurface> {
        self.surface.as_ref()
    }

    /// Mutable access to the raster surface, for layers to paint into.
    pub fn surface_mut(&mut self) -> Option<&mut PixelSurface> {
        self.surface.as_mut()
    }

    /// Rectangle of the whole buffer in buffer pixels.
    #[must_use]
    pub fn buffer_rect(&self) -> Rect {
        self.surface.as_ref().map_or(Rect::ZERO, PixelSurface::bounds)
    }

    /// Top-left of the view window inside the buffer.
    #[must_use]
    pub fn view_offset(&self) -> Vec2 {
        self.view_offset
    }

    /// The part of the buffer currently shown, in buffer pixels.
    #[must_use]
    pub fn view_window(&self) -> Rect {
        Rect::from_origin_size(self.view_offset.to_point(), self.view_size)
    }

    /// Makes sure the surface matches `view`, reallocating if needed.
    ///
    /// The required size is the view size rounded up to whole pixels and
    /// multiplied by the extend coefficient when `extend` is set. If the
    /// extended surface cannot be allocated, an unextended one is tried and
    /// [`BufferResize::Degraded`] reports the original failure. The fallback
    /// sticks for this view size, so the warning is logged once rather than
    /// on every call.
    ///
    /// # Errors
    ///
    /// Returns the allocation error if not even an unextended surface could
    /// be allocated. The buffer is then left without a surface.
    pub fn ensure_size(
        &mut self,
        view: Rect,
        extend: bool,
    ) -> Result<BufferResize, BufferAllocationError> {
        let view = view.abs();
        self.view_size = view.size();
        let (vw, vh) = whole_size(view.size());
        if vw == 0 || vh == 0 {
            let had_surface = self.surface.is_some();
            self.dispose();
            return Ok(if had_surface {
                BufferResize::Released
            } else {
                BufferResize::Unchanged
            });
        }

        if self.degraded_for.is_some_and(|size| size != (vw, vh)) {
            self.degraded_for = None;
        }
        let extend = extend && self.extend_coefficient > 1 && self.degraded_for.is_none();
        let k = if extend { self.extend_coefficient } else { 1 };
        let (bw, bh) = (vw.saturating_mul(k), vh.saturating_mul(k));

        if let Some(surface) = &self.surface
            && surface.width() == bw
            && surface.height() == bh
        {
            return Ok(BufferResize::Unchanged);
        }

        // Release the old surface before asking for a new one.
        self.surface = None;
        match PixelSurface::new(bw, bh, self.max_dimension) {
            Ok(surface) => {
                log::debug!("view buffer rebuilt at {bw}x{bh}");
                self.install(surface, extend, vw, vh);
                Ok(BufferResize::Rebuilt)
            }
            Err(err) if k > 1 => {
                log::warn!("view buffer unavailable ({err}); falling back to {vw}x{vh}");
                self.degraded_for = Some((vw, vh));
                let surface = PixelSurface::new(vw, vh, self.max_dimension)?;
                self.install(surface, false, vw, vh);
                Ok(BufferResize::Degraded(err))
            }
            Err(err) => Err(err),
        }
    }

    /// Moves the view window by `-delta` pixels, following a drag of `delta`.
    ///
    /// While the window stays inside the buffer this is free. Otherwise the
    /// contents are shifted by whole pixels to bring the window home, pending
    /// regions in `dirty` are moved along with them, and the uncovered strips
    /// are added to `dirty`. A diagonal shift uncovers one full-height column
    /// strip and one row strip that excludes the shared corner. A shift of
    /// the buffer's size or more invalidates everything.
    pub fn pan(&mut self, delta: Vec2, dirty: &mut RegionInvalidator) -> PanOutcome {
        let offset = self.view_offset - delta;
        let Some(surface) = self.surface.as_mut() else {
            self.view_offset = offset;
            return PanOutcome::Invalidated;
        };

        // Judge the window where `present` will put it, so a fractional
        // remainder never lets it hang over the buffer edge.
        let bounds = surface.bounds();
        let window = Rect::from_origin_size(snap(offset).to_point(), self.view_size);
        if bounds.contains_rect(window) {
            self.view_offset = offset;
            return PanOutcome::Reused;
        }

        let shift = self.home - snap(offset);
        self.view_offset = offset + shift;

        let size = surface.size();
        if shift.x.abs() >= size.width || shift.y.abs() >= size.height {
            surface.clear(Color::TRANSPARENT);
            dirty.clear();
            dirty.invalidate(bounds);
            return PanOutcome::Invalidated;
        }

        let (dx, dy) = whole_pixels(shift);
        surface.shift(dx, dy);
        dirty.translate(shift);
        let revealed = revealed_strips(shift, size);
        for strip in &revealed {
            dirty.invalidate(*strip);
        }
        log::trace!("view buffer shifted by {dx},{dy}");
        PanOutcome::Shifted { shift, revealed }
    }

    /// Puts the view window back at the middle of the buffer.
    ///
    /// The buffer contents are not moved, so they no longer line up with the
    /// window; callers re-render afterwards.
    pub fn recenter(&mut self) {
        self.view_offset = self.home;
    }

    /// Transform mapping `extent` onto the view window inside the buffer.
    ///
    /// `extent` is the visible extent of the view; geographic points outside
    /// it land in the buffer margin.
    ///
    /// # Errors
    ///
    /// See [`CoordinateTransform::new`].
    pub fn transform(
        &self,
        extent: Extent,
        angle_degrees: f64,
    ) -> Result<CoordinateTransform, TransformError> {
        CoordinateTransform::new(extent, self.view_window(), angle_degrees)
    }

    /// Copies the visible part of the buffer to `target`.
    ///
    /// `view` is where the view sits on the target and `clip` the area of the
    /// target that needs repainting. Returns `false` when nothing was copied.
    pub fn present<T: RenderTarget + ?Sized>(&self, target: &mut T, view: Rect, clip: Rect) -> bool {
        let Some(surface) = &self.surface else {
            return false;
        };
        let view = view.abs();
        let clip = clip.abs().intersect(view);
        if clip.width() <= 0.0 || clip.height() <= 0.0 {
            return false;
        }
        let origin = view.origin().to_vec2();
        let offset = snap(self.view_offset);
        let src = (clip - origin + offset).intersect(surface.bounds());
        if src.width() <= 0.0 || src.height() <= 0.0 {
            return false;
        }
        target.blit(surface, src, src.origin() - offset + origin);
        true
    }

    /// Releases the surface. The next [`ensure_size`](Self::ensure_size)
    /// allocates a fresh one.
    pub fn dispose(&mut self) {
        self.surface = None;
        self.extended = false;
        self.degraded_for = None;
    }

    fn install(&mut self, surface: PixelSurface, extended: bool, vw: u32, vh: u32) {
        let (bw, bh) = (surface.width(), surface.height());
        self.surface = Some(surface);
        self.extended = extended;
        self.set_home(bw, bh, vw, vh);
    }

    fn set_home(&mut self, bw: u32, bh: u32, vw: u32, vh: u32) {
        self.home = Vec2::new(f64::from((bw - vw) / 2), f64::from((bh - vh) / 2));
        self.recenter();
    }
}

/// Rounds to whole pixels with halves going up, so an offset `home + f`
/// with `f` in `[-0.5, 0.5)` always lands on `home`.
fn snap(v: Vec2) -> Vec2 {
    Vec2::new((v.x + 0.5).floor(), (v.y + 0.5).floor())
}

/// Strips of a `size` buffer uncovered by shifting its contents by `shift`.
fn revealed_strips(shift: Vec2, size: Size) -> RevealedStrips {
    let (w, h) = (size.width, size.height);
    let mut out = RevealedStrips::new();
    let (x0, x1) = if shift.x > 0.0 {
        out.push(Rect::new(0.0, 0.0, shift.x, h));
        (shift.x, w)
    } else if shift.x < 0.0 {
        out.push(Rect::new(w + shift.x, 0.0, w, h));
        (0.0, w + shift.x)
    } else {
        (0.0, w)
    };
    if shift.y > 0.0 {
        out.push(Rect::new(x0, 0.0, x1, shift.y));
    } else if shift.y < 0.0 {
        out.push(Rect::new(x0, h + shift.y, x1, h));
    }
    out
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "sizes are rounded up and clamped to the u32 range first"
)]
fn whole_size(size: Size) -> (u32, u32) {
    let clamp = |v: f64| {
        if v.is_finite() {
            v.ceil().clamp(0.0, f64::from(u32::MAX)) as u32
        } else {
            0
        }
    };
    (clamp(size.width), clamp(size.height))
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "shifts are whole numbers smaller than the surface size"
)]
fn whole_pixels(shift: Vec2) -> (i32, i32) {
    let clamp = |v: f64| v.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32;
    (clamp(shift.x), clamp(shift.y))
}
