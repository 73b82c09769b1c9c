// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;
use alloc::vec::Vec;

use kurbo::{Point, Rect};
use waymark_buffer::PixelSurface;
use waymark_clip::{ClipScratch, clip_polygon_with_scratch};
use waymark_transform::{CoordinateTransform, Extent};

use crate::error::LayerError;

/// Handle to a layer in a [`LayerStack`].
///
/// Handles are plain indices and never reused, so a handle to a removed
/// layer simply resolves to nothing. A stack hands out at most `u32::MAX + 1`
/// handles over its lifetime; [`LayerStack::push`] refuses layers after that.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u32);

impl LayerId {
    /// The raw index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    fn from_slot(slot: usize) -> Option<Self> {
        u32::try_from(slot).ok().map(Self)
    }
}

/// How a layer handled a render request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderStatus {
    /// The layer painted its regions into the buffer.
    Complete,
    /// The layer will deliver its pixels later as a
    /// [`RenderCompletion`](crate::RenderCompletion) tagged with
    /// [`RenderArgs::generation`].
    Deferred,
}

/// Something the viewport can draw.
///
/// Layers are idempotent painters: they may be asked to paint a region more
/// than once and must not assume they are asked for the whole visible
/// extent.
pub trait Layer {
    /// Display name, used in logs and errors.
    fn name(&self) -> &str;

    /// Geographic bounds of the layer's data, if known.
    fn extent(&self) -> Option<Extent> {
        None
    }

    /// Returns `false` if the layer should be skipped at `scale` (`1:scale`).
    fn visible_at_scale(&self, scale: f64) -> bool {
        let _ = scale;
        true
    }

    /// Paints the stale `regions` into `args`.
    ///
    /// # Errors
    ///
    /// Any error is caught by the viewport and reported per layer; it never
    /// stops other layers from rendering.
    fn draw_regions(
        &mut self,
        args: &mut RenderArgs<'_>,
        regions: &[Extent],
    ) -> Result<RenderStatus, LayerError>;
}

/// Reusable scratch storage for [`RenderArgs::project_polygon`].
#[derive(Debug, Default)]
pub(crate) struct DrawScratch {
    projected: Vec<Point>,
    clip: ClipScratch<Point>,
}

/// Everything a layer needs to paint into the buffer.
#[derive(Debug)]
pub struct RenderArgs<'a> {
    pub(crate) surface: &'a mut PixelSurface,
    pub(crate) transform: &'a CoordinateTransform,
    pub(crate) clip: Rect,
    pub(crate) regions: &'a [Rect],
    pub(crate) generation: u64,
    pub(crate) scale: f64,
    pub(crate) scratch: &'a mut DrawScratch,
}

impl RenderArgs<'_> {
    /// The buffer surface to paint into.
    pub fn surface(&mut self) -> &mut PixelSurface {
        self.surface
    }

    /// Transform from geographic units to buffer pixels.
    #[must_use]
    pub fn transform(&self) -> &CoordinateTransform {
        self.transform
    }

    /// The clip envelope around the buffer, in buffer pixels.
    #[must_use]
    pub fn clip_envelope(&self) -> Rect {
        self.clip
    }

    /// The stale regions in buffer pixels, matching the geographic regions
    /// passed to [`Layer::draw_regions`].
    #[must_use]
    pub fn pixel_regions(&self) -> &[Rect] {
        self.regions
    }

    /// Generation of this render; deferred results must carry it back.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Current scale denominator (`1:scale`).
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Projects a geographic ring to buffer pixels and clips it to the clip
    /// envelope.
    ///
    /// The result is empty or a closed ring. It borrows scratch storage that
    /// the next call reuses.
    pub fn project_polygon(&mut self, ring: &[Point]) -> &[Point] {
        let transform = self.transform;
        let DrawScratch { projected, clip } = &mut *self.scratch;
        projected.clear();
        projected.extend(ring.iter().map(|&pt| transform.proj_to_pixel(pt)));
        clip_polygon_with_scratch(projected, self.clip, clip)
    }
}

struct Slot {
    layer: Box<dyn Layer>,
    visible: bool,
}

/// Ordered collection of layers, drawn first to last.
///
/// The stack is the sole owner of its layers. Everything else refers to
/// them by [`LayerId`].
#[derive(Default)]
pub struct LayerStack {
    slots: Vec<Option<Slot>>,
}

impl core::fmt::Debug for LayerStack {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|(id, layer)| (id, layer.name())))
            .finish()
    }
}

impl LayerStack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `layer` on top and returns its handle. New layers are visible.
    ///
    /// Returns `None`, dropping `layer`, once every handle has been issued.
    pub fn push(&mut self, layer: Box<dyn Layer>) -> Option<LayerId> {
        let id = LayerId::from_slot(self.slots.len())?;
        self.slots.push(Some(Slot {
            layer,
            visible: true,
        }));
        Some(id)
    }

    /// Removes and returns a layer.
    pub fn remove(&mut self, id: LayerId) -> Option<Box<dyn Layer>> {
        let slot = self.slots.get_mut(id.0 as usize)?.take()?;
        Some(slot.layer)
    }

    /// Returns the layer behind `id`.
    #[must_use]
    pub fn get(&self, id: LayerId) -> Option<&dyn Layer> {
        self.slot(id).map(|s| &*s.layer)
    }

    /// Returns the layer behind `id` mutably.
    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut (dyn Layer + 'static)> {
        let slot = self.slots.get_mut(id.0 as usize)?.as_mut()?;
        Some(&mut *slot.layer)
    }

    /// Returns `true` if `id` is present and switched on.
    #[must_use]
    pub fn is_visible(&self, id: LayerId) -> bool {
        self.slot(id).is_some_and(|s| s.visible)
    }

    /// Switches a layer on or off. Returns `true` if anything changed.
    pub fn set_visible(&mut self, id: LayerId, visible: bool) -> bool {
        match self.slots.get_mut(id.0 as usize).and_then(Option::as_mut) {
            Some(slot) if slot.visible != visible => {
                slot.visible = visible;
                true
            }
            _ => false,
        }
    }

    /// Number of layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Returns `true` if there are no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over layers in draw order.
    pub fn iter(&self) -> impl Iterator<Item = (LayerId, &dyn Layer)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            let slot = slot.as_ref()?;
            Some((LayerId::from_slot(i)?, &*slot.layer))
        })
    }

    /// Union of the extents of all visible layers that report one.
    #[must_use]
    pub fn visible_extent(&self) -> Option<Extent> {
        self.iter()
            .filter(|(id, _)| self.is_visible(*id))
            .filter_map(|(_, layer)| layer.extent())
            .filter(Extent::is_finite)
            .reduce(Extent::union)
    }

    /// Visible layers that draw at `scale`, in draw order, mutably.
    pub(crate) fn drawable_mut(
        &mut self,
        scale: f64,
    ) -> impl Iterator<Item = (LayerId, &mut (dyn Layer + 'static))> + '_ {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(move |(i, slot)| {
                let slot = slot.as_mut()?;
                if !slot.visible || !slot.layer.visible_at_scale(scale) {
                    return None;
                }
                Some((LayerId::from_slot(i)?, &mut *slot.layer))
            })
    }

    fn slot(&self, id: LayerId) -> Option<&Slot> {
        self.slots.get(id.0 as usize)?.as_ref()
    }
}
