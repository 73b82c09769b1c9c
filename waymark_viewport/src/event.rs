// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Size};
use waymark_buffer::PixelSurface;
use waymark_transform::Extent;

use crate::error::ViewportError;
use crate::layer::LayerId;

/// Notification queued by the viewport for the host.
///
/// The host drains the queue with [`Viewport::take_events`](crate::Viewport::take_events),
/// typically once per event-loop turn, and reacts (repaint, update a scale
/// bar, show a warning).
#[derive(Debug)]
pub enum ViewEvent {
    /// The visible extent changed.
    ExtentChanged {
        /// The new visible extent.
        extent: Extent,
        /// Render generation after the change.
        generation: u64,
    },
    /// A new raster surface was allocated.
    BufferRebuilt {
        /// Size of the surface in pixels.
        size: Size,
    },
    /// Parts of the buffer were queued for rendering without a full rebuild.
    RegionsInvalidated {
        /// Number of regions queued.
        regions: usize,
    },
    /// A recoverable problem the user may want to know about.
    Warning(ViewportError),
}

/// Pixels a layer rendered after answering
/// [`RenderStatus::Deferred`](crate::RenderStatus::Deferred).
#[derive(Debug)]
pub struct RenderCompletion {
    /// Layer that rendered the tile.
    pub layer: LayerId,
    /// The generation from the [`RenderArgs`](crate::RenderArgs) of the request.
    pub generation: u64,
    /// Where the tile's top-left corner goes, in buffer pixels.
    pub origin: Point,
    /// The rendered pixels.
    pub tile: PixelSurface,
}

/// What [`Viewport::complete_render`](crate::Viewport::complete_render) did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The tile was composited into the buffer.
    Composited,
    /// The tile belongs to a superseded generation (or a removed layer) and
    /// was dropped.
    Discarded,
}
