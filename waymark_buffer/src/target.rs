// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use kurbo::{Point, Rect, Size};

use crate::surface::PixelSurface;

/// Destination of a presented frame, typically the host's on-screen control.
///
/// The view buffer calls [`blit`](Self::blit) once per paint with the part of
/// its surface that is visible.
pub trait RenderTarget {
    /// Copies the `src` rectangle of `surface` so its top-left corner lands
    /// at `dest` on the target.
    fn blit(&mut self, surface: &PixelSurface, src: Rect, dest: Point);
}

impl RenderTarget for PixelSurface {
    fn blit(&mut self, surface: &PixelSurface, src: Rect, dest: Point) {
        self.copy_from(surface, src, dest);
    }
}

/// A blit recorded by [`RecordingTarget`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Blit {
    /// Source rectangle in buffer pixels.
    pub src: Rect,
    /// Destination of the top-left corner on the target.
    pub dest: Point,
    /// Size of the surface the blit read from.
    pub surface_size: Size,
}

/// A [`RenderTarget`] that records blits instead of copying pixels.
///
/// Intended for tests and debugging that want to assert on what would be
/// put on screen, and when.
#[derive(Clone, Debug, Default)]
pub struct RecordingTarget {
    blits: Vec<Blit>,
}

impl RecordingTarget {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Blits in the order they were issued.
    #[must_use]
    pub fn blits(&self) -> &[Blit] {
        &self.blits
    }

    /// The most recent blit, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Blit> {
        self.blits.last()
    }

    /// Forgets all recorded blits.
    pub fn clear(&mut self) {
        self.blits.clear();
    }
}

impl RenderTarget for RecordingTarget {
    fn blit(&mut self, surface: &PixelSurface, src: Rect, dest: Point) {
        self.blits.push(Blit {
            src,
            dest,
            surface_size: surface.size(),
        });
    }
}
