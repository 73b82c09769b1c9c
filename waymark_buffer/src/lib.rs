// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=waymark_buffer --heading-base-level=0

//! Waymark Buffer: the off-screen raster behind a map view.
//!
//! - [`PixelSurface`]: a premultiplied RGBA8 raster over a
//!   [`vello_cpu::Pixmap`] with the handful of operations a buffered view
//!   needs (fill, clear, shift, composite).
//! - [`ViewBuffer`]: a surface sized [`extend_coefficient`] times the view so
//!   that pans move a window over already rendered pixels. When the window
//!   leaves the buffer the contents are shifted and only the revealed strips
//!   are handed to a [`RegionInvalidator`](waymark_dirty::RegionInvalidator).
//! - [`RenderTarget`]: where the visible window is copied on paint.
//!   [`RecordingTarget`] records those copies for tests.
//!
//! Allocation failures are reported as [`BufferAllocationError`]; an extended
//! buffer that cannot be allocated degrades to the view size instead of
//! failing.
//!
//! ```rust
//! use kurbo::{Rect, Vec2};
//! use waymark_buffer::{BufferResize, PanOutcome, ViewBuffer};
//! use waymark_dirty::RegionInvalidator;
//!
//! let mut buffer = ViewBuffer::new(3, 4096);
//! let view = Rect::new(0.0, 0.0, 200.0, 100.0);
//! assert_eq!(buffer.ensure_size(view, true), Ok(BufferResize::Rebuilt));
//!
//! let mut dirty = RegionInvalidator::new();
//! // Inside the pre-fetched margin: no rendering needed.
//! assert_eq!(buffer.pan(Vec2::new(150.0, 0.0), &mut dirty), PanOutcome::Reused);
//! // Past it: a strip on the left is revealed.
//! assert!(buffer.pan(Vec2::new(100.0, 0.0), &mut dirty).requires_render());
//! assert!(!dirty.is_empty());
//! ```
//!
//! [`extend_coefficient`]: ViewBuffer::extend_coefficient
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod error;
mod surface;
mod target;
mod view_buffer;

pub use error::BufferAllocationError;
pub use surface::PixelSurface;
pub use target::{Blit, RecordingTarget, RenderTarget};
pub use view_buffer::{
    BufferResize, DEFAULT_EXTEND_COEFFICIENT, DEFAULT_MAX_DIMENSION, PanOutcome, RevealedStrips,
    ViewBuffer,
};
