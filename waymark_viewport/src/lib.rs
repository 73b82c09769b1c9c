// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=waymark_viewport --heading-base-level=0

//! Waymark Viewport: an interactive, buffered 2D map view.
//!
//! [`Viewport`] ties the lower-level crates together:
//!
//! - the visible geographic extent and the
//!   [`CoordinateTransform`](waymark_transform::CoordinateTransform) between
//!   map units and screen pixels, with optional rotation;
//! - an off-screen [`ViewBuffer`](waymark_buffer::ViewBuffer), by default
//!   three times the view, so short pans only move a window over pixels
//!   that are already rendered;
//! - a [`RegionInvalidator`](waymark_dirty::RegionInvalidator) that records
//!   which parts of the buffer are stale;
//! - an [`ExtentHistory`](waymark_history::ExtentHistory) behind zoom to
//!   previous / next;
//! - a [`LayerStack`] of [`Layer`]s that paint stale regions on demand.
//!
//! Nothing is drawn when the view changes. Changes only mark regions stale;
//! [`Viewport::draw`] renders them and copies the visible window to a
//! [`RenderTarget`](waymark_buffer::RenderTarget). Layer failures are caught
//! per layer and reported in the [`DrawReport`].
//!
//! Layers that render elsewhere (on a worker, say) answer
//! [`RenderStatus::Deferred`] and later hand their pixels to
//! [`Viewport::complete_render`], tagged with the render generation they were
//! given. Output for a generation the view has since moved past is dropped.
//!
//! ## Quick Start
//!
//! ```rust
//! use kurbo::{Rect, Vec2};
//! use peniko::Color;
//! use waymark_buffer::{PanOutcome, RecordingTarget};
//! use waymark_transform::Extent;
//! use waymark_viewport::{
//!     Layer, LayerError, RenderArgs, RenderStatus, Viewport, ViewportConfig,
//! };
//!
//! struct Land;
//!
//! impl Layer for Land {
//!     fn name(&self) -> &str {
//!         "land"
//!     }
//!
//!     fn extent(&self) -> Option<Extent> {
//!         Some(Extent::new(0.0, 0.0, 1000.0, 500.0))
//!     }
//!
//!     fn draw_regions(
//!         &mut self,
//!         args: &mut RenderArgs<'_>,
//!         _regions: &[Extent],
//!     ) -> Result<RenderStatus, LayerError> {
//!         let field = Extent::new(100.0, 100.0, 900.0, 400.0);
//!         let bounds = args.transform().proj_to_pixel_rect(field);
//!         args.surface().fill_rect(bounds, Color::from_rgb8(40, 160, 60));
//!         Ok(RenderStatus::Complete)
//!     }
//! }
//!
//! let view = Rect::new(0.0, 0.0, 400.0, 200.0);
//! let mut viewport = Viewport::new(ViewportConfig::default(), view);
//! viewport.add_layer(Box::new(Land));
//! assert!(viewport.zoom_to_max_extent());
//!
//! let mut screen = RecordingTarget::new();
//! let report = viewport.draw(&mut screen, view);
//! assert_eq!(report.layers_rendered, 1);
//! assert!(report.presented);
//!
//! // A short drag reuses the pre-rendered margin.
//! assert_eq!(viewport.pan(Vec2::new(50.0, 0.0)), Some(PanOutcome::Reused));
//! assert!(viewport.can_zoom_to_previous());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod config;
mod error;
mod event;
mod gesture;
mod layer;
mod viewport;

pub use config::{DEFAULT_DPI, DEFAULT_ZOOM_STEP, ViewportConfig};
pub use error::{LayerError, LayerRenderError, ViewportError};
pub use event::{CompletionOutcome, RenderCompletion, ViewEvent};
pub use gesture::PanGesture;
pub use layer::{Layer, LayerId, LayerStack, RenderArgs, RenderStatus};
pub use viewport::{DrawReport, Viewport, ViewportState};
