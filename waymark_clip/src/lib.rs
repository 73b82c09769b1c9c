// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=waymark_clip --heading-base-level=0

//! Waymark Clip: Sutherland–Hodgman clipping against a drawing envelope.
//!
//! At extreme zoom, projected vector geometry can land millions of pixels off
//! screen. Handing such coordinates to a rasterizer wastes work and can
//! overflow fixed-point math. This crate clips point rings against an
//! axis‑aligned rectangle, typically the render buffer grown by
//! [`DEFAULT_CLIP_MARGIN`] (see [`clip_envelope`]).
//!
//! - [`clip_polygon`] clips one ring and returns a closed result.
//! - [`clip_polygon_with_scratch`] does the same with reusable storage.
//! - [`ClipPoint`] abstracts over [`kurbo::Point`] and raw `[f64; 2]` pairs.
//!
//! The four half-planes are applied in turn (max X, max Y, min X, min Y).
//! Crossing points are found by linear interpolation along the crossed axis
//! and snapped exactly onto the boundary.
//!
//! ```rust
//! use kurbo::Rect;
//! use waymark_clip::clip_polygon;
//!
//! let ring = [[5.0, 5.0], [50.0, -10.0], [95.0, 5.0], [70.0, 50.0], [30.0, 50.0]];
//! let out = clip_polygon(&ring, Rect::new(0.0, 0.0, 100.0, 40.0));
//!
//! assert_eq!(out.first(), out.last());
//! assert!(out.iter().all(|[_, y]| (0.0..=40.0).contains(y)));
//! ```
//!
//! All functions are pure and hold no shared state.
//!
//! This crate is `no_std`.

#![no_std]

extern crate alloc;

mod clip;
mod point;

pub use clip::{
    ClipScratch, DEFAULT_CLIP_MARGIN, clip_envelope, clip_polygon, clip_polygon_with_scratch,
    is_inside,
};
pub use point::ClipPoint;
