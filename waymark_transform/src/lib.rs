// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=waymark_transform --heading-base-level=0

//! Waymark Transform: geographic extents and the map ↔ pixel transform.
//!
//! This crate provides the pure math at the bottom of a map viewer:
//! - [`Extent`]: an axis‑aligned rectangle in geographic units (Y up), with
//!   aspect correction and degenerate-extent widening.
//! - [`CoordinateTransform`]: a cached affine pair mapping geographic points
//!   and rectangles to device pixels and back, with rotation about the
//!   extent center.
//! - [`LinearUnit`] and [`scale_denominator`]: conversion of the current
//!   resolution into a `1:N` display scale.
//!
//! It does **not** own any buffer, layers, or history. The
//! `waymark_viewport` crate composes these pieces into an interactive view.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use waymark_transform::{CoordinateTransform, Extent};
//!
//! let view = Rect::new(0.0, 0.0, 800.0, 600.0);
//! // Correct the requested extent to the view's aspect before transforming.
//! let extent = Extent::new(0.0, 0.0, 1_000.0, 1_000.0).fit_aspect(view.width() / view.height());
//! let tx = CoordinateTransform::new(extent, view, 0.0).unwrap();
//!
//! let px = tx.proj_to_pixel(Point::new(500.0, 500.0));
//! assert!((px.x - 400.0).abs() < 1e-9 && (px.y - 300.0).abs() < 1e-9);
//!
//! let back = tx.pixel_to_proj(px);
//! assert!((back.x - 500.0).abs() < 1e-9);
//! ```
//!
//! ## Degenerate extents
//!
//! A zero-width or zero-height extent has no defined scale, and
//! [`CoordinateTransform::new`] rejects it with
//! [`TransformError::DegenerateExtent`]. Widen such extents first:
//!
//! ```rust
//! use kurbo::Rect;
//! use waymark_transform::{CoordinateTransform, EXTENT_EPSILON, Extent};
//!
//! let point = Extent::new(10.0, 10.0, 10.0, 10.0);
//! assert!(point.is_degenerate(EXTENT_EPSILON));
//!
//! let tx = CoordinateTransform::new(
//!     point.widened(EXTENT_EPSILON),
//!     Rect::new(0.0, 0.0, 100.0, 100.0),
//!     0.0,
//! )
//! .unwrap();
//! assert!(tx.proj_to_pixel(point.center()).x.is_finite());
//! ```
//!
//! This crate is `no_std`.

#![no_std]

mod error;
mod extent;
mod transform;
pub mod units;

pub use error::TransformError;
pub use extent::{EXTENT_EPSILON, Extent};
pub use transform::CoordinateTransform;
pub use units::{LinearUnit, scale_denominator, units_per_pixel_at_scale};
