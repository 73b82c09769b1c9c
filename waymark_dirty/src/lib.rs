// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=waymark_dirty --heading-base-level=0

//! Waymark Dirty: coalescing invalidation of buffer regions.
//!
//! A buffered map view only repaints the parts of its pixel buffer that are
//! stale. This crate tracks those parts:
//!
//! - [`RegionInvalidator`]: accumulates dirty rectangles in buffer pixel
//!   space, rounding them out to whole pixels, clipping them to the buffer,
//!   and merging them per a [`Coalesce`] policy.
//! - [`RegionSet`]: the drained, coalesced regions handed to renderers.
//! - A **generation** counter on the invalidator that bumps on every mutation.
//!
//! Geographic extents can be invalidated directly through a
//! [`CoordinateTransform`](waymark_transform::CoordinateTransform), which is
//! how data-change notifications reach the buffer.
//!
//! ## Quick Start
//!
//! ```rust
//! use kurbo::{Rect, Vec2};
//! use waymark_dirty::{Coalesce, RegionInvalidator};
//!
//! let mut dirty = RegionInvalidator::new().with_coalesce(Coalesce::Overlapping);
//! dirty.set_bounds(Some(Rect::new(0.0, 0.0, 900.0, 900.0)));
//!
//! // A diagonal pan reveals a column strip and a row strip.
//! dirty.invalidate(Rect::new(0.0, 0.0, 20.0, 900.0));
//! dirty.invalidate(Rect::new(20.0, 0.0, 900.0, 10.0));
//! assert_eq!(dirty.len(), 2);
//!
//! // Contents moved by another pan: pending regions move with them.
//! dirty.translate(Vec2::new(5.0, 0.0));
//!
//! let regions = dirty.take_pending();
//! assert_eq!(regions.len(), 2);
//! assert!(dirty.is_empty());
//! ```
//!
//! This crate is `no_std`.

#![no_std]

mod invalidator;

pub use invalidator::{Coalesce, DEFAULT_MAX_REGIONS, RegionInvalidator, RegionSet};
