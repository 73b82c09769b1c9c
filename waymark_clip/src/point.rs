// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Point;

/// A 2D point the clipper can read and construct.
///
/// Implemented for [`kurbo::Point`] and for raw `[f64; 2]` coordinate pairs,
/// which are used on different rendering fast paths. Both behave identically.
pub trait ClipPoint: Copy + PartialEq {
    /// X coordinate.
    fn x(&self) -> f64;
    /// Y coordinate.
    fn y(&self) -> f64;
    /// Builds a point from its coordinates.
    fn from_xy(x: f64, y: f64) -> Self;
}

impl ClipPoint for Point {
    #[inline]
    fn x(&self) -> f64 {
        self.x
    }

    #[inline]
    fn y(&self) -> f64 {
        self.y
    }

    #[inline]
    fn from_xy(x: f64, y: f64) -> Self {
        Self::new(x, y)
    }
}

impl ClipPoint for [f64; 2] {
    #[inline]
    fn x(&self) -> f64 {
        self[0]
    }

    #[inline]
    fn y(&self) -> f64 {
        self[1]
    }

    #[inline]
    fn from_xy(x: f64, y: f64) -> Self {
        [x, y]
    }
}
