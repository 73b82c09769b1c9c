// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Rect, Size, Vec2};

/// Width or height at or below which an [`Extent`] is considered degenerate.
pub const EXTENT_EPSILON: f64 = 1e-7;

/// Relative tolerance used when comparing aspect ratios.
const ASPECT_TOLERANCE: f64 = 1e-12;

/// Axis‑aligned bounding rectangle in geographic units.
///
/// Unlike a device rectangle, the Y axis of an extent points "north": a larger
/// `max_y` is further up on screen. The constructor normalizes its inputs so
/// that `min_x <= max_x` and `min_y <= max_y` always hold.
///
/// Extents are plain `Copy` values. Every operation returns a new extent; the
/// viewport replaces its extent wholesale so that history entries never alias.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Extent {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Extent {
    /// Creates an extent from two opposite corners, in any order.
    #[must_use]
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            min_x: x0.min(x1),
            min_y: y0.min(y1),
            max_x: x0.max(x1),
            max_y: y0.max(y1),
        }
    }

    /// Creates an extent of the given size centered on `center`.
    ///
    /// Negative sizes are treated as their absolute value.
    #[must_use]
    pub fn from_center_size(center: Point, width: f64, height: f64) -> Self {
        let hw = width.abs() * 0.5;
        let hh = height.abs() * 0.5;
        Self::new(center.x - hw, center.y - hh, center.x + hw, center.y + hh)
    }

    /// Creates an extent covering the same coordinates as `rect`.
    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect.x0, rect.y0, rect.x1, rect.y1)
    }

    /// Returns the extent as a [`Rect`] with the same coordinates.
    #[must_use]
    pub fn to_rect(self) -> Rect {
        Rect::new(self.min_x, self.min_y, self.max_x, self.max_y)
    }

    /// Minimum X coordinate.
    #[must_use]
    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    /// Minimum Y coordinate.
    #[must_use]
    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    /// Maximum X coordinate.
    #[must_use]
    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    /// Maximum Y coordinate.
    #[must_use]
    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    /// Width in geographic units.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height in geographic units.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Width and height as a [`Size`].
    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Geometric center.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) * 0.5,
            (self.min_y + self.max_y) * 0.5,
        )
    }

    /// The four corners, counter-clockwise from the minimum corner.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }

    /// Returns `true` if all four coordinates are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.min_x.is_finite()
            && self.min_y.is_finite()
            && self.max_x.is_finite()
            && self.max_y.is_finite()
    }

    /// Returns `true` if the width or height is at or below `epsilon`.
    #[must_use]
    pub fn is_degenerate(&self, epsilon: f64) -> bool {
        self.width() <= epsilon || self.height() <= epsilon
    }

    /// Pads every degenerate axis by `epsilon` on both sides.
    ///
    /// Axes wider than `epsilon` are left untouched, so a point extent becomes
    /// a `2 * epsilon` square around the point while a horizontal line only
    /// gains height. Far from the origin the pad grows to a few ULPs of the
    /// coordinate, so the result is never degenerate in `f64`.
    #[must_use]
    pub fn widened(self, epsilon: f64) -> Self {
        let pad = epsilon.abs().max(f64::MIN_POSITIVE);
        let mut out = self;
        if out.width() <= pad {
            let pad = pad.max(ulps(out.min_x, out.max_x));
            out.min_x -= pad;
            out.max_x += pad;
        }
        if out.height() <= pad {
            let pad = pad.max(ulps(out.min_y, out.max_y));
            out.min_y -= pad;
            out.max_y += pad;
        }
        out
    }

    /// Returns the ratio `width / height`, or `None` if the height is not positive.
    #[must_use]
    pub fn aspect_ratio(&self) -> Option<f64> {
        let h = self.height();
        (h > 0.0).then(|| self.width() / h)
    }

    /// Expands the extent about its center so that its aspect ratio matches
    /// `view_aspect` (`width / height`).
    ///
    /// The extent is only ever grown along the axis that under-represents the
    /// view; it is never cropped. Applying the correction a second time is a
    /// no-op. Degenerate extents and non-positive aspects are returned as-is.
    #[must_use]
    pub fn fit_aspect(self, view_aspect: f64) -> Self {
        if !view_aspect.is_finite() || view_aspect <= 0.0 {
            return self;
        }
        let Some(aspect) = self.aspect_ratio() else {
            return self;
        };
        if self.width() <= 0.0 || (aspect - view_aspect).abs() <= ASPECT_TOLERANCE * view_aspect
        {
            return self;
        }
        let center = self.center();
        if aspect < view_aspect {
            Self::from_center_size(center, self.height() * view_aspect, self.height())
        } else {
            Self::from_center_size(center, self.width(), self.width() / view_aspect)
        }
    }

    /// Moves the extent by `delta` geographic units.
    #[must_use]
    pub fn translated(self, delta: Vec2) -> Self {
        Self {
            min_x: self.min_x + delta.x,
            min_y: self.min_y + delta.y,
            max_x: self.max_x + delta.x,
            max_y: self.max_y + delta.y,
        }
    }

    /// Scales the extent by `factor` about `anchor`.
    ///
    /// The anchor keeps its relative position inside the extent. A factor
    /// below `1.0` shrinks the extent (zooms in).
    #[must_use]
    pub fn scaled_about(self, anchor: Point, factor: f64) -> Self {
        let factor = factor.abs();
        Self::new(
            anchor.x + (self.min_x - anchor.x) * factor,
            anchor.y + (self.min_y - anchor.y) * factor,
            anchor.x + (self.max_x - anchor.x) * factor,
            anchor.y + (self.max_y - anchor.y) * factor,
        )
    }

    /// Returns a copy re-centered on `center` with the same size.
    #[must_use]
    pub fn centered_on(self, center: Point) -> Self {
        Self::from_center_size(center, self.width(), self.height())
    }

    /// Grows the extent by `margin` on every side.
    #[must_use]
    pub fn inflate(self, margin: f64) -> Self {
        Self::new(
            self.min_x - margin,
            self.min_y - margin,
            self.max_x + margin,
            self.max_y + margin,
        )
    }

    /// Smallest extent containing both `self` and `other`.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Overlapping part of two extents, if they overlap (touching counts).
    #[must_use]
    pub fn intersect(self, other: Self) -> Option<Self> {
        let min_x = self.min_x.max(other.min_x);
        let min_y = self.min_y.max(other.min_y);
        let max_x = self.max_x.min(other.max_x);
        let max_y = self.max_y.min(other.max_y);
        (min_x <= max_x && min_y <= max_y).then_some(Self {
            min_x,
            min_y,
            max_x,
            max_y,
        })
    }

    /// Returns `true` if the extents overlap or touch.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// Returns `true` if `pt` lies inside or on the boundary.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.min_x && pt.x <= self.max_x && pt.y >= self.min_y && pt.y <= self.max_y
    }
}

impl From<Rect> for Extent {
    fn from(rect: Rect) -> Self {
        Self::from_rect(rect)
    }
}

/// Four ULPs of the larger of two coordinates.
fn ulps(a: f64, b: f64) -> f64 {
    a.abs().max(b.abs()) * f64::EPSILON * 4.0
}
