// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use kurbo::Rect;

use crate::point::ClipPoint;

/// Default safety margin, in device units, added around a buffer to form the
/// clip envelope.
///
/// Large enough that clipped edges never show on screen, small enough that
/// rasterizers working in 16-bit fixed point do not overflow.
pub const DEFAULT_CLIP_MARGIN: f64 = 32_000.0;

/// Returns the drawing envelope for a buffer: `buffer` grown by `margin` on
/// every side.
#[must_use]
pub fn clip_envelope(buffer: Rect, margin: f64) -> Rect {
    buffer.abs().inflate(margin.abs(), margin.abs())
}

/// One of the four half-planes bounding the clip rectangle.
#[derive(Clone, Copy, Debug)]
enum Boundary {
    MaxX,
    MaxY,
    MinX,
    MinY,
}

impl Boundary {
    const ALL: [Self; 4] = [Self::MaxX, Self::MaxY, Self::MinX, Self::MinY];

    fn inside<P: ClipPoint>(self, p: &P, rect: &Rect) -> bool {
        match self {
            Self::MaxX => p.x() <= rect.x1,
            Self::MaxY => p.y() <= rect.y1,
            Self::MinX => p.x() >= rect.x0,
            Self::MinY => p.y() >= rect.y0,
        }
    }

    /// Point where the segment `a → b` crosses this boundary.
    ///
    /// Returns `None` when the segment has no extent along the crossed axis,
    /// which would otherwise divide by zero.
    fn intersect<P: ClipPoint>(self, a: &P, b: &P, rect: &Rect) -> Option<P> {
        let (bound, a_axis, b_axis, a_other, b_other, vertical) = match self {
            Self::MaxX => (rect.x1, a.x(), b.x(), a.y(), b.y(), true),
            Self::MinX => (rect.x0, a.x(), b.x(), a.y(), b.y(), true),
            Self::MaxY => (rect.y1, a.y(), b.y(), a.x(), b.x(), false),
            Self::MinY => (rect.y0, a.y(), b.y(), a.x(), b.x(), false),
        };
        let denom = b_axis - a_axis;
        if denom == 0.0 {
            return None;
        }
        let t = (bound - a_axis) / denom;
        let other = a_other + t * (b_other - a_other);
        Some(if vertical {
            P::from_xy(bound, other)
        } else {
            P::from_xy(other, bound)
        })
    }
}

/// Reusable buffers for [`clip_polygon_with_scratch`].
///
/// Clipping ping-pongs between two vectors, one per half-plane pass. Keeping
/// them across calls avoids allocating on every draw call in tight rendering
/// loops. Use one scratch per thread.
#[derive(Clone, Debug)]
pub struct ClipScratch<P> {
    front: Vec<P>,
    back: Vec<P>,
}

impl<P> Default for ClipScratch<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> ClipScratch<P> {
    /// Creates an empty scratch.
    #[must_use]
    pub fn new() -> Self {
        Self {
            front: Vec::new(),
            back: Vec::new(),
        }
    }

    /// Creates a scratch with room for `capacity` points per pass.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            front: Vec::with_capacity(capacity),
            back: Vec::with_capacity(capacity),
        }
    }
}

/// Clips a point ring against `rect` and returns the closed result.
///
/// `points` may be open or closed (first point repeated at the end). The
/// result is either empty, when nothing of the ring lies inside `rect`, or a
/// closed ring whose first and last points are equal.
///
/// This is a pure function and may be called concurrently on independent
/// inputs. See [`clip_polygon_with_scratch`] to reuse allocations.
///
/// ```rust
/// use kurbo::{Point, Rect};
/// use waymark_clip::clip_polygon;
///
/// let square = [
///     Point::new(-10.0, -10.0),
///     Point::new(10.0, -10.0),
///     Point::new(10.0, 10.0),
///     Point::new(-10.0, 10.0),
/// ];
/// let out = clip_polygon(&square, Rect::new(0.0, 0.0, 20.0, 20.0));
/// assert_eq!(out.first(), out.last());
/// assert!(out.iter().all(|p| p.x >= 0.0 && p.y >= 0.0));
/// ```
#[must_use]
pub fn clip_polygon<P: ClipPoint>(points: &[P], rect: Rect) -> Vec<P> {
    let mut scratch = ClipScratch::with_capacity(points.len() + 4);
    clip_polygon_with_scratch(points, rect, &mut scratch);
    scratch.front
}

/// Clips a point ring against `rect`, reusing `scratch` for storage.
///
/// Returns a slice into `scratch` holding the closed result; see
/// [`clip_polygon`] for the output contract.
///
/// Consecutive duplicate points are dropped on input, so zero-length
/// segments never reach the intersection step. A non-finite rectangle clips
/// everything away.
pub fn clip_polygon_with_scratch<'a, P: ClipPoint>(
    points: &[P],
    rect: Rect,
    scratch: &'a mut ClipScratch<P>,
) -> &'a [P] {
    let ClipScratch { front, back } = scratch;
    front.clear();
    back.clear();

    let rect = rect.abs();
    if !rect.is_finite() {
        return front;
    }

    for p in points {
        push_distinct(front, *p);
    }
    // Work on the open ring; it is closed again at the end.
    if front.len() > 1 && front.first() == front.last() {
        front.pop();
    }

    for boundary in Boundary::ALL {
        let Some(&last) = front.last() else {
            break;
        };
        back.clear();
        let mut prev = last;
        for &cur in front.iter() {
            match (boundary.inside(&prev, &rect), boundary.inside(&cur, &rect)) {
                (true, true) => push_distinct(back, cur),
                (true, false) => {
                    if let Some(hit) = boundary.intersect(&prev, &cur, &rect) {
                        push_distinct(back, hit);
                    }
                }
                (false, true) => {
                    if let Some(hit) = boundary.intersect(&prev, &cur, &rect) {
                        push_distinct(back, hit);
                    }
                    push_distinct(back, cur);
                }
                (false, false) => {}
            }
            prev = cur;
        }
        core::mem::swap(front, back);
    }

    if let (Some(&first), Some(&last)) = (front.first(), front.last())
        && first != last
    {
        front.push(first);
    }
    front
}

/// Returns `true` if every point lies inside `rect` (boundary included).
///
/// Renderers use this to skip clipping for geometry that is already safe.
#[must_use]
pub fn is_inside<P: ClipPoint>(points: &[P], rect: Rect) -> bool {
    let rect = rect.abs();
    points.iter().all(|p| {
        p.x() >= rect.x0 && p.x() <= rect.x1 && p.y() >= rect.y0 && p.y() <= rect.y1
    })
}

fn push_distinct<P: ClipPoint>(out: &mut Vec<P>, p: P) {
    if out.last() != Some(&p) {
        out.push(p);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use kurbo::{Point, Rect};

    use super::{ClipScratch, clip_envelope, clip_polygon, clip_polygon_with_scratch, is_inside};

    fn pts(raw: &[(f64, f64)]) -> Vec<Point> {
        raw.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn pentagon_is_cut_by_top_edge() {
        let pentagon = pts(&[
            (5.0, 5.0),
            (50.0, -10.0),
            (95.0, 5.0),
            (70.0, 50.0),
            (30.0, 50.0),
        ]);
        let rect = Rect::new(0.0, 0.0, 100.0, 40.0);
        let out = clip_polygon(&pentagon, rect);

        assert!(out.len() >= 4);
        assert_eq!(out.first(), out.last());
        for p in &out {
            assert!(p.y <= 40.0 && p.y >= 0.0, "{p:?}");
            assert!(p.x >= 0.0 && p.x <= 100.0, "{p:?}");
        }
        // The y = 40 edge must actually be reached.
        assert!(out.iter().any(|p| p.y == 40.0));
        assert!(out.iter().any(|p| p.y == 0.0));
    }

    #[test]
    fn fully_inside_ring_is_only_closed() {
        let tri = pts(&[(1.0, 1.0), (5.0, 1.0), (3.0, 4.0)]);
        let out = clip_polygon(&tri, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(out, pts(&[(1.0, 1.0), (5.0, 1.0), (3.0, 4.0), (1.0, 1.0)]));

        // Already closed input comes back as-is.
        let closed = clip_polygon(&out, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(closed, out);
    }

    #[test]
    fn fully_outside_ring_is_empty() {
        let tri = pts(&[(20.0, 20.0), (30.0, 20.0), (25.0, 30.0)]);
        assert!(clip_polygon(&tri, Rect::new(0.0, 0.0, 10.0, 10.0)).is_empty());
    }

    #[test]
    fn degenerate_inputs_do_not_divide_by_zero() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(clip_polygon::<Point>(&[], rect).is_empty());

        let single = clip_polygon(&pts(&[(5.0, 5.0)]), rect);
        assert_eq!(single, pts(&[(5.0, 5.0)]));
        assert!(clip_polygon(&pts(&[(50.0, 5.0)]), rect).is_empty());

        // Repeated points collapse instead of producing NaN intersections.
        let stutter = pts(&[(5.0, 5.0), (5.0, 5.0), (15.0, 5.0), (15.0, 5.0)]);
        let out = clip_polygon(&stutter, rect);
        assert!(out.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
        assert!(out.iter().all(|p| p.x <= 10.0));
    }

    #[test]
    fn array_points_match_kurbo_points() {
        let rect = Rect::new(-5.0, -5.0, 5.0, 5.0);
        let raw = [[-10.0, 0.0], [0.0, -10.0], [10.0, 0.0], [0.0, 10.0]];
        let as_points: Vec<Point> = raw.iter().map(|&[x, y]| Point::new(x, y)).collect();

        let a = clip_polygon(&raw, rect);
        let b = clip_polygon(&as_points, rect);
        assert_eq!(a.len(), b.len());
        for (l, r) in a.iter().zip(&b) {
            assert_eq!(l[0], r.x);
            assert_eq!(l[1], r.y);
        }
    }

    #[test]
    fn scratch_is_reusable() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let mut scratch = ClipScratch::new();
        let big = pts(&[(-5.0, -5.0), (15.0, -5.0), (15.0, 15.0), (-5.0, 15.0)]);
        let first: Vec<Point> = clip_polygon_with_scratch(&big, rect, &mut scratch).to_vec();
        assert_eq!(
            first,
            vec![
                Point::new(0.0, 10.0),
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(0.0, 10.0),
            ]
        );
        let outside = pts(&[(50.0, 50.0), (60.0, 50.0), (55.0, 60.0)]);
        assert!(clip_polygon_with_scratch(&outside, rect, &mut scratch).is_empty());
    }

    #[test]
    fn envelope_and_inside_check() {
        let env = clip_envelope(Rect::new(0.0, 0.0, 300.0, 200.0), 32_000.0);
        assert_eq!(env, Rect::new(-32_000.0, -32_000.0, 32_300.0, 32_200.0));
        assert!(is_inside(&pts(&[(0.0, 0.0), (300.0, 200.0)]), env));
        assert!(!is_inside(&pts(&[(0.0, 0.0), (1e9, 0.0)]), env));
    }
}
