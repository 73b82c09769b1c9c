// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pan gesture state: turn pointer positions into per-frame pan deltas.
//!
//! ## Usage
//!
//! 1) Start a gesture with [`PanGesture::begin`] at the pointer position.
//! 2) On each move, call [`PanGesture::update`] to get the delta since the
//!    previous position.
//! 3) [`PanGesture::total_offset`] gives the cumulative drag from the start.
//! 4) Finish with [`PanGesture::end`], which also returns the total offset.
//!
//! The viewport uses this behind `begin_pan` / `pan_to` / `end_pan`.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::Point;
//! use waymark_viewport::PanGesture;
//!
//! let mut gesture = PanGesture::default();
//! gesture.begin(Point::new(10.0, 20.0));
//! assert!(gesture.is_active());
//!
//! let delta = gesture.update(Point::new(15.0, 25.0)).unwrap();
//! assert_eq!((delta.x, delta.y), (5.0, 5.0));
//!
//! let total = gesture.end().unwrap();
//! assert_eq!((total.x, total.y), (5.0, 5.0));
//! assert!(!gesture.is_active());
//! ```

use kurbo::{Point, Vec2};

/// Tracks an in-progress pan drag.
#[derive(Debug, Clone, Default, Copy)]
pub struct PanGesture {
    start: Option<Point>,
    last: Option<Point>,
}

impl PanGesture {
    /// Starts a new gesture at `pos`, discarding any previous one.
    pub fn begin(&mut self, pos: Point) {
        self.start = Some(pos);
        self.last = Some(pos);
    }

    /// Moves the pointer to `pos` and returns the delta since the last
    /// position, or `None` when no gesture is active.
    pub fn update(&mut self, pos: Point) -> Option<Vec2> {
        self.start?;
        let last = self.last.replace(pos)?;
        Some(pos - last)
    }

    /// Cumulative drag from the start to the last known position.
    #[must_use]
    pub fn total_offset(&self) -> Option<Vec2> {
        Some(self.last? - self.start?)
    }

    /// Ends the gesture and returns its cumulative offset.
    pub fn end(&mut self) -> Option<Vec2> {
        let total = self.total_offset();
        self.start = None;
        self.last = None;
        total
    }

    /// Returns `true` while a gesture is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.start.is_some()
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Vec2};

    use super::PanGesture;

    #[test]
    fn idle_gesture_reports_nothing() {
        let mut g = PanGesture::default();
        assert!(!g.is_active());
        assert_eq!(g.update(Point::new(1.0, 1.0)), None);
        assert_eq!(g.total_offset(), None);
        assert_eq!(g.end(), None);
    }

    #[test]
    fn deltas_sum_to_total_offset() {
        let mut g = PanGesture::default();
        g.begin(Point::new(100.0, 100.0));
        let d1 = g.update(Point::new(110.0, 95.0)).unwrap();
        let d2 = g.update(Point::new(90.0, 105.0)).unwrap();
        assert_eq!(d1, Vec2::new(10.0, -5.0));
        assert_eq!(d2, Vec2::new(-20.0, 10.0));
        assert_eq!(g.total_offset(), Some(d1 + d2));
    }

    #[test]
    fn begin_restarts_an_active_gesture() {
        let mut g = PanGesture::default();
        g.begin(Point::new(0.0, 0.0));
        g.update(Point::new(50.0, 0.0));
        g.begin(Point::new(5.0, 5.0));
        assert_eq!(g.total_offset(), Some(Vec2::ZERO));
        assert_eq!(g.update(Point::new(6.0, 5.0)), Some(Vec2::new(1.0, 0.0)));
    }
}
