// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for `waymark_clip`: containment, closure, and pass-through
//! of rings that already fit.

use kurbo::{Point, Rect};
use proptest::prelude::*;
use waymark_clip::{clip_polygon, is_inside};

const EPS: f64 = 1e-9;

fn arb_rect() -> impl Strategy<Value = Rect> {
    (-1_000.0..1_000.0_f64, -1_000.0..1_000.0_f64, 1.0..2_000.0_f64, 1.0..2_000.0_f64)
        .prop_map(|(x, y, w, h)| Rect::new(x, y, x + w, y + h))
}

fn arb_ring() -> impl Strategy<Value = Vec<Point>> {
    prop::collection::vec(
        (-5_000.0..5_000.0_f64, -5_000.0..5_000.0_f64).prop_map(|(x, y)| Point::new(x, y)),
        0..24,
    )
}

fn within(p: Point, r: Rect) -> bool {
    let tol = EPS * (1.0 + r.x0.abs().max(r.x1.abs()).max(r.y0.abs()).max(r.y1.abs()));
    p.x >= r.x0 - tol && p.x <= r.x1 + tol && p.y >= r.y0 - tol && p.y <= r.y1 + tol
}

proptest! {
    #[test]
    fn output_lies_inside_rect(ring in arb_ring(), rect in arb_rect()) {
        let out = clip_polygon(&ring, rect);
        for p in &out {
            prop_assert!(within(*p, rect), "{p:?} outside {rect:?}");
        }
    }

    #[test]
    fn output_is_empty_or_closed(ring in arb_ring(), rect in arb_rect()) {
        let out = clip_polygon(&ring, rect);
        prop_assert!(out.is_empty() || out.first() == out.last());
    }

    #[test]
    fn rings_inside_pass_through(
        rect in arb_rect(),
        unit in prop::collection::vec((0.0..=1.0_f64, 0.0..=1.0_f64), 3..16),
    ) {
        let ring: Vec<Point> = unit
            .iter()
            .map(|&(u, v)| Point::new(rect.x0 + u * rect.width(), rect.y0 + v * rect.height()))
            .collect();
        prop_assume!(is_inside(&ring, rect));
        prop_assume!(ring.windows(2).all(|w| w[0] != w[1]));
        prop_assume!(ring.first() != ring.last());

        let out = clip_polygon(&ring, rect);
        prop_assert_eq!(&out[..ring.len()], &ring[..]);
        prop_assert_eq!(out.len(), ring.len() + 1);
        prop_assert_eq!(out.last(), ring.first());
    }

    #[test]
    fn array_and_point_paths_agree(ring in arb_ring(), rect in arb_rect()) {
        let raw: Vec<[f64; 2]> = ring.iter().map(|p| [p.x, p.y]).collect();
        let a = clip_polygon(&raw, rect);
        let b = clip_polygon(&ring, rect);
        prop_assert_eq!(a.len(), b.len());
        for (l, r) in a.iter().zip(&b) {
            prop_assert_eq!(l[0], r.x);
            prop_assert_eq!(l[1], r.y);
        }
    }
}
