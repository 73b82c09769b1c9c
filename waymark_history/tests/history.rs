// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the `waymark_history` crate.
//!
//! These exercise the linear undo/redo contract: boundaries are no-ops,
//! committing after rewinding discards the redo branch, and the revision
//! counter only moves when something changes.

use proptest::prelude::*;
use waymark_history::ExtentHistory;
use waymark_transform::Extent;

fn extent(i: u32) -> Extent {
    let s = f64::from(i);
    Extent::new(s, s, s + 10.0, s + 10.0)
}

#[test]
fn previous_previous_commit_discards_redo_branch() {
    let (a, b, c, d) = (extent(1), extent(2), extent(3), extent(4));
    let mut h = ExtentHistory::new(16);
    h.commit(a);
    h.commit(b);
    h.commit(c);

    assert_eq!(h.zoom_to_previous(), Some(b));
    assert_eq!(h.zoom_to_previous(), Some(a));

    h.commit(d);
    assert!(!h.can_zoom_to_next());
    assert_eq!(h.zoom_to_next(), Some(d));
    assert_eq!(h.iter().collect::<Vec<_>>(), vec![a, d]);
}

#[test]
fn boundaries_do_not_move_cursor_or_revision() {
    let mut h = ExtentHistory::new(16);
    h.commit(extent(1));
    h.commit(extent(2));

    let rev = h.revision();
    assert_eq!(h.zoom_to_next(), Some(extent(2)));
    assert_eq!(h.revision(), rev);
    assert_eq!(h.position(), Some(1));

    h.zoom_to_previous();
    let rev = h.revision();
    assert_eq!(h.zoom_to_previous(), Some(extent(1)));
    assert_eq!(h.revision(), rev);
    assert_eq!(h.position(), Some(0));
}

#[test]
fn clear_bumps_revision_only_on_change() {
    let mut h = ExtentHistory::new(4);
    h.clear();
    assert_eq!(h.revision(), 0);

    h.commit(extent(1));
    h.clear();
    assert_eq!(h.revision(), 2);
    assert!(h.is_empty());
    assert_eq!(h.current(), None);
}

#[derive(Clone, Debug)]
enum Op {
    Commit(u32),
    Previous,
    Next,
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![
            (0..50_u32).prop_map(Op::Commit),
            Just(Op::Previous),
            Just(Op::Next),
        ],
        0..64,
    )
}

proptest! {
    #[test]
    fn cursor_stays_in_bounds(ops in arb_ops(), capacity in 1..10_usize) {
        let mut h = ExtentHistory::new(capacity);
        for op in ops {
            match op {
                Op::Commit(i) => { h.commit(extent(i)); }
                Op::Previous => { h.zoom_to_previous(); }
                Op::Next => { h.zoom_to_next(); }
            }
            prop_assert!(h.len() <= capacity);
            match h.position() {
                Some(pos) => prop_assert!(pos < h.len()),
                None => prop_assert!(h.is_empty()),
            }
        }
    }

    #[test]
    fn commit_always_leaves_nothing_to_redo(ops in arb_ops(), last in 100..200_u32) {
        let mut h = ExtentHistory::new(8);
        for op in ops {
            match op {
                Op::Commit(i) => { h.commit(extent(i)); }
                Op::Previous => { h.zoom_to_previous(); }
                Op::Next => { h.zoom_to_next(); }
            }
        }
        h.commit(extent(last));
        prop_assert!(!h.can_zoom_to_next());
        prop_assert_eq!(h.current(), Some(extent(last)));
    }

    #[test]
    fn back_then_forward_returns_to_same(commits in prop::collection::vec(0..50_u32, 2..12)) {
        let mut h = ExtentHistory::new(32);
        for i in &commits {
            h.commit(extent(*i));
        }
        let before = h.current();
        if h.can_zoom_to_previous() {
            h.zoom_to_previous();
            h.zoom_to_next();
        }
        prop_assert_eq!(h.current(), before);
    }
}
