// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=waymark_history --heading-base-level=0

//! Waymark History: linear undo/redo of viewed extents.
//!
//! [`ExtentHistory`] stores the extents a map view has settled on, with a
//! cursor marking the one currently shown. It is deliberately a line, not a
//! tree:
//! - [`ExtentHistory::commit`] drops everything after the cursor and appends.
//! - [`ExtentHistory::zoom_to_previous`] / [`ExtentHistory::zoom_to_next`] move
//!   the cursor and return the extent there. At either end they do nothing.
//! - The capacity is bounded; when full, the oldest entry is evicted.
//! - A monotonically increasing **revision** counter bumps whenever the
//!   entries or the cursor change, so observers can cheaply detect updates.
//!
//! ```rust
//! use waymark_history::ExtentHistory;
//! use waymark_transform::Extent;
//!
//! let a = Extent::new(0.0, 0.0, 10.0, 10.0);
//! let b = Extent::new(0.0, 0.0, 5.0, 5.0);
//! let c = Extent::new(1.0, 1.0, 2.0, 2.0);
//!
//! let mut history = ExtentHistory::new(16);
//! history.commit(a);
//! history.commit(b);
//! history.commit(c);
//!
//! assert_eq!(history.zoom_to_previous(), Some(b));
//! assert_eq!(history.zoom_to_previous(), Some(a));
//! // Already at the oldest entry: stays put.
//! assert_eq!(history.zoom_to_previous(), Some(a));
//! assert!(history.can_zoom_to_next());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::collections::VecDeque;

use waymark_transform::Extent;

/// Default number of entries kept by [`ExtentHistory::default`].
pub const DEFAULT_CAPACITY: usize = 64;

/// Bounded, linear undo/redo stack of committed extents.
#[derive(Clone, Debug)]
pub struct ExtentHistory {
    entries: VecDeque<Extent>,
    /// Index of the current entry; meaningless while `entries` is empty.
    cursor: usize,
    capacity: usize,
    revision: u64,
}

impl Default for ExtentHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ExtentHistory {
    /// Creates an empty history holding at most `capacity` entries.
    ///
    /// A capacity of zero is treated as one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            cursor: 0,
            capacity,
            revision: 0,
        }
    }

    /// Maximum number of entries retained.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Changes the capacity, evicting the oldest entries if needed.
    ///
    /// If the current entry would be evicted, the oldest surviving entry
    /// becomes current.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        if self.evict_overflow() {
            self.bump_revision();
        }
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the revision counter.
    ///
    /// The revision starts at zero and increments whenever an entry is
    /// committed or evicted, the cursor moves, or the history is cleared.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The extent at the cursor, if any.
    #[must_use]
    pub fn current(&self) -> Option<Extent> {
        self.entries.get(self.cursor).copied()
    }

    /// Index of the cursor, counted from the oldest entry.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        (!self.entries.is_empty()).then_some(self.cursor)
    }

    /// Iterates over the stored entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = Extent> + '_ {
        self.entries.iter().copied()
    }

    /// Records `extent` as the new current entry.
    ///
    /// Any entries after the cursor (the redo branch) are discarded. When the
    /// history is full, the oldest entry is dropped. Committing an extent equal
    /// to the current one does nothing and returns `false`.
    pub fn commit(&mut self, extent: Extent) -> bool {
        if self.current() == Some(extent) {
            return false;
        }
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push_back(extent);
        self.cursor = self.entries.len() - 1;
        self.evict_overflow();
        self.bump_revision();
        true
    }

    /// Returns `true` if there is an older entry to move back to.
    #[must_use]
    pub fn can_zoom_to_previous(&self) -> bool {
        !self.entries.is_empty() && self.cursor > 0
    }

    /// Returns `true` if there is a newer entry to move forward to.
    #[must_use]
    pub fn can_zoom_to_next(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Moves the cursor back one entry and returns the extent there.
    ///
    /// At the oldest entry this is a no-op that returns the current extent.
    /// Returns `None` only when the history is empty.
    pub fn zoom_to_previous(&mut self) -> Option<Extent> {
        if self.can_zoom_to_previous() {
            self.cursor -= 1;
            self.bump_revision();
        }
        self.current()
    }

    /// Moves the cursor forward one entry and returns the extent there.
    ///
    /// At the newest entry this is a no-op that returns the current extent.
    /// Returns `None` only when the history is empty.
    pub fn zoom_to_next(&mut self) -> Option<Extent> {
        if self.can_zoom_to_next() {
            self.cursor += 1;
            self.bump_revision();
        }
        self.current()
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.entries.clear();
        self.cursor = 0;
        self.bump_revision();
    }

    /// Drops the oldest entries beyond capacity. Returns `true` if any were dropped.
    fn evict_overflow(&mut self) -> bool {
        let excess = self.entries.len().saturating_sub(self.capacity);
        if excess == 0 {
            return false;
        }
        self.entries.drain(..excess);
        self.cursor = self.cursor.saturating_sub(excess);
        true
    }

    fn bump_revision(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
