// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Region invalidator: coalesced dirty rectangles in buffer pixel space.

use kurbo::{Rect, Vec2};
use smallvec::SmallVec;
use waymark_transform::{CoordinateTransform, Extent};

/// Default number of pending regions before everything collapses into one union.
pub const DEFAULT_MAX_REGIONS: usize = 16;

/// Set of regions handed to renderers by [`RegionInvalidator::take_pending`].
///
/// Typical frames produce one to a few regions, so they are kept inline.
pub type RegionSet = SmallVec<[Rect; 4]>;

/// When two pending regions are merged into their bounding union.
///
/// Merging trades precision for fewer render calls: the union may cover
/// pixels neither region needed. Renderers must therefore be idempotent
/// painters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Coalesce {
    /// Merge regions that overlap or share any boundary point.
    #[default]
    Touching,
    /// Merge only regions whose interiors overlap. Adjacent strips, such as
    /// the two revealed by a diagonal pan, stay separate.
    Overlapping,
}

impl Coalesce {
    fn should_merge(self, a: &Rect, b: &Rect) -> bool {
        match self {
            Self::Touching => a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1,
            Self::Overlapping => a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1,
        }
    }
}

/// Tracks which rectangles of a render buffer are stale.
///
/// Regions are in buffer pixel space. On insertion they are rounded outward
/// to whole pixels, clipped to the optional [`bounds`](Self::bounds), and
/// merged with any pending region per the [`Coalesce`] policy, repeatedly,
/// until no further merge applies. If the number of pending regions exceeds
/// [`max_regions`](Self::max_regions), they all collapse into their union.
///
/// A generation counter increments on every mutation, mirroring how dirty
/// sets let callers detect change since a previous observation.
///
/// # Example
///
/// ```
/// use kurbo::Rect;
/// use waymark_dirty::RegionInvalidator;
///
/// let mut dirty = RegionInvalidator::new();
/// dirty.set_bounds(Some(Rect::new(0.0, 0.0, 300.0, 300.0)));
///
/// dirty.invalidate(Rect::new(0.0, 0.0, 50.0, 50.0));
/// dirty.invalidate(Rect::new(40.0, 40.0, 80.0, 80.0)); // overlaps: merged
/// dirty.invalidate(Rect::new(200.0, 200.0, 400.0, 400.0)); // clipped to bounds
///
/// let pending = dirty.take_pending();
/// assert_eq!(pending.len(), 2);
/// assert!(pending.contains(&Rect::new(0.0, 0.0, 80.0, 80.0)));
/// assert!(pending.contains(&Rect::new(200.0, 200.0, 300.0, 300.0)));
/// assert!(dirty.is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct RegionInvalidator {
    regions: RegionSet,
    bounds: Option<Rect>,
    coalesce: Coalesce,
    max_regions: usize,
    generation: u64,
}

impl Default for RegionInvalidator {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionInvalidator {
    /// Creates an empty invalidator with no bounds and default policy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            regions: RegionSet::new(),
            bounds: None,
            coalesce: Coalesce::default(),
            max_regions: DEFAULT_MAX_REGIONS,
            generation: 0,
        }
    }

    /// Sets the coalescing policy for future insertions.
    #[must_use]
    pub fn with_coalesce(mut self, coalesce: Coalesce) -> Self {
        self.coalesce = coalesce;
        self
    }

    /// Sets the pending-region limit; values below one are treated as one.
    #[must_use]
    pub fn with_max_regions(mut self, max_regions: usize) -> Self {
        self.max_regions = max_regions.max(1);
        self
    }

    /// Returns the coalescing policy.
    #[must_use]
    pub fn coalesce(&self) -> Coalesce {
        self.coalesce
    }

    /// Returns the pending-region limit.
    #[must_use]
    pub fn max_regions(&self) -> usize {
        self.max_regions
    }

    /// Returns the current generation.
    ///
    /// The generation is incremented on every mutation (insert, translate,
    /// drain, clear). It can be used to detect whether the pending set has
    /// changed since a previous observation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the clipping bounds, usually the full buffer rectangle.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// Sets the clipping bounds and re-clips pending regions to them.
    pub fn set_bounds(&mut self, bounds: Option<Rect>) {
        let bounds = bounds.map(|b| b.abs());
        if self.bounds == bounds {
            return;
        }
        self.bounds = bounds;
        if let Some(b) = bounds {
            self.regions = self
                .regions
                .iter()
                .map(|r| r.intersect(b))
                .filter(|r| r.area() > 0.0)
                .collect();
        }
        self.bump();
    }

    /// Returns `true` if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Number of pending (already coalesced) regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Iterates over pending regions without draining them.
    pub fn iter(&self) -> impl Iterator<Item = Rect> + '_ {
        self.regions.iter().copied()
    }

    /// Bounding box of all pending regions.
    #[must_use]
    pub fn bounding_union(&self) -> Option<Rect> {
        self.regions.iter().copied().reduce(|a, b| a.union(b))
    }

    /// Marks a buffer-space rectangle as stale.
    ///
    /// Returns `true` if the pending set changed. Empty, non-finite, or
    /// out-of-bounds rectangles and rectangles already covered by a pending
    /// region are ignored.
    pub fn invalidate(&mut self, rect: Rect) -> bool {
        if !rect.is_finite() {
            return false;
        }
        let mut rect = rect.abs().expand();
        if let Some(b) = self.bounds {
            rect = rect.intersect(b);
        }
        if rect.area() <= 0.0 {
            return false;
        }
        if self.regions.iter().any(|r| r.contains_rect(rect)) {
            return false;
        }

        while let Some(i) = self
            .regions
            .iter()
            .position(|r| self.coalesce.should_merge(r, &rect))
        {
            rect = rect.union(self.regions.swap_remove(i));
        }
        self.regions.push(rect);

        if self.regions.len() > self.max_regions {
            if let Some(all) = self.bounding_union() {
                self.regions.clear();
                self.regions.push(all);
            }
        }
        self.bump();
        true
    }

    /// Marks a geographic extent as stale, converting it through `transform`.
    ///
    /// `transform` must map into the same buffer space as the pending regions.
    pub fn invalidate_extent(&mut self, extent: Extent, transform: &CoordinateTransform) -> bool {
        self.invalidate(transform.proj_to_pixel_rect(extent))
    }

    /// Marks the whole bounds as stale. Does nothing without bounds.
    pub fn invalidate_all(&mut self) -> bool {
        let Some(b) = self.bounds else {
            return false;
        };
        if self.regions.len() == 1 && self.regions[0] == b {
            return false;
        }
        self.regions.clear();
        self.regions.push(b);
        self.bump();
        true
    }

    /// Offsets every pending region by `delta` pixels and re-clips to bounds.
    ///
    /// Used when buffer contents are shifted, so that stale areas stay
    /// attached to the pixels they describe.
    pub fn translate(&mut self, delta: Vec2) {
        if self.regions.is_empty() || delta == Vec2::ZERO {
            return;
        }
        let bounds = self.bounds;
        self.regions = self
            .regions
            .iter()
            .map(|r| *r + delta)
            .map(|r| bounds.map_or(r, |b| r.intersect(b)))
            .filter(|r| r.area() > 0.0)
            .collect();
        self.bump();
    }

    /// Drains and returns the coalesced pending regions.
    ///
    /// After this call the invalidator is empty.
    pub fn take_pending(&mut self) -> RegionSet {
        if self.regions.is_empty() {
            return RegionSet::new();
        }
        self.bump();
        core::mem::take(&mut self.regions)
    }

    /// Discards all pending regions.
    pub fn clear(&mut self) {
        if self.regions.is_empty() {
            return;
        }
        self.regions.clear();
        self.bump();
    }

    fn bump(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Rect, Vec2};
    use waymark_transform::{CoordinateTransform, Extent};

    use super::{Coalesce, RegionInvalidator};

    #[test]
    fn touching_regions_merge_by_default() {
        let mut dirty = RegionInvalidator::new();
        dirty.invalidate(Rect::new(0.0, 0.0, 10.0, 100.0));
        dirty.invalidate(Rect::new(10.0, 0.0, 100.0, 10.0));
        assert_eq!(dirty.len(), 1);
        assert_eq!(dirty.bounding_union(), Some(Rect::new(0.0, 0.0, 100.0, 100.0)));
    }

    #[test]
    fn overlapping_policy_keeps_adjacent_strips() {
        let mut dirty = RegionInvalidator::new().with_coalesce(Coalesce::Overlapping);
        dirty.invalidate(Rect::new(0.0, 0.0, 10.0, 100.0));
        dirty.invalidate(Rect::new(10.0, 0.0, 100.0, 10.0));
        assert_eq!(dirty.len(), 2);

        dirty.invalidate(Rect::new(5.0, 5.0, 20.0, 20.0));
        // Overlaps both strips, so everything chains into one union.
        assert_eq!(dirty.len(), 1);
    }

    #[test]
    fn merging_cascades_through_chains() {
        let mut dirty = RegionInvalidator::new();
        dirty.invalidate(Rect::new(0.0, 0.0, 10.0, 10.0));
        dirty.invalidate(Rect::new(50.0, 0.0, 60.0, 10.0));
        assert_eq!(dirty.len(), 2);
        // Bridges the two existing regions.
        dirty.invalidate(Rect::new(5.0, 0.0, 55.0, 5.0));
        assert_eq!(dirty.len(), 1);
        assert_eq!(dirty.bounding_union(), Some(Rect::new(0.0, 0.0, 60.0, 10.0)));
    }

    #[test]
    fn regions_are_rounded_out_and_clipped() {
        let mut dirty = RegionInvalidator::new();
        dirty.set_bounds(Some(Rect::new(0.0, 0.0, 100.0, 100.0)));
        assert!(dirty.invalidate(Rect::new(-5.5, 10.2, 20.4, 30.7)));
        assert_eq!(dirty.iter().next(), Some(Rect::new(0.0, 10.0, 21.0, 31.0)));

        assert!(!dirty.invalidate(Rect::new(200.0, 200.0, 300.0, 300.0)));
        assert!(!dirty.invalidate(Rect::new(1.0, 1.0, 1.0, 50.0)));
        assert!(!dirty.invalidate(Rect::new(0.0, 0.0, f64::NAN, 1.0)));
        // Already covered.
        assert!(!dirty.invalidate(Rect::new(2.0, 12.0, 3.0, 13.0)));
    }

    #[test]
    fn too_many_regions_collapse_into_union() {
        let mut dirty = RegionInvalidator::new().with_max_regions(3);
        for i in 0..4 {
            let x = f64::from(i) * 100.0;
            dirty.invalidate(Rect::new(x, 0.0, x + 10.0, 10.0));
        }
        assert_eq!(dirty.len(), 1);
        assert_eq!(dirty.bounding_union(), Some(Rect::new(0.0, 0.0, 310.0, 10.0)));
    }

    #[test]
    fn take_pending_drains_and_bumps_generation() {
        let mut dirty = RegionInvalidator::new();
        let g0 = dirty.generation();
        dirty.invalidate(Rect::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(dirty.generation(), g0 + 1);

        let pending = dirty.take_pending();
        assert_eq!(pending.len(), 1);
        assert!(dirty.is_empty());
        assert_eq!(dirty.generation(), g0 + 2);

        // Draining an empty invalidator is not a mutation.
        assert!(dirty.take_pending().is_empty());
        assert_eq!(dirty.generation(), g0 + 2);
    }

    #[test]
    fn invalidate_all_requires_bounds() {
        let mut dirty = RegionInvalidator::new();
        assert!(!dirty.invalidate_all());
        dirty.set_bounds(Some(Rect::new(0.0, 0.0, 30.0, 20.0)));
        assert!(dirty.invalidate_all());
        assert!(!dirty.invalidate_all());
        assert_eq!(dirty.take_pending().as_slice(), &[Rect::new(0.0, 0.0, 30.0, 20.0)]);
    }

    #[test]
    fn translate_follows_shifted_content() {
        let mut dirty = RegionInvalidator::new();
        dirty.set_bounds(Some(Rect::new(0.0, 0.0, 100.0, 100.0)));
        dirty.invalidate(Rect::new(10.0, 10.0, 20.0, 20.0));
        dirty.invalidate(Rect::new(90.0, 90.0, 100.0, 100.0));
        dirty.translate(Vec2::new(-15.0, 0.0));
        let pending = dirty.take_pending();
        assert!(pending.contains(&Rect::new(0.0, 10.0, 5.0, 20.0)));
        assert!(pending.contains(&Rect::new(75.0, 90.0, 85.0, 100.0)));
    }

    #[test]
    fn extents_are_converted_through_the_transform() {
        let tx = CoordinateTransform::new(
            Extent::new(0.0, 0.0, 100.0, 100.0),
            Rect::new(0.0, 0.0, 200.0, 200.0),
            0.0,
        )
        .unwrap();
        let mut dirty = RegionInvalidator::new();
        dirty.invalidate_extent(Extent::new(0.0, 50.0, 50.0, 100.0), &tx);
        // The north-west quarter of the map is the top-left quarter of the buffer.
        let r = dirty.iter().next().unwrap();
        assert!(r.contains(Point::new(1.0, 1.0)));
        assert_eq!(r, Rect::new(0.0, 0.0, 100.0, 100.0));
    }
}
