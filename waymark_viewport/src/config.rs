// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::Color;
use waymark_buffer::{DEFAULT_EXTEND_COEFFICIENT, DEFAULT_MAX_DIMENSION};
use waymark_clip::DEFAULT_CLIP_MARGIN;
use waymark_dirty::{Coalesce, DEFAULT_MAX_REGIONS};
use waymark_history::DEFAULT_CAPACITY;
use waymark_transform::{EXTENT_EPSILON, LinearUnit};

/// Device resolution assumed when the host does not know better.
pub const DEFAULT_DPI: f64 = 96.0;

/// Magnification of one zoom notch.
pub const DEFAULT_ZOOM_STEP: f64 = 2.0;

/// Settings a [`Viewport`](crate::Viewport) is constructed with.
///
/// The host owns this value and passes it in explicitly; nothing is read
/// from process-wide state.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ViewportConfig {
    /// Render into a buffer larger than the view so short pans need no render.
    pub extend_buffer: bool,
    /// How many times larger than the view the extended buffer is.
    pub extend_coefficient: u32,
    /// Maximum number of extents kept for zoom to previous / next.
    pub history_capacity: usize,
    /// Magnification applied by one zoom in or zoom out.
    pub zoom_step: f64,
    /// Device units added around the buffer to form the clip envelope.
    pub clip_margin: f64,
    /// Extents narrower than this on an axis are widened by it.
    pub extent_epsilon: f64,
    /// Largest surface side the platform can allocate, in pixels.
    pub max_surface_dimension: u32,
    /// Pending dirty regions beyond which they collapse into one.
    pub max_regions: usize,
    /// When pending dirty regions merge.
    ///
    /// Defaults to [`Coalesce::Overlapping`] so that the two strips of a
    /// diagonal pan are rendered separately instead of as their union, which
    /// would span the whole buffer.
    pub coalesce: Coalesce,
    /// Unit of the map coordinates.
    pub map_unit: LinearUnit,
    /// Device resolution used for the `1:N` scale.
    pub dpi: f64,
    /// Colour stale regions are cleared to before layers paint.
    #[cfg_attr(feature = "serde", serde(with = "color_serde"))]
    pub background: Color,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            extend_buffer: true,
            extend_coefficient: DEFAULT_EXTEND_COEFFICIENT,
            history_capacity: DEFAULT_CAPACITY,
            zoom_step: DEFAULT_ZOOM_STEP,
            clip_margin: DEFAULT_CLIP_MARGIN,
            extent_epsilon: EXTENT_EPSILON,
            max_surface_dimension: DEFAULT_MAX_DIMENSION,
            max_regions: DEFAULT_MAX_REGIONS,
            coalesce: Coalesce::Overlapping,
            map_unit: LinearUnit::default(),
            dpi: DEFAULT_DPI,
            background: Color::WHITE,
        }
    }
}

impl ViewportConfig {
    /// Returns a copy with out-of-range values replaced by usable ones.
    ///
    /// Counts are raised to at least one, a zoom step not above one falls
    /// back to the default, and the epsilon, margin and dpi must be positive
    /// and finite.
    #[must_use]
    pub fn validated(self) -> Self {
        let defaults = Self::default();
        let positive = |v: f64, fallback: f64| {
            if v.is_finite() && v > 0.0 {
                v
            } else {
                fallback
            }
        };
        Self {
            extend_coefficient: self.extend_coefficient.max(1),
            history_capacity: self.history_capacity.max(1),
            zoom_step: if self.zoom_step.is_finite() && self.zoom_step > 1.0 {
                self.zoom_step
            } else {
                defaults.zoom_step
            },
            clip_margin: positive(self.clip_margin, defaults.clip_margin),
            extent_epsilon: positive(self.extent_epsilon, defaults.extent_epsilon),
            max_surface_dimension: self.max_surface_dimension.max(1),
            max_regions: self.max_regions.max(1),
            dpi: positive(self.dpi, defaults.dpi),
            ..self
        }
    }
}

#[cfg(feature = "serde")]
mod color_serde {
    use peniko::Color;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub(super) fn serialize<S: Serializer>(color: &Color, s: S) -> Result<S::Ok, S::Error> {
        let c = color.to_rgba8();
        [c.r, c.g, c.b, c.a].serialize(s)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Color, D::Error> {
        let [r, g, b, a] = <[u8; 4]>::deserialize(d)?;
        Ok(Color::from_rgba8(r, g, b, a))
    }
}
