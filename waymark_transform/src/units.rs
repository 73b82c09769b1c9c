// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Linear units of map coordinates and the `1:N` scale derived from them.

/// Meters in one inch, the physical basis of device resolution.
pub const METERS_PER_INCH: f64 = 0.0254;

/// Linear unit of the geographic coordinates a map is drawn in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LinearUnit {
    /// Projected meters.
    #[default]
    Meters,
    /// International feet.
    Feet,
    /// Inches; mostly useful for page-space layouts.
    Inches,
    /// Decimal degrees of an unprojected coordinate system.
    ///
    /// Converted with the length of one degree of longitude at the WGS 84
    /// equator, which is the usual approximation for scale display.
    Degrees,
}

impl LinearUnit {
    /// Length of one unit in meters.
    #[must_use]
    pub const fn meters_per_unit(self) -> f64 {
        match self {
            Self::Meters => 1.0,
            Self::Feet => 0.3048,
            Self::Inches => METERS_PER_INCH,
            Self::Degrees => 111_319.490_793_273_58,
        }
    }
}

/// Returns the scale denominator `N` of a `1:N` map scale.
///
/// `units_per_pixel` is the ground distance covered by one device pixel in
/// `unit`s and `dpi` the device resolution. Non-positive `dpi` yields `0.0`.
#[must_use]
pub fn scale_denominator(units_per_pixel: f64, unit: LinearUnit, dpi: f64) -> f64 {
    if dpi <= 0.0 {
        return 0.0;
    }
    units_per_pixel.abs() * unit.meters_per_unit() * dpi / METERS_PER_INCH
}

/// Inverse of [`scale_denominator`]: ground units per pixel at scale `1:denominator`.
#[must_use]
pub fn units_per_pixel_at_scale(denominator: f64, unit: LinearUnit, dpi: f64) -> f64 {
    if dpi <= 0.0 {
        return 0.0;
    }
    denominator.abs() * METERS_PER_INCH / (dpi * unit.meters_per_unit())
}

#[cfg(test)]
mod tests {
    use super::{LinearUnit, scale_denominator, units_per_pixel_at_scale};

    #[test]
    fn meters_at_96_dpi() {
        // One pixel at 96 dpi is 0.2645833 mm; a meter per pixel is ~1:3780.
        let n = scale_denominator(1.0, LinearUnit::Meters, 96.0);
        assert!((n - 3779.527_559).abs() < 1e-3);
    }

    #[test]
    fn scale_roundtrips_through_units_per_pixel() {
        for unit in [
            LinearUnit::Meters,
            LinearUnit::Feet,
            LinearUnit::Inches,
            LinearUnit::Degrees,
        ] {
            let upp = units_per_pixel_at_scale(25_000.0, unit, 72.0);
            let n = scale_denominator(upp, unit, 72.0);
            assert!((n - 25_000.0).abs() < 1e-6, "{unit:?}: {n}");
        }
    }

    #[test]
    fn zero_dpi_is_harmless() {
        assert_eq!(scale_denominator(1.0, LinearUnit::Meters, 0.0), 0.0);
        assert_eq!(units_per_pixel_at_scale(1.0, LinearUnit::Meters, 0.0), 0.0);
    }
}
