// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Affine, Point, Rect, Vec2};

use crate::error::TransformError;
use crate::extent::Extent;

/// Affine mapping between geographic units and device pixels.
///
/// A `CoordinateTransform` is derived from three inputs: the geographic
/// [`Extent`] being shown, the device rectangle it is shown in, and a rotation
/// angle in degrees. The forward (`proj → pixel`) transform is composed as:
///
/// 1. translate the extent center to the origin,
/// 2. scale uniformly by [`pixels_per_unit`](Self::pixels_per_unit), flipping
///    Y so that north points up,
/// 3. rotate by the angle (clockwise on screen for positive angles),
/// 4. translate to the center of the device rectangle.
///
/// Points are offset from the extent center before the linear part is
/// applied, rather than folding the translation into one matrix, so that
/// large projected coordinates keep sub-pixel precision. The inverse linear
/// part is computed once and cached.
///
/// The scale is the smaller of the two per-axis ratios, so an extent whose
/// aspect differs from the view's is shown in full. Callers that want the
/// extent to exactly fill the view apply [`Extent::fit_aspect`] first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateTransform {
    extent: Extent,
    view: Rect,
    angle: f64,
    pixels_per_unit: f64,
    center: Point,
    view_center: Point,
    linear: Affine,
    inverse: Affine,
}

impl CoordinateTransform {
    /// Builds a transform showing `extent` inside the device rectangle `view`,
    /// rotated by `angle_degrees` about the extent center.
    ///
    /// # Errors
    ///
    /// - [`TransformError::DegenerateExtent`] if the extent has zero width or height.
    /// - [`TransformError::EmptyView`] if `view` has no area.
    /// - [`TransformError::NonFinite`] if any input is NaN/infinite or the
    ///   derived scale overflows.
    pub fn new(extent: Extent, view: Rect, angle_degrees: f64) -> Result<Self, TransformError> {
        if !extent.is_finite() || !view.is_finite() || !angle_degrees.is_finite() {
            return Err(TransformError::NonFinite);
        }
        let (width, height) = (extent.width(), extent.height());
        if width <= 0.0 || height <= 0.0 {
            return Err(TransformError::DegenerateExtent { width, height });
        }
        let view = view.abs();
        if view.width() <= 0.0 || view.height() <= 0.0 {
            return Err(TransformError::EmptyView {
                width: view.width(),
                height: view.height(),
            });
        }

        let pixels_per_unit = (view.width() / width).min(view.height() / height);
        if !pixels_per_unit.is_finite() || pixels_per_unit <= 0.0 {
            return Err(TransformError::NonFinite);
        }

        let linear = Affine::rotate(angle_degrees.to_radians())
            * Affine::scale_non_uniform(pixels_per_unit, -pixels_per_unit);

        Ok(Self {
            extent,
            view,
            angle: angle_degrees,
            pixels_per_unit,
            center: extent.center(),
            view_center: view.center(),
            linear,
            inverse: linear.inverse(),
        })
    }

    /// Returns a transform for the same extent and angle shown in `view`.
    ///
    /// # Errors
    ///
    /// See [`CoordinateTransform::new`].
    pub fn with_view(&self, view: Rect) -> Result<Self, TransformError> {
        Self::new(self.extent, view, self.angle)
    }

    /// Geographic extent this transform was built from.
    #[must_use]
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Device rectangle this transform maps into.
    #[must_use]
    pub fn view(&self) -> Rect {
        self.view
    }

    /// Rotation angle in degrees.
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Device pixels per geographic unit.
    #[must_use]
    pub fn pixels_per_unit(&self) -> f64 {
        self.pixels_per_unit
    }

    /// Geographic units per device pixel.
    #[must_use]
    pub fn units_per_pixel(&self) -> f64 {
        1.0 / self.pixels_per_unit
    }

    /// The forward transform as a single affine, for callers that transform
    /// whole paths at once.
    ///
    /// Less precise than [`proj_to_pixel`](Self::proj_to_pixel) for large
    /// coordinates, since the translation is folded into the matrix.
    #[must_use]
    pub fn proj_to_pixel_affine(&self) -> Affine {
        Affine::translate(self.view_center.to_vec2())
            * self.linear
            * Affine::translate(-self.center.to_vec2())
    }

    /// The inverse of [`proj_to_pixel_affine`](Self::proj_to_pixel_affine).
    #[must_use]
    pub fn pixel_to_proj_affine(&self) -> Affine {
        Affine::translate(self.center.to_vec2())
            * self.inverse
            * Affine::translate(-self.view_center.to_vec2())
    }

    /// Converts a geographic point into device pixels.
    #[must_use]
    pub fn proj_to_pixel(&self, pt: Point) -> Point {
        self.view_center + (self.linear * (pt - self.center).to_point()).to_vec2()
    }

    /// Converts a device pixel position into geographic units.
    #[must_use]
    pub fn pixel_to_proj(&self, pt: Point) -> Point {
        self.center + (self.inverse * (pt - self.view_center).to_point()).to_vec2()
    }

    /// Converts a pixel displacement into a geographic displacement.
    ///
    /// Only the linear part of the transform applies, so the result is
    /// independent of where on screen the displacement happens.
    #[must_use]
    pub fn pixel_to_proj_vec(&self, delta: Vec2) -> Vec2 {
        (self.inverse * delta.to_point()).to_vec2()
    }

    /// Converts a geographic displacement into a pixel displacement.
    #[must_use]
    pub fn proj_to_pixel_vec(&self, delta: Vec2) -> Vec2 {
        (self.linear * delta.to_point()).to_vec2()
    }

    /// Converts a geographic extent into the pixel rectangle bounding its
    /// transformed corners.
    ///
    /// Without rotation this is exact; with rotation it is the axis-aligned
    /// bounding box of the rotated extent.
    #[must_use]
    pub fn proj_to_pixel_rect(&self, extent: Extent) -> Rect {
        bounding_rect(extent.corners().map(|pt| self.proj_to_pixel(pt)))
    }

    /// Converts a pixel rectangle into the geographic extent bounding its
    /// transformed corners.
    #[must_use]
    pub fn pixel_to_proj_rect(&self, rect: Rect) -> Extent {
        let corners = [
            rect.origin(),
            Point::new(rect.x1, rect.y0),
            Point::new(rect.x1, rect.y1),
            Point::new(rect.x0, rect.y1),
        ];
        Extent::from_rect(bounding_rect(corners.map(|pt| self.pixel_to_proj(pt))))
    }

    /// Geographic extent covered by the device rectangle.
    ///
    /// With rotation this is larger than [`extent`](Self::extent), since it
    /// bounds the rotated view.
    #[must_use]
    pub fn visible_extent(&self) -> Extent {
        self.pixel_to_proj_rect(self.view)
    }
}

fn bounding_rect(points: [Point; 4]) -> Rect {
    let [p0, p1, p2, p3] = points;
    Rect::from_points(p0, p1).union_pt(p2).union_pt(p3)
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Rect, Vec2};

    use super::CoordinateTransform;
    use crate::{Extent, TransformError};

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6
    }

    #[test]
    fn corners_map_to_view_corners() {
        let tx = CoordinateTransform::new(
            Extent::new(0.0, 0.0, 100.0, 50.0),
            Rect::new(0.0, 0.0, 200.0, 100.0),
            0.0,
        )
        .unwrap();

        // North-west corner is the top-left pixel; south-east is bottom-right.
        assert!(close(
            tx.proj_to_pixel(Point::new(0.0, 50.0)),
            Point::new(0.0, 0.0)
        ));
        assert!(close(
            tx.proj_to_pixel(Point::new(100.0, 0.0)),
            Point::new(200.0, 100.0)
        ));
        assert_eq!(tx.pixels_per_unit(), 2.0);
        assert_eq!(tx.units_per_pixel(), 0.5);
    }

    #[test]
    fn rotation_is_about_the_extent_center() {
        let extent = Extent::new(0.0, 0.0, 100.0, 100.0);
        let view = Rect::new(0.0, 0.0, 200.0, 200.0);
        let upright = CoordinateTransform::new(extent, view, 0.0).unwrap();
        let rotated = CoordinateTransform::new(extent, view, 90.0).unwrap();

        let expected = upright.proj_to_pixel(Point::new(0.0, 0.0));
        let actual = rotated.proj_to_pixel(Point::new(100.0, 0.0));
        assert!(close(expected, actual), "{expected:?} vs {actual:?}");

        // The center stays put regardless of angle.
        assert!(close(
            rotated.proj_to_pixel(extent.center()),
            view.center()
        ));
    }

    #[test]
    fn roundtrip_under_rotation_and_offset_view() {
        let tx = CoordinateTransform::new(
            Extent::new(-1_000.0, 250.0, 3_000.0, 4_250.0),
            Rect::new(35.0, 12.0, 835.0, 612.0),
            33.0,
        )
        .unwrap();
        for pt in [
            Point::new(35.0, 12.0),
            Point::new(400.0, 300.0),
            Point::new(834.5, 611.5),
        ] {
            let back = tx.proj_to_pixel(tx.pixel_to_proj(pt));
            assert!(close(back, pt), "{pt:?} -> {back:?}");
        }
    }

    #[test]
    fn rect_conversion_bounds_rotated_corners() {
        let extent = Extent::new(0.0, 0.0, 100.0, 100.0);
        let view = Rect::new(0.0, 0.0, 100.0, 100.0);
        let tx = CoordinateTransform::new(extent, view, 45.0).unwrap();
        let px = tx.proj_to_pixel_rect(extent);
        // A square rotated by 45 degrees is sqrt(2) times wider.
        let expected = 100.0 * core::f64::consts::SQRT_2;
        assert!((px.width() - expected).abs() < 1e-9);
        assert!((px.height() - expected).abs() < 1e-9);

        let visible = tx.visible_extent();
        assert!(visible.width() > extent.width());
    }

    #[test]
    fn pixel_vector_ignores_translation() {
        let tx = CoordinateTransform::new(
            Extent::new(500.0, 500.0, 600.0, 600.0),
            Rect::new(0.0, 0.0, 100.0, 100.0),
            0.0,
        )
        .unwrap();
        let d = tx.pixel_to_proj_vec(Vec2::new(10.0, 10.0));
        // Y flips: moving down on screen moves south.
        assert!((d.x - 10.0).abs() < 1e-9);
        assert!((d.y + 10.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        let view = Rect::new(0.0, 0.0, 10.0, 10.0);
        let point = Extent::new(10.0, 10.0, 10.0, 10.0);
        assert!(matches!(
            CoordinateTransform::new(point, view, 0.0),
            Err(TransformError::DegenerateExtent { .. })
        ));
        assert!(matches!(
            CoordinateTransform::new(Extent::new(0.0, 0.0, 1.0, 1.0), Rect::ZERO, 0.0),
            Err(TransformError::EmptyView { .. })
        ));
        assert_eq!(
            CoordinateTransform::new(Extent::new(0.0, 0.0, f64::INFINITY, 1.0), view, 0.0),
            Err(TransformError::NonFinite)
        );
    }
}
