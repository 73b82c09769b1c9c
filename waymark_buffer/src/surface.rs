// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _; // for `round`
use kurbo::{Point, Rect, Size};
use peniko::color::PremulRgba8;
use peniko::{Blob, Color, ImageAlphaType, ImageData, ImageFormat, ImageQuality, ImageSampler};
use vello_cpu::kurbo::{Affine as CpuAffine, Rect as CpuRect};
use vello_cpu::{Image as CpuImage, ImageSource, Pixmap, RenderContext};

use crate::error::BufferAllocationError;

const TRANSPARENT: PremulRgba8 = PremulRgba8 {
    r: 0,
    g: 0,
    b: 0,
    a: 0,
};

/// Off-screen raster surface in premultiplied RGBA8.
///
/// A thin owner of a [`vello_cpu::Pixmap`]. Layers paint into it through
/// [`fill_rect`](Self::fill_rect), the view buffer shifts its contents on
/// pans and copies it to the screen. Pixels are stored row-major with the
/// origin at the top-left.
///
/// Painting and compositing are rasterized by `vello_cpu`; only the
/// replacing operations (clears, shifts, copies) touch rows directly.
#[derive(Clone)]
pub struct PixelSurface {
    pixmap: Pixmap,
}

impl core::fmt::Debug for PixelSurface {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PixelSurface")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .finish_non_exhaustive()
    }
}

impl PartialEq for PixelSurface {
    fn eq(&self, other: &Self) -> bool {
        self.pixmap.width() == other.pixmap.width()
            && self.pixmap.height() == other.pixmap.height()
            && self.pixmap.data() == other.pixmap.data()
    }
}

impl Eq for PixelSurface {}

/// Pixel rectangle `[x0, x1) × [y0, y1)`, already clipped to a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Span {
    x0: u16,
    y0: u16,
    x1: u16,
    y1: u16,
}

impl Span {
    fn width(self) -> u16 {
        self.x1 - self.x0
    }

    fn height(self) -> u16 {
        self.y1 - self.y0
    }

    fn columns(self) -> core::ops::Range<usize> {
        usize::from(self.x0)..usize::from(self.x1)
    }

    fn rows(self) -> core::ops::Range<usize> {
        usize::from(self.y0)..usize::from(self.y1)
    }
}

impl PixelSurface {
    /// Allocates a transparent `width × height` surface.
    ///
    /// # Errors
    ///
    /// - [`BufferAllocationError::TooLarge`] if either side exceeds
    ///   `max_dimension` or `u16::MAX`, the largest raster `vello_cpu`
    ///   addresses.
    /// - [`BufferAllocationError::OutOfMemory`] if the allocator refuses
    ///   the storage.
    pub fn new(width: u32, height: u32, max_dimension: u32) -> Result<Self, BufferAllocationError> {
        let max = max_dimension.min(u32::from(u16::MAX));
        let too_large = BufferAllocationError::TooLarge { width, height, max };
        if width > max || height > max {
            return Err(too_large);
        }
        let (Ok(w), Ok(h)) = (u16::try_from(width), u16::try_from(height)) else {
            return Err(too_large);
        };

        let len = usize::from(w) * usize::from(h);
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| BufferAllocationError::OutOfMemory { width, height })?;
        data.resize(len, TRANSPARENT);
        Ok(Self {
            pixmap: Pixmap::from_parts(data, w, h),
        })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        u32::from(self.pixmap.width())
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        u32::from(self.pixmap.height())
    }

    /// Size in pixels.
    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width()), f64::from(self.height()))
    }

    /// The rectangle `(0, 0, width, height)`.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.size().to_rect()
    }

    /// The underlying pixmap.
    #[must_use]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Row-major premultiplied pixels.
    #[must_use]
    pub fn pixels(&self) -> &[PremulRgba8] {
        self.pixmap.data()
    }

    /// Returns the premultiplied `[r, g, b, a]` at `(x, y)`, or `None`
    /// outside the surface.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let i = y as usize * usize::from(self.pixmap.width()) + x as usize;
        self.pixmap.data().get(i).map(|p| p.to_u8_array())
    }

    /// Replaces every pixel with `color`.
    pub fn clear(&mut self, color: Color) {
        self.pixmap.data_mut().fill(color.premultiply().to_rgba8());
    }

    /// Replaces the pixels covered by `rect` with `color`.
    ///
    /// `rect` is rounded to the pixel grid and clipped to the surface.
    pub fn clear_rect(&mut self, rect: Rect, color: Color) {
        let Some(span) = self.span(rect) else {
            return;
        };
        let px = color.premultiply().to_rgba8();
        let stride = usize::from(self.pixmap.width());
        let data = self.pixmap.data_mut();
        for y in span.rows() {
            let row = y * stride;
            data[row + usize::from(span.x0)..row + usize::from(span.x1)].fill(px);
        }
    }

    /// Paints `color` over the pixels covered by `rect` (source-over).
    ///
    /// `rect` is rounded to the pixel grid and clipped to the surface.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some(span) = self.span(rect) else {
            return;
        };
        self.render_over(span, |ctx, local| {
            ctx.set_paint(color);
            ctx.fill_rect(&local);
        });
    }

    /// Moves the contents by `(dx, dy)` pixels.
    ///
    /// The pixel at `(x, y)` ends up at `(x + dx, y + dy)`. Content moved past
    /// an edge is lost and the uncovered area becomes transparent.
    pub fn shift(&mut self, dx: i32, dy: i32) {
        let (w, h) = (
            usize::from(self.pixmap.width()),
            usize::from(self.pixmap.height()),
        );
        let (ax, ay) = (dx.unsigned_abs() as usize, dy.unsigned_abs() as usize);
        let data = self.pixmap.data_mut();
        if ax >= w || ay >= h {
            data.fill(TRANSPARENT);
            return;
        }
        if dx == 0 && dy == 0 {
            return;
        }

        // Columns that receive content, and where that content comes from.
        let (dst_x, src_x) = if dx >= 0 { (ax, 0) } else { (0, ax) };
        let span = w - ax;
        let copy_row = |data: &mut [PremulRgba8], dst_y: usize, src_y: usize| {
            let src = src_y * w + src_x;
            data.copy_within(src..src + span, dst_y * w + dst_x);
            let row = &mut data[dst_y * w..(dst_y + 1) * w];
            if dx >= 0 {
                row[..ax].fill(TRANSPARENT);
            } else {
                row[span..].fill(TRANSPARENT);
            }
        };

        // Walk rows against the direction of motion so sources are read
        // before they are overwritten.
        if dy >= 0 {
            for y in (ay..h).rev() {
                copy_row(data, y, y - ay);
            }
            data[..ay * w].fill(TRANSPARENT);
        } else {
            for y in 0..h - ay {
                copy_row(data, y, y + ay);
            }
            data[(h - ay) * w..].fill(TRANSPARENT);
        }
    }

    /// Composites `tile` over this surface with its top-left corner at `at`
    /// (source-over). `at` is rounded to whole pixels; parts of the tile
    /// outside the surface are ignored.
    pub fn composite(&mut self, tile: &Self, at: Point) {
        let (ox, oy) = (at.x.round(), at.y.round());
        let Some(span) = self.span(Rect::from_origin_size((ox, oy), tile.size())) else {
            return;
        };
        let Some(whole) = tile.span(tile.bounds()) else {
            return;
        };
        let image = tile.image_of(whole);
        let offset = CpuAffine::translate((ox - f64::from(span.x0), oy - f64::from(span.y0)));
        let tile_rect = CpuRect::new(0.0, 0.0, tile.size().width, tile.size().height);
        self.render_over(span, |ctx, _| {
            ctx.set_transform(offset);
            ctx.set_paint(image);
            ctx.fill_rect(&tile_rect);
        });
    }

    /// Copies `src` from `from` into this surface at `dest` (replacing).
    ///
    /// `dest` is rounded to whole pixels.
    pub(crate) fn copy_from(&mut self, from: &Self, src: Rect, dest: Point) {
        let Some(s) = from.span(src) else {
            return;
        };
        let (dx, dy) = (dest.x.round(), dest.y.round());
        let target = Rect::from_origin_size((dx, dy), (f64::from(s.width()), f64::from(s.height())));
        let Some(d) = self.span(target) else {
            return;
        };
        // Source pixels that fall left of or above this surface.
        let skip_x = inset(d.x0, dx);
        let skip_y = inset(d.y0, dy);
        let cols = usize::from(d.width());

        let src_stride = usize::from(from.pixmap.width());
        let dst_stride = usize::from(self.pixmap.width());
        let src_data = from.pixmap.data();
        let dst_data = self.pixmap.data_mut();
        for (i, y) in d.rows().enumerate() {
            let sy = usize::from(s.y0) + skip_y + i;
            let read = sy * src_stride + usize::from(s.x0) + skip_x;
            let write = y * dst_stride + usize::from(d.x0);
            dst_data[write..write + cols].copy_from_slice(&src_data[read..read + cols]);
        }
    }

    /// Rasterizes `draw` over the current contents of `span`.
    ///
    /// The existing pixels are painted first as an image backdrop, so
    /// whatever `draw` adds is blended over them by `vello_cpu`.
    fn render_over(&mut self, span: Span, draw: impl FnOnce(&mut RenderContext, CpuRect)) {
        let (w, h) = (span.width(), span.height());
        let local = CpuRect::new(0.0, 0.0, f64::from(w), f64::from(h));

        let mut ctx = RenderContext::new(w, h);
        ctx.set_paint(self.image_of(span));
        ctx.fill_rect(&local);
        draw(&mut ctx, local);
        ctx.flush();

        let mut out = Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut out);

        let stride = usize::from(self.pixmap.width());
        let cols = usize::from(w);
        let data = self.pixmap.data_mut();
        for (y, row) in span.rows().zip(out.data().chunks_exact(cols)) {
            let at = y * stride + usize::from(span.x0);
            data[at..at + cols].copy_from_slice(row);
        }
    }

    /// The pixels of `span` as an image paint, sampled without filtering.
    fn image_of(&self, span: Span) -> CpuImage {
        let stride = usize::from(self.pixmap.width());
        let mut bytes =
            Vec::with_capacity(usize::from(span.width()) * usize::from(span.height()) * 4);
        for y in span.rows() {
            let row = &self.pixmap.data()[y * stride..(y + 1) * stride];
            for p in &row[span.columns()] {
                bytes.extend_from_slice(&p.to_u8_array());
            }
        }
        let data = ImageData {
            data: Blob::from(bytes),
            format: ImageFormat::Rgba8,
            alpha_type: ImageAlphaType::AlphaPremultiplied,
            width: u32::from(span.width()),
            height: u32::from(span.height()),
        };
        CpuImage {
            image: ImageSource::from_peniko_image_data(&data),
            sampler: ImageSampler {
                quality: ImageQuality::Low,
                ..ImageSampler::default()
            },
        }
    }

    /// Pixels covered by `rect`, rounded to the grid and clipped.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "coordinates are rounded and clamped to the surface size first"
    )]
    fn span(&self, rect: Rect) -> Option<Span> {
        if !rect.is_finite() {
            return None;
        }
        let r = rect.abs().round().intersect(self.bounds());
        if r.width() <= 0.0 || r.height() <= 0.0 {
            return None;
        }
        Some(Span {
            x0: r.x0 as u16,
            y0: r.y0 as u16,
            x1: r.x1 as u16,
            y1: r.y1 as u16,
        })
    }
}

/// Distance from a rounded `origin` to the clipped `edge` it produced.
#[allow(
    clippy::cast_possible_truncation,
    reason = "the clipped edge never lies before the origin and is at most u16::MAX"
)]
fn inset(edge: u16, origin: f64) -> usize {
    (f64::from(edge) - origin).max(0.0) as usize
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Rect};
    use peniko::Color;

    use super::PixelSurface;
    use crate::BufferAllocationError;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const CLEAR: [u8; 4] = [0; 4];

    fn row(surface: &PixelSurface, y: u32) -> alloc::vec::Vec<[u8; 4]> {
        (0..surface.width())
            .map(|x| surface.pixel(x, y).unwrap())
            .collect()
    }

    fn count(surface: &PixelSurface, px: [u8; 4]) -> usize {
        surface
            .pixels()
            .iter()
            .filter(|p| p.to_u8_array() == px)
            .count()
    }

    #[test]
    fn limits_are_checked_before_allocating() {
        assert_eq!(
            PixelSurface::new(300, 10, 256),
            Err(BufferAllocationError::TooLarge {
                width: 300,
                height: 10,
                max: 256
            })
        );
        let s = PixelSurface::new(4, 3, 256).unwrap();
        assert_eq!(s.pixels().len(), 12);
        assert_eq!(count(&s, CLEAR), 12);
        assert_eq!(s.pixel(4, 0), None);
    }

    #[test]
    fn sides_are_capped_at_the_raster_limit() {
        assert_eq!(
            PixelSurface::new(70_000, 1, u32::MAX),
            Err(BufferAllocationError::TooLarge {
                width: 70_000,
                height: 1,
                max: u32::from(u16::MAX)
            })
        );
    }

    #[test]
    fn fill_rect_rounds_and_clips() {
        let mut s = PixelSurface::new(4, 2, 16).unwrap();
        s.fill_rect(Rect::new(2.4, -5.0, 9.0, 0.6), Color::from_rgba8(255, 0, 0, 255));
        assert_eq!(row(&s, 0), [CLEAR, CLEAR, RED, RED]);
        assert_eq!(row(&s, 1), [CLEAR; 4]);
    }

    #[test]
    fn fill_rect_keeps_pixels_outside_the_rect() {
        let mut s = PixelSurface::new(4, 1, 16).unwrap();
        s.clear(Color::from_rgba8(0, 0, 255, 255));
        s.fill_rect(Rect::new(1.0, 0.0, 2.0, 1.0), Color::from_rgba8(255, 0, 0, 255));
        let blue = [0, 0, 255, 255];
        assert_eq!(row(&s, 0), [blue, RED, blue, blue]);
    }

    #[test]
    fn translucent_fill_blends_over() {
        let mut s = PixelSurface::new(1, 1, 16).unwrap();
        s.clear(Color::WHITE);
        s.fill_rect(s.bounds(), Color::from_rgba8(0, 0, 0, 128));
        let [r, g, b, a] = s.pixel(0, 0).unwrap();
        assert_eq!(a, 255);
        assert!(r == g && g == b && (125..=129).contains(&r), "{r}");
    }

    #[test]
    fn clear_stores_premultiplied_channels() {
        let mut s = PixelSurface::new(2, 1, 16).unwrap();
        s.clear(Color::from_rgba8(255, 255, 255, 0));
        assert_eq!(s.pixel(0, 0), Some(CLEAR));
        s.clear_rect(Rect::new(1.0, 0.0, 2.0, 1.0), Color::from_rgba8(200, 100, 0, 255));
        assert_eq!(row(&s, 0), [CLEAR, [200, 100, 0, 255]]);
    }

    #[test]
    fn shift_moves_content_and_clears_the_rest() {
        let mut s = PixelSurface::new(4, 3, 16).unwrap();
        s.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::from_rgba8(255, 0, 0, 255));

        s.shift(2, 1);
        assert_eq!(s.pixel(0, 0), Some(CLEAR));
        assert_eq!(s.pixel(2, 1), Some(RED));
        assert_eq!(count(&s, RED), 1);

        s.shift(-1, -1);
        assert_eq!(s.pixel(1, 0), Some(RED));
        assert_eq!(count(&s, RED), 1);

        s.shift(0, 3);
        assert_eq!(count(&s, CLEAR), 12);
    }

    #[test]
    fn composite_places_tile_at_offset() {
        let mut tile = PixelSurface::new(2, 2, 16).unwrap();
        tile.clear(Color::from_rgba8(255, 0, 0, 255));
        let mut s = PixelSurface::new(4, 4, 16).unwrap();
        s.composite(&tile, Point::new(3.0, -1.0));
        assert_eq!(s.pixel(3, 0), Some(RED));
        assert_eq!(count(&s, RED), 1);
    }

    #[test]
    fn composite_leaves_transparent_tile_pixels_alone() {
        let mut tile = PixelSurface::new(2, 1, 16).unwrap();
        tile.clear_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::from_rgba8(255, 0, 0, 255));
        let mut s = PixelSurface::new(2, 1, 16).unwrap();
        s.clear(Color::from_rgba8(0, 255, 0, 255));
        s.composite(&tile, Point::ORIGIN);
        assert_eq!(row(&s, 0), [RED, [0, 255, 0, 255]]);
    }

    #[test]
    fn copy_from_clips_at_both_surfaces() {
        let mut from = PixelSurface::new(3, 3, 16).unwrap();
        from.clear_rect(Rect::new(2.0, 2.0, 3.0, 3.0), Color::from_rgba8(255, 0, 0, 255));
        let mut to = PixelSurface::new(2, 2, 16).unwrap();
        to.copy_from(&from, from.bounds(), Point::new(-1.0, -1.0));
        assert_eq!(to.pixel(1, 1), Some(RED));
        assert_eq!(count(&to, RED), 1);
    }
}
