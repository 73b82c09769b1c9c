// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use kurbo::{Rect, Vec2};
use waymark_buffer::{PixelSurface, RecordingTarget};
use waymark_transform::Extent;
use waymark_viewport::{Viewport, ViewportConfig};

const VIEW: Rect = Rect::new(0.0, 0.0, 800.0, 600.0);

fn viewport(extend_buffer: bool) -> Viewport {
    let config = ViewportConfig {
        extend_buffer,
        ..ViewportConfig::default()
    };
    let mut viewport = Viewport::new(config, VIEW);
    let _ = viewport.zoom_to_extent(Extent::new(0.0, 0.0, 8_000.0, 6_000.0));
    viewport.draw(&mut RecordingTarget::new(), VIEW);
    viewport
}

fn bench_pan(c: &mut Criterion) {
    let mut group = c.benchmark_group("waymark_viewport");

    // Back and forth inside the margin: pure window moves.
    group.bench_function("pan_reused", |b| {
        let mut vp = viewport(true);
        let mut target = RecordingTarget::new();
        let mut sign = 1.0;
        b.iter(|| {
            sign = -sign;
            vp.pan(Vec2::new(sign * 40.0, 0.0));
            black_box(vp.draw(&mut target, VIEW).regions)
        });
    });

    // Every step leaves the window: shift plus strip invalidation.
    for (label, extend) in [("pan_shifted_extended", true), ("pan_shifted_plain", false)] {
        group.bench_function(label, |b| {
            let mut vp = viewport(extend);
            let mut target = RecordingTarget::new();
            b.iter(|| {
                vp.pan(Vec2::new(900.0, 25.0));
                black_box(vp.draw(&mut target, VIEW).regions)
            });
        });
    }

    group.bench_function("surface_shift(2400x1800)", |b| {
        let mut surface = PixelSurface::new(2_400, 1_800, 16_384).unwrap();
        let mut sign = 1;
        b.iter(|| {
            sign = -sign;
            surface.shift(sign * 64, sign * 16);
            black_box(surface.pixel(0, 0))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_pan);
criterion_main!(benches);
