// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use kurbo::{Point, Rect};
use waymark_clip::{ClipScratch, clip_envelope, clip_polygon, clip_polygon_with_scratch};

#[derive(Clone)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_f64(&mut self) -> f64 {
        // Numerical Recipes LCG parameters.
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        f64::from((self.0 >> 32) as u32) / f64::from(u32::MAX)
    }
}

/// A star-shaped closed ring around `center` whose spikes reach `reach`.
fn ring(n: usize, center: Point, reach: f64, seed: u64) -> Vec<Point> {
    let mut rng = Lcg::new(seed);
    let mut points: Vec<Point> = (0..n)
        .map(|i| {
            let angle = i as f64 / n as f64 * core::f64::consts::TAU;
            let r = reach * (0.2 + 0.8 * rng.next_f64());
            Point::new(center.x + r * angle.cos(), center.y + r * angle.sin())
        })
        .collect();
    points.push(points[0]);
    points
}

fn bench_clip(c: &mut Criterion) {
    let mut group = c.benchmark_group("waymark_clip");
    let envelope = clip_envelope(Rect::new(0.0, 0.0, 1_200.0, 900.0), 256.0);

    for &n in &[16_usize, 256, 4_096] {
        // Mostly outside the envelope: exercises every half-plane pass.
        let straddling = ring(n, Point::new(600.0, 450.0), 3_000.0, 0xC11F_0000_0000_0001);
        let inside = ring(n, Point::new(600.0, 450.0), 300.0, 0xC11F_0000_0000_0002);

        group.bench_function(format!("alloc_straddling(n={n})"), |b| {
            b.iter(|| black_box(clip_polygon(black_box(&straddling), envelope)));
        });
        group.bench_function(format!("scratch_straddling(n={n})"), |b| {
            let mut scratch = ClipScratch::new();
            b.iter(|| {
                let out = clip_polygon_with_scratch(black_box(&straddling), envelope, &mut scratch);
                black_box(out.len())
            });
        });
        group.bench_function(format!("scratch_inside(n={n})"), |b| {
            let mut scratch = ClipScratch::new();
            b.iter(|| {
                let out = clip_polygon_with_scratch(black_box(&inside), envelope, &mut scratch);
                black_box(out.len())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_clip);
criterion_main!(benches);
