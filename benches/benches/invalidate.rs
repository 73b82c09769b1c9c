// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use kurbo::{Rect, Vec2};
use waymark_dirty::{Coalesce, RegionInvalidator};

#[derive(Clone)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u32(&mut self) -> u32 {
        // Numerical Recipes LCG parameters.
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 32) as u32
    }

    fn gen_range(&mut self, upper: f64) -> f64 {
        f64::from(self.next_u32()) / f64::from(u32::MAX) * upper
    }
}

const BOUNDS: Rect = Rect::new(0.0, 0.0, 3_600.0, 2_400.0);

fn random_rects(n: usize, max_side: f64, seed: u64) -> Vec<Rect> {
    let mut rng = Lcg::new(seed);
    (0..n)
        .map(|_| {
            let x = rng.gen_range(BOUNDS.width());
            let y = rng.gen_range(BOUNDS.height());
            let w = 1.0 + rng.gen_range(max_side);
            let h = 1.0 + rng.gen_range(max_side);
            Rect::new(x, y, x + w, y + h)
        })
        .collect()
}

fn invalidator(coalesce: Coalesce) -> RegionInvalidator {
    let mut dirty = RegionInvalidator::new()
        .with_coalesce(coalesce)
        .with_max_regions(64);
    dirty.set_bounds(Some(BOUNDS));
    dirty
}

fn bench_invalidate(c: &mut Criterion) {
    let mut group = c.benchmark_group("waymark_dirty");
    group.sample_size(50);

    for &(n, side) in &[(16_usize, 40.0), (256, 40.0), (256, 400.0), (4_096, 12.0)] {
        let rects = random_rects(n, side, 0xD1A7_0000_0000_0001);
        for (label, coalesce) in [
            ("touching", Coalesce::Touching),
            ("overlapping", Coalesce::Overlapping),
        ] {
            group.bench_function(format!("{label}(n={n},side={side})"), |b| {
                b.iter_batched(
                    || invalidator(coalesce),
                    |mut dirty| {
                        for r in &rects {
                            dirty.invalidate(*r);
                        }
                        black_box(dirty.take_pending())
                    },
                    BatchSize::SmallInput,
                );
            });
        }
    }

    let rects = random_rects(32, 60.0, 0xD1A7_0000_0000_0002);
    group.bench_function("translate(n=32)", |b| {
        b.iter_batched(
            || {
                let mut dirty = invalidator(Coalesce::Overlapping);
                for r in &rects {
                    dirty.invalidate(*r);
                }
                dirty
            },
            |mut dirty| {
                dirty.translate(Vec2::new(37.0, -12.0));
                black_box(dirty)
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_invalidate);
criterion_main!(benches);
