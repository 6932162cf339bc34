use std::hint::black_box;

use agora::simulation::collision::{resolve_pass, Body};
use bevy::math::Vec2;
use criterion::{criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn bench_resolve_pass(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let bodies: Vec<Body> = (0..1000)
        .map(|_| Body {
            position: Vec2::new(rng.gen_range(0.0..1600.0), rng.gen_range(0.0..1200.0)),
            velocity: Vec2::ZERO,
            anchored: false,
        })
        .collect();

    c.bench_function("resolve_pass_1000", |b| {
        b.iter(|| {
            let mut scratch = bodies.clone();
            resolve_pass(black_box(&mut scratch), 40.0, 0.05);
        })
    });
}

criterion_group!(benches, bench_resolve_pass);
criterion_main!(benches);
