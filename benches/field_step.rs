//! Benchmarks for per-frame CPU work: generation, physics, twinkle, rain, packing.
//!
//! Run with: `cargo bench`

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;

use ambient_field::headless::{HeadlessBackend, ManualScheduler};
use ambient_field::shader::pack_instances;
use ambient_field::{
    generate, impulse, physics, presets, rain, twinkle, FieldBuilder, SeededSource,
};

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");

    for count in [1_000, 10_000, 50_000] {
        group.bench_with_input(BenchmarkId::new("milky_way", count), &count, |b, &count| {
            let recipe = presets::milky_way(count);
            b.iter(|| black_box(generate(&recipe, &mut SeededSource::new(7))))
        });
        group.bench_with_input(BenchmarkId::new("spiral_galaxy", count), &count, |b, &count| {
            let recipe = presets::spiral_galaxy(count);
            b.iter(|| black_box(generate(&recipe, &mut SeededSource::new(7))))
        });
    }

    group.finish();
}

fn bench_physics_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("physics_step");

    for count in [1_000, 10_000, 50_000] {
        let mut layer = generate(&presets::milky_way(count), &mut SeededSource::new(7)).unwrap();
        impulse::inject(&mut layer, Vec3::ZERO, 30.0, 1.0);

        group.bench_with_input(BenchmarkId::new("no_pointer", count), &count, |b, _| {
            b.iter(|| physics::step(black_box(&mut layer), None))
        });
        group.bench_with_input(BenchmarkId::new("pointer", count), &count, |b, _| {
            b.iter(|| physics::step(black_box(&mut layer), Some(Vec3::new(2.0, 1.0, 0.0))))
        });
    }

    group.finish();
}

fn bench_twinkle(c: &mut Criterion) {
    let mut layer = generate(&presets::twinkling_sky(10_000), &mut SeededSource::new(7)).unwrap();
    let mut elapsed = 0.0;
    c.bench_function("twinkle_modulate_10k", |b| {
        b.iter(|| {
            elapsed += 0.016;
            twinkle::modulate(black_box(&mut layer), elapsed)
        })
    });
}

fn bench_rain(c: &mut Criterion) {
    let mut layer = generate(&presets::terminal_field(10_000), &mut SeededSource::new(7)).unwrap();
    c.bench_function("rain_advance_10k", |b| {
        b.iter(|| rain::advance(black_box(&mut layer)))
    });
}

fn bench_pack_instances(c: &mut Criterion) {
    let layer = generate(&presets::milky_way(10_000), &mut SeededSource::new(7)).unwrap();
    c.bench_function("pack_instances_10k", |b| {
        b.iter(|| black_box(pack_instances(&layer)))
    });
}

fn bench_headless_frame(c: &mut Criterion) {
    let mut field = FieldBuilder::new(1920.0, 1080.0)
        .with_seed(7)
        .with_layers(presets::night_sky())
        .mount(
            Some(HeadlessBackend::new()),
            ManualScheduler::with_interval(Duration::from_millis(16)),
        );
    field.pointer_moved(960.0, 540.0);

    c.bench_function("night_sky_frame", |b| b.iter(|| field.run_frames(1)));
}

criterion_group!(
    benches,
    bench_generate,
    bench_physics_step,
    bench_twinkle,
    bench_rain,
    bench_pack_instances,
    bench_headless_frame,
);
criterion_main!(benches);
