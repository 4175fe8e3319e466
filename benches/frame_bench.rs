//! Benchmarks for per-frame simulation and rendering.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use particle_brain::gpu::renderer::{pack_instances, ParticleInstance};
use particle_brain::{BrainConfig, DeviceProfile, ParticleScene, SnapshotRenderer};
use std::time::Duration;

const TICK: Duration = Duration::from_millis(17);

fn scene(count: u32) -> ParticleScene {
    let config = BrainConfig {
        particle_count: count,
        seed: Some(1),
        ..Default::default()
    }
    .resolve(&DeviceProfile::default());
    ParticleScene::new(config).unwrap()
}

fn bench_idle_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("Idle Frame");

    for count in [1800u32, 3000, 6000] {
        group.bench_with_input(BenchmarkId::new("particles", count), &count, |b, &count| {
            let mut scene = scene(count);
            let mut now = Duration::ZERO;
            b.iter(|| {
                now += TICK;
                black_box(scene.frame(now));
            });
        });
    }

    group.finish();
}

fn bench_morph_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("Morph Frame");

    group.bench_function("6000_particles", |b| {
        let mut scene = scene(6000);
        let mut now = Duration::ZERO;
        let mut target = 1;
        b.iter(|| {
            if !scene.controller().is_morphing() {
                scene.morph_to_shape(target);
                target += 1;
            }
            now += TICK;
            black_box(scene.frame(now));
        });
    });

    group.finish();
}

fn bench_pack_instances(c: &mut Criterion) {
    let scene = scene(6000);
    let buffers = scene.controller().buffers();
    let mut out = vec![ParticleInstance::default(); buffers.len()];

    c.bench_function("pack_instances_6000", |b| {
        b.iter(|| {
            pack_instances(buffers, &mut out);
            black_box(&out);
        });
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let mut scene = scene(6000);
    scene.resize(1280, 720, 1.0);
    scene.frame(Duration::ZERO);

    let mut renderer = match pollster::block_on(SnapshotRenderer::new(&scene, 1280, 720)) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Skipping GPU benchmarks: {}", e);
            return;
        }
    };

    c.bench_function("snapshot_720p", |b| {
        b.iter(|| {
            scene.mark_all_dirty();
            black_box(renderer.render(&mut scene).unwrap());
        });
    });
}

criterion_group!(
    benches,
    bench_idle_frame,
    bench_morph_frame,
    bench_pack_instances,
    bench_snapshot
);
criterion_main!(benches);
