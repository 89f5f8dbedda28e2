//! Benchmarks for per-frame scene updates and headless rendering.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hero_waveform::gpu::OffscreenRenderer;
use hero_waveform::scene::{
    ParticleDrift, ParticleField, SceneOptions, Viewport, WaveformLayers, WaveformScene,
};

fn bench_scene_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("Scene Update");

    let mut scene = WaveformScene::build(Viewport::new(1920, 1080, 1.0, 2.0), SceneOptions::default());
    group.bench_function("full_frame", |b| {
        b.iter(|| {
            black_box(scene.update().time);
        });
    });

    let mut layers = WaveformLayers::new();
    let mut time = 0.0f32;
    group.bench_function("waveform_layers", |b| {
        b.iter(|| {
            time += 0.01;
            layers.update(black_box(time));
        });
    });

    let mut particles = ParticleField::new(7, ParticleDrift::Unbounded);
    group.bench_function("particle_field", |b| {
        b.iter(|| {
            time += 0.01;
            particles.update(black_box(time));
        });
    });

    group.finish();
}

fn bench_render_resolutions(c: &mut Criterion) {
    let mut group = c.benchmark_group("Resolution Scaling");

    let resolutions = [
        (640, 360, "360p"),
        (1280, 720, "720p"),
        (1920, 1080, "1080p"),
    ];

    for (width, height, name) in resolutions {
        let viewport = Viewport::new(width, height, 1.0, 2.0);
        let mut renderer = match pollster::block_on(OffscreenRenderer::new(&viewport)) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Skipping GPU benchmarks: {}", e);
                return;
            }
        };
        let mut scene = WaveformScene::build(viewport, SceneOptions::default());

        group.bench_with_input(BenchmarkId::new("render", name), &(), |b, _| {
            b.iter(|| {
                let frame = scene.update();
                black_box(renderer.render(&frame).map(|pixels| pixels.len()).ok());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_scene_update, bench_render_resolutions);
criterion_main!(benches);
