use criterion::{Criterion, black_box, criterion_group, criterion_main};
use lanewatch::scene::{SceneFrame, render_scene};
use lanewatch::{Lane, SceneConfig, TelemetrySnapshot, telemetry::decode_snapshot};
use std::time::Duration;

const STATUS_BODY: &[u8] = br#"{"lane":1,"obstacle_detected":true,"position":[42.0,0],"status":"running","velocity":[1.0,0]}"#;

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene_rendering");
    group.measurement_time(Duration::from_secs(5));

    let config = SceneConfig::default();
    group.bench_function("render_clear_road", |b| {
        let frame = SceneFrame {
            position: [3., 0.],
            obstacle: false,
            lane: Lane::Upper,
        };
        b.iter(|| render_scene(black_box(&config), black_box(&frame)))
    });

    group.bench_function("render_with_obstacle", |b| {
        let frame = SceneFrame {
            position: [3., 0.],
            obstacle: true,
            lane: Lane::Lower,
        };
        b.iter(|| render_scene(black_box(&config), black_box(&frame)))
    });

    let wide = SceneConfig {
        width: 4000.,
        ..SceneConfig::default()
    };
    group.bench_function("render_wide_canvas", |b| {
        let frame = SceneFrame::from(&TelemetrySnapshot::default());
        b.iter(|| render_scene(black_box(&wide), black_box(&frame)))
    });

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    c.bench_function("decode_status_body", |b| {
        b.iter(|| decode_snapshot(black_box(STATUS_BODY)))
    });
}

criterion_group!(benches, bench_render, bench_decode);
criterion_main!(benches);
