use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lander::{init, App, Autopilot, ControlState, Landscape, Planet, TerrainSettings};

const SWEEP_STEP: f64 = 0.25;

const FLAT_SIM: &str = r#"{
    "Rocket": { "X": 600, "Y": 200 },
    "Terrain": [[0, 50], [1200, 50]]
}"#;

fn rough_landscape() -> Landscape {
    Planet::try_generate(
        TerrainSettings::default()
            .with_width(4000)
            .with_spacing(10)
            .with_seed(1),
    )
    .unwrap()
    .into_landscape()
}

fn sweep_cached(landscape: &mut Landscape) -> f64 {
    let mut x = 0.;
    let mut sum = 0.;
    while x < 4000. {
        sum += landscape.height(x);
        x += SWEEP_STEP;
    }
    sum
}

fn sweep_naive(landscape: &Landscape) -> f64 {
    let mut x = 0.;
    let mut sum = 0.;
    while x < 4000. {
        sum += landscape.height_naive(x);
        x += SWEEP_STEP;
    }
    sum
}

fn flat_app(max_ticks: usize) -> App {
    let mut config = init::json::parse_from_string(FLAT_SIM).unwrap();
    config.run = config.run.with_max_ticks(max_ticks);
    App::try_from_config(&config).unwrap()
}

pub fn landscape_benchmark(c: &mut Criterion) {
    let mut landscape = rough_landscape();
    c.bench_function("height_sweep_cached", |b| {
        b.iter(|| sweep_cached(black_box(&mut landscape)))
    });

    let landscape = rough_landscape();
    c.bench_function("height_sweep_naive", |b| {
        b.iter(|| sweep_naive(black_box(&landscape)))
    });
}

pub fn tick_benchmark(c: &mut Criterion) {
    c.bench_function("free_fall_100_ticks", |b| {
        b.iter_batched(
            || flat_app(100),
            |mut app| app.run(&mut ControlState::default()).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });

    c.bench_function("autopilot_landing", |b| {
        b.iter_batched(
            || flat_app(100_000),
            |mut app| app.run(&mut Autopilot::default()).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, landscape_benchmark, tick_benchmark);
criterion_main!(benches);
