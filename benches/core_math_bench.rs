use chrono::DateTime;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use trading_charts::api::{ChartEngine, ChartEngineConfig};
use trading_charts::core::{
    ChartConfig, DataMatrix, GraphData, LinearScale, OhlcvRecord, PAIRED_PALETTE, PlotConfig,
    PlotKind, ValueRecord, Viewport, WindowController, normalize,
};
use trading_charts::render::NullRenderer;

fn market_data(rows: i64) -> (GraphData, ChartConfig) {
    let candles: Vec<OhlcvRecord> = (0..rows)
        .map(|i| {
            let at = DateTime::from_timestamp(60 * i, 0).expect("valid time");
            let base = 100.0 + i as f64 * 0.05;
            let close = if i % 2 == 0 { base + 1.0 } else { base - 1.0 };
            OhlcvRecord::new(at, base, base.max(close) + 0.75, base.min(close) - 0.75, close, 1_000.0)
        })
        .collect();
    let sma: Vec<ValueRecord> = (0..rows)
        .map(|i| {
            let at = DateTime::from_timestamp(60 * i, 0).expect("valid time");
            ValueRecord::new(at, 100.0 + i as f64 * 0.05)
        })
        .collect();
    let data = GraphData::new()
        .with_series("ohlc", candles)
        .with_series("sma", sma);
    let config = ChartConfig::new()
        .with_plot("price", "candles", PlotConfig::candle("ohlc"))
        .with_plot("price", "sma", PlotConfig::scalar(PlotKind::SolidLine, "sma"));
    (data, config)
}

fn bench_linear_scale_round_trip(c: &mut Criterion) {
    let scale = LinearScale::new(0.0, 10_000.0, 1_080.0, 0.0).expect("valid scale");

    c.bench_function("linear_scale_round_trip", |b| {
        b.iter(|| {
            let px = scale.map(black_box(4_321.123));
            black_box(scale.invert(px))
        })
    });
}

fn bench_normalize_10k(c: &mut Criterion) {
    let (data, config) = market_data(10_000);

    c.bench_function("normalize_and_build_10k", |b| {
        b.iter(|| {
            let rows = normalize(black_box(&data), black_box(&config), &PAIRED_PALETTE);
            black_box(DataMatrix::build(rows))
        })
    });
}

fn bench_window_zoom_steps(c: &mut Criterion) {
    let mut window = WindowController::default();
    window.set_interpolator(100_000, 3);

    c.bench_function("window_zoom_and_drag", |b| {
        b.iter(|| {
            window.zoom_by_step(black_box(0.01));
            window.begin_drag();
            window.pan_by_pixels(black_box(-37.0), 4.0);
            window.end_drag();
            window.zoom_by_step(black_box(-0.01));
            black_box(window.state())
        })
    });
}

fn bench_engine_frame_build(c: &mut Criterion) {
    let (data, config) = market_data(5_000);
    let mut engine = ChartEngine::new(
        NullRenderer::default(),
        ChartEngineConfig::new(Viewport::new(1920, 1080)),
    )
    .expect("engine init");
    engine.set_data(data);
    engine.set_config(config).expect("valid config");
    engine.set_zoom_level(0.9);
    engine.pointer_move(900.0, 400.0);

    c.bench_function("engine_build_render_frame", |b| {
        b.iter(|| black_box(engine.build_render_frame().expect("frame")))
    });
}

criterion_group!(
    benches,
    bench_linear_scale_round_trip,
    bench_normalize_10k,
    bench_window_zoom_steps,
    bench_engine_frame_build
);
criterion_main!(benches);
