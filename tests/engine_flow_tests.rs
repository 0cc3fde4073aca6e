use approx::assert_relative_eq;
use chrono::{DateTime, Utc};
use trading_charts::api::{ChartEngine, ChartEngineConfig, SettingsPatch};
use trading_charts::core::{
    ChartConfig, GraphData, OhlcvRecord, PlotConfig, PlotKind, ValueRecord, Viewport,
    WindowController,
};
use trading_charts::interaction::InteractionMode;
use trading_charts::render::NullRenderer;

fn at(minute: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_672_531_200 + 60 * minute, 0).expect("valid time")
}

fn unpadded_full_zoom() -> SettingsPatch {
    SettingsPatch {
        zoom_level: Some(1.0),
        min_zoom_rows: Some(3),
        y_scale_padding_pct: Some(0.0),
        ..SettingsPatch::default()
    }
}

fn engine_with(settings: SettingsPatch) -> ChartEngine<NullRenderer> {
    let config = ChartEngineConfig::new(Viewport::new(800, 600)).with_settings(settings);
    ChartEngine::new(NullRenderer::default(), config).expect("engine init")
}

fn line_engine(rows: i64, settings: SettingsPatch) -> ChartEngine<NullRenderer> {
    let mut engine = engine_with(settings);
    let records: Vec<ValueRecord> = (0..rows)
        .map(|i| ValueRecord::new(at(i), 100.0 + i as f64))
        .collect();
    engine.set_data(GraphData::new().with_series("px", records));
    engine
        .set_config(
            ChartConfig::new().with_plot("price", "close", PlotConfig::scalar(PlotKind::SolidLine, "px")),
        )
        .expect("valid config");
    engine
}

#[test]
fn three_scalar_rows_fill_the_window_at_full_zoom() {
    let mut engine = engine_with(unpadded_full_zoom());
    engine
        .set_data_json(
            r#"{"px": [
                {"ts": "2023-01-01T00:00:00Z", "value": 10},
                {"ts": "2023-01-01T00:01:00Z", "value": 12},
                {"ts": "2023-01-01T00:02:00Z", "value": 11}
            ]}"#,
        )
        .expect("valid data");
    let rejected = engine
        .set_config_json(r#"{"price": {"close": {"type": "solid-line", "dataId": "px"}}}"#)
        .expect("valid config");
    assert!(rejected.is_empty());

    let window = engine.window_state();
    assert_eq!((window.start_index, window.end_index), (0, 3));
    assert_eq!(engine.windowed_data().len(), 3);

    let domain = engine.domains().value_domain("price").expect("price domain");
    assert_relative_eq!(domain.min, 10.0);
    assert_relative_eq!(domain.max, 12.0);
}

#[test]
fn zooming_out_cannot_exceed_available_rows() {
    let mut engine = line_engine(3, unpadded_full_zoom());
    engine.zoom(-1.0);

    let window = engine.window_state();
    assert_relative_eq!(engine.zoom_level(), engine.settings().min_zoom_level);
    assert_eq!(window.len(), 3);
    assert_eq!(window.end_index, 3);
}

#[test]
fn candle_domain_spans_lows_and_highs() {
    let mut engine = engine_with(unpadded_full_zoom());
    engine.set_data(GraphData::new().with_series(
        "nifty",
        vec![
            OhlcvRecord::new(at(0), 10.0, 15.0, 8.0, 12.0, 1_000.0),
            OhlcvRecord::new(at(1), 12.0, 14.0, 9.0, 13.0, 800.0),
        ],
    ));
    engine
        .set_config(ChartConfig::new().with_plot("price", "ohlc", PlotConfig::candle("nifty")))
        .expect("valid config");

    let domain = engine.domains().value_domain("price").expect("price domain");
    assert_relative_eq!(domain.min, 8.0);
    assert_relative_eq!(domain.max, 15.0);
}

#[test]
fn dragging_toward_latest_clamps_at_zero_offset() {
    let mut window = WindowController::new(1.0, 0.001);
    window.set_interpolator(10, 3);
    window.begin_drag();

    assert!(!window.pan_by_pixels(50.0, 10.0));
    assert_eq!(window.pan_offset(), 0);
    assert_eq!(window.state().end_index, 10);
}

#[test]
fn engine_pan_moves_by_whole_slots_relative_to_drag_start() {
    let mut engine = line_engine(30, SettingsPatch::default());
    let before = engine.window_state();
    let slot = engine.mapper().step();
    assert!(slot > 0.0);

    engine.pan_start();
    assert_eq!(engine.interaction_mode(), InteractionMode::Panning);
    assert!(engine.pan(-3.5 * slot, 0.0));
    assert_eq!(engine.window_state().pan_offset, 4);
    // a second move is still measured from the drag start
    assert!(engine.pan(-1.5 * slot, 12.0));
    assert_eq!(engine.window_state().pan_offset, 2);
    engine.pan_end();
    assert_eq!(engine.interaction_mode(), InteractionMode::Idle);

    let after = engine.window_state();
    assert_eq!(after.len(), before.len());
    assert_eq!(after.end_index, before.end_index - 2);
}

#[test]
fn zoom_to_range_selects_bracketing_rows_and_keeps_panning_coherent() {
    let mut engine = line_engine(50, SettingsPatch::default());
    let start = at(10) + chrono::Duration::seconds(30);
    assert!(engine.zoom_to_range(start, at(19)));

    let rows = engine.windowed_data();
    assert_eq!(rows.first().map(|row| row.timestamp), Some(at(10)));
    assert_eq!(rows.last().map(|row| row.timestamp), Some(at(19)));
    let window = engine.window_state();
    assert_eq!(window.pan_offset, 30);

    let slot = engine.mapper().step();
    engine.pan_start();
    engine.pan(slot * 2.5, 0.0);
    engine.pan_end();
    let panned = engine.window_state();
    assert_eq!(panned.pan_offset, 28);
    assert_eq!(panned.len(), window.len());
}

#[test]
fn zoom_to_range_on_empty_chart_is_a_no_op() {
    let mut engine = engine_with(SettingsPatch::default());
    assert!(!engine.zoom_to_range(at(0), at(5)));
    assert!(engine.windowed_data().is_empty());
}

#[test]
fn wheel_direction_follows_delta_sign() {
    let mut engine = line_engine(40, SettingsPatch::default());
    let start = engine.zoom_level();
    engine.zoom_by_wheel(-120.0);
    assert_relative_eq!(engine.zoom_level(), start - 0.01, epsilon = 1e-12);
    engine.zoom_by_wheel(120.0);
    engine.zoom_by_wheel(120.0);
    assert_relative_eq!(engine.zoom_level(), start + 0.01, epsilon = 1e-12);
    engine.zoom_by_wheel(f64::NAN);
    assert_relative_eq!(engine.zoom_level(), start + 0.01, epsilon = 1e-12);
}

#[test]
fn new_data_rebinds_window_to_latest_rows() {
    let mut engine = line_engine(10, SettingsPatch::default());
    assert_eq!(engine.window_state().end_index, 10);

    let records: Vec<ValueRecord> = (0..20)
        .map(|i| ValueRecord::new(at(i), i as f64))
        .collect();
    engine.set_data(GraphData::new().with_series("px", records));

    let window = engine.window_state();
    assert_eq!(engine.data_matrix().len(), 20);
    assert_eq!(window.end_index, 20);
    assert_eq!(window.len(), 7);
}

#[test]
fn crosshair_snaps_to_band_and_reads_value_back() {
    let mut engine = line_engine(10, SettingsPatch::default());
    let rows = engine.windowed_data().to_vec();
    let target = &rows[2];
    let x = engine.mapper().x_of(target.timestamp).expect("x of row");
    let y = engine.mapper().y_of("price", 107.0).expect("y of value");

    engine.pointer_move(x + 1.0, y);
    let crosshair = engine.crosshair_state();
    assert!(crosshair.visible);
    assert_eq!(crosshair.pane_index, Some(0));
    assert_eq!(crosshair.snapped_time, Some(target.timestamp));
    assert_relative_eq!(crosshair.snapped_x.expect("snapped x"), x);
    assert_relative_eq!(crosshair.snapped_value.expect("value"), 107.0, epsilon = 1e-9);

    engine.pointer_leave();
    assert!(!engine.crosshair_state().visible);
}

#[test]
fn config_with_only_invalid_plots_is_rejected_and_previous_kept() {
    let mut engine = line_engine(5, SettingsPatch::default());
    let broken = ChartConfig::new().with_plot("price", "sma", PlotConfig::new(PlotKind::SolidLine, "px"));

    assert!(engine.set_config(broken).is_err());
    assert!(engine.config().plot("price", "close").is_some());
    assert_eq!(engine.data_matrix().len(), 5);
}

#[test]
fn partially_invalid_config_keeps_valid_plots() {
    let mut engine = line_engine(5, SettingsPatch::default());
    let config = ChartConfig::new()
        .with_plot("price", "close", PlotConfig::scalar(PlotKind::SolidLine, "px"))
        .with_plot("price", "sma", PlotConfig::new(PlotKind::SolidLine, "px"));

    let rejected = engine.set_config(config).expect("valid part applies");
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].plot_id, "sma");
    assert_eq!(engine.config().plot_count(), 1);
}

#[test]
fn zero_sized_viewport_is_rejected() {
    let config = ChartEngineConfig::new(Viewport::new(0, 300));
    assert!(ChartEngine::new(NullRenderer::default(), config).is_err());

    let mut engine = engine_with(SettingsPatch::default());
    assert!(engine.set_viewport(Viewport::new(640, 0)).is_err());
    assert_eq!(engine.viewport(), Viewport::new(800, 600));
}

#[test]
fn flat_series_at_large_magnitude_keeps_its_value_scale() {
    let mut engine = engine_with(unpadded_full_zoom());
    let records: Vec<ValueRecord> = (0..5).map(|i| ValueRecord::new(at(i), 5.0e10)).collect();
    engine.set_data(GraphData::new().with_series("px", records));
    engine
        .set_config(
            ChartConfig::new().with_plot("price", "close", PlotConfig::scalar(PlotKind::SolidLine, "px")),
        )
        .expect("valid config");

    let domain = engine.domains().value_domain("price").expect("price domain");
    assert!(domain.min < domain.max);
    assert!(engine.mapper().value_scale("price").is_some());

    let pane = engine.pane_layout().panes[0].clone();
    engine.pointer_move(100.0, pane.top + pane.height / 2.0);
    let value = engine.crosshair_state().snapped_value.expect("crosshair value");
    assert_relative_eq!(value, 5.0e10, max_relative = 1e-9);
    engine.render().expect("render");
}
