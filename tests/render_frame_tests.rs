use chrono::{DateTime, Utc};
use smallvec::smallvec;
use trading_charts::api::{ChartEngine, ChartEngineConfig, SettingsPatch, Theme};
use trading_charts::core::{
    ChartConfig, GraphData, OhlcvRecord, PlotConfig, PlotKind, ValueRecord, Viewport,
};
use trading_charts::extensions::{AnnotationKind, AnnotationMark, FlagDirection};
use trading_charts::render::{Color, LineStrokeStyle, NullRenderer, RenderFrame};

const ORANGE: Color = Color::rgb(1.0, 0.5, 0.0);

fn at(hour: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000 + 3_600 * hour, 0).expect("valid time")
}

fn engine(settings: SettingsPatch) -> ChartEngine<NullRenderer> {
    let config = ChartEngineConfig::new(Viewport::new(900, 600)).with_settings(settings);
    ChartEngine::new(NullRenderer::default(), config).expect("engine init")
}

/// Candles on `price`, a line on `price` and volume bars on `volume`.
fn market_engine(settings: SettingsPatch) -> ChartEngine<NullRenderer> {
    let mut engine = engine(settings);
    let candles: Vec<OhlcvRecord> = (0..40)
        .map(|i| {
            let base = 100.0 + (i % 7) as f64;
            OhlcvRecord::new(at(i), base, base + 3.0, base - 2.0, base + 1.0, 1_000.0 + 10.0 * i as f64)
        })
        .collect();
    let sma: Vec<ValueRecord> = (0..40).map(|i| ValueRecord::new(at(i), 102.0)).collect();
    engine.set_data(
        GraphData::new()
            .with_series("nifty", candles)
            .with_series("sma", sma),
    );
    let config = ChartConfig::new()
        .with_plot("price", "ohlc", PlotConfig::candle("nifty").with_color(ORANGE))
        .with_plot("price", "sma", PlotConfig::scalar(PlotKind::DashedLine, "sma"))
        .with_plot(
            "volume",
            "vol",
            PlotConfig::scalar(PlotKind::Bar, "nifty")
                .with_scalar_extractor(|record| match record {
                    trading_charts::core::RawRecord::Ohlcv(bar) => Some(bar.volume),
                    _ => None,
                })
                .with_baseline(0.0),
        );
    engine.set_config(config).expect("valid config");
    engine
}

fn last_frame(engine: &ChartEngine<NullRenderer>) -> &RenderFrame {
    engine.renderer().last_frame.as_ref().expect("rendered frame")
}

#[test]
fn empty_chart_renders_background_only() {
    let mut engine = engine(SettingsPatch::default());
    engine.set_theme(Theme::Dark).expect("theme");
    engine.render().expect("render");

    let frame = last_frame(&engine);
    assert_eq!(frame.rects.len(), 1);
    assert_eq!(frame.rects[0].fill_color, Color::from_rgb8(0, 0, 0));
    assert!(frame.lines.is_empty());
    assert!(frame.texts.is_empty());
}

#[test]
fn every_plot_kind_contributes_primitives() {
    let mut engine = market_engine(SettingsPatch::default());
    engine.render().expect("render");

    let window_len = engine.window_state().len();
    let frame = last_frame(&engine);
    let candle_bodies = frame
        .rects
        .iter()
        .filter(|rect| rect.fill_color == ORANGE)
        .count();
    assert_eq!(candle_bodies, window_len);

    let dashed = frame
        .lines
        .iter()
        .filter(|line| line.stroke_style == LineStrokeStyle::Dashed)
        .count();
    assert_eq!(dashed, window_len - 1);

    // background + candle bodies + one bar per row
    assert_eq!(frame.rects.len(), 1 + 2 * window_len);
}

#[test]
fn panes_stack_in_config_order() {
    let engine = market_engine(SettingsPatch::default());
    let layout = engine.pane_layout();
    assert_eq!(layout.panes.len(), 2);
    assert_eq!(layout.panes[0].scale_id, "price");
    assert_eq!(layout.panes[1].scale_id, "volume");
    assert!(layout.panes[0].bottom() <= layout.panes[1].top);
    assert!(layout.panes[1].bottom() <= layout.x_axis_top());
}

#[test]
fn legend_follows_crosshair_row() {
    let mut engine = market_engine(SettingsPatch {
        title: Some("NIFTY 50".to_owned()),
        ..SettingsPatch::default()
    });
    engine.render().expect("render");
    let latest_close = format!("ohlc: O {0} H {1} L {2} C {3}", 104, 107, 102, 105);
    assert!(last_frame(&engine).texts.iter().any(|t| t.text == latest_close));
    assert!(last_frame(&engine).texts.iter().any(|t| t.text == "NIFTY 50"));
    assert!(last_frame(&engine).texts.iter().any(|t| t.text == "vol: 1390"));

    let first = engine.windowed_data()[0].timestamp;
    let x = engine.mapper().x_of(first).expect("x");
    let pane = engine.pane_layout().panes[0].clone();
    engine.pointer_move(x, pane.top + pane.height / 2.0);
    engine.render().expect("render");

    let frame = last_frame(&engine);
    assert!(!frame.texts.iter().any(|t| t.text == latest_close));
    let crosshair_lines: Vec<_> = frame
        .lines
        .iter()
        .filter(|line| line.color == engine.settings().crosshair_color)
        .collect();
    assert_eq!(crosshair_lines.len(), 2);
    assert!(crosshair_lines
        .iter()
        .all(|line| line.stroke_style == engine.settings().crosshair_type));
}

#[test]
fn malformed_annotation_is_skipped_without_blanking_others() {
    let mut engine = market_engine(SettingsPatch::default());
    let rows = engine.windowed_data().to_vec();
    let start = rows[1].timestamp;
    let end = rows[4].timestamp;

    let mut broken = AnnotationMark::x_range("price", start, end, ORANGE);
    broken.x = smallvec![start];
    assert_eq!(broken.kind, AnnotationKind::XRange);

    engine.set_annotations(vec![
        broken,
        AnnotationMark::x_single("price", end, Color::rgb(0.0, 0.0, 1.0)),
        AnnotationMark::flag("price", start, 104.0, FlagDirection::Down, Color::rgb(0.0, 0.6, 0.0))
            .with_text("B"),
    ]);
    engine.render().expect("render");

    let frame = last_frame(&engine);
    assert!(frame
        .lines
        .iter()
        .any(|line| line.color == Color::rgb(0.0, 0.0, 1.0)));
    assert!(frame
        .polygons
        .iter()
        .any(|polygon| polygon.fill_color == Color::rgb(0.0, 0.6, 0.0)));
    assert!(frame.texts.iter().any(|t| t.text == "B"));
}

#[test]
fn annotations_load_from_json() {
    let mut engine = market_engine(SettingsPatch::default());
    engine
        .set_annotations_json(
            r##"[
                {"scaleId": "price", "type": "xRange", "x": ["2023-11-14T22:13:20Z", "2023-11-15T02:13:20Z"], "color": "#ff000080"},
                {"scaleId": "volume", "type": "rect", "x": ["2023-11-14T22:13:20Z", "2023-11-15T02:13:20Z"], "y": [1000, 1100, 1050, 1150], "color": "#00ff00"}
            ]"##,
        )
        .expect("valid annotations");
    assert_eq!(engine.annotations().len(), 2);
    assert!(engine.set_annotations_json(r#"[{"type": "unknown"}]"#).is_err());
    assert_eq!(engine.annotations().len(), 2);

    engine.clear_annotations();
    assert!(engine.annotations().is_empty());
}

#[test]
fn watermark_and_axis_labels_are_drawn() {
    let mut engine = market_engine(SettingsPatch {
        watermark_text: Some("DEMO".to_owned()),
        x_scale_format: Some("%H:%M".to_owned()),
        ..SettingsPatch::default()
    });
    engine.render().expect("render");

    let frame = last_frame(&engine);
    assert!(frame.texts.iter().any(|t| t.text == "DEMO"));
    let first = engine.windowed_data()[0].timestamp;
    let label = first.format("%H:%M").to_string();
    assert!(frame.texts.iter().any(|t| t.text == label));
}

#[test]
fn annotation_outside_float_range_does_not_blank_the_chart() {
    let mut engine = market_engine(SettingsPatch::default());
    engine.render().expect("render");
    let baseline_rects = last_frame(&engine).rects.len();

    engine.set_annotations(vec![
        AnnotationMark::x_single("price", at(30), Color::rgb(0.0, 0.0, 1.0)).with_text("ok"),
        AnnotationMark::flag("price", at(30), 1.7e308, FlagDirection::Up, Color::rgb(0.0, 0.6, 0.0)),
    ]);
    engine.render().expect("render survives an unmappable mark");

    let frame = last_frame(&engine);
    assert_eq!(frame.rects.len(), baseline_rects);
    assert!(frame.texts.iter().any(|t| t.text == "ok"));
    assert!(frame
        .lines
        .iter()
        .any(|line| line.color == Color::rgb(0.0, 0.0, 1.0)));
    assert!(!frame
        .polygons
        .iter()
        .any(|polygon| polygon.fill_color == Color::rgb(0.0, 0.6, 0.0)));
}
