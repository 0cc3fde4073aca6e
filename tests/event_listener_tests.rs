use std::cell::RefCell;
use std::rc::Rc;

use chrono::DateTime;
use trading_charts::api::{ChartEngine, ChartEngineConfig};
use trading_charts::core::{ChartConfig, GraphData, PlotConfig, PlotKind, ValueRecord, Viewport};
use trading_charts::extensions::{ChartEvent, ChartEventKind};
use trading_charts::render::NullRenderer;

fn engine() -> ChartEngine<NullRenderer> {
    let config = ChartEngineConfig::new(Viewport::new(600, 400));
    let mut engine = ChartEngine::new(NullRenderer::default(), config).expect("engine init");
    let records: Vec<ValueRecord> = (0..60)
        .map(|i| ValueRecord::new(DateTime::from_timestamp(60 * i, 0).expect("time"), i as f64))
        .collect();
    engine.set_data(GraphData::new().with_series("px", records));
    engine
        .set_config(ChartConfig::new().with_plot("main", "px", PlotConfig::scalar(PlotKind::Area, "px")))
        .expect("valid config");
    engine
}

fn recorder() -> (Rc<RefCell<Vec<ChartEvent>>>, impl FnMut(&ChartEvent) + 'static) {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    (events, move |event: &ChartEvent| sink.borrow_mut().push(*event))
}

#[test]
fn zoom_and_pan_notify_their_own_listeners() {
    let mut engine = engine();
    let (zooms, on_zoom) = recorder();
    let (pans, on_pan) = recorder();
    engine.on(ChartEventKind::Zoom, on_zoom);
    engine.on(ChartEventKind::Pan, on_pan);

    engine.zoom(0.05);
    let slot = engine.mapper().step();
    engine.pan_start();
    engine.pan(-2.5 * slot, 0.0);
    engine.pan_end();

    let zooms = zooms.borrow();
    assert_eq!(zooms.len(), 1);
    let window = engine.window_state();
    assert!(matches!(
        pans.borrow().as_slice(),
        [ChartEvent::Pan { pan_offset: 3, start_index, end_index }]
            if *start_index == window.start_index && *end_index == window.end_index
    ));
}

#[test]
fn pan_without_movement_is_silent() {
    let mut engine = engine();
    let (pans, on_pan) = recorder();
    engine.on(ChartEventKind::Pan, on_pan);

    engine.pan_start();
    assert!(!engine.pan(1_000.0, 0.0));
    engine.pan_end();
    assert!(pans.borrow().is_empty());
}

#[test]
fn once_listener_fires_a_single_time() {
    let mut engine = engine();
    let (zooms, on_zoom) = recorder();
    engine.once(ChartEventKind::Zoom, on_zoom);
    assert_eq!(engine.listener_count(ChartEventKind::Zoom), 1);

    engine.zoom(0.01);
    engine.zoom(0.01);
    assert_eq!(zooms.borrow().len(), 1);
    assert_eq!(engine.listener_count(ChartEventKind::Zoom), 0);
}

#[test]
fn removed_listeners_stop_receiving_events() {
    let mut engine = engine();
    let (zooms, on_zoom) = recorder();
    let id = engine.on(ChartEventKind::Zoom, on_zoom);
    let (_, other) = recorder();
    engine.on(ChartEventKind::Pan, other);

    assert!(engine.off(id));
    assert!(!engine.off(id));
    engine.zoom(0.01);
    assert!(zooms.borrow().is_empty());

    assert_eq!(engine.off_all(None), 1);
    assert_eq!(engine.listener_count(ChartEventKind::Pan), 0);
}

#[test]
fn range_zoom_reports_the_new_window() {
    let mut engine = engine();
    let (zooms, on_zoom) = recorder();
    engine.on(ChartEventKind::Zoom, on_zoom);

    let start = DateTime::from_timestamp(60 * 10, 0).expect("time");
    let end = DateTime::from_timestamp(60 * 29, 0).expect("time");
    assert!(engine.zoom_to_range(start, end));

    assert!(matches!(
        zooms.borrow().as_slice(),
        [ChartEvent::Zoom { start_index: 10, end_index: 30, .. }]
    ));
}
