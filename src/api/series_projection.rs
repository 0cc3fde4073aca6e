use crate::core::{BandScale, Cell, LinearScale, PaneRegion, PlotKind, PlotValue};
use crate::render::{
    Color, LinePrimitive, LineStrokeStyle, PolygonPrimitive, RectPrimitive, RenderFrame,
};

const WICK_WIDTH_PX: f64 = 1.0;
const MIN_BODY_HEIGHT_PX: f64 = 1.0;
const AREA_FILL_OPACITY: f64 = 0.4;

/// Geometry shared by every plot of one pane.
#[derive(Debug, Clone, Copy)]
pub(super) struct SeriesContext<'a> {
    pub(super) band: BandScale,
    pub(super) values: LinearScale,
    pub(super) pane: &'a PaneRegion,
    pub(super) line_width: f64,
}

impl SeriesContext<'_> {
    /// Pixel row of a cell's baseline, or the pane bottom without one.
    fn base_y(&self, cell: &Cell) -> f64 {
        cell.baseline
            .filter(|value| value.is_finite())
            .map_or(self.pane.bottom(), |value| self.values.map(value))
    }

    /// Band centers and mapped values of the scalar cells.
    fn scalar_path(&self, points: &[(usize, Cell)]) -> Vec<(f64, f64, f64)> {
        points
            .iter()
            .filter_map(|(slot, cell)| {
                let PlotValue::Scalar(value) = cell.value else {
                    return None;
                };
                let x = self.band.center(*slot)?;
                Some((x, self.values.map(value), self.base_y(cell)))
            })
            .collect()
    }
}

/// Appends the primitives of one plot. `points` pairs window slots with cells.
pub(super) fn project_plot(
    frame: &mut RenderFrame,
    kind: PlotKind,
    points: &[(usize, Cell)],
    ctx: &SeriesContext<'_>,
) {
    if points.is_empty() {
        return;
    }
    match kind {
        PlotKind::Candle => project_candles(frame, points, ctx),
        PlotKind::SolidLine => project_line(frame, points, ctx, LineStrokeStyle::Solid),
        PlotKind::DashedLine => project_line(frame, points, ctx, LineStrokeStyle::Dashed),
        PlotKind::DottedLine => project_line(frame, points, ctx, LineStrokeStyle::Dotted),
        PlotKind::Area => project_area(frame, points, ctx),
        PlotKind::Bar | PlotKind::VarBar => project_bars(frame, points, ctx),
    }
}

fn project_candles(frame: &mut RenderFrame, points: &[(usize, Cell)], ctx: &SeriesContext<'_>) {
    let bandwidth = ctx.band.bandwidth();
    for (slot, cell) in points {
        let PlotValue::Candle(candle) = cell.value else {
            continue;
        };
        let Some(x) = ctx.band.position(*slot) else {
            continue;
        };
        let open_y = ctx.values.map(candle.open);
        let close_y = ctx.values.map(candle.close);
        let wick_x = x + bandwidth / 2.0;

        frame.rects.push(RectPrimitive {
            x,
            y: open_y.min(close_y),
            width: bandwidth,
            height: (close_y - open_y).abs().max(MIN_BODY_HEIGHT_PX),
            fill_color: cell.color,
        });
        frame.lines.push(LinePrimitive::new(
            wick_x,
            ctx.values.map(candle.high),
            wick_x,
            ctx.values.map(candle.low),
            WICK_WIDTH_PX,
            cell.color,
        ));
    }
}

fn project_line(
    frame: &mut RenderFrame,
    points: &[(usize, Cell)],
    ctx: &SeriesContext<'_>,
    stroke_style: LineStrokeStyle,
) {
    let color = points[0].1.color;
    let path = ctx.scalar_path(points);
    push_polyline(frame, &path, ctx.line_width, color, stroke_style);
}

fn project_area(frame: &mut RenderFrame, points: &[(usize, Cell)], ctx: &SeriesContext<'_>) {
    let color = points[0].1.color;
    let path = ctx.scalar_path(points);
    if path.len() >= 2 {
        let fill: Vec<(f64, f64)> = path
            .iter()
            .map(|(x, y, _)| (*x, *y))
            .chain(path.iter().rev().map(|(x, _, base)| (*x, *base)))
            .collect();
        frame.polygons.push(PolygonPrimitive::new(
            fill,
            color.with_alpha(color.alpha * AREA_FILL_OPACITY),
        ));
    }
    push_polyline(frame, &path, ctx.line_width, color, LineStrokeStyle::Solid);
}

fn project_bars(frame: &mut RenderFrame, points: &[(usize, Cell)], ctx: &SeriesContext<'_>) {
    let bandwidth = ctx.band.bandwidth();
    for (slot, cell) in points {
        let PlotValue::Scalar(value) = cell.value else {
            continue;
        };
        let Some(x) = ctx.band.position(*slot) else {
            continue;
        };
        frame.rects.push(RectPrimitive::from_corners(
            x,
            ctx.values.map(value),
            x + bandwidth,
            ctx.base_y(cell),
            cell.color,
        ));
    }
}

fn push_polyline(
    frame: &mut RenderFrame,
    path: &[(f64, f64, f64)],
    width: f64,
    color: Color,
    stroke_style: LineStrokeStyle,
) {
    for pair in path.windows(2) {
        let (x1, y1, _) = pair[0];
        let (x2, y2, _) = pair[1];
        frame
            .lines
            .push(LinePrimitive::new(x1, y1, x2, y2, width, color).with_stroke_style(stroke_style));
    }
}
