use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};
use tracing::warn;

use crate::core::{CoordinateMapper, PaneLayout, PaneRegion, ScaleId, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::render::{
    Color, LinePrimitive, PolygonPrimitive, RectPrimitive, RenderFrame, TextHAlign, TextPrimitive,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnnotationKind {
    /// Shaded span between two instants.
    XRange,
    /// Vertical marker at one instant.
    XSingle,
    /// Triangle flag at one instant and value.
    Flag,
    /// Quadrilateral between two instants and four values `y11, y12, y21, y22`.
    Rect,
}

impl AnnotationKind {
    /// Required `(x, y)` arity.
    #[must_use]
    pub fn arity(self) -> (usize, usize) {
        match self {
            Self::XRange => (2, 0),
            Self::XSingle => (1, 0),
            Self::Flag => (1, 1),
            Self::Rect => (2, 4),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FlagDirection {
    #[default]
    Up,
    Down,
}

/// Overlay drawn on one pane, positioned through the coordinate mapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationMark {
    pub scale_id: ScaleId,
    #[serde(rename = "type")]
    pub kind: AnnotationKind,
    pub x: SmallVec<[DateTime<Utc>; 2]>,
    #[serde(default)]
    pub y: SmallVec<[f64; 4]>,
    pub color: Color,
    #[serde(default)]
    pub area_color: Option<Color>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub direction: FlagDirection,
}

impl AnnotationMark {
    fn base(scale_id: impl Into<ScaleId>, kind: AnnotationKind, color: Color) -> Self {
        Self {
            scale_id: scale_id.into(),
            kind,
            x: SmallVec::new(),
            y: SmallVec::new(),
            color,
            area_color: None,
            text: String::new(),
            direction: FlagDirection::Up,
        }
    }

    #[must_use]
    pub fn x_range(
        scale_id: impl Into<ScaleId>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        color: Color,
    ) -> Self {
        let mut mark = Self::base(scale_id, AnnotationKind::XRange, color);
        mark.x = smallvec![start, end];
        mark
    }

    #[must_use]
    pub fn x_single(scale_id: impl Into<ScaleId>, at: DateTime<Utc>, color: Color) -> Self {
        let mut mark = Self::base(scale_id, AnnotationKind::XSingle, color);
        mark.x = smallvec![at];
        mark
    }

    #[must_use]
    pub fn flag(
        scale_id: impl Into<ScaleId>,
        at: DateTime<Utc>,
        value: f64,
        direction: FlagDirection,
        color: Color,
    ) -> Self {
        let mut mark = Self::base(scale_id, AnnotationKind::Flag, color);
        mark.x = smallvec![at];
        mark.y = smallvec![value];
        mark.direction = direction;
        mark
    }

    /// Band from `(start, y11..y12)` to `(end, y21..y22)`.
    #[must_use]
    pub fn rect(
        scale_id: impl Into<ScaleId>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        values: [f64; 4],
        color: Color,
    ) -> Self {
        let mut mark = Self::base(scale_id, AnnotationKind::Rect, color);
        mark.x = smallvec![start, end];
        mark.y = SmallVec::from_buf(values);
        mark
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    #[must_use]
    pub fn with_area_color(mut self, area_color: Color) -> Self {
        self.area_color = Some(area_color);
        self
    }

    /// Checks geometry arity and value finiteness; `index` labels the error.
    pub fn validate(&self, index: usize) -> ChartResult<()> {
        let invalid = |reason: String| ChartError::InvalidAnnotation { index, reason };
        let (x_needed, y_needed) = self.kind.arity();
        if self.x.len() < x_needed {
            return Err(invalid(format!(
                "{:?} needs {x_needed} x value(s), got {}",
                self.kind,
                self.x.len()
            )));
        }
        if self.y.len() < y_needed {
            return Err(invalid(format!(
                "{:?} needs {y_needed} y value(s), got {}",
                self.kind,
                self.y.len()
            )));
        }
        if self.y.iter().take(y_needed).any(|y| !y.is_finite()) {
            return Err(invalid("y values must be finite".to_owned()));
        }
        self.color
            .validate()
            .map_err(|err| invalid(err.to_string()))?;
        Ok(())
    }

    fn area_color(&self) -> Color {
        self.area_color
            .unwrap_or_else(|| self.color.with_alpha(self.color.alpha * 0.2))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnotationStyle {
    pub line_width: f64,
    pub font_size_px: f64,
    pub text_color: Color,
}

/// Everything needed to place annotations for one frame.
#[derive(Debug, Clone, Copy)]
pub struct AnnotationContext<'a> {
    pub viewport: Viewport,
    pub mapper: &'a CoordinateMapper,
    pub layout: &'a PaneLayout,
    pub style: AnnotationStyle,
}

impl AnnotationContext<'_> {
    /// Slot of an instant inside the window, snapped at or before.
    fn slot_within(&self, at: DateTime<Utc>) -> Option<usize> {
        let last = *self.mapper.time_domain().last()?;
        if at > last {
            return None;
        }
        self.mapper.slot_at_or_before(at)
    }

    /// Slots of a span clamped to the window; `None` when fully outside.
    fn span_slots(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> Option<(usize, usize)> {
        let domain = self.mapper.time_domain();
        let (first, last) = (*domain.first()?, *domain.last()?);
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        if end < first || start > last {
            return None;
        }
        let start_slot = self.mapper.slot_at_or_before(start.max(first))?;
        let end_slot = self.mapper.slot_at_or_before(end.min(last))?;
        Some((start_slot, end_slot))
    }
}

fn project_mark(
    index: usize,
    mark: &AnnotationMark,
    ctx: &AnnotationContext<'_>,
) -> ChartResult<Option<RenderFrame>> {
    mark.validate(index)?;
    let pane: &PaneRegion = ctx.layout.pane(&mark.scale_id).ok_or_else(|| {
        ChartError::InvalidAnnotation {
            index,
            reason: format!("unknown scale `{}`", mark.scale_id),
        }
    })?;
    let style = ctx.style;
    let mut frame = RenderFrame::new(ctx.viewport);

    match mark.kind {
        AnnotationKind::XRange => {
            let Some((start, end)) = ctx.span_slots(mark.x[0], mark.x[1]) else {
                return Ok(None);
            };
            let (Some(x1), Some(x2)) = (ctx.mapper.x_of_slot(start), ctx.mapper.x_of_slot(end))
            else {
                return Ok(None);
            };
            for x in [x1, x2] {
                frame.lines.push(LinePrimitive::new(
                    x,
                    pane.top,
                    x,
                    pane.bottom(),
                    style.line_width,
                    mark.color,
                ));
            }
            frame.rects.push(RectPrimitive::from_corners(
                x1,
                pane.top,
                x2,
                pane.bottom(),
                mark.area_color(),
            ));
            push_label(&mut frame, mark, (x1 + x2) / 2.0, pane.top + 10.0, style);
        }
        AnnotationKind::XSingle => {
            let Some(x) = ctx.slot_within(mark.x[0]).and_then(|s| ctx.mapper.x_of_slot(s))
            else {
                return Ok(None);
            };
            frame.lines.push(LinePrimitive::new(
                x,
                pane.top,
                x,
                pane.bottom(),
                style.line_width,
                mark.color,
            ));
            push_label(&mut frame, mark, x, pane.top + 10.0, style);
        }
        AnnotationKind::Flag => {
            let Some(x) = ctx.slot_within(mark.x[0]).and_then(|s| ctx.mapper.x_of_slot(s))
            else {
                return Ok(None);
            };
            let Some(y) = ctx.mapper.y_of(&mark.scale_id, mark.y[0]) else {
                return Ok(None);
            };
            let dir = match mark.direction {
                FlagDirection::Up => -1.0,
                FlagDirection::Down => 1.0,
            };
            let marker_h = style.font_size_px * 2.0;
            let marker_w = style.font_size_px * 1.4;
            frame.polygons.push(PolygonPrimitive::new(
                vec![
                    (x, y),
                    (x - marker_w, y + dir * marker_h),
                    (x + marker_w, y + dir * marker_h),
                ],
                mark.color,
            ));
            if let Some(initial) = mark.text.chars().next() {
                frame.texts.push(TextPrimitive::new(
                    initial.to_string(),
                    x,
                    y + dir * marker_h * 0.6,
                    style.font_size_px,
                    style.text_color,
                    TextHAlign::Center,
                ));
            }
        }
        AnnotationKind::Rect => {
            let Some((start, end)) = ctx.span_slots(mark.x[0], mark.x[1]) else {
                return Ok(None);
            };
            let (Some(x1), Some(x2)) = (ctx.mapper.x_of_slot(start), ctx.mapper.x_of_slot(end))
            else {
                return Ok(None);
            };
            let ys: Option<SmallVec<[f64; 4]>> = mark.y[..4]
                .iter()
                .map(|value| ctx.mapper.y_of(&mark.scale_id, *value))
                .collect();
            let Some(ys) = ys else {
                return Ok(None);
            };
            let (y11, y12, y21, y22) = (ys[0], ys[1], ys[2], ys[3]);
            frame
                .lines
                .push(LinePrimitive::new(x1, y11, x2, y21, style.line_width, mark.color));
            frame
                .lines
                .push(LinePrimitive::new(x1, y12, x2, y22, style.line_width, mark.color));
            frame.polygons.push(PolygonPrimitive::new(
                vec![(x1, y11), (x1, y12), (x2, y22), (x2, y21)],
                mark.area_color(),
            ));
            push_label(&mut frame, mark, (x1 + x2) / 2.0, (y12 + y22) / 2.0, style);
        }
    }

    // finite data can still map past f64 range
    frame
        .validate()
        .map_err(|err| ChartError::InvalidAnnotation {
            index,
            reason: err.to_string(),
        })?;
    Ok(Some(frame))
}

fn push_label(frame: &mut RenderFrame, mark: &AnnotationMark, x: f64, y: f64, style: AnnotationStyle) {
    if mark.text.is_empty() {
        return;
    }
    frame.texts.push(TextPrimitive::new(
        mark.text.clone(),
        x,
        y,
        style.font_size_px,
        mark.color,
        TextHAlign::Center,
    ));
}

/// Appends every drawable mark to `frame`.
///
/// Invalid marks are logged and skipped so one bad mark never blanks the
/// rest; marks outside the window are clipped silently. Returns the number
/// of invalid marks.
pub fn project_annotations(
    marks: &[AnnotationMark],
    ctx: &AnnotationContext<'_>,
    frame: &mut RenderFrame,
) -> usize {
    let mut invalid = 0;
    for (index, mark) in marks.iter().enumerate() {
        match project_mark(index, mark, ctx) {
            Ok(Some(part)) => frame.extend(part),
            Ok(None) => {}
            Err(err) => {
                invalid += 1;
                warn!(error = %err, "skipping annotation");
            }
        }
    }
    invalid
}
